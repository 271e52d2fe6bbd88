use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no recognized instruction in line: {line}")]
    MalformedInstructionLine { line: String },
    #[error("malformed ADD line: {line}")]
    MalformedAddLine { line: String },
    #[error("unknown item type: {label}")]
    UnknownItemKind { label: String },
    #[error("malformed document at line {line}: {msg}")]
    MalformedDocument { line: usize, msg: String },
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    pub fn malformed_instruction(line: impl Into<String>) -> Self {
        Self::MalformedInstructionLine { line: line.into() }
    }

    pub fn malformed_add(line: impl Into<String>) -> Self {
        Self::MalformedAddLine { line: line.into() }
    }

    pub fn unknown_kind(label: impl Into<String>) -> Self {
        Self::UnknownItemKind {
            label: label.into(),
        }
    }

    pub fn malformed_document(line: usize, msg: impl Into<String>) -> Self {
        Self::MalformedDocument {
            line,
            msg: msg.into(),
        }
    }

    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
