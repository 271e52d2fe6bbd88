use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    InstructionParse = 2,
    AddParse = 3,
    Document = 4,
    Io = 6,
    Usage = 64,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(value: &Error) -> Self {
        match value {
            Error::MalformedInstructionLine { .. } => Self::InstructionParse,
            Error::MalformedAddLine { .. } => Self::AddParse,
            Error::UnknownItemKind { .. } | Error::MalformedDocument { .. } => Self::Document,
            Error::Io { .. } => Self::Io,
        }
    }
}
