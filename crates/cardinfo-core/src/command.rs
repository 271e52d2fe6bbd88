use core::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Error;
use crate::model::Instruction;

pub const CACHE_MARKER: &str = "#runnable-cache";
// accepted on input only
pub const LEGACY_CACHE_MARKER: &str = "# runnable-cache";

static INSTRUCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)(?:\s+|$)").expect("instruction pattern is valid")
});

/// `instruction` is `None` only for the blank command produced from an
/// empty line. Blank commands render as nothing.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Command {
    pub instruction: Option<Instruction>,
    pub body: String,
    pub cache: bool,
}

impl Command {
    pub fn new(instruction: Instruction, body: impl Into<String>) -> Self {
        Self {
            instruction: Some(instruction),
            body: body.into(),
            cache: false,
        }
    }

    pub fn blank() -> Self {
        Self {
            instruction: None,
            body: String::new(),
            cache: false,
        }
    }

    pub fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    pub fn parse(line: &str) -> Result<Self, Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Self::blank());
        }

        let captures = INSTRUCTION_PATTERN
            .captures(trimmed)
            .ok_or_else(|| Error::malformed_instruction(line))?;
        let instruction = Instruction::from_keyword(&captures[1])
            .ok_or_else(|| Error::malformed_instruction(line))?;
        let rest = trimmed[captures[0].len()..].trim_end();

        let (rest, cache) = match rest
            .strip_suffix(LEGACY_CACHE_MARKER)
            .or_else(|| rest.strip_suffix(CACHE_MARKER))
        {
            Some(stripped) => (stripped, true),
            None => (rest, false),
        };

        Ok(Self {
            instruction: Some(instruction),
            body: rest.trim().to_string(),
            cache,
        })
    }

    pub fn is_blank(&self) -> bool {
        self.instruction.is_none() || self.body.trim().is_empty()
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(instruction) = self.instruction.filter(|_| !self.is_blank()) else {
            return Ok(());
        };
        write!(f, "{instruction} {}", self.body.trim())?;
        if self.cache {
            write!(f, " {CACHE_MARKER}")?;
        }
        Ok(())
    }
}

// copies carry the canonical form of the rendered line
impl Clone for Command {
    fn clone(&self) -> Self {
        Self::parse(&self.to_string()).unwrap_or_else(|_| Self {
            instruction: self.instruction,
            body: self.body.clone(),
            cache: self.cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{CACHE_MARKER, Command};
    use crate::error::Error;
    use crate::model::Instruction;

    #[test]
    fn parses_instruction_and_body() {
        let command = Command::parse("RUN apt-get install -y curl").expect("command");
        assert_eq!(command.instruction, Some(Instruction::Run));
        assert_eq!(command.body, "apt-get install -y curl");
        assert!(!command.cache);
    }

    #[test]
    fn keyword_is_case_insensitive_and_canonicalized() {
        let command = Command::parse("expose   8080 ").expect("command");
        assert_eq!(command.instruction, Some(Instruction::Expose));
        assert_eq!(command.to_string(), "EXPOSE 8080");
    }

    #[test]
    fn detects_both_cache_marker_spellings() {
        let tight = Command::parse("RUN apt-get install #runnable-cache").expect("command");
        assert!(tight.cache);
        assert_eq!(tight.body, "apt-get install");

        let spaced = Command::parse("RUN make   # runnable-cache").expect("command");
        assert!(spaced.cache);
        assert_eq!(spaced.body, "make");
        assert_eq!(spaced.to_string(), format!("RUN make {CACHE_MARKER}"));
    }

    #[test]
    fn blank_line_is_a_no_op_command() {
        let command = Command::parse("   ").expect("blank is allowed");
        assert_eq!(command, Command::blank());
        assert_eq!(command.to_string(), "");
    }

    #[test]
    fn empty_body_renders_nothing() {
        let mut command = Command::new(Instruction::Run, "").cached();
        assert_eq!(command.to_string(), "");
        command.instruction = None;
        assert_eq!(command.to_string(), "");
        assert_eq!(Command::parse("WORKDIR").expect("command").to_string(), "");
    }

    #[test]
    fn body_without_instruction_is_blank() {
        let command = Command {
            instruction: None,
            body: "make".to_string(),
            cache: true,
        };
        assert!(command.is_blank());
        assert_eq!(command.to_string(), "");
        assert_eq!(command.clone(), Command::blank());
    }

    #[test]
    fn rejects_unknown_instruction() {
        let err = Command::parse("Hello there").expect_err("should fail");
        assert!(matches!(err, Error::MalformedInstructionLine { .. }));
    }

    #[test]
    fn keyword_must_be_followed_by_separator() {
        assert!(Command::parse("RUNNER go").is_err());
        assert!(Command::parse("ENVIRONMENT x").is_err());
    }

    #[test]
    fn clone_normalizes_through_reparse() {
        let original = Command {
            instruction: Some(Instruction::Run),
            body: "  echo hi  ".to_string(),
            cache: true,
        };
        let copy = original.clone();
        assert_eq!(copy.body, "echo hi");
        assert!(copy.cache);
        assert_eq!(copy.to_string(), original.to_string());
    }

    #[test]
    fn format_of_parse_preserves_text() {
        for line in [
            "RUN apt-get install #runnable-cache",
            "ENV PATH=/usr/local/bin:$PATH",
            "CMD [\"node\", \"server.js\"]",
            "ONBUILD RUN make",
        ] {
            assert_eq!(Command::parse(line).expect("command").to_string(), line);
        }
    }
}
