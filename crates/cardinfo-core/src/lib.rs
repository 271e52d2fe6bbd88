pub mod command;
pub mod error;
pub mod exit_code;
pub mod id;
pub mod item;
pub mod model;
pub mod parser;

pub use crate::command::Command;
pub use crate::error::Error;
pub use crate::exit_code::ExitCode;
pub use crate::id::{IdProvider, UuidV4};
pub use crate::item::{ContainerItem, DockerfileItem, Packages, wrap_with_type};
pub use crate::model::{Instruction, ItemKind};
pub use crate::parser::{parse_document, render_document};
