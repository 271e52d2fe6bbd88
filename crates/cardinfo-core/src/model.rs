use core::fmt;

use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instruction {
    Cmd,
    From,
    Maintainer,
    Run,
    Expose,
    Env,
    Add,
    Entrypoint,
    Volume,
    User,
    Workdir,
    Onbuild,
    Copy,
}

impl Instruction {
    pub const ALL: [Self; 13] = [
        Self::Cmd,
        Self::From,
        Self::Maintainer,
        Self::Run,
        Self::Expose,
        Self::Env,
        Self::Add,
        Self::Entrypoint,
        Self::Volume,
        Self::User,
        Self::Workdir,
        Self::Onbuild,
        Self::Copy,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cmd => "CMD",
            Self::From => "FROM",
            Self::Maintainer => "MAINTAINER",
            Self::Run => "RUN",
            Self::Expose => "EXPOSE",
            Self::Env => "ENV",
            Self::Add => "ADD",
            Self::Entrypoint => "ENTRYPOINT",
            Self::Volume => "VOLUME",
            Self::User => "USER",
            Self::Workdir => "WORKDIR",
            Self::Onbuild => "ONBUILD",
            Self::Copy => "COPY",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|instruction| instruction.as_str().eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    File,
    Repository,
    #[serde(rename = "Main Repository")]
    MainRepository,
    Packages,
    #[serde(rename = "SSH Key")]
    SshKey,
}

impl ItemKind {
    pub const ALL: [Self; 5] = [
        Self::File,
        Self::Repository,
        Self::MainRepository,
        Self::Packages,
        Self::SshKey,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Repository => "Repository",
            Self::MainRepository => "Main Repository",
            Self::Packages => "Packages",
            Self::SshKey => "SSH Key",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, Error> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == label)
            .ok_or_else(|| Error::unknown_kind(label))
    }

    pub fn default_path<'a>(self, name: &'a str, path: &'a str) -> &'a str {
        match self {
            Self::SshKey => crate::item::SSH_KEY_PATH,
            _ if !path.trim().is_empty() => path,
            Self::File => "",
            _ => name,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Instruction, ItemKind};

    #[test]
    fn keywords_match_case_insensitively() {
        assert_eq!(Instruction::from_keyword("run"), Some(Instruction::Run));
        assert_eq!(
            Instruction::from_keyword("EntryPoint"),
            Some(Instruction::Entrypoint)
        );
        assert_eq!(Instruction::from_keyword("ARG"), None);
    }

    #[test]
    fn labels_round_trip() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::from_label(kind.label()).expect("label"), kind);
        }
        assert!(ItemKind::from_label("Widget").is_err());
    }

    #[test]
    fn default_path_depends_on_kind() {
        assert_eq!(ItemKind::File.default_path("asdf", ""), "");
        assert_eq!(ItemKind::Repository.default_path("api", ""), "api");
        assert_eq!(ItemKind::MainRepository.default_path("api", "  "), "api");
        assert_eq!(ItemKind::Repository.default_path("api", "srv"), "srv");
        assert_eq!(ItemKind::SshKey.default_path("id_rsa", "tmp"), "root/.ssh/");
    }
}
