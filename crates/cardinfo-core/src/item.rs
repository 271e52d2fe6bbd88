use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::Error;
use crate::id::{IdProvider, UuidV4};
use crate::model::{Instruction, ItemKind};

pub const SSH_KEY_PATH: &str = "root/.ssh/";
pub const PACKAGES_PREAMBLE: &str =
    "RUN apt-get update -y && apt-get upgrade -y && apt-get install -y ";

const BOOTSTRAP_SCRIPT: &str = "find_and_replace.sh";

static LEGACY_ADD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ADD ((?:\\\s|[^\s])*) ((?:\\\s|[^\s])*)").expect("legacy ADD pattern is valid")
});

static LEGACY_SCRIPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)translation_rules\.sh").expect("legacy script pattern is valid")
});

/// The ADD + RUN pair that runs the find-and-replace script ahead of the
/// item's own commands.
pub fn bootstrap_commands() -> [Command; 2] {
    [
        Command::new(
            Instruction::Add,
            format!("./{BOOTSTRAP_SCRIPT} {BOOTSTRAP_SCRIPT}"),
        ),
        Command::new(Instruction::Run, format!("bash {BOOTSTRAP_SCRIPT}")),
    ]
}

pub fn wrap_with_type(kind: ItemKind, content: &str) -> String {
    format!("#Start: {}\n{content}\n#End", kind.label())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DockerfileItem {
    pub id: String,
    pub name: String,
    pub path: String,
    pub commands: Vec<Command>,
    pub has_find_replace: bool,
    pub legacy_add: bool,
    pub from_origin_text: bool,
    #[serde(skip)]
    pub source: Option<String>,
}

impl DockerfileItem {
    pub fn blank(kind: ItemKind, ids: &dyn IdProvider) -> Self {
        let path = match kind {
            ItemKind::SshKey => SSH_KEY_PATH.to_string(),
            _ => String::new(),
        };
        Self {
            id: ids.generate(),
            name: String::new(),
            path,
            commands: Vec::new(),
            has_find_replace: false,
            legacy_add: false,
            from_origin_text: false,
            source: None,
        }
    }

    pub fn parse(kind: ItemKind, source: Option<&str>, ids: &dyn IdProvider) -> Result<Self, Error> {
        let mut item = Self::blank(kind, ids);
        let Some(text) = source.filter(|text| !text.is_empty()) else {
            return Ok(item);
        };

        let mut lines = text.lines();
        let add_line = lines.next().unwrap_or_default();
        let (name, path, legacy_add) = parse_add_line(add_line)?;
        if legacy_add {
            warn!(kind = %kind, line = add_line, "legacy ADD syntax, rendering as array syntax");
        }
        item.name = name;
        if kind != ItemKind::SshKey {
            item.path = path;
        }
        item.legacy_add = legacy_add;

        // the WORKDIR line is recomputed from `path` on render
        let mut body: Vec<String> = lines
            .skip(1)
            .map(|line| {
                let migrated = LEGACY_SCRIPT_PATTERN.replace_all(line, BOOTSTRAP_SCRIPT);
                if migrated != line {
                    debug!(line, "migrated legacy bootstrap script name");
                }
                migrated.into_owned()
            })
            .collect();

        if body
            .first()
            .is_some_and(|line| line.contains(&format!("ADD ./{BOOTSTRAP_SCRIPT}")))
        {
            debug!(kind = %kind, "found find-and-replace bootstrap block");
            item.has_find_replace = true;
            body.drain(..body.len().min(2));
        }

        item.commands = body
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Command::parse(line))
            .collect::<Result<Vec<_>, _>>()?;
        item.from_origin_text = true;
        item.source = Some(text.to_string());
        Ok(item)
    }

    /// Commands in render order, bootstrap pair first. For SSH keys the
    /// stored commands are ignored and replaced by the key setup line.
    pub fn effective_commands(&self, kind: ItemKind) -> Vec<Command> {
        let own = match kind {
            ItemKind::SshKey => vec![ssh_key_command(&self.name)],
            _ => self.commands.clone(),
        };
        if self.has_find_replace {
            bootstrap_commands().into_iter().chain(own).collect()
        } else {
            own
        }
    }

    pub fn render(&self, kind: ItemKind) -> String {
        let name = self.name.trim();
        let path = kind.default_path(name, &self.path).trim();

        let mut contents = format!(
            "ADD [{}, {}]",
            json_quote(&format!("./{name}")),
            json_quote(&format!("/{path}"))
        );

        let lines: Vec<String> = self
            .effective_commands(kind)
            .iter()
            .map(Command::to_string)
            .filter(|line| !line.is_empty())
            .collect();
        if !lines.is_empty() {
            contents.push_str(&format!("\nWORKDIR /{path}\n"));
            contents.push_str(&lines.join("\n"));
        }

        wrap_with_type(kind, &contents)
    }
}

// (name, path, legacy)
fn parse_add_line(line: &str) -> Result<(String, String, bool), Error> {
    let Some(params) = line.strip_prefix("ADD ") else {
        return Err(Error::malformed_add(line));
    };

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(params) {
        let Ok((source, target)) = serde_json::from_value::<(String, String)>(value) else {
            return Err(Error::malformed_add(line));
        };
        return Ok((strip_name(&source), strip_path(&target), false));
    }

    let captures = LEGACY_ADD_PATTERN
        .captures(line)
        .ok_or_else(|| Error::malformed_add(line))?;
    Ok((strip_name(&captures[1]), strip_path(&captures[2]), true))
}

fn strip_name(source: &str) -> String {
    source.strip_prefix("./").unwrap_or(source).to_string()
}

fn strip_path(target: &str) -> String {
    target.strip_prefix('/').unwrap_or(target).to_string()
}

fn json_quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn ssh_key_command(name: &str) -> Command {
    let key = name.trim();
    Command::new(
        Instruction::Run,
        format!(
            "chmod 0400 {key} \
             && echo \"IdentityFile /{SSH_KEY_PATH}{key}\" >> /etc/ssh/ssh_config \
             && ssh-keyscan -H github.com > /etc/ssh/ssh_known_hosts"
        ),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packages {
    pub id: String,
    pub package_list: String,
    pub from_origin_text: bool,
    #[serde(skip)]
    pub source: Option<String>,
}

impl Packages {
    pub fn blank(ids: &dyn IdProvider) -> Self {
        Self {
            id: ids.generate(),
            package_list: String::new(),
            from_origin_text: false,
            source: None,
        }
    }

    pub fn parse(source: Option<&str>, ids: &dyn IdProvider) -> Self {
        let mut item = Self::blank(ids);
        if let Some(text) = source.filter(|text| !text.is_empty()) {
            let text_start = text.trim_start();
            let list = match text_start.strip_prefix(PACKAGES_PREAMBLE.trim_end()) {
                Some(rest) => rest.to_string(),
                None => text.replacen(PACKAGES_PREAMBLE, "", 1),
            };
            item.package_list = normalize_packages(&list);
            item.from_origin_text = true;
            item.source = Some(text.to_string());
        }
        item
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.package_list.split_whitespace()
    }

    pub fn render(&self) -> String {
        let list = normalize_packages(&self.package_list);
        if list.is_empty() {
            return String::new();
        }
        wrap_with_type(ItemKind::Packages, &format!("{PACKAGES_PREAMBLE}{list}"))
    }
}

fn normalize_packages(list: &str) -> String {
    list.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ContainerItem {
    File(DockerfileItem),
    Repository(DockerfileItem),
    #[serde(rename = "Main Repository")]
    MainRepository(DockerfileItem),
    Packages(Packages),
    #[serde(rename = "SSH Key")]
    SshKey(DockerfileItem),
}

impl ContainerItem {
    pub fn blank(kind: ItemKind) -> Self {
        Self::blank_with(kind, &UuidV4)
    }

    pub fn blank_with(kind: ItemKind, ids: &dyn IdProvider) -> Self {
        match kind {
            ItemKind::File => Self::File(DockerfileItem::blank(kind, ids)),
            ItemKind::Repository => Self::Repository(DockerfileItem::blank(kind, ids)),
            ItemKind::MainRepository => Self::MainRepository(DockerfileItem::blank(kind, ids)),
            ItemKind::Packages => Self::Packages(Packages::blank(ids)),
            ItemKind::SshKey => Self::SshKey(DockerfileItem::blank(kind, ids)),
        }
    }

    pub fn parse(kind: ItemKind, source: Option<&str>) -> Result<Self, Error> {
        Self::parse_with(kind, source, &UuidV4)
    }

    pub fn parse_with(
        kind: ItemKind,
        source: Option<&str>,
        ids: &dyn IdProvider,
    ) -> Result<Self, Error> {
        let item = match kind {
            ItemKind::File => Self::File(DockerfileItem::parse(kind, source, ids)?),
            ItemKind::Repository => Self::Repository(DockerfileItem::parse(kind, source, ids)?),
            ItemKind::MainRepository => {
                Self::MainRepository(DockerfileItem::parse(kind, source, ids)?)
            }
            ItemKind::Packages => Self::Packages(Packages::parse(source, ids)),
            ItemKind::SshKey => Self::SshKey(DockerfileItem::parse(kind, source, ids)?),
        };
        Ok(item)
    }

    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::File(_) => ItemKind::File,
            Self::Repository(_) => ItemKind::Repository,
            Self::MainRepository(_) => ItemKind::MainRepository,
            Self::Packages(_) => ItemKind::Packages,
            Self::SshKey(_) => ItemKind::SshKey,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Packages(item) => &item.id,
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => &item.id,
        }
    }

    pub fn from_origin_text(&self) -> bool {
        match self {
            Self::Packages(item) => item.from_origin_text,
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => item.from_origin_text,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Packages(item) => item.source.as_deref(),
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => item.source.as_deref(),
        }
    }

    pub fn as_dockerfile(&self) -> Option<&DockerfileItem> {
        match self {
            Self::Packages(_) => None,
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => Some(item),
        }
    }

    pub fn as_dockerfile_mut(&mut self) -> Option<&mut DockerfileItem> {
        match self {
            Self::Packages(_) => None,
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => Some(item),
        }
    }

    // clone() keeps the id
    pub fn duplicate(&self, ids: &dyn IdProvider) -> Self {
        let mut copy = self.clone();
        let id = ids.generate();
        match &mut copy {
            Self::Packages(item) => item.id = id,
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => item.id = id,
        }
        copy
    }

    pub fn render(&self) -> String {
        match self {
            Self::Packages(item) => item.render(),
            Self::File(item)
            | Self::Repository(item)
            | Self::MainRepository(item)
            | Self::SshKey(item) => item.render(self.kind()),
        }
    }
}
