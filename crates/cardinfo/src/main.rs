use std::io::{IsTerminal, Read, Write};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind};
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cardinfo_core::exit_code::ExitCode;
use cardinfo_core::parser::{parse_document, render_document};
use cardinfo_core::{ContainerItem, Error, ItemKind};

const LONG_ABOUT: &str = "Parse container build-step cards and print their canonical Dockerfile rendering.\n\nInput is a document of `#Start: <type>` ... `#End` blocks, or a single raw item body when --kind is given. Legacy ADD syntax is accepted and rewritten to array syntax.";

const AFTER_HELP: &str = "Examples:\n  cardinfo --file cards.txt\n  cardinfo --kind file < step.txt\n  cardinfo --json --stdin < cards.txt\n  cardinfo completion bash";

fn main() {
    let code = match run() {
        Ok(()) => ExitCode::Success,
        Err(app_error) => {
            if !app_error.message.is_empty() {
                eprintln!("{}", app_error.message);
            }
            app_error.code
        }
    };
    std::process::exit(code.as_i32());
}

#[derive(Debug)]
struct AppError {
    code: ExitCode,
    message: String,
}

impl AppError {
    fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Usage,
            message: message.into(),
        }
    }
}

impl From<Error> for AppError {
    fn from(value: Error) -> Self {
        Self {
            code: ExitCode::from(&value),
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum, value_name = "SHELL")]
        shell: CompletionShell,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum KindArg {
    File,
    Repository,
    MainRepository,
    Packages,
    SshKey,
}

impl From<KindArg> for ItemKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::File => Self::File,
            KindArg::Repository => Self::Repository,
            KindArg::MainRepository => Self::MainRepository,
            KindArg::Packages => Self::Packages,
            KindArg::SshKey => Self::SshKey,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "cardinfo",
    about = "Normalize container build-step cards",
    long_about = LONG_ABOUT,
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATH",
        help = "Read input from a file path",
        long_help = "Read input from PATH. If omitted, input is read from stdin."
    )]
    file: Option<String>,

    #[arg(
        long = "stdin",
        help = "Read input from stdin",
        long_help = "Read input from stdin. This conflicts with --file."
    )]
    stdin: bool,

    #[arg(
        short = 'k',
        long = "kind",
        value_enum,
        value_name = "KIND",
        help = "Treat input as one unwrapped item",
        long_help = "Treat the whole input as the body of a single item of KIND instead of a document of #Start/#End blocks."
    )]
    kind: Option<KindArg>,

    #[arg(
        long = "json",
        help = "Emit parsed items as JSON",
        long_help = "Emit a JSON array with one object per item (type, id, name, path, commands, flags) instead of the rendered text."
    )]
    json: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Print debug details to stderr",
        long_help = "Print parser debug events to stderr while keeping stdout clean for result output. RUST_LOG takes precedence when set."
    )]
    verbose: bool,
}

fn run() -> Result<(), AppError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                print!("{err}");
                return Ok(());
            }
            return Err(AppError::usage(err.to_string()));
        }
    };

    init_tracing(cli.verbose);
    execute(cli)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<(), AppError> {
    if let Some(command) = cli.command {
        return execute_command(command);
    }

    validate_cli(&cli)?;

    let input = read_input(&cli)?;
    let items = match cli.kind {
        Some(kind) => {
            let source = (!input.trim().is_empty()).then_some(input.as_str());
            vec![ContainerItem::parse(kind.into(), source)?]
        }
        None => parse_document(&input)?,
    };
    debug!(count = items.len(), "parsed items");

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        let payload = serde_json::to_string_pretty(&items)
            .map_err(std::io::Error::from)
            .map_err(Error::from)?;
        stdout.write_all(payload.as_bytes()).map_err(Error::from)?;
        stdout.write_all(b"\n").map_err(Error::from)?;
        return Ok(());
    }

    let rendered = render_document(&items);
    if !rendered.is_empty() {
        stdout.write_all(rendered.as_bytes()).map_err(Error::from)?;
        stdout.write_all(b"\n").map_err(Error::from)?;
    }
    Ok(())
}

fn execute_command(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Completion { shell } => write_completion(shell),
    }
}

fn write_completion(shell: CompletionShell) -> Result<(), AppError> {
    let mut command = Cli::command();
    let mut stdout = std::io::stdout().lock();
    match shell {
        CompletionShell::Bash => generate(Bash, &mut command, "cardinfo", &mut stdout),
        CompletionShell::Zsh => generate(Zsh, &mut command, "cardinfo", &mut stdout),
        CompletionShell::Fish => generate(Fish, &mut command, "cardinfo", &mut stdout),
    }
    stdout.flush().map_err(Error::from).map_err(AppError::from)
}

fn validate_cli(cli: &Cli) -> Result<(), AppError> {
    if cli.stdin && cli.file.is_some() {
        return Err(AppError::usage("--stdin is mutually exclusive with --file"));
    }
    Ok(())
}

fn read_input(cli: &Cli) -> Result<String, AppError> {
    if let Some(path) = cli.file.as_deref() {
        return std::fs::read_to_string(path)
            .map_err(Error::from)
            .map_err(AppError::from);
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(Error::from)?;
    Ok(input)
}
