mod commands;
mod helpers;

use clap::Parser;
use harmonia_core::domain::HarmoniaError;
use std::path::PathBuf;

pub fn run_from_env() -> i32 {
    let remaining: Vec<String> = std::env::args().skip(1).collect();

    match run(remaining) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_harmonia_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.fatal_exit_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("harmonia".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(cli.verbose);
            let sizes = helpers::load_block_sizes(cli.config.as_deref())?;
            dispatch_parsed(cli.command, &sizes)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "harmonia", version, about = "Real spherical harmonics toolkit")]
struct Cli {
    /// Runtime configuration file (launch block sizes, thread count)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit debug logs (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate one real spherical harmonic
    Evaluate(commands::EvaluateArgs),
    /// Project directions onto the basis up to a maximum degree
    Project(commands::ProjectArgs),
    /// Sample a basis function or an expansion on a longitude/latitude grid
    Sample(commands::SampleArgs),
    /// Couple two expansions into the expansion of their product
    Product(commands::ProductArgs),
    /// Euclidean distance between two expansions
    Compare(commands::CompareArgs),
    /// Check the parallel engines against the serial reconstructions
    Verify(commands::VerifyArgs),
}

fn dispatch_parsed(
    command: CliCommand,
    sizes: &harmonia_core::launch::BlockSizes,
) -> Result<i32, CliError> {
    match command {
        CliCommand::Evaluate(args) => commands::run_evaluate_command(args),
        CliCommand::Project(args) => commands::run_project_command(args, sizes),
        CliCommand::Sample(args) => commands::run_sample_command(args, sizes),
        CliCommand::Product(args) => commands::run_product_command(args, sizes),
        CliCommand::Compare(args) => commands::run_compare_command(args),
        CliCommand::Verify(args) => commands::run_verify_command(args, sizes),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(HarmoniaError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn as_harmonia_error(&self) -> HarmoniaError {
        match self {
            Self::Usage(message) => {
                HarmoniaError::invalid_input("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => HarmoniaError::io("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<HarmoniaError> for CliError {
    fn from(error: HarmoniaError) -> Self {
        Self::Compute(error)
    }
}

impl From<harmonia_core::domain::ShapeError> for CliError {
    fn from(error: harmonia_core::domain::ShapeError) -> Self {
        Self::Compute(error.into())
    }
}
