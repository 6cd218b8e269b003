use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use mps_sample_data::config::{ConfigLoader, ConfigOverrides};
use mps_sample_data::domain::DatasetVariant;
use mps_sample_data::error::SampleDataError;
use mps_sample_data::fetch::HttpFetcher;
use mps_sample_data::output::{JsonOutput, OutputMode, TextOutput};
use mps_sample_data::progress::BarProgress;
use mps_sample_data::resolver::CacheResolver;

#[derive(Parser)]
#[command(name = "mps-sample-data")]
#[command(about = "Download the MPS sample recording once and reuse the local copy")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Print JSON results and skip the progress bar")]
    non_interactive: bool,

    #[arg(long, global = true, help = "Directory holding the cached recordings")]
    cache_dir: Option<Utf8PathBuf>,

    #[arg(
        long,
        global = true,
        help = "JSON config file (defaults to ./mps-sample-data.json when present)"
    )]
    config: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Give up on a download after this many seconds (default: never)"
    )]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Fetch a dataset variant unless it is already cached")]
    Fetch(FetchArgs),
    #[command(about = "Show where each variant lives and whether it is cached")]
    Status,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(long, value_enum, default_value_t = DatasetVariant::Full)]
    variant: DatasetVariant,

    #[arg(long, help = "Download even if the file already exists")]
    overwrite: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SampleDataError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SampleDataError) -> u8 {
    match error {
        SampleDataError::ConfigRead(_)
        | SampleDataError::ConfigParse(_)
        | SampleDataError::InvalidVariant(_) => 2,
        SampleDataError::Http(_) | SampleDataError::Status { .. } => 3,
        SampleDataError::Filesystem(_) | SampleDataError::Load(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(
        cli.config.as_deref(),
        ConfigOverrides {
            cache_dir: cli.cache_dir,
            timeout_secs: cli.timeout,
        },
    )?;
    let fetcher = HttpFetcher::new(config.timeout)?;
    let resolver = CacheResolver::new(config, fetcher);

    match command_or_default(cli.command) {
        Command::Fetch(args) => run_fetch(args, &resolver, output_mode),
        Command::Status => {
            let status = resolver.status()?;
            match output_mode {
                OutputMode::Interactive => TextOutput::print_status(&status).into_diagnostic(),
                OutputMode::NonInteractive => JsonOutput::print_status(&status).into_diagnostic(),
            }
        }
    }
}

fn command_or_default(command: Option<Command>) -> Command {
    command.unwrap_or(Command::Fetch(FetchArgs {
        variant: DatasetVariant::Full,
        overwrite: false,
    }))
}

fn run_fetch(
    args: FetchArgs,
    resolver: &CacheResolver<HttpFetcher>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::Interactive => {
            let sink = BarProgress::new();
            let result = resolver.acquire(args.variant, args.overwrite, &sink)?;
            TextOutput::print_acquire(&result).into_diagnostic()
        }
        OutputMode::NonInteractive => {
            let result = resolver.acquire(args.variant, args.overwrite, &JsonOutput)?;
            JsonOutput::print_acquire(&result).into_diagnostic()
        }
    }
}
