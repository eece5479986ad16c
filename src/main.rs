use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use version_dispatch::config::load_options;
use version_dispatch::dispatch::Version;
use version_dispatch::inspect::ResolutionReport;

#[derive(Parser)]
#[command(name = "version-dispatch")]
#[command(version, about = "Inspect how requested versions resolve against registered versions")]
struct Cli {
    /// Log output format (logs go to stderr, filtered by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve requested version numbers against a set of registered versions
    Resolve {
        /// Registered versions, comma separated
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        versions: Vec<Version>,

        /// Inclusive lower bound
        #[arg(long, allow_negative_numbers = true)]
        min: Option<Version>,

        /// Inclusive upper bound
        #[arg(long, allow_negative_numbers = true)]
        max: Option<Version>,

        /// Require an exact match instead of falling back to the nearest lower version
        #[arg(long)]
        exact: bool,

        /// JSON options file (defaults to $VERSION_DISPATCH_OPTIONS)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Version numbers to resolve
        #[arg(required = true, allow_negative_numbers = true)]
        requested: Vec<Version>,
    },
    /// Print the effective registry options as JSON
    Options {
        /// JSON options file (defaults to $VERSION_DISPATCH_OPTIONS)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(format: LogFormat) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    guard
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_format);

    match cli.command {
        Command::Resolve {
            versions,
            min,
            max,
            exact,
            config,
            json,
            requested,
        } => {
            let options = load_options(config)?.overridden(min, max, exact);
            options.validate()?;
            info!(?options, ?versions, "resolving {} version numbers", requested.len());

            let report = ResolutionReport::build(options, &versions, &requested)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
            }

            if report.has_rejections() {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Options { config } => {
            let options = load_options(config)?;
            println!("{}", serde_json::to_string_pretty(&options)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
