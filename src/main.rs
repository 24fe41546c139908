use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use energy_ledger::{run, run_async, LedgerConfig, DEFAULT_MAX_INDEX_RETRIES};
use tracing_subscriber::EnvFilter;

/// Replays a CSV file of ledger invocations and prints one outcome row per invocation.
#[derive(Parser, Debug)]
#[command(name = "energy-ledger", version, about, long_about = None)]
struct Cli {
    /// Invocation file with a `function,id,payload` header
    input: PathBuf,

    /// Use the channel-based async runner
    #[arg(long = "async")]
    use_async: bool,

    /// Retries when an index changes between read and write
    #[arg(
        long,
        env = "ENERGY_LEDGER_MAX_INDEX_RETRIES",
        default_value_t = DEFAULT_MAX_INDEX_RETRIES
    )]
    max_index_retries: u32,

    /// Log filter, e.g. `info` or `energy_ledger=debug`. `RUST_LOG` takes precedence.
    #[arg(long, env = "ENERGY_LEDGER_LOG", default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(err) = run_app(cli) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the outcome CSV.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_app(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = LedgerConfig {
        max_index_retries: cli.max_index_retries,
    };
    tracing::info!(input = %cli.input.display(), async_runner = cli.use_async, "replaying invocations");

    if cli.use_async {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime
            .block_on(run_async(cli.input, std::io::stdout(), config))
            .map_err(|err| -> Box<dyn Error> { err })
    } else {
        run(cli.input, std::io::stdout(), config)
    }
}
