//! Replays an invocation file through the channel-based async runner and
//! prints a short tally of succeeded and failed invocations to stderr.
//!
//! ```bash
//! cargo run --example async_main                      # data/seed.csv
//! cargo run --example async_main -- data/padded.csv 2 # file, index retries
//! ```

use std::env;
use std::error::Error;
use std::io::Write;
use std::process::ExitCode;

use energy_ledger::{run_async, LedgerConfig, Outcome, DEFAULT_MAX_INDEX_RETRIES};

const DEFAULT_INPUT: &str = "data/seed.csv";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter("energy_ledger=info")
        .init();

    match replay().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("replay failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn replay() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut args = env::args().skip(1);
    let input = args.next().unwrap_or_else(|| DEFAULT_INPUT.to_owned());
    let max_index_retries = match args.next() {
        Some(raw) => raw.parse()?,
        None => DEFAULT_MAX_INDEX_RETRIES,
    };

    let mut buffer = Vec::new();
    run_async(&input, &mut buffer, LedgerConfig { max_index_retries }).await?;

    let outcomes: Vec<Outcome> = csv::Reader::from_reader(buffer.as_slice())
        .deserialize()
        .collect::<Result<_, _>>()?;
    let failed = outcomes.iter().filter(|outcome| !outcome.ok).count();

    std::io::stdout().write_all(&buffer)?;
    eprintln!("{input}: {} invocations, {failed} failed", outcomes.len());
    Ok(())
}
