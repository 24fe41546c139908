use std::error::Error;
use std::io::Write;
use std::path::Path;

use crate::{
    csv_utils::write_csv,
    invocation::{Invocation, Outcome},
    stores::MemoryStore,
    Ledger, LedgerConfig,
};

use super::sync_runner::replay;

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Replays the invocations in the given file asynchronously and writes the outcomes.
/// Spawns two tasks:
/// * CSV reader - streams invocations from the input file, deserializes them and sends them to the processor via channel.
/// * Processor - receives invocations from the channel and dispatches them in arrival order until the channel is closed.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file (`function,id,payload`)
/// * `writer` - Where to write the outcomes (e.g. stdout)
/// * `config` - Ledger settings for the replay
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub async fn run<P, W>(input_path: P, writer: W, config: LedgerConfig) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    // Create channel for passing invocations from reader to processor
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_invocations(input_path, tx));
    let processor_handle = tokio::spawn(process_invocations(rx, config));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;

    let outcomes = processor_handle.await?;

    write_csv(writer, outcomes.into_iter())?;
    Ok(())
}

/// Reads and deserializes invocations from a CSV file.
/// Returns them through the provided channel.
async fn read_invocations(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<Invocation>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<Invocation>();
    while let Some(result) = records.next().await {
        match result {
            Ok(invocation) => {
                if tx.send(invocation).await.is_err() {
                    // Receiver dropped, exit gracefully
                    break;
                }
            }
            // CSV parsing errors are critical - propagate them
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Dispatches invocations received through the channel against a ledger
/// owned by this task. Returns the outcomes once the reader closes the channel.
async fn process_invocations(
    mut rx: mpsc::Receiver<Invocation>,
    config: LedgerConfig,
) -> Vec<Outcome> {
    let ledger = Ledger::with_config(MemoryStore::new(), config);
    let mut outcomes = Vec::new();
    while let Some(invocation) = rx.recv().await {
        outcomes.push(replay(&ledger, invocation));
    }
    outcomes
}
