use std::error::Error;
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::{
    csv_utils::{read_csv, write_csv},
    invocation::{Invocation, Outcome},
    stores::MemoryStore,
    Ledger, LedgerConfig,
};

/// Replays the invocations in the given file and writes one outcome per invocation.
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
pub fn run<P, W>(input_path: P, writer: W, config: LedgerConfig) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    W: Write,
{
    let ledger = Ledger::with_config(MemoryStore::new(), config);

    let mut outcomes = Vec::new();
    for invocation in read_csv::<Invocation, _>(input_path)? {
        // CSV parsing errors are critical - propagate them
        let invocation = invocation?;
        outcomes.push(replay(&ledger, invocation));
    }

    write_csv(writer, outcomes.into_iter())?;
    Ok(())
}

/// Dispatches one invocation. Operation errors end up in the outcome row
/// instead of stopping the replay.
pub(crate) fn replay(ledger: &Ledger<MemoryStore>, invocation: Invocation) -> Outcome {
    let response = ledger.dispatch(&invocation);
    if let Err(err) = &response {
        warn!(function = %invocation.function, id = %invocation.id, error = %err, "invocation failed");
    }
    Outcome::new(invocation, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Order;
    use rust_decimal_macros::dec;

    fn read_outcomes(output: Vec<u8>) -> Vec<Outcome> {
        csv::Reader::from_reader(output.as_slice())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_payload_whitespace_passes_through() -> Result<(), Box<dyn Error>> {
        let mut output = Vec::new();
        run("data/padded.csv", &mut output, LedgerConfig::default())?;

        let outcomes = read_outcomes(output);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|outcome| outcome.ok));
        assert_eq!(
            outcomes[1].result,
            r#" {"id":"ord1","kwhAmount":" 2.5 ","priceKwh":"0.2"} "#
        );

        let orders: Vec<Order> = serde_json::from_str(&outcomes[2].result)?;
        assert_eq!(orders[0].kwh_amount.to_string(), " 2.5 ");
        assert_eq!(orders[0].kwh_amount.decimal(), Some(dec!(2.5)));
        Ok(())
    }

    #[test]
    fn test_seed_file() -> Result<(), Box<dyn Error>> {
        let mut output = Vec::new();
        run("data/seed.csv", &mut output, LedgerConfig::default())?;

        let outcomes = read_outcomes(output);
        assert_eq!(outcomes.len(), 12);

        // Writes answer with an empty payload
        for outcome in &outcomes[..6] {
            assert!(outcome.ok, "{outcome:?}");
            assert_eq!(outcome.result, "");
        }

        assert_eq!(outcomes[6].function, "get_order");
        assert!(outcomes[6].result.contains(r#""sellerId":"alice""#));

        let orders: Vec<Order> = serde_json::from_str(&outcomes[7].result)?;
        let summary: Vec<_> = orders
            .iter()
            .map(|order| (order.id.as_str(), order.kwh_amount.decimal(), order.total_price()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("ord1", Some(dec!(10)), Some(dec!(50))),
                ("ord2", Some(dec!(2.5)), Some(dec!(0.5)))
            ]
        );
        assert!(outcomes[7].result.contains(r#""kwhAmount":10,"priceKwh":5"#));
        assert!(outcomes[7].result.contains(r#""kwhAmount":"2.5","priceKwh":"0.2""#));

        assert!(outcomes[8].result.contains(r#""buyerId":"bob""#));
        assert!(outcomes[9].result.starts_with(r#"{"authenticated":true,"user":{"userId":"alice""#));
        assert_eq!(outcomes[10].result, r#"{"authenticated":false}"#);

        assert!(!outcomes[11].ok);
        assert_eq!(outcomes[11].result, "received unknown function name: add_thing");
        Ok(())
    }

    #[test]
    fn test_missing_input_file() {
        let result = run("data/does_not_exist.csv", Vec::new(), LedgerConfig::default());
        assert!(result.is_err());
    }
}
