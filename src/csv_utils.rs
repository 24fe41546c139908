//! CSV serialization and deserialization utilities.
//!
//! Provides generic functions for reading and writing CSV data.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Creates an iterator that reads CSV records from a file.
/// Each record is deserialized into type T. Only header names are trimmed;
/// field values are passed through byte for byte.
pub fn read_csv<T, P>(path: P) -> csv::Result<impl Iterator<Item = csv::Result<T>>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?
        .into_deserialize())
}

/// Writes all records to a CSV writer and flushes it once at the end.
pub fn write_csv<T, W>(writer: W, records: impl Iterator<Item = T>) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{Invocation, Outcome};

    #[test]
    fn test_read_csv() -> csv::Result<()> {
        let invocations: Vec<Invocation> =
            read_csv("data/seed.csv")?.collect::<Result<_, _>>()?;

        assert_eq!(invocations.len(), 12);
        assert_eq!(
            invocations[0],
            Invocation {
                function: "reset_indexes".into(),
                id: String::new(),
                payload: String::new(),
            }
        );
        assert_eq!(invocations[3].function, "add_order");
        assert_eq!(invocations[3].id, "ord1");
        assert!(invocations[3].payload.starts_with(r#"{"id":"ord1","kwhAmount":10"#));
        assert_eq!(invocations[9].payload, "any-password");

        Ok(())
    }

    #[test]
    fn test_read_csv_trims_headers_only() -> csv::Result<()> {
        let invocations: Vec<Invocation> =
            read_csv("data/padded.csv")?.collect::<Result<_, _>>()?;

        assert_eq!(invocations[0].function, "add_order");
        assert!(invocations[0].payload.starts_with(r#" {"id":"ord1""#));
        assert!(invocations[0].payload.ends_with("} "));
        Ok(())
    }

    #[test]
    fn test_write_csv_quotes_json() -> csv::Result<()> {
        let mut output = Vec::new();
        let outcomes = vec![
            Outcome {
                function: "add_order".into(),
                id: "ord".into(),
                ok: true,
                result: String::new(),
            },
            Outcome {
                function: "authenticate".into(),
                id: "bob".into(),
                ok: true,
                result: r#"{"authenticated":false}"#.into(),
            },
        ];
        write_csv(&mut output, outcomes.into_iter())?;

        let expected = "function,id,ok,result
add_order,ord,true,
authenticate,bob,true,\"{\"\"authenticated\"\":false}\"
";
        assert_eq!(String::from_utf8(output).unwrap(), expected);
        Ok(())
    }
}
