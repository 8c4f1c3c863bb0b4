//! Record readers shared by the domain analyses.

use std::io::BufRead;

use friction_core::errors::DomainError;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};

/// Records read from one export, with the count of rows that failed to
/// deserialize.
#[derive(Debug)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub rejected: usize,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: 0,
        }
    }
}

/// Read a headed CSV. Every name in `required` must be a header; bad rows
/// are logged and counted, unknown columns are ignored.
pub fn read_csv<T, R>(reader: R, required: &[&'static str]) -> Result<Loaded<T>, DomainError>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| DomainError::Header { message: e.to_string() })?
        .clone();
    if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(DomainError::MissingColumn { column });
    }

    let mut loaded = Loaded::default();
    for (i, row) in csv.deserialize::<T>().enumerate() {
        match row {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                loaded.rejected += 1;
                tracing::warn!(row = i + 1, error = %e, "rejected csv row");
            }
        }
    }
    Ok(loaded)
}

/// Read one JSON record per line. Blank lines are skipped.
pub fn read_ndjson<T, R>(reader: R) -> Result<Loaded<T>, DomainError>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut loaded = Loaded::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DomainError::Read {
            path: format!("line {}", i + 1),
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                loaded.rejected += 1;
                tracing::warn!(line = i + 1, error = %e, "rejected json record");
            }
        }
    }
    Ok(loaded)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// `true`/`false`, `1`/`0`, or `1.0`/`0.0` as a bool, from JSON or CSV.
/// Exports disagree on how they spell correctness.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let unexpected = |shown: String| de::Error::custom(format!("not a boolean flag: {shown}"));
    match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(b) => Ok(b),
        RawFlag::Int(1) => Ok(true),
        RawFlag::Int(0) => Ok(false),
        RawFlag::Int(i) => Err(unexpected(i.to_string())),
        RawFlag::Float(f) if f == 1.0 => Ok(true),
        RawFlag::Float(f) if f == 0.0 => Ok(false),
        RawFlag::Float(f) => Err(unexpected(f.to_string())),
        RawFlag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" => Ok(true),
            "0" | "false" | "f" | "no" => Ok(false),
            _ => Err(unexpected(s)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        user_id: u64,
        #[serde(deserialize_with = "flag")]
        correct: bool,
    }

    #[test]
    fn csv_rows_with_mixed_flags() {
        let text = "user_id,extra,correct\n1,x,1\n2,y,false\n3,z,maybe\n";
        let loaded: Loaded<Row> = read_csv(text.as_bytes(), &["user_id", "correct"]).unwrap();
        assert_eq!(
            loaded.records,
            vec![Row { user_id: 1, correct: true }, Row { user_id: 2, correct: false }]
        );
        assert_eq!(loaded.rejected, 1);
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = read_csv::<Row, _>("user_id\n1\n".as_bytes(), &["user_id", "correct"]).unwrap_err();
        assert!(matches!(err, DomainError::MissingColumn { column: "correct" }));
    }

    #[test]
    fn ndjson_skips_blank_and_counts_bad_lines() {
        #[derive(Deserialize)]
        struct Item {
            #[allow(dead_code)]
            id: u32,
        }
        let loaded: Loaded<Item> = read_ndjson("{\"id\":1}\n\n{\"id\":\"x\"}\n{\"id\":2}\n".as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.rejected, 1);
    }

    #[test]
    fn json_flags_accept_bools_and_numbers() {
        #[derive(Deserialize)]
        struct Flagged {
            #[serde(deserialize_with = "flag")]
            ok: bool,
        }
        let loaded: Loaded<Flagged> =
            read_ndjson("{\"ok\":true}\n{\"ok\":0}\n{\"ok\":\"yes\"}\n{\"ok\":2}\n".as_bytes()).unwrap();
        let flags: Vec<bool> = loaded.records.iter().map(|r| r.ok).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(loaded.rejected, 1);
    }
}
