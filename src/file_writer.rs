//! File reading and writing for pipeline tables.
//!
//! Every table is written with its header row, even when there are no rows,
//! and lands through a temporary file in the target directory so a failed
//! run never leaves a partial table behind.

use crate::error::Result;
use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;

/// Read a whole JSON export into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid JSON.
pub fn read_json(file_path: &Path) -> Result<Value> {
    let file = File::open(file_path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

/// Write rows to a CSV file under a fixed header.
///
/// The header is written explicitly so an empty `rows` still yields a
/// header-only file. Field order of `T` must match `header`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or any row fails to
/// serialize; in that case the target path is left untouched.
pub fn write_csv_atomic<T: Serialize>(rows: &[T], header: &[&str], file_path: &Path) -> Result<()> {
    let directory = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(directory)?;

    let temp = NamedTempFile::new_in(directory)?;
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(temp.as_file()));

        writer.write_record(header)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    temp.persist(file_path)?;
    Ok(())
}

/// Read every row of a CSV file with a header row.
///
/// Columns are matched by header name, so `T` may name a subset of them.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row does not
/// deserialize into `T`.
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(file_path)?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Pair {
        name: String,
        count: Option<u64>,
    }

    #[test]
    fn test_empty_rows_still_write_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.csv");

        write_csv_atomic::<Pair>(&[], &["name", "count"], &path).expect("write");

        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "name,count\n");
    }

    #[test]
    fn test_write_then_read_by_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("pairs.csv");
        let rows = vec![
            Pair {
                name: "nike".to_string(),
                count: Some(3),
            },
            Pair {
                name: "adidas".to_string(),
                count: None,
            },
        ];

        write_csv_atomic(&rows, &["name", "count"], &path).expect("write");
        let back: Vec<Pair> = read_csv(&path).expect("read");
        assert_eq!(back, rows);
    }

    #[test]
    fn test_read_json_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").expect("write");

        assert!(read_json(&path).is_err());
    }
}
