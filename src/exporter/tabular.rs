// file: src/exporter/tabular.rs
// description: tabular csv export of extracted records
// reference: https://docs.rs/csv

use crate::error::{PipelineError, Result};
use crate::models::{ExportArtifact, ExtractedData};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one row per record under a header of the shared field names.
    ///
    /// The table is fully serialized before touching the filesystem, staged in
    /// a temporary file next to the target and moved into place with a rename,
    /// so a failure at any point leaves no file behind.
    pub fn export(&self, data: &ExtractedData) -> Result<ExportArtifact> {
        let columns = data.columns()?;
        let rows = if columns.is_empty() { 0 } else { data.len() };
        let bytes = render_table(data, &columns)?;

        self.write_atomically(&bytes)?;

        info!(
            "Exported {} rows x {} columns to {}",
            rows,
            columns.len(),
            self.path.display()
        );

        Ok(ExportArtifact {
            path: self.path.clone(),
            rows,
            columns,
        })
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        // Dropping the staged file on any early return deletes it.
        let mut staged =
            NamedTempFile::new_in(parent).map_err(|source| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;

        debug!("Staging export at {}", staged.path().display());

        staged
            .write_all(bytes)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|source| PipelineError::FileOperation {
                path: staged.path().to_path_buf(),
                source,
            })?;

        staged
            .persist(&self.path)
            .map_err(|err| PipelineError::FileOperation {
                path: self.path.clone(),
                source: err.error,
            })?;

        Ok(())
    }
}

/// Header first, then one line per record. A table without columns renders empty.
fn render_table(data: &ExtractedData, columns: &[String]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if !columns.is_empty() {
        writer.write_record(columns)?;

        for record in &data.records {
            writer.write_record(columns.iter().map(|column| record.cell(column)))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::Serialization(e.to_string()))
}

/// Reads an exported table back as one field → cell map per row.
pub fn read_rows(path: &Path) -> Result<Vec<BTreeMap<String, String>>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    reader
        .records()
        .map(|row| -> Result<BTreeMap<String, String>> {
            let row = row?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedRecord;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn listings(n: usize) -> ExtractedData {
        ExtractedData::from_records(
            (0..n)
                .map(|i| {
                    ExtractedRecord::new()
                        .with("price", 45000 + i as u64 * 500)
                        .with("dealer", format!("Dealer, {}", i))
                        .with("location", "Texas")
                })
                .collect(),
        )
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let data = listings(3);

        let artifact = CsvExporter::new(&path).export(&data).unwrap();
        assert_eq!(artifact.rows, 3);
        assert_eq!(artifact.columns, vec!["dealer", "location", "price"]);

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        for (row, record) in rows.iter().zip(&data.records) {
            for column in &artifact.columns {
                assert_eq!(row[column], record.cell(column));
            }
        }
    }

    #[test]
    fn test_non_rectangular_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let data = ExtractedData::from_records(vec![
            ExtractedRecord::new().with("price", 45000),
            ExtractedRecord::new().with("price", 47000).with("mileage", 30000),
        ]);

        let err = CsvExporter::new(&path).export(&data).unwrap_err();

        assert!(err.is_serialization());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_overwrites_previous_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let exporter = CsvExporter::new(&path);

        exporter.export(&listings(2)).unwrap();
        exporter.export(&listings(1)).unwrap();

        assert_eq!(read_rows(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_header_only_table_for_empty_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let data = ExtractedData::from_response(r#"{"price": []}"#);

        let artifact = CsvExporter::new(&path).export(&data).unwrap();

        assert_eq!(artifact.rows, 0);
        assert_eq!(artifact.columns, vec!["price"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "price\n");
        assert!(read_rows(&path).unwrap().is_empty());
    }

    #[test]
    fn test_artifact_matches_file_for_empty_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let data = ExtractedData::from_response("{}");

        let artifact = CsvExporter::new(&path).export(&data).unwrap();

        assert_eq!(artifact.rows, 0);
        assert!(artifact.columns.is_empty());
        assert_eq!(read_rows(&path).unwrap().len(), artifact.rows);
    }

    #[test]
    fn test_failed_rename_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        // A non-empty directory at the target path makes the final rename fail.
        let path = dir.path().join("output.csv");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = CsvExporter::new(&path).export(&listings(2)).unwrap_err();

        assert!(matches!(err, PipelineError::FileOperation { .. }));
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("output.csv")]);
    }

    #[test]
    fn test_missing_directory_is_file_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("output.csv");

        let err = CsvExporter::new(&path).export(&listings(1)).unwrap_err();
        assert!(matches!(err, PipelineError::FileOperation { .. }));
    }
}
