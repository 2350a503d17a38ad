//! XLSX output using rust_xlsxwriter.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use super::{validate, Result};
use crate::models::config::SpreadsheetConfig;
use crate::models::record::{ExtractionRecord, Schema};

/// Name of the workbook written at `timestamp`, to the second.
pub fn spreadsheet_file_name(timestamp: NaiveDateTime) -> String {
    format!("Extracted_Data_{}.xlsx", timestamp.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes a batch to a new timestamped workbook with a header row and an
/// auto-filter over the data.
pub struct SpreadsheetSink {
    config: SpreadsheetConfig,
}

impl SpreadsheetSink {
    pub fn new(config: SpreadsheetConfig) -> Self {
        Self { config }
    }

    /// Write `records` to `Extracted_Data_<now>.xlsx` in the output
    /// directory and return its path.
    pub fn write(&self, schema: &Schema, records: &[ExtractionRecord]) -> Result<PathBuf> {
        self.write_at(schema, records, Local::now().naive_local())
    }

    /// Write `records` to the workbook named for `timestamp`.
    pub fn write_at(
        &self,
        schema: &Schema,
        records: &[ExtractionRecord],
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf> {
        validate(schema, records)?;

        let columns = schema.columns();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.sheet_name)?;

        for (col, header) in columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = (index + 1) as u32;
            for (col, value) in record.values().iter().enumerate() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }

        // Header plus one row per record
        worksheet.autofilter(0, 0, records.len() as u32, (columns.len() - 1) as u16)?;

        fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(spreadsheet_file_name(timestamp));
        workbook.save(&path)?;

        debug!("Wrote {} rows x {} columns", records.len(), columns.len());
        info!("Excel file saved as {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::models::record::FieldValue;
    use calamine::{open_workbook, Reader, Xlsx};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn schema() -> Schema {
        Schema::new(vec!["F1".to_string(), "F2".to_string()])
    }

    fn records() -> Vec<ExtractionRecord> {
        (1..=3)
            .map(|i| {
                ExtractionRecord::completed(
                    vec![
                        FieldValue::new("F1", format!("{}", i * 100)),
                        FieldValue::new("F2", format!("0{}/01/2024", i)),
                    ],
                    format!("doc{}.pdf", i),
                )
            })
            .collect()
    }

    fn timestamp(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, second)
            .unwrap()
    }

    fn sink(dir: &Path) -> SpreadsheetSink {
        SpreadsheetSink::new(SpreadsheetConfig {
            output_dir: dir.to_path_buf(),
            ..SpreadsheetConfig::default()
        })
    }

    fn read_rows(path: &Path, sheet: &str) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range(sheet).unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(
            spreadsheet_file_name(timestamp(9)),
            "Extracted_Data_2024-03-05_14-07-09.xlsx"
        );
    }

    #[test]
    fn test_header_and_rows_follow_schema() {
        let dir = tempfile::tempdir().unwrap();

        let path = sink(dir.path())
            .write_at(&schema(), &records(), timestamp(0))
            .unwrap();

        assert_eq!(path, dir.path().join("Extracted_Data_2024-03-05_14-07-00.xlsx"));
        assert_eq!(
            read_rows(&path, "Extracted Data"),
            vec![
                vec!["F1", "F2", "File Name", "Status"],
                vec!["100", "01/01/2024", "doc1.pdf", "Completed"],
                vec!["200", "02/01/2024", "doc2.pdf", "Completed"],
                vec!["300", "03/01/2024", "doc3.pdf", "Completed"],
            ]
        );
    }

    #[test]
    fn test_failed_records_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![ExtractionRecord::failed(&schema(), "bad.pdf", "broken")];

        let path = sink(dir.path())
            .write_at(&schema(), &records, timestamp(0))
            .unwrap();

        assert_eq!(
            read_rows(&path, "Extracted Data")[1],
            vec!["N/A", "N/A", "bad.pdf", "Erro: broken"]
        );
    }

    #[test]
    fn test_runs_at_different_seconds_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let sink = sink(dir.path());

        let first = sink.write_at(&schema(), &records(), timestamp(1)).unwrap();
        let second = sink.write_at(&schema(), &records(), timestamp(2)).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_custom_sheet_name_and_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports").join("march");
        let sink = SpreadsheetSink::new(SpreadsheetConfig {
            enabled: true,
            output_dir: out.clone(),
            sheet_name: "Invoices".to_string(),
        });

        let path = sink.write(&schema(), &records()).unwrap();

        assert!(path.starts_with(&out));
        assert_eq!(read_rows(&path, "Invoices").len(), 4);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let err = sink(dir.path()).write(&schema(), &[]).unwrap_err();

        assert!(matches!(err, SinkError::EmptyBatch));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
