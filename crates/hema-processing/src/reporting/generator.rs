use crate::error::{CleaningError, Result};
use crate::types::QualityReport;
use crate::utils::is_numeric_dtype;
use chrono::Local;
use polars::prelude::*;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default base name for exported tables.
pub const DEFAULT_EXPORT_NAME: &str = "blood_cancer_cleaned";

/// File name of the plain-text summary report.
pub const SUMMARY_FILE_NAME: &str = "analysis_report.txt";

/// Worksheet holding the clean table in the spreadsheet export.
pub const XLSX_SHEET_NAME: &str = "Clean Data";

/// Output formats the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// The clean table as CSV with a header row
    Csv,
    /// The clean table as a JSON array of row objects
    Json,
    /// The clean table as an Excel workbook with one worksheet
    Xlsx,
    /// A plain-text summary of the dataset and the cleaning run
    Summary,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
            Self::Summary => "summary",
        }
    }
}

/// Writes the clean table and the summary report to an output directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    base_name: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            base_name: DEFAULT_EXPORT_NAME.to_string(),
        }
    }
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, base_name: Option<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: base_name.unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where a format is written.
    pub fn path_for(&self, format: ExportFormat) -> PathBuf {
        match format {
            ExportFormat::Csv => self.output_dir.join(format!("{}.csv", self.base_name)),
            ExportFormat::Json => self.output_dir.join(format!("{}.json", self.base_name)),
            ExportFormat::Xlsx => self.output_dir.join(format!("{}.xlsx", self.base_name)),
            ExportFormat::Summary => self.output_dir.join(SUMMARY_FILE_NAME),
        }
    }

    fn create(&self, path: &Path) -> Result<File> {
        fs::create_dir_all(&self.output_dir).map_err(|e| export_failed(&self.output_dir, e))?;
        File::create(path).map_err(|e| export_failed(path, e))
    }

    /// Write the table as CSV.
    pub fn write_csv(&self, df: &DataFrame) -> Result<PathBuf> {
        let path = self.path_for(ExportFormat::Csv);
        let mut file = self.create(&path)?;
        let mut df = df.clone();

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
            .map_err(|e| export_failed(&path, e))?;

        debug!("Wrote {} rows to '{}'", df.height(), path.display());
        Ok(path)
    }

    /// Write the table as a JSON array with one object per row.
    pub fn write_json(&self, df: &DataFrame) -> Result<PathBuf> {
        let path = self.path_for(ExportFormat::Json);
        let mut file = self.create(&path)?;
        let mut df = df.clone();

        JsonWriter::new(&mut file)
            .with_json_format(JsonFormat::Json)
            .finish(&mut df)
            .map_err(|e| export_failed(&path, e))?;

        debug!("Wrote {} rows to '{}'", df.height(), path.display());
        Ok(path)
    }

    /// Write the table as an Excel workbook. Missing cells stay empty.
    pub fn write_xlsx(&self, df: &DataFrame) -> Result<PathBuf> {
        let path = self.path_for(ExportFormat::Xlsx);
        fs::create_dir_all(&self.output_dir).map_err(|e| export_failed(&self.output_dir, e))?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(XLSX_SHEET_NAME)
            .map_err(|e| export_failed(&path, e))?;
        write_sheet(worksheet, df, &path)?;
        workbook.save(&path).map_err(|e| export_failed(&path, e))?;

        debug!("Wrote {} rows to '{}'", df.height(), path.display());
        Ok(path)
    }

    /// Write the plain-text summary report.
    pub fn write_summary(&self, df: &DataFrame, report: Option<&QualityReport>) -> Result<PathBuf> {
        let path = self.path_for(ExportFormat::Summary);
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let text = render_summary(df, report, &generated_at);

        let mut file = self.create(&path)?;
        file.write_all(text.as_bytes())
            .map_err(|e| export_failed(&path, e))?;

        debug!("Wrote summary report to '{}'", path.display());
        Ok(path)
    }

    /// Write every requested format, returning the written paths in order.
    pub fn export(
        &self,
        df: &DataFrame,
        report: Option<&QualityReport>,
        formats: &[ExportFormat],
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = match format {
                ExportFormat::Csv => self.write_csv(df)?,
                ExportFormat::Json => self.write_json(df)?,
                ExportFormat::Xlsx => self.write_xlsx(df)?,
                ExportFormat::Summary => self.write_summary(df, report)?,
            };
            written.push(path);
        }

        info!(
            "Exported {} files to '{}'",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}

fn export_failed(path: &Path, err: impl std::fmt::Display) -> CleaningError {
    CleaningError::ExportFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Header row, then one sheet row per table row. Numeric columns are
/// written as numbers, everything else as text.
fn write_sheet(worksheet: &mut Worksheet, df: &DataFrame, path: &Path) -> Result<()> {
    let xlsx_err = |e: XlsxError| export_failed(path, e);
    let sheet_row = |row: usize| {
        u32::try_from(row + 1).map_err(|_| xlsx_err(XlsxError::RowColumnLimitError))
    };

    for (idx, col) in df.get_columns().iter().enumerate() {
        let sheet_col =
            u16::try_from(idx).map_err(|_| xlsx_err(XlsxError::RowColumnLimitError))?;
        worksheet
            .write_string(0, sheet_col, col.name().as_str())
            .map_err(xlsx_err)?;

        let series = col.as_materialized_series();
        if is_numeric_dtype(col.dtype()) {
            let values = series.cast(&DataType::Float64)?;
            for (row, value) in values.f64()?.into_iter().enumerate() {
                if let Some(value) = value.filter(|v| v.is_finite()) {
                    worksheet
                        .write_number(sheet_row(row)?, sheet_col, value)
                        .map_err(xlsx_err)?;
                }
            }
        } else {
            let values = series.cast(&DataType::String)?;
            for (row, value) in values.str()?.into_iter().enumerate() {
                if let Some(value) = value {
                    worksheet
                        .write_string(sheet_row(row)?, sheet_col, value)
                        .map_err(xlsx_err)?;
                }
            }
        }
    }

    Ok(())
}

/// Render the summary report as plain text.
pub fn render_summary(df: &DataFrame, report: Option<&QualityReport>, generated_at: &str) -> String {
    let mut lines = vec![
        "Blood Cancer Analysis Report".to_string(),
        "=".repeat(60),
        format!("Generated: {}", generated_at),
        String::new(),
        "Dataset Overview".to_string(),
        "-".repeat(60),
        format!("Total Records: {}", df.height()),
        format!("Total Variables: {}", df.width()),
        String::new(),
        "Variables Analyzed".to_string(),
        "-".repeat(60),
        df.get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    ];

    if let Some(report) = report {
        lines.extend([
            String::new(),
            "Cleaning Summary".to_string(),
            "-".repeat(60),
            format!("Rows: {} -> {}", report.rows_before, report.rows_after),
            format!(
                "Duplicates removed: {} ({:.1}%)",
                report.duplicates_removed,
                report.duplicate_percentage()
            ),
            format!("Missing cells before cleaning: {}", report.total_missing_before()),
            format!("Outliers flagged: {}", report.outliers_detected),
        ]);

        for record in &report.imputations {
            lines.push(format!(
                "Imputed {} cells in {} ({} = {})",
                record.cells_filled, record.column, record.method, record.value
            ));
        }
        if !report.normalized_columns.is_empty() {
            lines.push(format!(
                "Normalized text: {}",
                report.normalized_columns.join(", ")
            ));
        }
        for skipped in &report.skipped {
            lines.push(format!(
                "Skipped {} during {}: {:?}",
                skipped.column, skipped.stage, skipped.reason
            ));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImputationRecord, SkipReason, SkippedColumn};
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn table() -> DataFrame {
        df! {
            "Patient_ID" => &["P1", "P2"],
            "Age" => &[34.0f64, 51.0],
            "Diagnosis" => &["Acute Myeloid Leukemia", "Chronic Lymphocytic Leukemia"],
        }
        .unwrap()
    }

    fn report() -> QualityReport {
        QualityReport {
            duplicates_removed: 1,
            missing_before: HashMap::from([("Age".to_string(), 1)]),
            outliers_detected: 0,
            rows_before: 3,
            rows_after: 2,
            columns_before: 3,
            columns_after: 3,
            outliers_by_column: Vec::new(),
            imputations: vec![ImputationRecord {
                column: "Age".to_string(),
                method: "median".to_string(),
                value: "42.5".to_string(),
                cells_filled: 1,
            }],
            normalized_columns: vec!["Diagnosis".to_string()],
            skipped: vec![SkippedColumn::new("Platelets", "coercion", SkipReason::ColumnAbsent)],
            actions: Vec::new(),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), None);

        let path = exporter.write_csv(&table()).unwrap();
        assert_eq!(path.file_name().unwrap(), "blood_cancer_cleaned.csv");

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Patient_ID,Age,Diagnosis"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_write_json_records() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), Some("patients".to_string()));

        let path = exporter.write_json(&table()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Patient_ID"], "P1");
        assert_eq!(rows[1]["Age"], 51.0);
    }

    #[test]
    fn test_write_xlsx() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("sheets"), None);

        let path = exporter.write_xlsx(&table()).unwrap();
        assert_eq!(path, dir.path().join("sheets").join("blood_cancer_cleaned.xlsx"));

        // xlsx is a zip container
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_xlsx_with_missing_cells() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), Some("with_gaps".to_string()));
        let df = df! {
            "Patient_ID" => &[Some("P1"), None],
            "WBC" => &[None, Some(7.2f64)],
        }
        .unwrap();

        let path = exporter.write_xlsx(&df).unwrap();
        assert!(path.ends_with("with_gaps.xlsx"));
        assert!(path.exists());
    }

    #[test]
    fn test_write_summary_creates_directory() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("reports"), None);

        let path = exporter.write_summary(&table(), Some(&report())).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.contains("Total Records: 2"));
        assert!(content.contains("Patient_ID, Age, Diagnosis"));
        assert!(content.contains("Duplicates removed: 1"));
    }

    #[test]
    fn test_render_summary_without_report() {
        let text = render_summary(&table(), None, "2024-01-01 00:00:00");
        assert!(text.contains("Generated: 2024-01-01 00:00:00"));
        assert!(text.contains("Total Variables: 3"));
        assert!(!text.contains("Cleaning Summary"));
    }

    #[test]
    fn test_render_summary_lists_imputations_and_skips() {
        let text = render_summary(&table(), Some(&report()), "now");
        assert!(text.contains("Imputed 1 cells in Age (median = 42.5)"));
        assert!(text.contains("Normalized text: Diagnosis"));
        assert!(text.contains("Skipped Platelets during coercion"));
    }

    #[test]
    fn test_export_all_formats() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), None);

        let written = exporter
            .export(
                &table(),
                Some(&report()),
                &[
                    ExportFormat::Csv,
                    ExportFormat::Json,
                    ExportFormat::Xlsx,
                    ExportFormat::Summary,
                ],
            )
            .unwrap();

        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists());
        }
        assert_eq!(written[3], dir.path().join(SUMMARY_FILE_NAME));
    }
}
