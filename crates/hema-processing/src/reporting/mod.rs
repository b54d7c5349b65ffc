//! Export of the clean table (CSV, JSON, xlsx) and the plain-text summary report.
//!
//! # Example
//!
//! ```rust,ignore
//! use hema_processing::reporting::{ExportFormat, Exporter};
//!
//! let exporter = Exporter::new("outputs", None);
//! let written = exporter.export(
//!     &outcome.clean,
//!     Some(&outcome.report),
//!     &[ExportFormat::Csv, ExportFormat::Summary],
//! )?;
//! ```

mod generator;

pub use generator::{
    DEFAULT_EXPORT_NAME, ExportFormat, Exporter, SUMMARY_FILE_NAME, XLSX_SHEET_NAME, render_summary,
};
