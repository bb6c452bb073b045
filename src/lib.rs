//! nachweismd - Ausbildungsnachweis spreadsheets to Markdown
//!
//! This crate converts weekly vocational-training logs (Ausbildungsnachweise)
//! stored as spreadsheets into one Markdown document per week, with a
//! deterministic output filename derived from the reporting period.
//!
//! The pipeline for each file is:
//!
//! 1. [`DateRangeResolver`] reads the reporting period from the filename
//!    (`AusbildungsnachweisU27_03.03-07.03.xlsx`) and resolves the year.
//! 2. [`DayAggregator`] scans the cell grid and groups rows into daily records.
//! 3. [`DocumentRenderer`] renders the Markdown text and the output filename.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nachweismd::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().with_default_year("2025").build()?;
//!
//!     let report = converter.convert_file("input/AusbildungsnachweisU27_03.03-07.03.xlsx")?;
//!     std::fs::write(format!("output/{}", report.filename), report.content)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Batch Conversion
//!
//! ```rust,no_run
//! use std::path::Path;
//! use nachweismd::{BatchConverter, BatchOptions, ConverterBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let batch = BatchConverter::new(converter, BatchOptions::default());
//!
//!     let summary = batch.run(Path::new("input"), Path::new("output"))?;
//!     summary.write_report(&mut std::io::stdout())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Converting an In-Memory Grid
//!
//! ```rust
//! use nachweismd::{CellGrid, ConverterBuilder};
//!
//! # fn main() -> Result<(), nachweismd::NachweisError> {
//! let grid = CellGrid::new();
//! let converter = ConverterBuilder::new().build()?;
//! let report = converter.convert_grid("AusbildungsnachweisU27_03.03-07.03.xlsx", &grid)?;
//!
//! assert_eq!(report.filename, "2025-KW10-Ausbildungsnachweis-03.03-07.03.md");
//! assert!(report.content.starts_with("# KW10 - Ausbildungsnachweis (03.03.2025 - 07.03.2025)"));
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod api;
mod batch;
mod builder;
mod error;
mod header;
mod parser;
mod renderer;
mod resolver;
mod security;
mod types;

// 公開API
pub use aggregator::{find_data_start, scan_days, DayAggregator};
pub use api::{CellPos, GridLayout, HeaderDefaults, SheetSelector};
pub use batch::{write_archive, BatchConverter, BatchOptions, BatchSummary, FileOutcome};
pub use builder::{Converter, ConverterBuilder};
pub use error::NachweisError;
pub use header::extract_header;
pub use renderer::DocumentRenderer;
pub use resolver::{iso_week_of, parse_date_token, split_filename_tokens, DateRangeResolver, YearSource};
pub use types::{
    Cell, CellGrid, ConvertedReport, DailyRecord, DateRange, ReportDocument, ReportHeader,
    ReportingContext,
};
