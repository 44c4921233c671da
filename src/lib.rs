mod assign;
pub mod calendar;
pub mod config;
mod csv_out;
mod error;
mod grid;
mod model;
mod normalize;
mod options;
mod pdf_reader;
mod reconstruct;
pub mod report_source;
mod rows;
pub mod teams;
mod warning;

use std::path::Path;

use tracing::debug;

use crate::csv_out::{write_csv, write_csv_to_string, write_json, write_json_to_string};
use crate::pdf_reader::{read_pdf_pages, read_pdf_pages_from_bytes};

pub use error::{CalendarError, ReportError, RowError};
pub use model::{Column, PageFragments, Record, Rect, TextFragment};
pub use normalize::normalize_text;
pub use options::{GridScope, OutputFormat, PageSelection, ParseOptions, QualityMode};
pub use reconstruct::{Reconstruction, reconstruct_pages};
pub use warning::{ParseWarning, WarningCode};

/// Reconstructs the injury table of the PDF at `input_pdf`.
pub fn parse_report_pdf(
    input_pdf: &Path,
    options: &ParseOptions,
) -> Result<Reconstruction, ReportError> {
    options.validate()?;
    let pages = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    debug!(path = %input_pdf.display(), pages = pages.len(), "loaded report pages");
    reconstruct_pages(&pages, options)
}

pub fn parse_report_pdf_bytes(
    input_pdf: &[u8],
    options: &ParseOptions,
) -> Result<Reconstruction, ReportError> {
    options.validate()?;
    let pages = read_pdf_pages_from_bytes(input_pdf, options.pages.as_ref())?;
    reconstruct_pages(&pages, options)
}

/// Serializes records with the header row (CSV) or as a JSON array.
pub fn render_records(
    records: &[Record],
    format: OutputFormat,
    delimiter: u8,
) -> Result<String, ReportError> {
    match format {
        OutputFormat::Csv => write_csv_to_string(records, delimiter),
        OutputFormat::Json => write_json_to_string(records),
    }
}

pub fn write_records(
    output: &Path,
    records: &[Record],
    format: OutputFormat,
    delimiter: u8,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Csv => write_csv(output, records, delimiter),
        OutputFormat::Json => write_json(output, records),
    }
}

/// Parses `input_pdf` and writes its records to `output`.
pub fn export_report(
    input_pdf: &Path,
    output: &Path,
    format: OutputFormat,
    options: &ParseOptions,
) -> Result<Reconstruction, ReportError> {
    let reconstruction = parse_report_pdf(input_pdf, options)?;
    write_records(output, &reconstruction.records, format, options.delimiter)?;
    Ok(reconstruction)
}
