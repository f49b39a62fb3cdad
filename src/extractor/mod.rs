//! Turns an uploaded file into a balance-sheet table (spreadsheets) or plain text (PDFs)

use std::path::Path;
use thiserror::Error;
use tracing::info;

pub mod pdf;
pub mod spreadsheet;
pub mod table;

pub use table::{Cell, FinancialRow, FinancialTable, SheetLayout};

/// Why an upload could not be turned into something displayable
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type '{extension}' (expected .xlsx or .pdf)")]
    UnsupportedType { extension: String },

    #[error("spreadsheet shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("unreadable workbook: {0}")]
    Workbook(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepted upload types, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Pdf,
}

impl FileKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" => Ok(FileKind::Spreadsheet),
            "pdf" => Ok(FileKind::Pdf),
            _ => Err(ExtractError::UnsupportedType { extension }),
        }
    }
}

/// Result of reading an upload
#[derive(Debug, Clone)]
pub enum Extracted {
    Table(FinancialTable),
    PdfText(String),
}

impl Extracted {
    pub fn table(&self) -> Option<&FinancialTable> {
        match self {
            Extracted::Table(table) => Some(table),
            Extracted::PdfText(_) => None,
        }
    }
}

/// Read an uploaded file. Unsupported types fail before any content is inspected.
pub fn extract(file_name: &str, bytes: &[u8], layout: &SheetLayout) -> Result<Extracted, ExtractError> {
    let kind = FileKind::from_file_name(file_name)?;
    info!("Extracting {} as {:?} ({} bytes)", file_name, kind, bytes.len());

    match kind {
        FileKind::Spreadsheet => spreadsheet::read_financial_table(bytes, layout).map(Extracted::Table),
        FileKind::Pdf => pdf::extract_pdf_text(bytes).map(Extracted::PdfText),
    }
}
