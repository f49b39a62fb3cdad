//! Upload and analysis flow: check the file type, store the blob, read it, compute ratios

use anyhow::Result;
use tracing::info;

use crate::analysis::{calculate_ratios, RatioReport};
use crate::database::DatabaseManager;
use crate::extractor::{self, ExtractError, Extracted, FileKind, FinancialTable, SheetLayout};
use crate::models::UploadedFile;

/// What an uploaded file turned into
#[derive(Debug, Clone)]
pub enum Analysis {
    Ratios {
        table: FinancialTable,
        report: RatioReport,
    },
    PdfText(String),
}

/// Store a file for a company after checking its extension.
/// Unsupported types are rejected before anything is written.
pub fn upload_file(
    db: &DatabaseManager,
    company_id: i64,
    file_name: &str,
    bytes: &[u8],
) -> Result<i64> {
    let kind = FileKind::from_file_name(file_name)?;
    let file_id = db.store_file(company_id, file_name, bytes)?;
    info!("Accepted {:?} upload {} as file {}", kind, file_name, file_id);
    Ok(file_id)
}

/// Read an upload and, for spreadsheets, compute the ratio report
pub fn analyze(file_name: &str, bytes: &[u8], layout: &SheetLayout) -> Result<Analysis, ExtractError> {
    match extractor::extract(file_name, bytes, layout)? {
        Extracted::Table(table) => {
            let report = calculate_ratios(&table);
            Ok(Analysis::Ratios { table, report })
        }
        Extracted::PdfText(text) => Ok(Analysis::PdfText(text)),
    }
}

pub fn analyze_stored(file: &UploadedFile, layout: &SheetLayout) -> Result<Analysis, ExtractError> {
    analyze(&file.file_name, &file.bytes, layout)
}
