//! PDF text extraction through poppler's `pdftotext`.
//! The text is shown verbatim and never parsed into a table.

use std::io::Write;
use std::process::Command;
use tracing::{debug, info};

use super::ExtractError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Reject byte strings that cannot be a PDF before spawning anything
pub fn validate_pdf(bytes: &[u8]) -> Result<(), ExtractError> {
    if bytes.len() < 8 {
        return Err(ExtractError::Pdf("file too small to be a PDF".to_string()));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractError::Pdf("missing %PDF header".to_string()));
    }

    Ok(())
}

/// Extract the text layer of a PDF
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    validate_pdf(bytes)?;

    let pdftotext = which::which("pdftotext")
        .map_err(|_| ExtractError::Pdf("pdftotext not installed (poppler-utils)".to_string()))?;

    // pdftotext wants a path, so the upload goes through a temp file
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    debug!("Wrote {} PDF bytes to {}", bytes.len(), file.path().display());

    let output = Command::new(&pdftotext)
        .arg("-layout")
        .arg(file.path())
        .arg("-")
        .output()
        .map_err(|e| ExtractError::Pdf(format!("failed to run pdftotext: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Pdf(format!(
            "pdftotext failed (exit {}): {}",
            output.status.code().unwrap_or(-1),
            stderr.trim(),
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    if text.trim().is_empty() {
        return Err(ExtractError::Pdf(
            "PDF appears scanned/image-only, no text extracted".to_string(),
        ));
    }

    info!("Extracted {} characters of PDF text", text.len());
    Ok(text)
}
