//! Text, JSON and CSV rendering of ratio reports and table previews

use anyhow::Result;
use serde::Serialize;

use crate::analysis::{RatioKind, RatioReport, RatioValue};
use crate::extractor::{Cell, FinancialTable};

pub const UNDEFINED: &str = "undefined";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Beyond this many places an f64 has no digits left to round
const MAX_ROUNDING_PRECISION: usize = 15;

/// Round for display only; stored values stay unrounded
pub fn round_to(value: f64, precision: usize) -> f64 {
    if precision >= MAX_ROUNDING_PRECISION {
        return value;
    }
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

pub fn format_ratio(value: &RatioValue, precision: usize) -> String {
    match value {
        Ok(v) => format!("{:.*}", precision, round_to(*v, precision)),
        Err(_) => UNDEFINED.to_string(),
    }
}

pub fn render(report: &RatioReport, format: OutputFormat, precision: usize) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report, precision)),
        OutputFormat::Json => render_json(report, precision),
        OutputFormat::Csv => render_csv(report, precision),
    }
}

/// Fixed-width table: one row per year, one column per ratio
pub fn render_table(report: &RatioReport, precision: usize) -> String {
    let mut header = vec!["Year".to_string()];
    header.extend(RatioKind::ALL.iter().map(|kind| kind.title().to_string()));

    let mut rows = vec![header];
    for entry in &report.years {
        let mut row = vec![entry.year.clone()];
        for kind in RatioKind::ALL {
            let cell = entry
                .get(kind)
                .map(|value| format_ratio(value, precision))
                .unwrap_or_else(|| UNDEFINED.to_string());
            row.push(cell);
        }
        rows.push(row);
    }

    let mut out = format_grid(&rows);

    let notes: Vec<String> = report
        .years
        .iter()
        .flat_map(|entry| {
            entry.values.iter().filter_map(move |(kind, value)| {
                value
                    .as_ref()
                    .err()
                    .map(|e| format!("  {} {}: {}", entry.year, kind.title(), e))
            })
        })
        .collect();

    if !notes.is_empty() {
        out.push_str("\nUndefined values:\n");
        for note in notes {
            out.push_str(&note);
            out.push('\n');
        }
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    precision: usize,
    missing_line_items: Vec<&'static str>,
    years: Vec<JsonYear<'a>>,
}

#[derive(Serialize)]
struct JsonYear<'a> {
    year: &'a str,
    ratios: Vec<JsonRatio>,
}

#[derive(Serialize)]
struct JsonRatio {
    ratio: &'static str,
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

pub fn render_json(report: &RatioReport, precision: usize) -> Result<String> {
    let json = JsonReport {
        precision,
        missing_line_items: report.missing_line_items.iter().map(|item| item.label()).collect(),
        years: report
            .years
            .iter()
            .map(|entry| JsonYear {
                year: &entry.year,
                ratios: entry
                    .values
                    .iter()
                    .map(|(kind, value)| match value {
                        Ok(v) => JsonRatio {
                            ratio: kind.key(),
                            value: Some(round_to(*v, precision)),
                            error: None,
                            reason: None,
                        },
                        Err(e) => JsonRatio {
                            ratio: kind.key(),
                            value: None,
                            error: Some(e.to_string()),
                            reason: Some(e.code()),
                        },
                    })
                    .collect(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&json)?)
}

pub fn render_csv(report: &RatioReport, precision: usize) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["year"];
    header.extend(RatioKind::ALL.iter().map(|kind| kind.key()));
    writer.write_record(&header)?;

    for entry in &report.years {
        let mut record = vec![entry.year.clone()];
        for kind in RatioKind::ALL {
            record.push(
                entry
                    .get(kind)
                    .map(|value| format_ratio(value, precision))
                    .unwrap_or_else(|| UNDEFINED.to_string()),
            );
        }
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Sheet names, columns, size and the first rows of an extracted table
pub fn render_table_preview(table: &FinancialTable, max_rows: usize) -> String {
    let mut out = String::new();

    if !table.sheet_names().is_empty() {
        out.push_str(&format!("Sheets found: {}\n", table.sheet_names().join(", ")));
    }
    if let Some(sheet) = table.source_sheet() {
        out.push_str(&format!("Using sheet: {}\n", sheet));
    }
    out.push_str(&format!(
        "Rows: {}, year columns: {}\n\n",
        table.rows().len(),
        table.years().join(", ")
    ));

    let mut header = vec![table.description_column().to_string()];
    header.extend(table.years().iter().cloned());

    let mut rows = vec![header];
    for row in table.rows().iter().take(max_rows) {
        let mut line = vec![row.description.clone()];
        for year in table.years() {
            line.push(match row.get(year) {
                Some(Cell::Number(v)) => format!("{}", v),
                Some(Cell::Malformed(raw)) => raw.clone(),
                Some(Cell::Blank) | None => String::new(),
            });
        }
        rows.push(line);
    }

    out.push_str(&format_grid(&rows));
    if table.rows().len() > max_rows {
        out.push_str(&format!("... and {} more rows\n", table.rows().len() - max_rows));
    }
    out
}

fn format_grid(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let pad = widths[c].saturating_sub(cell.chars().count());
                if c == 0 {
                    format!("{}{}", cell, " ".repeat(pad))
                } else {
                    format!("{}{}", " ".repeat(pad), cell)
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');

        if i == 0 {
            let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            out.push_str(&"-".repeat(total));
            out.push('\n');
        }
    }
    out
}
