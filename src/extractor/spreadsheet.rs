//! Balance-sheet reading from XLSX workbooks using calamine

use calamine::{Data, Range, Reader, Xlsx};
use std::io::Cursor;
use tracing::{debug, info, warn};

use super::table::{Cell, FinancialRow, FinancialTable, SheetLayout};
use super::ExtractError;

/// Read the first sheet of an XLSX workbook into a [`FinancialTable`]
pub fn read_financial_table(bytes: &[u8], layout: &SheetLayout) -> Result<FinancialTable, ExtractError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Workbook(format!("Failed to open workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    info!("Sheets found: {:?}", sheet_names);

    let first_sheet = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ExtractError::ShapeMismatch("workbook contains no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| ExtractError::Workbook(format!("Failed to read sheet '{}': {}", first_sheet, e)))?;

    let mut table = table_from_range(&range, layout, &first_sheet)?;
    table.set_source(first_sheet, sheet_names);
    Ok(table)
}

/// Select the description column and the layout's year columns out of a sheet range.
/// The first row of the range is the header.
pub fn table_from_range(
    range: &Range<Data>,
    layout: &SheetLayout,
    sheet_name: &str,
) -> Result<FinancialTable, ExtractError> {
    let (height, width) = range.get_size();
    debug!("Sheet '{}' has {} rows and {} columns", sheet_name, height, width);

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(header_text).collect(),
        None => {
            return Err(ExtractError::ShapeMismatch(format!(
                "sheet '{}' is empty",
                sheet_name
            )))
        }
    };
    debug!("Columns available: {:?}", header);

    let description_idx = header
        .iter()
        .position(|name| *name == layout.description_column)
        .ok_or_else(|| {
            ExtractError::ShapeMismatch(format!(
                "sheet '{}' has no '{}' column",
                sheet_name, layout.description_column
            ))
        })?;

    let mut year_columns = Vec::with_capacity(layout.years.len());
    let mut missing = Vec::new();
    for year in &layout.years {
        match header.iter().position(|name| name == year) {
            Some(idx) => year_columns.push((year.clone(), idx)),
            None => missing.push(year.as_str()),
        }
    }
    if !missing.is_empty() {
        return Err(ExtractError::ShapeMismatch(format!(
            "sheet '{}' is missing year columns: {}",
            sheet_name,
            missing.join(", ")
        )));
    }

    let mut table = FinancialTable::with_years(layout.years.iter().cloned());
    table.set_description_column(layout.description_column.clone());
    for row in rows {
        let description = row.get(description_idx).map(label_text).unwrap_or_default();

        let mut financial_row = FinancialRow::new(description);
        for (year, idx) in &year_columns {
            let cell = row.get(*idx).map(to_cell).unwrap_or(Cell::Blank);
            if let Cell::Malformed(raw) = &cell {
                warn!("Non-numeric value '{}' in '{}' for {}", raw, financial_row.description, year);
            }
            financial_row.values.insert(year.clone(), cell);
        }
        table.push_row(financial_row);
    }

    info!(
        "Read {} rows x {} year columns from sheet '{}'",
        table.rows().len(),
        year_columns.len(),
        sheet_name
    );
    Ok(table)
}

/// Header cells may hold years as numbers (2019.0); normalise them to "2019"
fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn label_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Float(f) if f.is_finite() => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::parse_text(s),
        Data::Empty => Cell::Blank,
        other => Cell::Malformed(other.to_string()),
    }
}
