use std::collections::BTreeMap;

use crate::models::{default_report_years, Config, DEFAULT_DESCRIPTION_COLUMN};

/// One spreadsheet value under a year column
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Blank,
    /// Cell content that could not be read as a number, kept verbatim
    Malformed(String),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl Cell {
    /// Interpret spreadsheet text as a number.
    /// Accepts plain decimals ("1234.5") and pt-BR formatting ("1.234,50", "1.234.567").
    /// Mixed shapes such as "1,234.56" are malformed.
    pub fn parse_text(raw: &str) -> Cell {
        let text = raw.trim();
        if text.is_empty() {
            return Cell::Blank;
        }

        let normalized = match text.split_once(',') {
            Some((integer, fraction)) if is_digits(fraction) => {
                strip_thousands(integer).map(|integer| format!("{}.{}", integer, fraction))
            }
            Some(_) => None,
            None if text.matches('.').count() > 1 => strip_thousands(text),
            None => Some(text.to_string()),
        };

        match normalized.and_then(|n| n.parse::<f64>().ok()) {
            Some(value) if value.is_finite() => Cell::Number(value),
            _ => Cell::Malformed(raw.to_string()),
        }
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// "-1.234.567" -> "-1234567". Groups after the first must have exactly three digits.
fn strip_thousands(integer: &str) -> Option<String> {
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer.strip_prefix('+').unwrap_or(integer)),
    };

    let mut groups = digits.split('.');
    let first = groups.next()?;
    if !is_digits(first) {
        return None;
    }
    if digits.contains('.') && first.len() > 3 {
        return None;
    }

    let mut out = format!("{}{}", sign, first);
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

/// A labelled line of the balance sheet
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRow {
    pub description: String,
    pub values: BTreeMap<String, Cell>,
}

impl FinancialRow {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, year: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.values.insert(year.into(), cell.into());
        self
    }

    pub fn get(&self, year: &str) -> Option<&Cell> {
        self.values.get(year)
    }
}

/// Balance-sheet rows keyed by description, with ordered year columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialTable {
    years: Vec<String>,
    rows: Vec<FinancialRow>,
    source_sheet: Option<String>,
    sheet_names: Vec<String>,
    description_column: Option<String>,
}

impl FinancialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_years<I, S>(years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            years: years.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builder form of [`FinancialTable::push_row`]
    pub fn with_row<I, S, C>(mut self, description: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<Cell>,
    {
        let row = values
            .into_iter()
            .fold(FinancialRow::new(description), |row, (year, cell)| {
                row.with_value(year, cell)
            });
        self.push_row(row);
        self
    }

    /// Append a row; years not seen before are added to the column list
    pub fn push_row(&mut self, row: FinancialRow) {
        for year in row.values.keys() {
            if !self.years.contains(year) {
                self.years.push(year.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn set_source(&mut self, sheet_name: impl Into<String>, sheet_names: Vec<String>) {
        self.source_sheet = Some(sheet_name.into());
        self.sheet_names = sheet_names;
    }

    /// Header of the column the row labels were read from
    pub fn description_column(&self) -> &str {
        self.description_column.as_deref().unwrap_or(DEFAULT_DESCRIPTION_COLUMN)
    }

    pub fn set_description_column(&mut self, column: impl Into<String>) {
        self.description_column = Some(column.into());
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn rows(&self) -> &[FinancialRow] {
        &self.rows
    }

    pub fn source_sheet(&self) -> Option<&str> {
        self.source_sheet.as_deref()
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// First row whose description equals `description` exactly
    pub fn row(&self, description: &str) -> Option<&FinancialRow> {
        self.rows.iter().find(|row| row.description == description)
    }
}

/// Expected shape of the uploaded balance sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub description_column: String,
    pub years: Vec<String>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            description_column: DEFAULT_DESCRIPTION_COLUMN.to_string(),
            years: default_report_years(),
        }
    }
}

impl SheetLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            description_column: config.description_column.clone(),
            years: config.report_years.clone(),
        }
    }
}
