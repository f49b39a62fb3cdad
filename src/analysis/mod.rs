//! Liquidity, return-on-equity and EBITDA-margin ratios per year.
//!
//! Line items are located by exact description match through [`LineItemIndex`].
//! Every ratio cell is computed independently: a missing line item, a blank or
//! non-numeric cell, or a zero denominator makes that cell undefined and leaves
//! the rest of the report intact.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extractor::{Cell, FinancialRow, FinancialTable};

/// Balance-sheet rows the ratios are built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LineItem {
    AtivoCirculante,
    PassivoCirculante,
    LucroLiquido,
    PatrimonioLiquido,
    Ebitda,
    ReceitaLiquida,
}

impl LineItem {
    pub const ALL: [LineItem; 6] = [
        LineItem::AtivoCirculante,
        LineItem::PassivoCirculante,
        LineItem::LucroLiquido,
        LineItem::PatrimonioLiquido,
        LineItem::Ebitda,
        LineItem::ReceitaLiquida,
    ];

    /// Exact row description in the uploaded sheet
    pub fn label(&self) -> &'static str {
        match self {
            LineItem::AtivoCirculante => "ATIVO CIRCULANTE",
            LineItem::PassivoCirculante => "PASSIVO CIRCULANTE",
            LineItem::LucroLiquido => "LUCRO LÍQUIDO",
            LineItem::PatrimonioLiquido => "PATRIMÔNIO LÍQUIDO",
            LineItem::Ebitda => "EBITDA",
            LineItem::ReceitaLiquida => "RECEITA LÍQUIDA",
        }
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    CurrentLiquidity,
    ReturnOnEquity,
    EbitdaMargin,
}

impl RatioKind {
    pub const ALL: [RatioKind; 3] = [
        RatioKind::CurrentLiquidity,
        RatioKind::ReturnOnEquity,
        RatioKind::EbitdaMargin,
    ];

    /// Numerator and denominator line items
    pub fn operands(&self) -> (LineItem, LineItem) {
        match self {
            RatioKind::CurrentLiquidity => (LineItem::AtivoCirculante, LineItem::PassivoCirculante),
            RatioKind::ReturnOnEquity => (LineItem::LucroLiquido, LineItem::PatrimonioLiquido),
            RatioKind::EbitdaMargin => (LineItem::Ebitda, LineItem::ReceitaLiquida),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            RatioKind::CurrentLiquidity => "current_liquidity",
            RatioKind::ReturnOnEquity => "return_on_equity",
            RatioKind::EbitdaMargin => "ebitda_margin",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RatioKind::CurrentLiquidity => "Current liquidity",
            RatioKind::ReturnOnEquity => "ROE",
            RatioKind::EbitdaMargin => "EBITDA margin",
        }
    }
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Why a single ratio cell is undefined
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatioError {
    #[error("missing line item '{0}'")]
    MissingLineItem(LineItem),

    #[error("'{item}' has no value for {year}")]
    BlankCell { item: LineItem, year: String },

    #[error("'{item}' has non-numeric value '{raw}' for {year}")]
    BadNumber { item: LineItem, year: String, raw: String },

    #[error("division by zero: '{denominator}' is 0 for {year}")]
    DivisionByZero { denominator: LineItem, year: String },

    #[error("result is not a finite number for {year}")]
    NonFinite { year: String },
}

impl RatioError {
    /// Short machine-readable reason
    pub fn code(&self) -> &'static str {
        match self {
            RatioError::MissingLineItem(_) => "missing_line_item",
            RatioError::BlankCell { .. } => "blank_cell",
            RatioError::BadNumber { .. } => "bad_number",
            RatioError::DivisionByZero { .. } => "division_by_zero",
            RatioError::NonFinite { .. } => "non_finite",
        }
    }
}

pub type RatioValue = Result<f64, RatioError>;

/// Label → row lookup over a table, first match per label
#[derive(Debug)]
pub struct LineItemIndex<'a> {
    rows: HashMap<LineItem, &'a FinancialRow>,
}

impl<'a> LineItemIndex<'a> {
    pub fn build(table: &'a FinancialTable) -> Self {
        let rows = LineItem::ALL
            .iter()
            .filter_map(|item| table.row(item.label()).map(|row| (*item, row)))
            .collect();
        Self { rows }
    }

    pub fn get(&self, item: LineItem) -> Option<&'a FinancialRow> {
        self.rows.get(&item).copied()
    }

    pub fn missing(&self) -> Vec<LineItem> {
        LineItem::ALL
            .iter()
            .copied()
            .filter(|item| !self.rows.contains_key(item))
            .collect()
    }

    /// Numeric value of a line item in a year
    pub fn value(&self, item: LineItem, year: &str) -> RatioValue {
        let row = self.get(item).ok_or(RatioError::MissingLineItem(item))?;

        match row.get(year) {
            Some(Cell::Number(value)) => Ok(*value),
            Some(Cell::Malformed(raw)) => Err(RatioError::BadNumber {
                item,
                year: year.to_string(),
                raw: raw.clone(),
            }),
            Some(Cell::Blank) | None => Err(RatioError::BlankCell {
                item,
                year: year.to_string(),
            }),
        }
    }

    /// Compute one ratio for one year
    pub fn ratio(&self, kind: RatioKind, year: &str) -> RatioValue {
        let (numerator_item, denominator_item) = kind.operands();

        // Report a missing label before looking at any cell
        for item in [numerator_item, denominator_item] {
            if self.get(item).is_none() {
                return Err(RatioError::MissingLineItem(item));
            }
        }

        let numerator = self.value(numerator_item, year)?;
        let denominator = self.value(denominator_item, year)?;

        if denominator == 0.0 {
            return Err(RatioError::DivisionByZero {
                denominator: denominator_item,
                year: year.to_string(),
            });
        }

        let result = numerator / denominator;
        if !result.is_finite() {
            return Err(RatioError::NonFinite { year: year.to_string() });
        }
        Ok(result)
    }
}

/// Ratios for a single year
#[derive(Debug, Clone, PartialEq)]
pub struct YearRatios {
    pub year: String,
    pub values: BTreeMap<RatioKind, RatioValue>,
}

impl YearRatios {
    pub fn get(&self, kind: RatioKind) -> Option<&RatioValue> {
        self.values.get(&kind)
    }
}

/// Ratios for every reported year, in table column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioReport {
    pub years: Vec<YearRatios>,
    pub missing_line_items: Vec<LineItem>,
}

impl RatioReport {
    pub fn year(&self, year: &str) -> Option<&YearRatios> {
        self.years.iter().find(|entry| entry.year == year)
    }

    pub fn value(&self, year: &str, kind: RatioKind) -> Option<&RatioValue> {
        self.year(year).and_then(|entry| entry.get(kind))
    }

    pub fn defined_count(&self) -> usize {
        self.cells().filter(|value| value.is_ok()).count()
    }

    pub fn undefined_count(&self) -> usize {
        self.cells().filter(|value| value.is_err()).count()
    }

    fn cells(&self) -> impl Iterator<Item = &RatioValue> {
        self.years.iter().flat_map(|entry| entry.values.values())
    }
}

/// Compute every ratio for every year the located line items cover
pub fn calculate_ratios(table: &FinancialTable) -> RatioReport {
    let index = LineItemIndex::build(table);
    let missing_line_items = index.missing();

    if !missing_line_items.is_empty() {
        warn!("Missing line items: {:?}", missing_line_items);
    }

    let years = report_years(table, &index);
    debug!("Calculating ratios for years {:?}", years);

    let years = years
        .into_iter()
        .map(|year| {
            let values = RatioKind::ALL
                .iter()
                .map(|kind| (*kind, index.ratio(*kind, &year)))
                .collect();
            YearRatios { year, values }
        })
        .collect();

    RatioReport {
        years,
        missing_line_items,
    }
}

/// Table years present in at least one located row; all table years when nothing was located
fn report_years(table: &FinancialTable, index: &LineItemIndex<'_>) -> Vec<String> {
    let located: Vec<&FinancialRow> = LineItem::ALL.iter().filter_map(|item| index.get(*item)).collect();

    if located.is_empty() {
        return table.years().to_vec();
    }

    table
        .years()
        .iter()
        .filter(|year| located.iter().any(|row| row.values.contains_key(year.as_str())))
        .cloned()
        .collect()
}
