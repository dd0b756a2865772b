//! A single cell: stored text, optional formula, memoized value

use crate::sheet::Sheet;
use std::cell::RefCell;
use tally_sheets_core::{CellValue, Position};
use tally_sheets_formula::Formula;

/// The escape sign: text starting with it displays without it
const ESCAPE_SIGN: char = '\'';

/// A cell of the sheet
///
/// Holds the raw text as entered (canonicalized for formulas), the parsed
/// formula when the text is one, and the last computed value. The value
/// cache is cleared transitively by the sheet whenever an input changes.
#[derive(Debug, Default)]
pub struct Cell {
    text: String,
    formula: Option<Formula>,
    value: RefCell<Option<CellValue>>,
}

impl Cell {
    /// Create an empty placeholder cell
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The stored text. For formula cells this is `=` followed by the
    /// canonical expression.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The cell's value, computing and caching it on first access.
    ///
    /// Formula cells evaluate against the owning sheet and reduce to a
    /// number or an error code. Text cells yield their text, with a
    /// leading `'` stripped from the value but kept in the text.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        if let Some(value) = &*self.value.borrow() {
            return value.clone();
        }

        let computed = self.compute(sheet);
        *self.value.borrow_mut() = Some(computed.clone());
        computed
    }

    /// Positions the cell's formula references, in ascending order
    pub fn referenced_cells(&self) -> Vec<Position> {
        self.formula
            .as_ref()
            .map(|f| f.referenced_cells())
            .unwrap_or_default()
    }

    fn compute(&self, sheet: &Sheet) -> CellValue {
        match &self.formula {
            Some(formula) => match formula.evaluate(sheet) {
                Ok(number) => CellValue::Number(number),
                Err(error) => CellValue::Error(error),
            },
            None => match self.text.strip_prefix(ESCAPE_SIGN) {
                Some(stripped) => CellValue::Text(stripped.to_string()),
                None => CellValue::Text(self.text.clone()),
            },
        }
    }

    pub(crate) fn formula_mut(&mut self) -> Option<&mut Formula> {
        self.formula.as_mut()
    }

    pub(crate) fn install_formula(&mut self, formula: Formula) {
        self.text = format!("={}", formula.expression());
        self.formula = Some(formula);
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
        self.formula = None;
    }

    /// Re-derive the stored text after references were renamed or broken.
    pub(crate) fn refresh_text(&mut self) {
        if let Some(formula) = &self.formula {
            self.text = format!("={}", formula.expression());
        }
    }

    /// Drop the cached value unconditionally.
    pub(crate) fn clear_cached_value(&self) {
        self.value.borrow_mut().take();
    }

    /// Drop the cached value; returns whether there was one.
    pub(crate) fn invalidate(&self) -> bool {
        self.value.borrow_mut().take().is_some()
    }
}
