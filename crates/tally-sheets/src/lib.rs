//! # tally-sheets
//!
//! The computational core of a spreadsheet: a grid of cells holding plain
//! text or arithmetic formulas that reference other cells.
//!
//! The sheet parses formulas into an AST, maintains the cell dependency
//! graph, memoizes cell values, invalidates cached results when inputs
//! change, rejects circular references before they are installed, and
//! rewrites formulas when rows or columns are inserted or deleted so that
//! references stay correct.
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! let a1 = Position::parse("A1").unwrap();
//! let a2 = Position::parse("A2").unwrap();
//! let a3 = Position::parse("A3").unwrap();
//!
//! sheet.set_cell(a1, "2").unwrap();
//! sheet.set_cell(a2, "3").unwrap();
//! sheet.set_cell(a3, "=A1+A2").unwrap();
//!
//! assert_eq!(sheet.value(a3).unwrap(), Some(CellValue::Number(5.0)));
//!
//! // Edits invalidate dependents transitively
//! sheet.set_cell(a1, "4").unwrap();
//! assert_eq!(sheet.value(a3).unwrap(), Some(CellValue::Number(7.0)));
//! ```

pub mod cell;
pub mod prelude;
pub mod sheet;

mod graph;

pub use cell::Cell;
pub use sheet::Sheet;

// Re-export core types
pub use tally_sheets_core::{
    CellError, CellValue, Error, Position, Result, Size, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use tally_sheets_formula::{parse_formula, CellSource, Formula, RefAdjustment};
