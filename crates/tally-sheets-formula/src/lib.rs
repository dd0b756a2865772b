//! # tally-sheets-formula
//!
//! Formula front end for the tally-sheets spreadsheet engine.
//!
//! This crate provides:
//! - Formula parsing (text → AST) for the arithmetic mini-language
//! - Formula evaluation (AST → number or error) against a [`CellSource`]
//! - Shared-slot tracking of cell references, so a row/column shift
//!   renames every reference in a formula in one pass
//! - Canonical expression rebuilding (minimal parentheses)
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_formula::parse_formula;
//!
//! let formula = parse_formula("(1*2)+3").unwrap();
//! // Redundant parentheses are erased during construction
//! assert_eq!(formula.expression(), "1*2+3");
//! ```

pub mod ast;
pub mod cache;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOp, CellSource, EvalResult, Node, TreeBuilder, UnaryOp};
pub use cache::{CellRefCache, CellSlot};
pub use formula::{Formula, RefAdjustment};
pub use parser::parse_formula;
