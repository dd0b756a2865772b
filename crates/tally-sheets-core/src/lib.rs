//! # tally-sheets-core
//!
//! Core value types for the tally-sheets spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout tally-sheets:
//! - [`Position`] and [`Size`] - grid coordinates and bounding boxes
//! - [`CellValue`] - computed cell values (numbers, text, error codes)
//! - [`CellError`] - the in-formula error codes (`#REF!`, `#VALUE!`, `#DIV/0!`)
//! - [`Error`] - the exceptional conditions surfaced to callers
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::Position;
//!
//! let pos = Position::parse("B2").unwrap();
//! assert_eq!(pos, Position::new(1, 1));
//! assert_eq!(pos.to_string(), "B2");
//! ```

pub mod error;
pub mod position;
pub mod value;

pub use error::{Error, Result};
pub use position::{Position, Size};
pub use value::{CellError, CellValue};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;
