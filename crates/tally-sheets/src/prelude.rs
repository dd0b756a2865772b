//! Prelude module - common imports for tally-sheets users
//!
//! ```rust
//! use tally_sheets::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    CellError,
    CellValue,
    // Error types
    Error,
    Position,
    Result,
    // Main types
    Sheet,
    Size,
};
