//! A parsed formula: AST root plus the reference cache behind it

use crate::ast::{CellSource, EvalResult, Node};
use crate::cache::CellRefCache;
use tally_sheets_core::Position;

/// How a structural edit affected a formula's references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefAdjustment {
    /// No reference was touched
    Unchanged,
    /// References were renamed; the value is unaffected but the
    /// expression text changed
    Renamed,
    /// At least one reference now points at deleted cells
    Broken,
}

/// A parsed, evaluatable formula
#[derive(Debug)]
pub struct Formula {
    root: Node,
    refs: CellRefCache,
}

impl Formula {
    pub(crate) fn new(root: Node, refs: CellRefCache) -> Self {
        Self { root, refs }
    }

    /// Evaluate against `source`, yielding a number or an error code.
    pub fn evaluate(&self, source: &dyn CellSource) -> EvalResult {
        self.root.evaluate(source)
    }

    /// The canonical expression text, without the leading `=`.
    pub fn expression(&self) -> String {
        self.root.build_expression()
    }

    /// All live referenced positions in ascending (row, col) order.
    pub fn referenced_cells(&self) -> Vec<Position> {
        self.refs.referenced_cells()
    }

    /// Rename references for rows inserted before `before`.
    pub fn adjust_for_inserted_rows(&mut self, before: u32, count: u32) -> RefAdjustment {
        Self::from_renamed(self.refs.shift_inserted_rows(before, count))
    }

    /// Rename references for columns inserted before `before`.
    pub fn adjust_for_inserted_cols(&mut self, before: u16, count: u16) -> RefAdjustment {
        Self::from_renamed(self.refs.shift_inserted_cols(before, count))
    }

    /// Break or rename references for a deleted row band.
    pub fn adjust_for_deleted_rows(&mut self, first: u32, count: u32) -> RefAdjustment {
        let (deleted, renamed) = self.refs.shift_deleted_rows(first, count);
        Self::from_counts(deleted, renamed)
    }

    /// Break or rename references for a deleted column band.
    pub fn adjust_for_deleted_cols(&mut self, first: u16, count: u16) -> RefAdjustment {
        let (deleted, renamed) = self.refs.shift_deleted_cols(first, count);
        Self::from_counts(deleted, renamed)
    }

    fn from_renamed(renamed: usize) -> RefAdjustment {
        if renamed > 0 {
            RefAdjustment::Renamed
        } else {
            RefAdjustment::Unchanged
        }
    }

    fn from_counts(deleted: usize, renamed: usize) -> RefAdjustment {
        if deleted > 0 {
            RefAdjustment::Broken
        } else {
            Self::from_renamed(renamed)
        }
    }
}
