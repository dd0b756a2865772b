//! Dependency tracking between cells
//!
//! Edges are keyed by stable cell handles rather than positions, so
//! inserting or deleting rows and columns never re-keys the graph.

use std::collections::{HashMap, HashSet};

/// Stable handle of a cell, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellId(u64);

impl CellId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Dependency graph of formula cells
///
/// For every edge, the *reader* is the cell whose formula references the
/// *target*. Both directions are kept so that recalculation can walk
/// dependents and cycle checks can walk precedents.
#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    /// Cell → cells whose formulas read it
    dependents: HashMap<CellId, HashSet<CellId>>,
    /// Cell → cells its formula reads
    precedents: HashMap<CellId, HashSet<CellId>>,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add an edge: `reader`'s formula references `target`.
    pub(crate) fn connect(&mut self, reader: CellId, target: CellId) {
        self.precedents.entry(reader).or_default().insert(target);
        self.dependents.entry(target).or_default().insert(reader);
    }

    /// Drop every outgoing edge of `reader` (its formula is going away).
    pub(crate) fn disconnect_outgoing(&mut self, reader: CellId) {
        if let Some(targets) = self.precedents.remove(&reader) {
            for target in targets {
                if let Some(readers) = self.dependents.get_mut(&target) {
                    readers.remove(&reader);
                }
            }
        }
    }

    /// Remove a cell from both sides of the graph.
    pub(crate) fn remove_cell(&mut self, cell: CellId) {
        self.disconnect_outgoing(cell);

        if let Some(readers) = self.dependents.remove(&cell) {
            for reader in readers {
                if let Some(targets) = self.precedents.get_mut(&reader) {
                    targets.remove(&cell);
                }
            }
        }
    }

    /// Cells whose formulas read the given cell
    pub(crate) fn dependents_of(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Whether `target` has at least one dependent
    pub(crate) fn has_dependents(&self, target: CellId) -> bool {
        self.dependents.get(&target).map_or(false, |s| !s.is_empty())
    }

    /// Would pointing `target`'s formula at `new_refs` close a cycle?
    ///
    /// DFS over precedents starting from `new_refs`. The forward subgraph
    /// currently reachable from `target` is about to be replaced and, by
    /// the no-cycle invariant, cannot lead back to `target`, so it is
    /// seeded as visited and skipped.
    pub(crate) fn would_cycle(&self, target: CellId, new_refs: &[CellId]) -> bool {
        if new_refs.contains(&target) {
            return true;
        }

        let mut visited = HashSet::new();
        let mut stack: Vec<CellId> = self.precedents_of(target).collect();
        while let Some(id) = stack.pop() {
            if visited.insert(id) {
                stack.extend(self.precedents_of(id));
            }
        }

        let mut stack: Vec<CellId> = new_refs.to_vec();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if visited.insert(id) {
                stack.extend(self.precedents_of(id));
            }
        }

        false
    }

    fn precedents_of(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
