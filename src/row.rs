use std::fmt;

use bytes::Bytes;

use crate::util::Slice;

/// One stored unit: (row key, family, qualifier) → value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    row: Slice,
    family: String,
    qualifier: Slice,
    value: Bytes,
}

impl Cell {
    pub fn new(row: Slice, family: String, qualifier: Slice, value: Bytes) -> Self {
        Cell {
            row,
            family,
            qualifier,
            value,
        }
    }

    pub fn row(&self) -> &Slice {
        &self.row
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn qualifier(&self) -> &Slice {
        &self.qualifier
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}:{}->{}",
            self.row,
            self.family,
            self.qualifier,
            Slice::from_bytes(&self.value)
        )
    }
}

/// All cells returned for one row key, sorted by (family, qualifier).
///
/// A row is a grouping view; it is never stored as an object of its own and
/// is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    key: Slice,
    cells: Vec<Cell>,
}

impl Row {
    /// `cells` must all carry `key` and be sorted by (family, qualifier).
    pub(crate) fn new(key: Slice, cells: Vec<Cell>) -> Self {
        debug_assert!(!cells.is_empty());
        debug_assert!(cells.iter().all(|c| c.row == key));
        Row { key, cells }
    }

    pub fn key(&self) -> &Slice {
        &self.key
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of one cell, if present
    pub fn value(&self, family: &str, qualifier: impl AsRef<[u8]>) -> Option<&Bytes> {
        let qualifier = qualifier.as_ref();
        self.cells
            .iter()
            .find(|c| c.family == family && c.qualifier.data() == qualifier)
            .map(|c| &c.value)
    }

    /// Cells of one family, in qualifier order
    pub fn family_cells<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a Cell> + 'a {
        self.cells.iter().filter(move |c| c.family == family)
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.cells.iter().any(|c| c.family == family)
    }
}
