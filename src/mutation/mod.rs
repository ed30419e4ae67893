/// Mutations sent to the store
///
/// A mutation always targets exactly one row key:
///
/// ```text
/// Mutation
///  ├─→ Put     : upsert one or more (family, qualifier) → value
///  └─→ Delete
///       ├─→ Row       : every cell of the row
///       ├─→ Family    : every cell of one family in the row
///       └─→ Qualifier : one cell
/// ```
///
/// The store validates every family a mutation names before it applies any
/// cell, so a Put that names an unknown family changes nothing.
pub mod batch;

use bytes::Bytes;

pub use batch::BatchReport;

use crate::util::Slice;

/// A column value inside a [`Put`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    pub family: String,
    pub qualifier: Slice,
    pub value: Bytes,
}

/// Upsert of one or more cells under a single row key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    row: Slice,
    columns: Vec<ColumnValue>,
}

impl Put {
    pub fn new(row: impl Into<Slice>) -> Self {
        Put {
            row: row.into(),
            columns: Vec::new(),
        }
    }

    /// Add a cell; later columns for the same (family, qualifier) win.
    pub fn add_column(
        mut self,
        family: &str,
        qualifier: impl Into<Slice>,
        value: impl AsRef<[u8]>,
    ) -> Self {
        self.columns.push(ColumnValue {
            family: family.to_string(),
            qualifier: qualifier.into(),
            value: Bytes::copy_from_slice(value.as_ref()),
        });
        self
    }

    pub fn row(&self) -> &Slice {
        &self.row
    }

    pub fn columns(&self) -> &[ColumnValue] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Approximate payload size in bytes
    pub fn data_size(&self) -> usize {
        self.columns
            .iter()
            .map(|c| self.row.size() + c.family.len() + c.qualifier.size() + c.value.len())
            .sum()
    }
}

/// What a [`Delete`] removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    Row,
    Family(String),
    Qualifier { family: String, qualifier: Slice },
}

/// Removal of cells under a single row key; deleting absent cells succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    row: Slice,
    scope: DeleteScope,
}

impl Delete {
    pub fn row(row: impl Into<Slice>) -> Self {
        Delete {
            row: row.into(),
            scope: DeleteScope::Row,
        }
    }

    pub fn family(row: impl Into<Slice>, family: &str) -> Self {
        Delete {
            row: row.into(),
            scope: DeleteScope::Family(family.to_string()),
        }
    }

    pub fn qualifier(row: impl Into<Slice>, family: &str, qualifier: impl Into<Slice>) -> Self {
        Delete {
            row: row.into(),
            scope: DeleteScope::Qualifier {
                family: family.to_string(),
                qualifier: qualifier.into(),
            },
        }
    }

    pub fn row_key(&self) -> &Slice {
        &self.row
    }

    pub fn scope(&self) -> &DeleteScope {
        &self.scope
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Put(Put),
    Delete(Delete),
}

impl Mutation {
    pub fn row(&self) -> &Slice {
        match self {
            Mutation::Put(put) => put.row(),
            Mutation::Delete(delete) => delete.row_key(),
        }
    }

    /// Families named by the mutation, in order of appearance
    pub fn families(&self) -> Vec<&str> {
        match self {
            Mutation::Put(put) => put.columns.iter().map(|c| c.family.as_str()).collect(),
            Mutation::Delete(delete) => match &delete.scope {
                DeleteScope::Row => Vec::new(),
                DeleteScope::Family(family) => vec![family.as_str()],
                DeleteScope::Qualifier { family, .. } => vec![family.as_str()],
            },
        }
    }
}

impl From<Put> for Mutation {
    fn from(put: Put) -> Self {
        Mutation::Put(put)
    }
}

impl From<Delete> for Mutation {
    fn from(delete: Delete) -> Self {
        Mutation::Delete(delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_builder() {
        let put = Put::new("csh")
            .add_column("grade", "math", "99")
            .add_column("info", "name", b"x3");

        assert_eq!(put.row(), &Slice::from("csh"));
        assert_eq!(put.columns().len(), 2);
        assert_eq!(put.columns()[1].value, Bytes::from_static(b"x3"));
        assert_eq!(
            Mutation::from(put).families(),
            vec!["grade", "info"]
        );
    }

    #[test]
    fn test_delete_families() {
        assert!(Mutation::from(Delete::row("hr")).families().is_empty());
        assert_eq!(
            Mutation::from(Delete::qualifier("hr", "info", "age")).families(),
            vec!["info"]
        );
        assert_eq!(
            Mutation::from(Delete::family("hr", "grade")).families(),
            vec!["grade"]
        );
    }
}
