use std::{
    ops::Bound,
    sync::atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;

use crate::{
    filter::{CellView, CompiledFilter},
    mutation::{DeleteScope, Mutation},
    reader::ColumnSelection,
    row::{Cell, Row},
    schema::TableDescriptor,
    util::{Result, Slice, Status},
};

/// Sort key of a stored cell.
///
/// Field order makes the derived ordering group cells by row key first,
/// then by family and qualifier, so a forward walk of the map visits rows in
/// byte-lexicographic order with each row's cells contiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CellKey {
    pub(crate) row: Slice,
    pub(crate) family: String,
    pub(crate) qualifier: Slice,
}

impl CellKey {
    /// Smallest possible key of `row`
    fn first_of(row: Slice) -> Self {
        CellKey {
            row,
            family: String::new(),
            qualifier: Slice::empty(),
        }
    }

    /// Smallest possible key of the first row sorting after `row`
    fn first_after(row: &Slice) -> Self {
        let mut next = row.data().to_vec();
        next.push(0);
        CellKey::first_of(Slice::from(next))
    }
}

/// Runtime state of one table inside the local cluster
///
/// # Thread Safety
///
/// - Cells live in a lock-free skip map (concurrent readers and writers)
/// - The descriptor sits behind an RwLock: mutations hold the read lock while
///   validating and applying, so a concurrent family drop either happens
///   entirely before or entirely after a mutation
pub(crate) struct TableData {
    descriptor: RwLock<TableDescriptor>,
    enabled: AtomicBool,
    cells: SkipMap<CellKey, Bytes>,
}

impl TableData {
    pub(crate) fn new(descriptor: TableDescriptor) -> Self {
        TableData {
            descriptor: RwLock::new(descriptor),
            enabled: AtomicBool::new(true),
            cells: SkipMap::new(),
        }
    }

    pub(crate) fn descriptor(&self) -> TableDescriptor {
        self.descriptor.read().clone()
    }

    pub(crate) fn name(&self) -> String {
        self.descriptor.read().name().to_string()
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Fails unless the table is serving reads and writes
    pub(crate) fn ensure_enabled(&self) -> Result<()> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(Status::table_disabled(&self.name()))
        }
    }

    fn ensure_families<'a>(
        descriptor: &TableDescriptor,
        families: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        for family in families {
            if !descriptor.has_family(family) {
                return Err(Status::schema_error(format!(
                    "unknown column family '{}' in table '{}'",
                    family,
                    descriptor.name()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn validate_selection(&self, selection: &ColumnSelection) -> Result<()> {
        let descriptor = self.descriptor.read();
        Self::ensure_families(&descriptor, selection.named_families())
    }

    pub(crate) fn apply(&self, mutation: &Mutation) -> Result<()> {
        let descriptor = self.descriptor.read();
        Self::ensure_families(&descriptor, mutation.families())?;

        match mutation {
            Mutation::Put(put) => {
                for column in put.columns() {
                    let key = CellKey {
                        row: put.row().clone(),
                        family: column.family.clone(),
                        qualifier: column.qualifier.clone(),
                    };
                    self.cells.insert(key, column.value.clone());
                }
            }
            Mutation::Delete(delete) => match delete.scope() {
                DeleteScope::Row => {
                    for key in self.row_keys(delete.row_key()) {
                        self.cells.remove(&key);
                    }
                }
                DeleteScope::Family(family) => {
                    for key in self.row_keys(delete.row_key()) {
                        if &key.family == family {
                            self.cells.remove(&key);
                        }
                    }
                }
                DeleteScope::Qualifier { family, qualifier } => {
                    self.cells.remove(&CellKey {
                        row: delete.row_key().clone(),
                        family: family.clone(),
                        qualifier: qualifier.clone(),
                    });
                }
            },
        }
        Ok(())
    }

    fn row_keys(&self, row: &Slice) -> Vec<CellKey> {
        self.cells
            .range(CellKey::first_of(row.clone())..)
            .take_while(|entry| &entry.key().row == row)
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub(crate) fn add_family(&self, family: crate::schema::ColumnFamilyDescriptor) -> Result<()> {
        self.descriptor.write().add_family(family)
    }

    /// Drops the family from the schema and purges its cells in every row.
    /// The descriptor write lock is held until the purge is complete.
    pub(crate) fn drop_family(&self, family: &str) -> Result<usize> {
        let mut descriptor = self.descriptor.write();
        descriptor.remove_family(family)?;

        let doomed: Vec<CellKey> = self
            .cells
            .iter()
            .filter(|entry| entry.key().family == family)
            .map(|entry| entry.key().clone())
            .collect();
        for key in &doomed {
            self.cells.remove(key);
        }
        Ok(doomed.len())
    }

    pub(crate) fn read_row(
        &self,
        row: &Slice,
        selection: &ColumnSelection,
        filter: Option<&CompiledFilter>,
    ) -> Option<Row> {
        let cells: Vec<Cell> = self
            .cells
            .range(CellKey::first_of(row.clone())..)
            .take_while(|entry| &entry.key().row == row)
            .filter(|entry| passes(entry.key(), entry.value(), selection, filter))
            .map(|entry| to_cell(entry.key(), entry.value()))
            .collect();

        if cells.is_empty() {
            None
        } else {
            Some(Row::new(row.clone(), cells))
        }
    }

    /// Collects up to `max_rows` rows with at least one passing cell,
    /// starting at `lower` and stopping before `stop`.
    ///
    /// Returns the rows and the key of the last row examined, which the
    /// caller resumes after. `None` as the last key means nothing was left to
    /// examine.
    pub(crate) fn scan_rows(
        &self,
        lower: Bound<&Slice>,
        stop: Option<&Slice>,
        selection: &ColumnSelection,
        filter: Option<&CompiledFilter>,
        max_rows: usize,
    ) -> (Vec<Row>, Option<Slice>) {
        let from = match lower {
            Bound::Included(row) => CellKey::first_of(row.clone()),
            Bound::Excluded(row) => CellKey::first_after(row),
            Bound::Unbounded => CellKey::first_of(Slice::empty()),
        };

        let mut rows = Vec::new();
        let mut current: Option<Slice> = None;
        let mut cells: Vec<Cell> = Vec::new();

        for entry in self.cells.range(from..) {
            let key = entry.key();
            if stop.is_some_and(|stop| &key.row >= stop) {
                break;
            }

            if current.as_ref() != Some(&key.row) {
                if let Some(done) = current.take() {
                    if !cells.is_empty() {
                        rows.push(Row::new(done.clone(), std::mem::take(&mut cells)));
                    }
                    if rows.len() >= max_rows {
                        return (rows, Some(done));
                    }
                }
                current = Some(key.row.clone());
            }

            if passes(key, entry.value(), selection, filter) {
                cells.push(to_cell(key, entry.value()));
            }
        }

        if let Some(done) = current.as_ref()
            && !cells.is_empty()
        {
            rows.push(Row::new(done.clone(), cells));
        }
        (rows, None)
    }

    /// Every cell in key order
    pub(crate) fn all_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .map(|entry| to_cell(entry.key(), entry.value()))
            .collect()
    }

    pub(crate) fn insert_cell(&self, cell: Cell) {
        let key = CellKey {
            row: cell.row().clone(),
            family: cell.family().to_string(),
            qualifier: cell.qualifier().clone(),
        };
        self.cells.insert(key, cell.value().clone());
    }
}

#[inline]
fn passes(
    key: &CellKey,
    value: &Bytes,
    selection: &ColumnSelection,
    filter: Option<&CompiledFilter>,
) -> bool {
    if !selection.selects(&key.family, key.qualifier.data()) {
        return false;
    }
    filter.is_none_or(|filter| {
        filter.matches(&CellView {
            row: key.row.data(),
            family: &key.family,
            qualifier: key.qualifier.data(),
            value: value.as_ref(),
        })
    })
}

fn to_cell(key: &CellKey, value: &Bytes) -> Cell {
    Cell::new(
        key.row.clone(),
        key.family.clone(),
        key.qualifier.clone(),
        value.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::{Delete, Put};

    fn table() -> TableData {
        TableData::new(
            TableDescriptor::builder("student")
                .column_families(["grade", "info"])
                .build()
                .unwrap(),
        )
    }

    fn put(table: &TableData, row: &str, family: &str, qualifier: &str, value: &str) {
        table
            .apply(&Put::new(row).add_column(family, qualifier, value).into())
            .unwrap();
    }

    fn keys(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_put_unknown_family_applies_nothing() {
        let t = table();
        let mutation = Put::new("hr")
            .add_column("grade", "math", "100")
            .add_column("address", "city", "x")
            .into();

        assert!(t.apply(&mutation).unwrap_err().is_schema_error());
        assert_eq!(t.cell_count(), 0);
    }

    #[test]
    fn test_row_is_grouped_and_ordered() {
        let t = table();
        put(&t, "csh", "info", "name", "x3");
        put(&t, "csh", "grade", "math", "99");
        put(&t, "csh", "grade", "English", "100");
        put(&t, "cs", "grade", "math", "1");

        let row = t
            .read_row(&Slice::from("csh"), &ColumnSelection::default(), None)
            .unwrap();
        let order: Vec<String> = row
            .cells()
            .iter()
            .map(|c| format!("{}:{}", c.family(), c.qualifier()))
            .collect();
        assert_eq!(order, vec!["grade:English", "grade:math", "info:name"]);
    }

    #[test]
    fn test_delete_scopes() {
        let t = table();
        put(&t, "hr", "grade", "math", "100");
        put(&t, "hr", "info", "age", "18");
        put(&t, "hr", "info", "name", "hr");
        put(&t, "hs", "info", "age", "20");

        t.apply(&Delete::qualifier("hr", "info", "age").into()).unwrap();
        assert_eq!(t.cell_count(), 3);

        t.apply(&Delete::family("hr", "info").into()).unwrap();
        assert_eq!(t.cell_count(), 2);

        t.apply(&Delete::row("hr").into()).unwrap();
        assert_eq!(t.cell_count(), 1);

        // Absent targets are fine
        t.apply(&Delete::row("hr").into()).unwrap();
        t.apply(&Delete::qualifier("nobody", "info", "age").into())
            .unwrap();
        assert_eq!(t.cell_count(), 1);
    }

    #[test]
    fn test_scan_rows_resumes_after_last_row() {
        let t = table();
        for row in ["a", "b", "b\0", "c", "d"] {
            put(&t, row, "grade", "q", "v");
        }
        let all = ColumnSelection::default();

        let (rows, last) = t.scan_rows(Bound::Unbounded, Some(&Slice::from("d")), &all, None, 2);
        assert_eq!(keys(&rows), vec!["a", "b"]);
        let last = last.unwrap();

        let (rows, last) = t.scan_rows(
            Bound::Excluded(&last),
            Some(&Slice::from("d")),
            &all,
            None,
            2,
        );
        // Stop key reached before the batch filled up: nothing left
        assert_eq!(keys(&rows), vec!["b\0", "c"]);
        assert!(last.is_none());
    }

    #[test]
    fn test_drop_family_purges_cells() {
        let t = table();
        put(&t, "a", "grade", "math", "1");
        put(&t, "a", "info", "name", "x");
        put(&t, "b", "info", "name", "y");

        assert_eq!(t.drop_family("info").unwrap(), 2);
        assert_eq!(t.cell_count(), 1);
        assert!(!t.descriptor().has_family("info"));
        assert!(t.drop_family("info").unwrap_err().is_schema_error());
    }
}
