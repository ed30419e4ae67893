/// Point gets and range scans
///
/// ```text
/// Reader::get  ──→ TableHandle ──→ StoreCluster::get ──→ Row | NotFound
/// Reader::scan ──→ Scanner (owns its TableHandle)
///                    └─→ open_scanner, next_batch × N, close_scanner
/// ```
pub mod request;
pub mod scanner;

use std::sync::Arc;

use tracing::debug;

pub use request::{ColumnSelection, Get, Scan};
pub use scanner::{Scanner, ScannerState};

use crate::{
    connection::ConnectionManager,
    filter::Filter,
    options::ReadOptions,
    row::Row,
    util::{Result, Slice, Status},
};

#[derive(Clone)]
pub struct Reader {
    manager: Arc<ConnectionManager>,
}

impl Reader {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Reader { manager }
    }

    /// Reads one row, keeping only the cells that pass `filter`.
    ///
    /// A row with no (passing) cell is reported as `NotFound`, which is
    /// never used for infrastructure failures.
    pub fn get(&self, table: &str, row: impl Into<Slice>, filter: Option<Filter>) -> Result<Row> {
        let mut get = Get::new(row);
        if let Some(filter) = filter {
            get = get.with_filter(filter);
        }
        self.get_with(&ReadOptions::default(), table, &get)
    }

    pub fn get_with(&self, options: &ReadOptions, table: &str, get: &Get) -> Result<Row> {
        options.check_cancelled()?;
        let handle = self.manager.table_handle(table)?;
        let row = handle.get(get)?;
        handle.statistics().record_get(row.is_some());
        debug!(table, row = %get.row(), hit = row.is_some(), "get");

        row.ok_or_else(|| {
            Status::not_found(format!("row '{}' not found in table '{}'", get.row(), table))
        })
    }

    /// Opens a scanner over `scan`, or over the whole table when `None`
    pub fn scan(&self, table: &str, scan: Option<Scan>) -> Result<Scanner> {
        self.scan_with(ReadOptions::default(), table, scan.unwrap_or_default())
    }

    pub fn scan_with(&self, options: ReadOptions, table: &str, scan: Scan) -> Result<Scanner> {
        let handle = self.manager.table_handle(table)?;
        Scanner::open(handle, scan, options)
    }
}
