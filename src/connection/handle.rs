use std::sync::Arc;

use crate::{
    cluster::{ScanBatch, ScannerId, StoreCluster},
    mutation::Mutation,
    reader::{Get, Scan},
    row::Row,
    schema::{ColumnFamilyDescriptor, TableDescriptor},
    statistics::ClientStatistics,
    util::Result,
};

/// Scoped access to one table
///
/// Acquired per operation from a [`Connection`](super::Connection) and
/// released when dropped, whatever the outcome of the operation. Handles are
/// not `Clone`; concurrent operations each acquire their own.
pub struct TableHandle {
    cluster: Arc<dyn StoreCluster>,
    statistics: Arc<ClientStatistics>,
    table: String,
    scanner_caching: usize,
}

impl TableHandle {
    pub(crate) fn new(
        cluster: Arc<dyn StoreCluster>,
        statistics: Arc<ClientStatistics>,
        table: &str,
        scanner_caching: usize,
    ) -> Self {
        statistics.record_handle_acquired();
        TableHandle {
            cluster,
            statistics,
            table: table.to_string(),
            scanner_caching,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Rows per scan round trip when the scan does not set a batch size
    pub fn scanner_caching(&self) -> usize {
        self.scanner_caching
    }

    pub fn statistics(&self) -> &ClientStatistics {
        &self.statistics
    }

    pub fn mutate(&self, mutation: &Mutation) -> Result<()> {
        self.track(self.cluster.mutate(&self.table, mutation))
    }

    pub fn get(&self, get: &Get) -> Result<Option<Row>> {
        self.track(self.cluster.get(&self.table, get))
    }

    pub fn open_scanner(&self, scan: &Scan) -> Result<ScannerId> {
        self.track(self.cluster.open_scanner(&self.table, scan))
    }

    pub fn next_batch(&self, scanner: ScannerId, max_rows: usize) -> Result<ScanBatch> {
        self.track(self.cluster.next_batch(scanner, max_rows))
    }

    pub fn close_scanner(&self, scanner: ScannerId) -> Result<()> {
        self.track(self.cluster.close_scanner(scanner))
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.statistics.record_error();
        }
        result
    }
}

impl Drop for TableHandle {
    fn drop(&mut self) {
        self.statistics.record_handle_released();
    }
}

/// Scoped access to schema operations, released when dropped
pub struct AdminHandle {
    cluster: Arc<dyn StoreCluster>,
    statistics: Arc<ClientStatistics>,
}

impl AdminHandle {
    pub(crate) fn new(cluster: Arc<dyn StoreCluster>, statistics: Arc<ClientStatistics>) -> Self {
        statistics.record_handle_acquired();
        AdminHandle {
            cluster,
            statistics,
        }
    }

    pub fn statistics(&self) -> &ClientStatistics {
        &self.statistics
    }

    pub fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        self.track(self.cluster.create_table(descriptor))
    }

    pub fn delete_table(&self, table: &str) -> Result<()> {
        self.track(self.cluster.delete_table(table))
    }

    pub fn enable_table(&self, table: &str) -> Result<()> {
        self.track(self.cluster.enable_table(table))
    }

    pub fn disable_table(&self, table: &str) -> Result<()> {
        self.track(self.cluster.disable_table(table))
    }

    pub fn is_table_enabled(&self, table: &str) -> Result<bool> {
        self.track(self.cluster.is_table_enabled(table))
    }

    pub fn describe_table(&self, table: &str) -> Result<TableDescriptor> {
        self.track(self.cluster.describe_table(table))
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.track(self.cluster.list_tables())
    }

    pub fn add_column_family(&self, table: &str, family: &ColumnFamilyDescriptor) -> Result<()> {
        self.track(self.cluster.add_column_family(table, family))
    }

    pub fn delete_column_family(&self, table: &str, family: &str) -> Result<()> {
        self.track(self.cluster.delete_column_family(table, family))
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.statistics.record_error();
        }
        result
    }
}

impl Drop for AdminHandle {
    fn drop(&mut self) {
        self.statistics.record_handle_released();
    }
}
