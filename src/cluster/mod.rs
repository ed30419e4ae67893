/// The store cluster as seen by the access layer
///
/// [`StoreCluster`] is the RPC surface the client needs: schema changes,
/// single-row mutations, point reads and server-side scanners. Persistence,
/// placement and replication all live behind it.
///
/// ```text
/// Mutator / Reader / SchemaAdmin
///         ↓  (TableHandle / AdminHandle)
///    dyn StoreCluster
///         ├─→ LocalCluster   (in-process, skip-map backed)
///         └─→ ...            (a networked implementation)
/// ```
///
/// Scanners are cluster-side state. A scanner is opened with
/// [`StoreCluster::open_scanner`], drained with
/// [`StoreCluster::next_batch`] and must be released with
/// [`StoreCluster::close_scanner`] unless a batch reported `exhausted`,
/// in which case the cluster has already released it. Closing an unknown or
/// already released scanner succeeds.
pub mod compression;
pub mod local;
pub mod snapshot;
mod table_data;

pub use compression::CompressionType;
pub use local::LocalCluster;

use crate::{
    mutation::Mutation,
    reader::{Get, Scan},
    row::Row,
    schema::{ColumnFamilyDescriptor, TableDescriptor},
    util::Result,
};

/// Identifier of a cluster-side scanner
pub type ScannerId = u64;

/// One round trip worth of scan results
#[derive(Debug, Default)]
pub struct ScanBatch {
    /// Rows in strictly increasing key order
    pub rows: Vec<Row>,
    /// No rows remain; the cluster has released the scanner
    pub exhausted: bool,
}

pub trait StoreCluster: Send + Sync {
    /// Fails with a schema error if the table exists
    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()>;

    /// Only disabled tables can be deleted
    fn delete_table(&self, table: &str) -> Result<()>;

    fn enable_table(&self, table: &str) -> Result<()>;

    fn disable_table(&self, table: &str) -> Result<()>;

    fn is_table_enabled(&self, table: &str) -> Result<bool>;

    fn describe_table(&self, table: &str) -> Result<TableDescriptor>;

    /// Table names in ascending order
    fn list_tables(&self) -> Result<Vec<String>>;

    fn add_column_family(&self, table: &str, family: &ColumnFamilyDescriptor) -> Result<()>;

    /// Removes the family and every cell stored under it
    fn delete_column_family(&self, table: &str, family: &str) -> Result<()>;

    /// Applies a single-row mutation; nothing is applied if any family it
    /// names is unknown
    fn mutate(&self, table: &str, mutation: &Mutation) -> Result<()>;

    /// `Ok(None)` if no cell of the row passes the selection and filter
    fn get(&self, table: &str, get: &Get) -> Result<Option<Row>>;

    fn open_scanner(&self, table: &str, scan: &Scan) -> Result<ScannerId>;

    fn next_batch(&self, scanner: ScannerId, max_rows: usize) -> Result<ScanBatch>;

    fn close_scanner(&self, scanner: ScannerId) -> Result<()>;

    /// Called once when the owning connection is closed
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
