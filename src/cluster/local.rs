use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    cluster::{
        CompressionType, ScanBatch, ScannerId, StoreCluster,
        snapshot::{self, SnapshotCell, SnapshotInfo, SnapshotTable},
        table_data::TableData,
    },
    filter::CompiledFilter,
    mutation::Mutation,
    reader::{ColumnSelection, Get, Scan},
    row::{Cell, Row},
    schema::{ColumnFamilyDescriptor, TableDescriptor},
    util::{Result, Slice, Status},
};

/// Cluster-side state of an open scanner
struct OpenScanner {
    table: Arc<TableData>,
    table_name: String,
    /// Last row examined by the previous batch
    resume_after: Option<Slice>,
    start: Option<Slice>,
    stop: Option<Slice>,
    selection: ColumnSelection,
    filter: Option<CompiledFilter>,
}

struct SnapshotTarget {
    path: PathBuf,
    compression: CompressionType,
}

/// In-process store cluster
///
/// Tables are kept in memory, one skip map per table. Filters are compiled
/// and evaluated here, scanners are tracked until exhausted or closed, and
/// the whole cluster can be saved to and loaded from a snapshot file.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use widecolumn::{ConnectionConfig, ConnectionManager, LocalCluster, LocalConnector};
///
/// let cluster = Arc::new(LocalCluster::new());
/// let manager =
///     ConnectionManager::new(ConnectionConfig::default(), LocalConnector::shared(cluster.clone()));
/// assert_eq!(cluster.open_scanner_count(), 0);
/// ```
pub struct LocalCluster {
    tables: RwLock<BTreeMap<String, Arc<TableData>>>,
    scanners: Mutex<HashMap<ScannerId, OpenScanner>>,
    next_scanner_id: AtomicU64,
    snapshot: Option<SnapshotTarget>,
}

impl Default for LocalCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCluster {
    pub fn new() -> Self {
        LocalCluster {
            tables: RwLock::new(BTreeMap::new()),
            scanners: Mutex::new(HashMap::new()),
            next_scanner_id: AtomicU64::new(1),
            snapshot: None,
        }
    }

    /// Opens a cluster persisted at `path`.
    ///
    /// The snapshot is loaded if the file exists, otherwise the cluster starts
    /// empty. Either way [`StoreCluster::shutdown`] saves to `path`.
    pub fn open<P: AsRef<Path>>(path: P, compression: CompressionType) -> Result<Self> {
        let path = path.as_ref();
        let mut cluster = if path.exists() {
            Self::load_snapshot(path)?
        } else {
            Self::new()
        };
        cluster.snapshot = Some(SnapshotTarget {
            path: path.to_path_buf(),
            compression,
        });
        Ok(cluster)
    }

    /// Loads a cluster from a snapshot file
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let tables = snapshot::read_file(path)?;
        let cluster = Self::new();

        {
            let mut registry = cluster.tables.write();
            for table in tables {
                let descriptor = table.descriptor;
                let name = descriptor.name().to_string();
                if registry.contains_key(&name) {
                    return Err(Status::corruption(format!(
                        "duplicate table '{name}' in snapshot"
                    )));
                }

                let data = TableData::new(descriptor);
                data.set_enabled(table.enabled);
                for cell in table.cells {
                    if !data.descriptor().has_family(&cell.family) {
                        return Err(Status::corruption(format!(
                            "snapshot cell of table '{name}' names unknown family '{}'",
                            cell.family
                        )));
                    }
                    data.insert_cell(Cell::new(
                        cell.row,
                        cell.family,
                        cell.qualifier,
                        cell.value.into(),
                    ));
                }
                registry.insert(name, Arc::new(data));
            }
        }

        info!(
            path = %path.display(),
            tables = cluster.tables.read().len(),
            "loaded local cluster snapshot"
        );
        Ok(cluster)
    }

    /// Saves every table to `path`.
    ///
    /// Tables are copied one at a time; writes racing with the save may or may
    /// not be included.
    pub fn save_snapshot<P: AsRef<Path>>(
        &self,
        path: P,
        compression: CompressionType,
    ) -> Result<SnapshotInfo> {
        let tables: Vec<SnapshotTable> = self
            .tables
            .read()
            .values()
            .map(|table| SnapshotTable {
                descriptor: table.descriptor(),
                enabled: table.is_enabled(),
                cells: table
                    .all_cells()
                    .into_iter()
                    .map(|cell| SnapshotCell {
                        row: cell.row().clone(),
                        family: cell.family().to_string(),
                        qualifier: cell.qualifier().clone(),
                        value: cell.value().to_vec(),
                    })
                    .collect(),
            })
            .collect();

        let info = snapshot::write_file(path.as_ref(), &tables, compression)?;
        info!(
            path = %path.as_ref().display(),
            tables = info.tables,
            cells = info.cells,
            bytes = info.file_size,
            "saved local cluster snapshot"
        );
        Ok(info)
    }

    /// Number of cluster-side scanners neither exhausted nor closed
    pub fn open_scanner_count(&self) -> usize {
        self.scanners.lock().len()
    }

    /// Number of cells stored in `table`
    pub fn cell_count(&self, table: &str) -> Result<usize> {
        Ok(self.table(table)?.cell_count())
    }

    fn table(&self, name: &str) -> Result<Arc<TableData>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Status::table_not_found(name))
    }

    fn serving_table(&self, name: &str) -> Result<Arc<TableData>> {
        let table = self.table(name)?;
        table.ensure_enabled()?;
        Ok(table)
    }

    fn compile(filter: Option<&crate::filter::Filter>) -> Result<Option<CompiledFilter>> {
        filter.map(CompiledFilter::compile).transpose()
    }

    /// Fetches the next batch of `scanner`; the caller has already taken it
    /// out of the registry.
    fn fetch(&self, scanner: &mut OpenScanner, max_rows: usize) -> Result<ScanBatch> {
        let registered = self.tables.read().get(&scanner.table_name).cloned();
        match registered {
            Some(table) if Arc::ptr_eq(&table, &scanner.table) => {}
            _ => return Err(Status::table_not_found(&scanner.table_name)),
        }
        scanner.table.ensure_enabled()?;

        let lower = match (&scanner.resume_after, &scanner.start) {
            (Some(last), _) => Bound::Excluded(last),
            (None, Some(start)) => Bound::Included(start),
            (None, None) => Bound::Unbounded,
        };
        let (rows, last) = scanner.table.scan_rows(
            lower,
            scanner.stop.as_ref(),
            &scanner.selection,
            scanner.filter.as_ref(),
            max_rows,
        );

        let exhausted = last.is_none();
        scanner.resume_after = last;
        Ok(ScanBatch { rows, exhausted })
    }
}

impl StoreCluster for LocalCluster {
    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(descriptor.name()) {
            return Err(Status::schema_error(format!(
                "table '{}' already exists",
                descriptor.name()
            )));
        }
        tables.insert(
            descriptor.name().to_string(),
            Arc::new(TableData::new(descriptor.clone())),
        );
        debug!(table = descriptor.name(), families = ?descriptor.family_names(), "created table");
        Ok(())
    }

    fn delete_table(&self, table: &str) -> Result<()> {
        let mut tables = self.tables.write();
        let data = tables
            .get(table)
            .ok_or_else(|| Status::table_not_found(table))?;
        if data.is_enabled() {
            return Err(Status::schema_error(format!(
                "table '{table}' must be disabled before it is deleted"
            )));
        }
        tables.remove(table);
        debug!(table, "deleted table");
        Ok(())
    }

    fn enable_table(&self, table: &str) -> Result<()> {
        let data = self.table(table)?;
        if data.is_enabled() {
            return Err(Status::schema_error(format!(
                "table '{table}' is already enabled"
            )));
        }
        data.set_enabled(true);
        Ok(())
    }

    fn disable_table(&self, table: &str) -> Result<()> {
        let data = self.table(table)?;
        if !data.is_enabled() {
            return Err(Status::schema_error(format!(
                "table '{table}' is already disabled"
            )));
        }
        data.set_enabled(false);
        Ok(())
    }

    fn is_table_enabled(&self, table: &str) -> Result<bool> {
        Ok(self.table(table)?.is_enabled())
    }

    fn describe_table(&self, table: &str) -> Result<TableDescriptor> {
        Ok(self.table(table)?.descriptor())
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.read().keys().cloned().collect())
    }

    fn add_column_family(&self, table: &str, family: &ColumnFamilyDescriptor) -> Result<()> {
        self.table(table)?.add_family(family.clone())
    }

    fn delete_column_family(&self, table: &str, family: &str) -> Result<()> {
        let purged = self.table(table)?.drop_family(family)?;
        debug!(table, family, purged, "deleted column family");
        Ok(())
    }

    fn mutate(&self, table: &str, mutation: &Mutation) -> Result<()> {
        self.serving_table(table)?.apply(mutation)
    }

    fn get(&self, table: &str, get: &Get) -> Result<Option<Row>> {
        let data = self.serving_table(table)?;
        data.validate_selection(get.selection())?;
        let filter = Self::compile(get.filter())?;
        Ok(data.read_row(get.row(), get.selection(), filter.as_ref()))
    }

    fn open_scanner(&self, table: &str, scan: &Scan) -> Result<ScannerId> {
        let data = self.serving_table(table)?;
        data.validate_selection(scan.selection())?;
        let filter = Self::compile(scan.filter())?;

        let id = self.next_scanner_id.fetch_add(1, Ordering::Relaxed);
        self.scanners.lock().insert(
            id,
            OpenScanner {
                table: data,
                table_name: table.to_string(),
                resume_after: None,
                start: scan.start_row().cloned(),
                stop: scan.stop_row().cloned(),
                selection: scan.selection().clone(),
                filter,
            },
        );
        debug!(table, scanner = id, "opened scanner");
        Ok(id)
    }

    fn next_batch(&self, scanner: ScannerId, max_rows: usize) -> Result<ScanBatch> {
        if max_rows == 0 {
            return Err(Status::invalid_argument("scan batch size must be positive"));
        }

        // Taken out while scanning so other scanners are not blocked. A failed
        // or exhausted scanner is not put back.
        let mut state = self
            .scanners
            .lock()
            .remove(&scanner)
            .ok_or_else(|| Status::invalid_argument(format!("unknown scanner {scanner}")))?;

        let batch = self.fetch(&mut state, max_rows)?;
        if batch.exhausted {
            debug!(scanner, "scanner exhausted and released");
        } else {
            self.scanners.lock().insert(scanner, state);
        }
        Ok(batch)
    }

    fn close_scanner(&self, scanner: ScannerId) -> Result<()> {
        if self.scanners.lock().remove(&scanner).is_some() {
            debug!(scanner, "closed scanner");
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.scanners.lock().clear();
        if let Some(target) = &self.snapshot {
            self.save_snapshot(&target.path, target.compression)?;
        }
        Ok(())
    }
}
