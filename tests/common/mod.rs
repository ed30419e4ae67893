#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use widecolumn::{
    ColumnFamilyDescriptor, ConnectionConfig, ConnectionManager, LocalCluster, LocalConnector,
    Mutation, Mutator, Reader, Result, Scan, SchemaAdmin, Status, StoreCluster, TableDescriptor,
    cluster::{ScanBatch, ScannerId},
    reader::Get,
    row::Row,
};

/// Everything a test needs to talk to one in-process cluster
pub struct Fixture {
    pub cluster: Arc<LocalCluster>,
    pub manager: Arc<ConnectionManager>,
    pub admin: SchemaAdmin,
    pub mutator: Mutator,
    pub reader: Reader,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ConnectionConfig::default())
    }

    pub fn with_config(config: ConnectionConfig) -> Self {
        let cluster = Arc::new(LocalCluster::new());
        let manager = Arc::new(ConnectionManager::new(
            config,
            LocalConnector::shared(cluster.clone()),
        ));
        Fixture::from_manager(cluster, manager)
    }

    pub fn from_manager(cluster: Arc<LocalCluster>, manager: Arc<ConnectionManager>) -> Self {
        Fixture {
            cluster,
            admin: SchemaAdmin::new(manager.clone()),
            mutator: Mutator::new(manager.clone()),
            reader: Reader::new(manager.clone()),
            manager,
        }
    }

    /// Fixture with the `student` table (families `grade` and `info`)
    pub fn student() -> Self {
        let fixture = Fixture::new();
        fixture
            .admin
            .create_table("student", ["grade", "info"])
            .unwrap();
        fixture
    }

    pub fn active_handles(&self) -> u64 {
        self.manager.statistics().active_handles()
    }

    /// Row keys of a scan, as strings
    pub fn scan_keys(&self, table: &str, scan: Scan) -> Vec<String> {
        self.reader
            .scan(table, Some(scan))
            .unwrap()
            .map(|row| row.unwrap().key().to_string())
            .collect()
    }
}

/// Faults [`FlakyCluster`] injects
#[derive(Default)]
pub struct Faults {
    /// Fail every mutation with an I/O error
    pub mutations: AtomicBool,
    /// Fail `disable_table` with an I/O error
    pub disable: AtomicBool,
    /// Another client disables the table just before this one's disable lands
    pub disable_race: AtomicBool,
    /// Fail `delete_table` with an I/O error
    pub delete: AtomicBool,
    /// Fail `next_batch` once this many batches have been served
    pub batches_before_failure: AtomicUsize,
    pub fail_batches: AtomicBool,
    /// Return the rows of each batch in reverse order
    pub reorder_batches: AtomicBool,
}

/// Store cluster wrapper that injects transport failures
pub struct FlakyCluster {
    inner: Arc<LocalCluster>,
    pub faults: Faults,
    batches_served: AtomicUsize,
}

impl FlakyCluster {
    pub fn new(inner: Arc<LocalCluster>) -> Self {
        FlakyCluster {
            inner,
            faults: Faults::default(),
            batches_served: AtomicUsize::new(0),
        }
    }

    /// Manager whose connections go through `flaky`
    pub fn manager(flaky: Arc<FlakyCluster>) -> Arc<ConnectionManager> {
        let connector = move |_: &ConnectionConfig| -> Result<Arc<dyn StoreCluster>> {
            Ok(flaky.clone())
        };
        Arc::new(ConnectionManager::new(ConnectionConfig::default(), connector))
    }

    fn io_error(op: &str) -> Status {
        Status::io_error(format!("injected transport failure during {op}"))
    }
}

impl StoreCluster for FlakyCluster {
    fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        self.inner.create_table(descriptor)
    }

    fn delete_table(&self, table: &str) -> Result<()> {
        if self.faults.delete.load(Ordering::SeqCst) {
            return Err(Self::io_error("delete_table"));
        }
        self.inner.delete_table(table)
    }

    fn enable_table(&self, table: &str) -> Result<()> {
        self.inner.enable_table(table)
    }

    fn disable_table(&self, table: &str) -> Result<()> {
        if self.faults.disable.load(Ordering::SeqCst) {
            return Err(Self::io_error("disable_table"));
        }
        if self.faults.disable_race.load(Ordering::SeqCst) {
            self.inner.disable_table(table)?;
        }
        self.inner.disable_table(table)
    }

    fn is_table_enabled(&self, table: &str) -> Result<bool> {
        self.inner.is_table_enabled(table)
    }

    fn describe_table(&self, table: &str) -> Result<TableDescriptor> {
        self.inner.describe_table(table)
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        self.inner.list_tables()
    }

    fn add_column_family(&self, table: &str, family: &ColumnFamilyDescriptor) -> Result<()> {
        self.inner.add_column_family(table, family)
    }

    fn delete_column_family(&self, table: &str, family: &str) -> Result<()> {
        self.inner.delete_column_family(table, family)
    }

    fn mutate(&self, table: &str, mutation: &Mutation) -> Result<()> {
        if self.faults.mutations.load(Ordering::SeqCst) {
            return Err(Self::io_error("mutate"));
        }
        self.inner.mutate(table, mutation)
    }

    fn get(&self, table: &str, get: &Get) -> Result<Option<Row>> {
        self.inner.get(table, get)
    }

    fn open_scanner(&self, table: &str, scan: &Scan) -> Result<ScannerId> {
        self.inner.open_scanner(table, scan)
    }

    fn next_batch(&self, scanner: ScannerId, max_rows: usize) -> Result<ScanBatch> {
        let served = self.batches_served.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_batches.load(Ordering::SeqCst)
            && served >= self.faults.batches_before_failure.load(Ordering::SeqCst)
        {
            return Err(Self::io_error("next_batch"));
        }

        let mut batch = self.inner.next_batch(scanner, max_rows)?;
        if self.faults.reorder_batches.load(Ordering::SeqCst) {
            batch.rows.reverse();
        }
        Ok(batch)
    }

    fn close_scanner(&self, scanner: ScannerId) -> Result<()> {
        self.inner.close_scanner(scanner)
    }

    fn shutdown(&self) -> Result<()> {
        self.inner.shutdown()
    }
}
