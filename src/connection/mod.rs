/// Connection lifecycle and per-operation sub-handles
///
/// ```text
/// ConnectionManager ──lazy──→ Connection (Arc, shared by all threads)
///                                 ├─→ TableHandle  (one table, one operation)
///                                 └─→ AdminHandle  (schema, one operation)
/// ```
///
/// Sub-handles are RAII guards: acquisition and release are counted in
/// [`ClientStatistics`], and every exit path of an operation drops its
/// handle.
pub mod connector;
pub mod handle;
pub mod manager;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

pub use connector::{Connector, LocalConnector};
pub use handle::{AdminHandle, TableHandle};
pub use manager::ConnectionManager;

use crate::{
    cluster::StoreCluster,
    options::ConnectionConfig,
    statistics::ClientStatistics,
    util::{Result, Status},
};

/// Shared handle to a store cluster
///
/// Cheap to clone; all clones refer to the same underlying link. Once closed,
/// every clone refuses to issue new sub-handles.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    cluster: Arc<dyn StoreCluster>,
    config: ConnectionConfig,
    statistics: Arc<ClientStatistics>,
    closed: AtomicBool,
}

impl Connection {
    pub(crate) fn new(
        cluster: Arc<dyn StoreCluster>,
        config: ConnectionConfig,
        statistics: Arc<ClientStatistics>,
    ) -> Self {
        Connection {
            inner: Arc::new(ConnectionInner {
                cluster,
                config,
                statistics,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Acquires a sub-handle bound to `table`.
    ///
    /// The table is not looked up here; a missing table is reported by the
    /// operation performed through the handle.
    pub fn table(&self, table: &str) -> Result<TableHandle> {
        self.ensure_open()?;
        Ok(TableHandle::new(
            self.inner.cluster.clone(),
            self.inner.statistics.clone(),
            table,
            self.inner.config.scanner_caching,
        ))
    }

    pub fn admin(&self) -> Result<AdminHandle> {
        self.ensure_open()?;
        Ok(AdminHandle::new(
            self.inner.cluster.clone(),
            self.inner.statistics.clone(),
        ))
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn statistics(&self) -> &ClientStatistics {
        &self.inner.statistics
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Closes the link and shuts the cluster down. Only the first call does
    /// anything.
    pub(crate) fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.cluster.shutdown()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Status::connection_error("connection is closed"))
        } else {
            Ok(())
        }
    }
}
