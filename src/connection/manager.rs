use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{
    connection::{AdminHandle, Connection, Connector, LocalConnector, TableHandle},
    options::ConnectionConfig,
    statistics::ClientStatistics,
    util::{Result, Status},
};

/// Owner of the process-wide connection
///
/// The connection is established lazily on first use and shared by every
/// caller. Initialization failures are not cached: the next call tries
/// again. After [`shutdown`](ConnectionManager::shutdown), sub-handle
/// acquisition fails until [`connection`](ConnectionManager::connection) is
/// called again.
///
/// # Example
///
/// ```no_run
/// use widecolumn::{ConnectionConfig, ConnectionManager};
///
/// let manager = ConnectionManager::local(ConnectionConfig::default());
/// let admin = manager.admin_handle().unwrap();
/// assert!(admin.list_tables().unwrap().is_empty());
/// drop(admin);
/// manager.shutdown().unwrap();
/// ```
pub struct ConnectionManager {
    config: ConnectionConfig,
    connector: Box<dyn Connector>,
    connection: RwLock<Option<Connection>>,
    statistics: Arc<ClientStatistics>,
    shut_down: AtomicBool,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig, connector: impl Connector + 'static) -> Self {
        ConnectionManager {
            config,
            connector: Box::new(connector),
            connection: RwLock::new(None),
            statistics: Arc::new(ClientStatistics::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Manager for an in-process [`LocalCluster`](crate::LocalCluster)
    pub fn local(config: ConnectionConfig) -> Self {
        Self::new(config, LocalConnector::new())
    }

    /// The shared connection, establishing it if needed.
    ///
    /// Concurrent first callers race for the write lock; exactly one of them
    /// connects and the others reuse its connection.
    pub fn connection(&self) -> Result<Connection> {
        if let Some(conn) = self.connection.read().as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write();
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        self.config.validate()?;
        let cluster = self.connector.connect(&self.config).inspect_err(|e| {
            self.statistics.record_error();
            warn!(error = %e, "failed to connect to store cluster");
        })?;

        let conn = Connection::new(cluster, self.config.clone(), self.statistics.clone());
        *slot = Some(conn.clone());
        self.shut_down.store(false, Ordering::Release);
        info!(quorum = ?self.config.quorum, port = self.config.client_port, "connected to store cluster");
        Ok(conn)
    }

    /// Sub-handle bound to `table`, released when dropped
    pub fn table_handle(&self, table: &str) -> Result<TableHandle> {
        self.ensure_not_shut_down()?;
        self.connection()?.table(table)
    }

    /// Sub-handle for schema operations, released when dropped
    pub fn admin_handle(&self) -> Result<AdminHandle> {
        self.ensure_not_shut_down()?;
        self.connection()?.admin()
    }

    /// Closes the connection. Calling it again, or before any connection
    /// was made, does nothing.
    pub fn shutdown(&self) -> Result<()> {
        let conn = {
            let mut slot = self.connection.write();
            let Some(conn) = slot.take() else {
                return Ok(());
            };
            self.shut_down.store(true, Ordering::Release);
            conn
        };
        conn.close()?;
        info!(
            active_handles = self.statistics.active_handles(),
            "store cluster connection closed"
        );
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.read().is_some()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Statistics of every connection this manager has made
    pub fn statistics(&self) -> &Arc<ClientStatistics> {
        &self.statistics
    }

    fn ensure_not_shut_down(&self) -> Result<()> {
        if self.shut_down.load(Ordering::Acquire) {
            Err(Status::connection_error("connection manager has been shut down"))
        } else {
            Ok(())
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "store cluster shutdown failed");
        }
    }
}
