use std::sync::Arc;

use tracing::debug;

use crate::{
    cluster::{LocalCluster, StoreCluster},
    options::ConnectionConfig,
    util::{Result, Status},
};

/// Establishes the link to a store cluster
///
/// Any `Fn(&ConnectionConfig) -> Result<Arc<dyn StoreCluster>>` closure is a
/// connector, which makes it easy to wrap or replace the cluster in tests.
pub trait Connector: Send + Sync {
    /// Fails with a connection error if the cluster cannot be reached
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StoreCluster>>;
}

impl<F> Connector for F
where
    F: Fn(&ConnectionConfig) -> Result<Arc<dyn StoreCluster>> + Send + Sync,
{
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StoreCluster>> {
        self(config)
    }
}

/// Quorum hosts served by the in-process cluster
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "local"];

/// Connector for [`LocalCluster`]
///
/// Only local quorum hosts are reachable. [`LocalConnector::new`] opens a
/// fresh cluster on every connect, loading `snapshot_path` when the config
/// names one; [`LocalConnector::shared`] hands out the same cluster every
/// time.
#[derive(Default)]
pub struct LocalConnector {
    shared: Option<Arc<LocalCluster>>,
}

impl LocalConnector {
    pub fn new() -> Self {
        LocalConnector::default()
    }

    pub fn shared(cluster: Arc<LocalCluster>) -> Self {
        LocalConnector {
            shared: Some(cluster),
        }
    }

    fn check_quorum(config: &ConnectionConfig) -> Result<()> {
        match config
            .quorum
            .iter()
            .find(|host| !LOCAL_HOSTS.contains(&host.trim()))
        {
            Some(host) => Err(Status::connection_error(format!(
                "quorum host '{host}:{}' is not reachable",
                config.client_port
            ))),
            None => Ok(()),
        }
    }
}

impl Connector for LocalConnector {
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StoreCluster>> {
        Self::check_quorum(config)?;

        if let Some(cluster) = &self.shared {
            return Ok(cluster.clone());
        }

        let cluster = match &config.snapshot_path {
            Some(path) => {
                debug!(path = %path.display(), "opening local cluster from snapshot");
                LocalCluster::open(path, config.snapshot_compression).map_err(|e| {
                    Status::connection_error(format!(
                        "failed to open local cluster at {}: {e}",
                        path.display()
                    ))
                })?
            }
            None => LocalCluster::new(),
        };
        Ok(Arc::new(cluster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_quorum_is_unreachable() {
        let config = ConnectionConfig {
            quorum: vec!["localhost".to_string(), "zk1.example.com".to_string()],
            ..Default::default()
        };
        let err = LocalConnector::new().connect(&config).err().unwrap();
        assert!(err.is_connection_error());
        assert!(err.message().unwrap().contains("zk1.example.com:2181"));
    }

    #[test]
    fn test_shared_returns_same_cluster() {
        let cluster = Arc::new(LocalCluster::new());
        let connector = LocalConnector::shared(cluster.clone());
        let config = ConnectionConfig::default();

        let a = connector.connect(&config).unwrap();
        let b = connector.connect(&config).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_corrupt_snapshot_is_connection_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"definitely not a snapshot file").unwrap();

        let config = ConnectionConfig {
            snapshot_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let err = LocalConnector::new().connect(&config).err().unwrap();
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_closure_connector() {
        let connector =
            |_: &ConnectionConfig| -> Result<Arc<dyn StoreCluster>> { Err(Status::connection_error("down")) };
        assert!(
            connector
                .connect(&ConnectionConfig::default())
                .err()
                .unwrap()
                .is_connection_error()
        );
    }
}
