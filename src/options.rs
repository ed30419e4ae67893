use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    cluster::CompressionType,
    util::{CancelToken, Result, Status},
};

/// Default number of rows a scanner fetches per round trip
pub const DEFAULT_SCANNER_CACHING: usize = 1000;

/// Client configuration used to reach the store cluster.
///
/// Can be loaded from a JSON file; missing fields take their defaults:
///
/// ```json
/// { "quorum": ["localhost"], "client_port": 2181, "scanner_caching": 500 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Coordination quorum hosts
    pub quorum: Vec<String>,
    pub client_port: u16,
    /// Rows fetched per scan round trip unless the scan sets its own
    pub scanner_caching: usize,
    /// Snapshot file the local cluster loads on connect and saves on shutdown
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_compression: CompressionType,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            quorum: vec!["localhost".to_string()],
            client_port: 2181,
            scanner_caching: DEFAULT_SCANNER_CACHING,
            snapshot_path: None,
            snapshot_compression: CompressionType::Snappy,
        }
    }
}

impl ConnectionConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Status::connection_error(format!(
                "failed to read client config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: ConnectionConfig = serde_json::from_str(content)
            .map_err(|e| Status::connection_error(format!("invalid client config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// A misconfigured client is reported as a connection error
    pub fn validate(&self) -> Result<()> {
        if self.quorum.is_empty() || self.quorum.iter().any(|h| h.trim().is_empty()) {
            return Err(Status::connection_error("quorum must list at least one host"));
        }
        if self.client_port == 0 {
            return Err(Status::connection_error("client_port must not be 0"));
        }
        if self.scanner_caching == 0 {
            return Err(Status::connection_error("scanner_caching must be positive"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    pub cancel: Option<CancelToken>,
}

impl ReadOptions {
    pub fn with_cancel(cancel: CancelToken) -> Self {
        ReadOptions {
            cancel: Some(cancel),
        }
    }

    #[inline]
    pub(crate) fn check_cancelled(&self) -> Result<()> {
        self.cancel.as_ref().map_or(Ok(()), CancelToken::check)
    }
}

#[derive(Clone, Debug, Default)]
pub struct WriteOptions {
    pub cancel: Option<CancelToken>,
}

impl WriteOptions {
    pub fn with_cancel(cancel: CancelToken) -> Self {
        WriteOptions {
            cancel: Some(cancel),
        }
    }

    #[inline]
    pub(crate) fn check_cancelled(&self) -> Result<()> {
        self.cancel.as_ref().map_or(Ok(()), CancelToken::check)
    }
}
