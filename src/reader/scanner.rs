use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::{
    cluster::ScannerId,
    connection::TableHandle,
    options::ReadOptions,
    reader::Scan,
    row::Row,
    util::{Result, Slice, Status},
};

/// Lifecycle of a [`Scanner`]
///
/// ```text
/// Created ──open──→ Open ──┬─→ Exhausted   (no rows left)
///                          ├─→ Closed      (close() or drop)
///                          └─→ Errored     (fetch failed or cancelled)
/// ```
///
/// Every terminal state means the cluster-side scanner and the table handle
/// have been released. There is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Created,
    Open,
    Exhausted,
    Closed,
    Errored,
}

impl ScannerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScannerState::Exhausted | ScannerState::Closed | ScannerState::Errored
        )
    }
}

/// Lazy, forward-only sequence of rows
///
/// Rows are fetched from the cluster in batches as the scanner is advanced.
/// Row keys are strictly increasing and lie inside the scan range; a batch
/// that violates this fails the scanner with a corruption error. A write
/// made to the scanned range while the scan runs may or may not appear.
///
/// Dropping an open scanner closes it. Use [`Scanner::close`] to observe the
/// outcome of the close.
pub struct Scanner {
    handle: Option<TableHandle>,
    scan: Scan,
    options: ReadOptions,
    batch_size: usize,
    /// Set while the cluster holds state for this scanner
    scanner_id: Option<ScannerId>,
    state: ScannerState,
    buffer: VecDeque<Row>,
    last_key: Option<Slice>,
    cluster_exhausted: bool,
    rows_returned: u64,
    batches_fetched: u64,
}

impl Scanner {
    pub(crate) fn open(handle: TableHandle, scan: Scan, options: ReadOptions) -> Result<Self> {
        let batch_size = scan.batch_size().unwrap_or(handle.scanner_caching());
        let mut scanner = Scanner {
            handle: Some(handle),
            scan,
            options,
            batch_size,
            scanner_id: None,
            state: ScannerState::Created,
            buffer: VecDeque::new(),
            last_key: None,
            cluster_exhausted: false,
            rows_returned: 0,
            batches_fetched: 0,
        };
        scanner.open_cluster_scanner()?;
        Ok(scanner)
    }

    fn open_cluster_scanner(&mut self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Status::invalid_argument("scan batch size must be positive"));
        }
        self.options.check_cancelled()?;

        let handle = self.live_handle()?;
        let id = handle.open_scanner(&self.scan)?;
        handle.statistics().record_scan_opened();
        debug!(
            table = handle.table(),
            scanner = id,
            batch_size = self.batch_size,
            "scanner opened"
        );

        self.scanner_id = Some(id);
        self.state = ScannerState::Open;
        Ok(())
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Rows handed to the caller so far
    pub fn rows_returned(&self) -> u64 {
        self.rows_returned
    }

    /// Round trips made to the cluster so far
    pub fn batches_fetched(&self) -> u64 {
        self.batches_fetched
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Next row, or `Ok(None)` once the scanner is in a terminal state
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if self.state != ScannerState::Open {
            return Ok(None);
        }

        loop {
            if let Some(row) = self.buffer.pop_front() {
                self.rows_returned += 1;
                return Ok(Some(row));
            }

            if self.cluster_exhausted {
                self.state = ScannerState::Exhausted;
                self.handle = None;
                debug!(
                    rows = self.rows_returned,
                    batches = self.batches_fetched,
                    "scanner exhausted"
                );
                return Ok(None);
            }

            if let Err(e) = self.fetch_batch() {
                self.fail();
                return Err(e);
            }
        }
    }

    fn fetch_batch(&mut self) -> Result<()> {
        self.options.check_cancelled()?;
        let id = self
            .scanner_id
            .ok_or_else(|| Status::invalid_argument("scanner is not open"))?;

        let handle = self.live_handle()?;
        let batch = handle.next_batch(id, self.batch_size)?;
        handle.statistics().record_scan_batch(batch.rows.len() as u64);
        self.batches_fetched += 1;

        if batch.exhausted {
            self.scanner_id = None;
            self.cluster_exhausted = true;
        }

        for row in batch.rows {
            if self.last_key.as_ref().is_some_and(|last| row.key() <= last) {
                return Err(Status::corruption(format!(
                    "scan returned row '{}' out of order",
                    row.key()
                )));
            }
            if !self.scan.contains(row.key()) {
                return Err(Status::corruption(format!(
                    "scan returned row '{}' outside of the requested range",
                    row.key()
                )));
            }
            self.last_key = Some(row.key().clone());
            self.buffer.push_back(row);
        }
        Ok(())
    }

    /// Releases the cluster-side scanner after a failure. The failure itself
    /// is what the caller sees; a close error is only logged.
    fn fail(&mut self) {
        self.state = ScannerState::Errored;
        self.buffer.clear();
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release scanner after error");
        }
        self.handle = None;
    }

    /// Closes the scanner, releasing cluster-side state and the table
    /// handle. Closing a scanner in a terminal state does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.state = ScannerState::Closed;
        self.buffer.clear();
        let result = self.release();
        self.handle = None;
        debug!(rows = self.rows_returned, "scanner closed");
        result
    }

    fn release(&mut self) -> Result<()> {
        match (self.scanner_id.take(), &self.handle) {
            (Some(id), Some(handle)) => handle.close_scanner(id),
            _ => Ok(()),
        }
    }

    fn live_handle(&self) -> Result<&TableHandle> {
        self.handle
            .as_ref()
            .ok_or_else(|| Status::invalid_argument("scanner handle already released"))
    }
}

impl Iterator for Scanner {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close scanner on drop");
        }
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("state", &self.state)
            .field("scanner_id", &self.scanner_id)
            .field("batch_size", &self.batch_size)
            .field("rows_returned", &self.rows_returned)
            .field("batches_fetched", &self.batches_fetched)
            .finish()
    }
}
