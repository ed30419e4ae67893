use std::sync::atomic::{AtomicU64, Ordering};

/// Client-side statistics
///
/// Thread-safe counters shared by every operation of one connection.
/// Uses atomic counters for lock-free updates.
#[derive(Debug, Default)]
pub struct ClientStatistics {
    // Sub-handles
    pub handles_acquired: AtomicU64,
    pub handles_released: AtomicU64,

    // Mutations
    pub num_puts: AtomicU64,
    pub cells_written: AtomicU64,
    pub bytes_written: AtomicU64,
    pub num_deletes: AtomicU64,
    pub num_batches: AtomicU64,

    // Reads
    pub num_gets: AtomicU64,
    pub get_misses: AtomicU64,
    pub scans_opened: AtomicU64,
    pub scan_batches: AtomicU64,
    pub rows_scanned: AtomicU64,

    // Schema operations
    pub schema_ops: AtomicU64,

    // Error counts
    pub num_errors: AtomicU64,
}

impl ClientStatistics {
    pub fn new() -> Self {
        ClientStatistics::default()
    }

    // Handle tracking
    #[inline]
    pub fn record_handle_acquired(&self) {
        self.handles_acquired.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_handle_released(&self) {
        self.handles_released.fetch_add(1, Ordering::Relaxed);
    }

    // Mutation tracking
    #[inline]
    pub fn record_put(&self, cells: u64, bytes: u64) {
        self.num_puts.fetch_add(1, Ordering::Relaxed);
        self.cells_written.fetch_add(cells, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delete(&self) {
        self.num_deletes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_batch(&self) {
        self.num_batches.fetch_add(1, Ordering::Relaxed);
    }

    // Read tracking
    #[inline]
    pub fn record_get(&self, hit: bool) {
        self.num_gets.fetch_add(1, Ordering::Relaxed);
        if !hit {
            self.get_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_scan_opened(&self) {
        self.scans_opened.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_scan_batch(&self, rows: u64) {
        self.scan_batches.fetch_add(1, Ordering::Relaxed);
        self.rows_scanned.fetch_add(rows, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_schema_op(&self) {
        self.schema_ops.fetch_add(1, Ordering::Relaxed);
    }

    // Error tracking
    #[inline]
    pub fn record_error(&self) {
        self.num_errors.fetch_add(1, Ordering::Relaxed);
    }

    // Getters (snapshot values)
    pub fn handles_acquired(&self) -> u64 {
        self.handles_acquired.load(Ordering::Relaxed)
    }

    pub fn handles_released(&self) -> u64 {
        self.handles_released.load(Ordering::Relaxed)
    }

    /// Sub-handles acquired but not yet released
    pub fn active_handles(&self) -> u64 {
        // Released is read first so a concurrent acquire/release pair never
        // makes the difference negative.
        let released = self.handles_released();
        self.handles_acquired().saturating_sub(released)
    }

    pub fn num_puts(&self) -> u64 {
        self.num_puts.load(Ordering::Relaxed)
    }

    pub fn cells_written(&self) -> u64 {
        self.cells_written.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn num_deletes(&self) -> u64 {
        self.num_deletes.load(Ordering::Relaxed)
    }

    pub fn num_batches(&self) -> u64 {
        self.num_batches.load(Ordering::Relaxed)
    }

    pub fn num_gets(&self) -> u64 {
        self.num_gets.load(Ordering::Relaxed)
    }

    pub fn get_misses(&self) -> u64 {
        self.get_misses.load(Ordering::Relaxed)
    }

    pub fn scans_opened(&self) -> u64 {
        self.scans_opened.load(Ordering::Relaxed)
    }

    pub fn scan_batches(&self) -> u64 {
        self.scan_batches.load(Ordering::Relaxed)
    }

    pub fn rows_scanned(&self) -> u64 {
        self.rows_scanned.load(Ordering::Relaxed)
    }

    pub fn schema_ops(&self) -> u64 {
        self.schema_ops.load(Ordering::Relaxed)
    }

    pub fn num_errors(&self) -> u64 {
        self.num_errors.load(Ordering::Relaxed)
    }

    pub fn get_hit_rate(&self) -> f64 {
        let gets = self.num_gets() as f64;
        let hits = gets - self.get_misses() as f64;
        if gets > 0.0 { hits / gets } else { 0.0 }
    }

    pub fn avg_rows_per_batch(&self) -> f64 {
        let batches = self.scan_batches() as f64;
        if batches > 0.0 {
            self.rows_scanned() as f64 / batches
        } else {
            0.0
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&self) {
        self.handles_acquired.store(0, Ordering::Relaxed);
        self.handles_released.store(0, Ordering::Relaxed);
        self.num_puts.store(0, Ordering::Relaxed);
        self.cells_written.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.num_deletes.store(0, Ordering::Relaxed);
        self.num_batches.store(0, Ordering::Relaxed);
        self.num_gets.store(0, Ordering::Relaxed);
        self.get_misses.store(0, Ordering::Relaxed);
        self.scans_opened.store(0, Ordering::Relaxed);
        self.scan_batches.store(0, Ordering::Relaxed);
        self.rows_scanned.store(0, Ordering::Relaxed);
        self.schema_ops.store(0, Ordering::Relaxed);
        self.num_errors.store(0, Ordering::Relaxed);
    }

    /// Get a formatted statistics report
    pub fn report(&self) -> String {
        format!(
            "Client Statistics:\n\
            \n\
            Handles:\n\
            - Acquired:      {}\n\
            - Released:      {}\n\
            - Active:        {}\n\
            \n\
            Mutations:\n\
            - Puts:          {}\n\
            - Cells written: {}\n\
            - Bytes written: {} ({:.2} MB)\n\
            - Deletes:       {}\n\
            - Batches:       {}\n\
            \n\
            Reads:\n\
            - Gets:          {}\n\
            - Misses:        {}\n\
            - Hit rate:      {:.2}%\n\
            - Scans opened:  {}\n\
            - Scan batches:  {}\n\
            - Rows scanned:  {}\n\
            - Rows/batch:    {:.1}\n\
            \n\
            Schema ops:      {}\n\
            Errors:          {}",
            self.handles_acquired(),
            self.handles_released(),
            self.active_handles(),
            self.num_puts(),
            self.cells_written(),
            self.bytes_written(),
            self.bytes_written() as f64 / 1024.0 / 1024.0,
            self.num_deletes(),
            self.num_batches(),
            self.num_gets(),
            self.get_misses(),
            self.get_hit_rate() * 100.0,
            self.scans_opened(),
            self.scan_batches(),
            self.rows_scanned(),
            self.avg_rows_per_batch(),
            self.schema_ops(),
            self.num_errors(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_basic() {
        let stats = ClientStatistics::new();

        stats.record_put(2, 100);
        stats.record_put(1, 200);
        stats.record_delete();

        assert_eq!(stats.num_puts(), 2);
        assert_eq!(stats.cells_written(), 3);
        assert_eq!(stats.bytes_written(), 300);
        assert_eq!(stats.num_deletes(), 1);
    }

    #[test]
    fn test_active_handles() {
        let stats = ClientStatistics::new();

        stats.record_handle_acquired();
        stats.record_handle_acquired();
        assert_eq!(stats.active_handles(), 2);

        stats.record_handle_released();
        stats.record_handle_released();
        assert_eq!(stats.active_handles(), 0);
        assert_eq!(stats.handles_acquired(), 2);
    }

    #[test]
    fn test_get_hit_rate() {
        let stats = ClientStatistics::new();

        stats.record_get(true);
        stats.record_get(true);
        stats.record_get(true);
        stats.record_get(false);

        assert_eq!(stats.get_misses(), 1);
        assert_eq!(stats.get_hit_rate(), 0.75);
    }

    #[test]
    fn test_scan_batches() {
        let stats = ClientStatistics::new();

        stats.record_scan_opened();
        stats.record_scan_batch(10);
        stats.record_scan_batch(4);
        stats.record_scan_batch(0);

        assert_eq!(stats.scans_opened(), 1);
        assert_eq!(stats.scan_batches(), 3);
        assert_eq!(stats.rows_scanned(), 14);
    }

    #[test]
    fn test_statistics_reset() {
        let stats = ClientStatistics::new();

        stats.record_put(1, 100);
        stats.record_get(false);
        stats.record_error();

        stats.reset();

        assert_eq!(stats.num_puts(), 0);
        assert_eq!(stats.num_gets(), 0);
        assert_eq!(stats.get_misses(), 0);
        assert_eq!(stats.num_errors(), 0);
    }

    #[test]
    fn test_statistics_report() {
        let stats = ClientStatistics::new();

        stats.record_put(1, 1024);
        stats.record_get(true);
        stats.record_get(false);

        let report = stats.report();
        assert!(report.contains("Puts:          1"));
        assert!(report.contains("Gets:          2"));
        assert!(report.contains("Hit rate:      50.00%"));
    }
}
