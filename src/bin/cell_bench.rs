use std::{
    io::{self, Write},
    sync::Arc,
    time::{Duration, Instant},
};

use tempfile::TempDir;
use tracing::info;
use tracing_subscriber::EnvFilter;
use widecolumn::{
    CompressionType, ConnectionConfig, ConnectionManager, LocalCluster, LocalConnector, Mutator,
    Put, Reader, Scan, SchemaAdmin,
};

const TABLE: &str = "bench";
const FAMILY: &str = "cf";

/// Benchmark configuration
struct BenchConfig {
    num_rows: usize,
    columns_per_row: usize,
    value_size: usize,
    batch_size: usize,
    scan_batch_size: usize,
    compression: CompressionType,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            num_rows: 50_000,
            columns_per_row: 4,
            value_size: 100,
            batch_size: 1000,
            scan_batch_size: 1000,
            compression: CompressionType::Snappy,
        }
    }
}

/// Statistics for a benchmark run
struct BenchStats {
    duration: Duration,
    operations: usize,
    bytes_written: usize,
    latencies: Vec<Duration>,
}

impl BenchStats {
    fn new() -> Self {
        BenchStats {
            duration: Duration::ZERO,
            operations: 0,
            bytes_written: 0,
            latencies: Vec::new(),
        }
    }

    fn ops_per_sec(&self) -> f64 {
        self.operations as f64 / self.duration.as_secs_f64()
    }

    fn mb_per_sec(&self) -> f64 {
        (self.bytes_written as f64 / (1024.0 * 1024.0)) / self.duration.as_secs_f64()
    }

    fn avg_latency_us(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        let sum: u128 = self.latencies.iter().map(|d| d.as_micros()).sum();
        sum as f64 / self.latencies.len() as f64
    }

    fn percentile_latency_us(&mut self, percentile: f64) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.latencies.sort();
        let idx = ((self.latencies.len() as f64 * percentile / 100.0) as usize)
            .min(self.latencies.len() - 1);
        self.latencies[idx].as_micros() as f64
    }

    fn print_summary(&mut self, name: &str) {
        println!("\n{}", "=".repeat(60));
        println!("Benchmark: {name}");
        println!("{}", "=".repeat(60));
        println!("Operations:     {:>12}", format_number(self.operations));
        println!("Duration:       {:>12.2} sec", self.duration.as_secs_f64());
        println!("Throughput:     {:>12.0} ops/sec", self.ops_per_sec());
        if self.bytes_written > 0 {
            println!("Throughput:     {:>12.2} MB/sec", self.mb_per_sec());
        }
        if !self.latencies.is_empty() {
            println!("\nLatency (microseconds):");
            println!("  Average:      {:>12.2}", self.avg_latency_us());
            println!("  P50:          {:>12.2}", self.percentile_latency_us(50.0));
            println!("  P99:          {:>12.2}", self.percentile_latency_us(99.0));
            println!("  P99.9:        {:>12.2}", self.percentile_latency_us(99.9));
        }
        println!("{}", "=".repeat(60));
    }
}

fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Progress indicator
struct ProgressBar {
    total: usize,
    current: usize,
    last_update: Instant,
}

impl ProgressBar {
    fn new(total: usize) -> Self {
        ProgressBar {
            total,
            current: 0,
            last_update: Instant::now(),
        }
    }

    fn update(&mut self, current: usize) {
        self.current = current;
        if self.last_update.elapsed() > Duration::from_millis(100) {
            self.display();
            self.last_update = Instant::now();
        }
    }

    fn finish(&mut self) {
        self.current = self.total;
        self.display();
        println!();
    }

    fn display(&self) {
        let percent = (self.current as f64 / self.total as f64 * 100.0) as usize;
        let bar_width = 40;
        let filled = (bar_width * self.current) / self.total;
        let bar = "=".repeat(filled) + &" ".repeat(bar_width - filled);
        print!(
            "\r[{}] {:>3}% ({}/{})",
            bar,
            percent,
            format_number(self.current),
            format_number(self.total)
        );
        let _ = io::stdout().flush();
    }
}

/// Generate a value of specified size
fn generate_value(size: usize, seed: usize) -> Vec<u8> {
    let mut value = Vec::with_capacity(size);
    let mut x = seed;
    for _ in 0..size {
        x = x.wrapping_mul(1103515245).wrapping_add(12345);
        value.push((x >> 16) as u8);
    }
    value
}

fn row_key(i: usize) -> String {
    format!("row{i:08}")
}

fn make_put(i: usize, config: &BenchConfig) -> Put {
    (0..config.columns_per_row).fold(Put::new(row_key(i)), |put, c| {
        put.add_column(
            FAMILY,
            format!("q{c}"),
            generate_value(config.value_size, i * 31 + c),
        )
    })
}

/// One put per row, one round trip each
fn bench_put(mutator: &Mutator, config: &BenchConfig) -> BenchStats {
    println!("\n📝 Running single put benchmark...");
    let mut stats = BenchStats::new();
    let mut progress = ProgressBar::new(config.num_rows);

    let start = Instant::now();
    for i in 0..config.num_rows {
        let put = make_put(i, config);
        let bytes = put.data_size();

        let op_start = Instant::now();
        mutator
            .mutate(&Default::default(), TABLE, put)
            .unwrap();
        stats.latencies.push(op_start.elapsed());

        stats.operations += 1;
        stats.bytes_written += bytes;

        if i % 1000 == 0 {
            progress.update(i);
        }
    }
    progress.finish();
    stats.duration = start.elapsed();

    stats
}

/// Batches of puts applied in parallel by row
fn bench_put_batch(mutator: &Mutator, config: &BenchConfig) -> BenchStats {
    println!("\n📦 Running batch put benchmark...");
    let mut stats = BenchStats::new();
    let mut progress = ProgressBar::new(config.num_rows);

    let start = Instant::now();
    for chunk_start in (0..config.num_rows).step_by(config.batch_size) {
        let end = (chunk_start + config.batch_size).min(config.num_rows);
        let puts: Vec<Put> = (chunk_start..end).map(|i| make_put(i, config)).collect();
        stats.bytes_written += puts.iter().map(Put::data_size).sum::<usize>();

        let op_start = Instant::now();
        let report = mutator.put_batch(TABLE, puts);
        stats.latencies.push(op_start.elapsed());

        assert!(report.all_succeeded(), "batch failed: {:?}", report.failed());
        stats.operations += report.count();
        progress.update(end);
    }
    progress.finish();
    stats.duration = start.elapsed();

    stats
}

/// Random point reads
fn bench_random_get(reader: &Reader, config: &BenchConfig) -> BenchStats {
    println!("\n📖 Running random get benchmark...");
    let mut stats = BenchStats::new();
    let mut progress = ProgressBar::new(config.num_rows);

    // Use simple LCG for random-ish access pattern
    let mut x = 123456789u64;
    let start = Instant::now();

    for i in 0..config.num_rows {
        x = x.wrapping_mul(1103515245).wrapping_add(12345);
        let key = row_key((x as usize) % config.num_rows);

        let op_start = Instant::now();
        let row = reader.get(TABLE, key.as_str(), None).unwrap();
        stats.latencies.push(op_start.elapsed());

        assert_eq!(row.len(), config.columns_per_row, "row {key}");
        stats.operations += 1;

        if i % 1000 == 0 {
            progress.update(i);
        }
    }
    progress.finish();
    stats.duration = start.elapsed();

    stats
}

/// Full table scan
fn bench_scan(reader: &Reader, config: &BenchConfig) -> BenchStats {
    println!("\n📚 Running full scan benchmark...");
    let mut stats = BenchStats::new();

    let start = Instant::now();
    let scan = Scan::new().with_batch_size(config.scan_batch_size);
    let mut scanner = reader.scan(TABLE, Some(scan)).unwrap();
    while let Some(row) = scanner.next_row().unwrap() {
        assert!(!row.is_empty());
        stats.operations += 1;
    }
    stats.duration = start.elapsed();

    println!(
        "✅ Scanned {} rows in {} batches",
        format_number(stats.operations),
        scanner.batches_fetched()
    );
    stats
}

/// Save the whole cluster to a snapshot file
fn bench_snapshot(cluster: &LocalCluster, config: &BenchConfig) -> BenchStats {
    println!("\n💾 Running snapshot save benchmark...");
    let mut stats = BenchStats::new();
    let dir = TempDir::new().unwrap();

    let start = Instant::now();
    let info = cluster
        .save_snapshot(dir.path().join("bench.snap"), config.compression)
        .unwrap();
    stats.duration = start.elapsed();
    stats.operations = info.cells;
    stats.bytes_written = info.file_size as usize;

    println!(
        "✅ Saved {} cells, {} bytes on disk",
        format_number(info.cells),
        format_number(info.file_size as usize)
    );
    stats
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();

    println!("\n🚀 Wide-column Client Benchmark Tool");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let config = BenchConfig::default();

    println!("Configuration:");
    println!("  Rows:           {}", format_number(config.num_rows));
    println!("  Columns/row:    {}", config.columns_per_row);
    println!("  Value size:     {} bytes", config.value_size);
    println!("  Batch size:     {}", config.batch_size);
    println!("  Scan batch:     {}", config.scan_batch_size);
    println!("  Compression:    {:?}", config.compression);

    let cluster = Arc::new(LocalCluster::new());
    let manager = Arc::new(ConnectionManager::new(
        ConnectionConfig::default(),
        LocalConnector::shared(cluster.clone()),
    ));
    let admin = SchemaAdmin::new(manager.clone());
    let mutator = Mutator::new(manager.clone());
    let reader = Reader::new(manager.clone());

    admin.create_table(TABLE, [FAMILY]).unwrap();
    info!(table = TABLE, "benchmark table created");

    let mut put_stats = bench_put(&mutator, &config);
    put_stats.print_summary("Single Put");

    admin.drop_table(TABLE).unwrap();
    admin.create_table(TABLE, [FAMILY]).unwrap();

    let mut batch_stats = bench_put_batch(&mutator, &config);
    batch_stats.print_summary("Batch Put (per-row parallel)");

    let mut get_stats = bench_random_get(&reader, &config);
    get_stats.print_summary("Random Get");

    let mut scan_stats = bench_scan(&reader, &config);
    scan_stats.print_summary("Full Scan");

    let mut snapshot_stats = bench_snapshot(&cluster, &config);
    snapshot_stats.print_summary("Snapshot Save");

    println!("\n📈 {}", manager.statistics().report());

    manager.shutdown().unwrap();
    println!("\n✅ Benchmark completed!");
}
