use hdrhistogram::Histogram;
use log::{error, warn};
use pqueue::Item;
use rand::Rng;
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::{sync::Barrier, time};

use crate::AsyncPriorityQueue;

#[derive(Debug, Clone)]
pub struct StressTestCfg {
    pub num_producers: usize,
    pub num_ops: usize,
    pub num_consumers: usize,
    pub drain_interval_us: u64,
    pub drain_timeout_us: u64,
    pub drain_batch_size: usize,
    pub priority_range: (i64, i64),
    /// Share of producer operations that update an earlier item instead of pushing a new one
    pub update_ratio: f64,
    pub run_duration_seconds: u64,
    /// Operations per second, None for max speed
    pub submission_rate: Option<f64>,
    /// Track push-to-pop latency
    pub latency_tracking: bool,
    /// How often to print stats
    pub print_stats_interval_ms: u64,
    /// Percentiles to track (e.g. [50.0, 90.0, 99.0, 99.9])
    pub latency_percentiles: Vec<f64>,
}

struct TestStats {
    pushed: AtomicU64,
    updated: AtomicU64,
    drained: AtomicU64,
    push_errors: AtomicU64,
    drain_errors: AtomicU64,
    /// Producer or consumer tasks that panicked or were cancelled
    task_failures: AtomicU64,
    // Store latencies in a histogram for percentile calculation
    latency_hist: Mutex<Histogram<u64>>,
}

/// Counters of a finished async stress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressSummary {
    pub pushed: u64,
    pub updated: u64,
    pub drained: u64,
    pub errors: u64,
    pub remaining: usize,
    pub invariants_hold: bool,
}

impl TestStats {
    fn new() -> Self {
        Self {
            pushed: AtomicU64::new(0),
            updated: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            push_errors: AtomicU64::new(0),
            drain_errors: AtomicU64::new(0),
            task_failures: AtomicU64::new(0),
            latency_hist: Mutex::new(
                Histogram::new_with_max(60_000_000, 3)
                    .expect("Initializing the histogram should work"),
            ),
        }
    }

    fn record_latency(&self, latency_us: u64) {
        if let Ok(mut hist) = self.latency_hist.lock() {
            let lat = latency_us.min(hist.high());
            hist.record(lat).expect("cannot exceed max");
        }
    }

    // Calculate the specified percentile from the histogram
    fn calculate_percentile(&self, percentile: f64) -> Option<u64> {
        let hist = self.latency_hist.lock().ok()?;
        if hist.is_empty() {
            return None;
        }
        Some(hist.value_at_quantile(percentile / 100.0))
    }

    fn print_stats(&self, elapsed_seconds: f64, percentiles: &[f64]) {
        use num_format::{Locale, ToFormattedString};
        let locale = Locale::en;

        let pushed = self.pushed.load(Ordering::Relaxed);
        let updated = self.updated.load(Ordering::Relaxed);
        let drained = self.drained.load(Ordering::Relaxed);
        let push_errors = self.push_errors.load(Ordering::Relaxed);
        let drain_errors = self.drain_errors.load(Ordering::Relaxed);

        let push_rate = pushed as f64 / elapsed_seconds;
        let drain_rate = drained as f64 / elapsed_seconds;

        let avg_latency = { self.latency_hist.lock().map(|h| h.mean()) }.unwrap_or_default();
        let max_latency = { self.latency_hist.lock().map(|h| h.max()) }.unwrap_or_default();

        println!("--- QUEUE STATS [{:.2}s] ---", elapsed_seconds);
        println!("Pushed:  {} items ({:.2}/sec)", pushed, push_rate);
        println!("Updated: {} items", updated);
        println!("Drained: {} items ({:.2}/sec)", drained, drain_rate);
        println!("Queue size: ~{} items", pushed.saturating_sub(drained));
        println!(
            "Errors: {} push, {} drain, {} failed tasks",
            push_errors,
            drain_errors,
            self.task_failures.load(Ordering::Relaxed)
        );

        println!(
            "Latency: avg {} μs, max {} μs.",
            (avg_latency as u64).to_formatted_string(&locale),
            max_latency.to_formatted_string(&locale)
        );

        print!("Percentiles: ");
        for &p in percentiles {
            if let Some(latency) = self.calculate_percentile(p) {
                print!("P{:.1}: {} μs, ", p, latency.to_formatted_string(&locale));
            }
        }
        println!();

        println!("---------------------------");
    }
}

/// Item values carry their push time as microseconds since `epoch`, so consumers can measure
/// how long an item waited in the queue.
fn micros_since(epoch: Instant) -> u64 {
    epoch
        .elapsed()
        .as_micros()
        .try_into()
        .unwrap_or(u64::MAX)
}

async fn run_producer<T: AsyncPriorityQueue<u64, i64>>(
    queue: T,
    cfg: StressTestCfg,
    stats: Arc<TestStats>,
    epoch: Instant,
    start_barrier: Arc<Barrier>,
    stop_signal: Arc<AtomicU64>,
) {
    // Wait for all producers and consumers to be ready
    start_barrier.wait().await;

    let mut op_counter = 0;
    let mut keys = vec![];

    let delay = cfg.submission_rate.map(|rate| {
        let producer_rate = rate / cfg.num_producers as f64;
        Duration::from_secs_f64(1.0 / producer_rate)
    });
    let mut interval = delay.map(time::interval);

    while stop_signal.load(Ordering::Relaxed) == 0 && op_counter < cfg.num_ops {
        if let Some(ref mut i) = interval {
            i.tick().await;
        }
        op_counter += 1;

        let (update_key, priority) = {
            let mut rng = rand::rng();
            let priority = rng.random_range(cfg.priority_range.0..cfg.priority_range.1);
            let update_key = (!keys.is_empty() && rng.random_bool(cfg.update_ratio))
                .then(|| keys[rng.random_range(0..keys.len())]);
            (update_key, priority)
        };

        if let Some(key) = update_key {
            // Stale keys are expected once consumers popped the item
            if queue.update(key, micros_since(epoch), priority).await.is_ok() {
                stats.updated.fetch_add(1, Ordering::Relaxed);
            }
            continue;
        }

        match queue.push(Item::new(micros_since(epoch), priority)).await {
            Ok(key) => {
                stats.pushed.fetch_add(1, Ordering::Relaxed);
                keys.push(key);
            }
            Err(_) => {
                stats.push_errors.fetch_add(1, Ordering::Relaxed);
                break;
            }
        }
    }
}

async fn run_consumer<T: AsyncPriorityQueue<u64, i64>>(
    queue: T,
    cfg: StressTestCfg,
    stats: Arc<TestStats>,
    epoch: Instant,
    start_barrier: Arc<Barrier>,
    stop_signal: Arc<AtomicU64>,
) {
    // Wait for all producers and consumers to be ready
    start_barrier.wait().await;

    // tokio rejects a zero period
    let mut interval = time::interval(Duration::from_micros(cfg.drain_interval_us.max(1)));

    while stop_signal.load(Ordering::Relaxed) == 0 {
        interval.tick().await;

        match queue
            .drain(cfg.drain_batch_size, cfg.drain_timeout_us)
            .await
        {
            Ok(items) => {
                if cfg.latency_tracking {
                    let now = micros_since(epoch);
                    for item in &items {
                        stats.record_latency(now.saturating_sub(item.value));
                    }
                }
                stats.drained.fetch_add(items.len() as u64, Ordering::Relaxed);
            }
            Err(_) => {
                stats.drain_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

pub async fn run_stress_test<T: AsyncPriorityQueue<u64, i64> + Clone>(
    config: StressTestCfg,
    queue: T,
) -> StressSummary {
    println!("Starting queue stress test with config: {:?}", config);

    let stats = Arc::new(TestStats::new());
    let epoch = Instant::now();

    // Start barrier ensures all producers and consumers start simultaneously
    let start_barrier = Arc::new(Barrier::new(
        config.num_producers + config.num_consumers + 1,
    ));

    // Stop signal to coordinate shutdown
    let stop_signal = Arc::new(AtomicU64::new(0));

    let mut producer_handles = Vec::with_capacity(config.num_producers);
    for _ in 0..config.num_producers {
        let handle = tokio::spawn(run_producer(
            queue.clone(),
            config.clone(),
            Arc::clone(&stats),
            epoch,
            Arc::clone(&start_barrier),
            Arc::clone(&stop_signal),
        ));
        producer_handles.push(handle);
    }

    let mut consumer_handles = Vec::with_capacity(config.num_consumers);
    for _ in 0..config.num_consumers {
        let handle = tokio::spawn(run_consumer(
            queue.clone(),
            config.clone(),
            Arc::clone(&stats),
            epoch,
            Arc::clone(&start_barrier),
            Arc::clone(&stop_signal),
        ));
        consumer_handles.push(handle);
    }

    // Setup stats printer
    let stats_printer = {
        let stats_clone = Arc::clone(&stats);
        let printer_stop = Arc::clone(&stop_signal);
        let percentiles = config.latency_percentiles.clone();
        let print_interval = Duration::from_millis(config.print_stats_interval_ms.max(1));

        tokio::spawn(async move {
            let start_time = Instant::now();
            let mut interval = time::interval(print_interval);

            while printer_stop.load(Ordering::Relaxed) == 0 {
                interval.tick().await;
                let elapsed = start_time.elapsed().as_secs_f64();
                stats_clone.print_stats(elapsed, &percentiles);
            }

            // Print final stats
            let elapsed = start_time.elapsed().as_secs_f64();
            stats_clone.print_stats(elapsed, &percentiles);
        })
    };

    println!("Waiting for all tasks to be ready...");
    start_barrier.wait().await;
    println!("Test started!");

    time::sleep(Duration::from_secs(config.run_duration_seconds)).await;

    println!("Test duration completed, shutting down...");
    stop_signal.store(1, Ordering::SeqCst);

    for handle in producer_handles.into_iter().chain(consumer_handles) {
        if let Err(e) = handle.await {
            error!("stress task failed: {e}");
            stats.task_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    if let Err(e) = stats_printer.await {
        warn!("stats printer failed: {e}");
    }

    StressSummary {
        pushed: stats.pushed.load(Ordering::Relaxed),
        updated: stats.updated.load(Ordering::Relaxed),
        drained: stats.drained.load(Ordering::Relaxed),
        errors: stats.push_errors.load(Ordering::Relaxed)
            + stats.drain_errors.load(Ordering::Relaxed)
            + stats.task_failures.load(Ordering::Relaxed),
        remaining: queue.len().await,
        invariants_hold: queue.validate().await.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::{StressTestCfg, run_stress_test};
    use crate::LockedQueue;

    fn short_run() -> StressTestCfg {
        StressTestCfg {
            num_producers: 3,
            num_ops: 2_000,
            num_consumers: 2,
            drain_interval_us: 200,
            drain_timeout_us: 5_000,
            drain_batch_size: 50,
            priority_range: (0, 500),
            update_ratio: 0.25,
            run_duration_seconds: 1,
            submission_rate: None,
            latency_tracking: true,
            print_stats_interval_ms: 250,
            latency_percentiles: vec![50.0, 99.0],
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn locked_queue_accounts_for_every_item() {
        let _ = env_logger::builder().is_test(true).try_init();
        let summary = run_stress_test(short_run(), LockedQueue::<u64>::new(6_000)).await;

        assert!(summary.invariants_hold);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.pushed, summary.drained + summary.remaining as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn zero_intervals_run_at_full_speed() {
        let _ = env_logger::builder().is_test(true).try_init();
        let cfg = StressTestCfg {
            num_ops: 500,
            drain_interval_us: 0,
            print_stats_interval_ms: 0,
            ..short_run()
        };

        let summary = run_stress_test(cfg, LockedQueue::<u64>::new(1_000)).await;

        assert_eq!(summary.errors, 0);
        assert!(summary.invariants_hold);
        assert!(summary.drained > 0);
        assert_eq!(summary.pushed, summary.drained + summary.remaining as u64);
    }

    #[tokio::test]
    async fn panicking_producer_is_counted() {
        let cfg = StressTestCfg {
            num_producers: 1,
            num_ops: 10,
            num_consumers: 1,
            run_duration_seconds: 0,
            // an empty range makes the producer panic on its first pick
            priority_range: (5, 5),
            ..short_run()
        };

        let summary = run_stress_test(cfg, LockedQueue::<u64>::new(16)).await;

        assert_eq!(summary.pushed, 0);
        assert_eq!(summary.errors, 1);
    }
}
