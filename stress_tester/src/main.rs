use std::sync::Arc;

use anyhow::Context;
use cfg::Cfg;
use clap::Parser;
use log::info;
use pqueue::{
    PriorityQueue,
    test::stress::{StressTestConfig, TestResults, run_stress_test},
};
use sync::{ChanneledQueue, LockedQueue};

pub mod cfg;

fn main() {
    env_logger::init();
    let cfg = cfg::Cfg::parse();
    println!("Running configuration:\n{cfg:#?}");

    let res = match cfg.implementation {
        cfg::Implementation::Locked => run_locked(cfg),
        cfg::Implementation::Channels => run_channels(cfg),
        cfg::Implementation::Async => run_async(cfg),
    };
    if let Err(e) = res {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn capacity(cfg: &Cfg) -> anyhow::Result<usize> {
    cfg.op_num
        .checked_mul(cfg.producer_num)
        .ok_or_else(|| anyhow::anyhow!("Overflow while calculating queue capacity"))
}

fn stress_config(cfg: &Cfg) -> StressTestConfig {
    StressTestConfig {
        num_producers: cfg.producer_num,
        num_ops: cfg.op_num,
        num_consumers: cfg.consumer_num,
        update_ratio: cfg.update_ratio,
        drain_interval_ms: cfg.drain_interval_ms,
        drain_batch_size: cfg.drain_batch_size,
        priority_range: (0, 1_000),
        run_duration_seconds: cfg.run_duration_seconds,
    }
}

fn run_threaded<T: PriorityQueue<u64, i64>>(queue: Arc<T>, cfg: &Cfg) -> anyhow::Result<()> {
    let results = run_stress_test(queue, stress_config(cfg));
    results.print_summary();
    check(&results)
}

fn check(results: &TestResults) -> anyhow::Result<()> {
    if !results.is_consistent() {
        anyhow::bail!("stress run left the queue in an inconsistent state");
    }
    Ok(())
}

fn run_locked(cfg: Cfg) -> anyhow::Result<()> {
    let queue = Arc::new(LockedQueue::<u64>::new(capacity(&cfg)?));
    run_threaded(queue, &cfg)
}

fn run_channels(cfg: Cfg) -> anyhow::Result<()> {
    let queue = Arc::new(ChanneledQueue::<u64>::new(capacity(&cfg)?)?);
    run_threaded(Arc::clone(&queue), &cfg)?;

    let queue = Arc::into_inner(queue).context("stress threads still hold the queue")?;
    let remaining = queue.stop()?;
    info!("queue worker stopped, {} items were left", remaining.len());
    Ok(())
}

fn run_async(cfg: Cfg) -> anyhow::Result<()> {
    use async_impl::{LockedQueue, StressTestCfg, run_stress_test};

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let summary = rt.block_on(async {
        let stress_cfg = StressTestCfg {
            num_producers: cfg.producer_num,
            num_ops: cfg.op_num,
            num_consumers: cfg.consumer_num,
            drain_interval_us: cfg.drain_interval_ms * 1_000,
            drain_timeout_us: 3_000,
            drain_batch_size: cfg.drain_batch_size,
            priority_range: (0, 1_000),
            update_ratio: cfg.update_ratio,
            run_duration_seconds: cfg.run_duration_seconds,
            submission_rate: None, // Max speed
            latency_tracking: true,
            print_stats_interval_ms: 1000,
            latency_percentiles: vec![50.0, 90.0, 99.0, 99.9],
        };
        let queue = LockedQueue::<u64>::new(capacity(&cfg)?);
        anyhow::Ok(run_stress_test(stress_cfg, queue).await)
    })?;

    println!("{summary:#?}");
    if !summary.invariants_hold || summary.errors > 0 {
        anyhow::bail!("stress run left the queue in an inconsistent state");
    }
    Ok(())
}
