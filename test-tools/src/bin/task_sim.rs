/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! task-sim: stands in for one real-time task started by rt-launcher.
//!
//! ```text
//!   task-sim <p0> <p1> <p2> <t0..t6> <barrier> <program> [iterations] [period_ms]
//!
//!   1. decode the launcher argv layout
//!   2. join the barrier (waits for every sibling task)
//!   3. run `iterations` dummy jobs, one every `period_ms`
//! ```
//!
//! Put it in a schedule as the task program, e.g.
//!
//! ```text
//!   ./task-sim 5 20
//!   0 0 0 0 10 20 30 40 50 60 70
//!   cpu0 cpu1 cpu2
//! ```
//!
//! The barrier directory defaults to the launcher's and can be overridden
//! with `RT_LAUNCHER_BARRIER_DIR` when the launcher config moves it.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use rt_launcher::barrier::SingleUseBarrier;
use rt_launcher::config::DEFAULT_BARRIER_DIR;
use rt_launcher::projector::TaskArgv;

const BARRIER_DIR_ENV: &str = "RT_LAUNCHER_BARRIER_DIR";
const DEFAULT_ITERATIONS: u32 = 1;
const DEFAULT_PERIOD_MS: u64 = 100;

struct Workload {
    iterations: u32,
    period: Duration,
}

impl Workload {
    fn from_task_args(args: &[String]) -> Result<Self> {
        let iterations = match args.first() {
            Some(s) => s
                .parse()
                .with_context(|| format!("invalid iteration count '{s}'"))?,
            None => DEFAULT_ITERATIONS,
        };
        let period_ms = match args.get(1) {
            Some(s) => s.parse().with_context(|| format!("invalid period '{s}'"))?,
            None => DEFAULT_PERIOD_MS,
        };
        Ok(Self {
            iterations,
            period: Duration::from_millis(period_ms),
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv = TaskArgv::from_args(std::env::args().collect())
        .context("task-sim must be started by rt-launcher")?;
    let workload = Workload::from_task_args(&argv.task_command()[1..])?;
    let pid = std::process::id();

    info!(
        pid,
        partition = ?argv.partition_fields(),
        timing = ?argv.timing_fields(),
        "task-sim started"
    );

    // ── Barrier ───────────────────────────────────────────────────────────────
    let dir = std::env::var_os(BARRIER_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BARRIER_DIR));
    let barrier = SingleUseBarrier::new(dir, argv.barrier_name());

    let waited = Instant::now();
    barrier
        .join()
        .with_context(|| format!("failed to join barrier {}", barrier.path().display()))?;
    info!(pid, waited_us = waited.elapsed().as_micros() as u64, "Barrier released");

    // ── Dummy periodic workload ───────────────────────────────────────────────
    let start = Instant::now();
    for job in 1..=workload.iterations {
        let release = start + workload.period * (job - 1);
        if let Some(delay) = release.checked_duration_since(Instant::now()) {
            thread::sleep(delay);
        }
        info!(pid, job, elapsed_ms = start.elapsed().as_millis() as u64, "Job released");
    }

    info!(pid, jobs = workload.iterations, "task-sim finished");
    Ok(())
}
