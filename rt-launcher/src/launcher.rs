/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end launch sequence.
//!
//! ```text
//! ensure_fresh ─► Schedule::load ─► check_schedulable ─► barrier.init(N)
//!              ─► Orchestrator::launch ─► reap_all
//! ```
//!
//! Every error is terminal.  Failures before the first task is started
//! return directly; failures while starting tasks broadcast the abort first
//! (the orchestrator does that) and remove the barrier name so the next run
//! does not collide with it.

use tracing::{info, warn};

use crate::barrier::SingleUseBarrier;
use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::freshness::{ensure_fresh, Freshness, SchedulePaths};
use crate::orchestrator::{
    AbortBroadcaster, ExecSpawner, LaunchedTask, Orchestrator, ProcessGroupAbort, TaskSpawner,
};
use crate::reaper::reap_all;
use crate::schedule::Schedule;

/// Summary of a completed launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub freshness: Freshness,
    pub launched: Vec<LaunchedTask>,
    /// Children collected by the reaper.
    pub reaped: usize,
}

/// Launch the schedule `<base>.rtps` with real processes and the
/// process-group abort.
pub fn run(base: &str, config: &LauncherConfig) -> Result<LaunchReport, LaunchError> {
    let abort = ProcessGroupAbort::new();
    run_with(base, config, ExecSpawner, &abort, reap_all)
}

/// [`run`] with injectable process creation, abort and reaping.
pub fn run_with<S, A, R>(
    base: &str,
    config: &LauncherConfig,
    spawner: S,
    abort: &A,
    reap: R,
) -> Result<LaunchReport, LaunchError>
where
    S: TaskSpawner,
    A: AbortBroadcaster + ?Sized,
    R: FnOnce() -> usize,
{
    let paths = SchedulePaths::from_base(base);

    let freshness = match ensure_fresh(&paths, &config.scheduler) {
        Ok(freshness) => freshness,
        Err(e @ LaunchError::ForkExec { .. }) => {
            abort.broadcast();
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let schedule = Schedule::load(&paths.schedule)?;
    schedule.check_schedulable(base)?;

    let barrier = SingleUseBarrier::new(config.barrier_dir.clone(), config.barrier_name.clone());
    barrier
        .init(schedule.task_count())
        .map_err(LaunchError::BarrierInit)?;

    let launched = match Orchestrator::new(spawner, abort, barrier.name()).launch(&schedule.tasks) {
        Ok(launched) => launched,
        Err(e) => {
            if let Err(cleanup) = barrier.remove() {
                warn!(error = %cleanup, "Failed to remove barrier after aborted launch");
            }
            return Err(e);
        }
    };

    info!(tasks = launched.len(), "All tasks started");
    let reaped = reap();
    info!(reaped, "All tasks finished");

    Ok(LaunchReport {
        freshness,
        launched,
        reaped,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
