/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Staleness check between a taskset (`.rtpt`) and its derived schedule
//! (`.rtps`).
//!
//! The schedule is regenerated by the external offline scheduler only when
//! it is missing or older than the taskset.  The scheduler's exit status is
//! not checked: the parser will reject whatever it failed to write.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::config::SchedulerCommand;
use crate::error::LaunchError;

pub const TASKSET_EXTENSION: &str = "rtpt";
pub const SCHEDULE_EXTENSION: &str = "rtps";

/// File names derived from a schedule base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePaths {
    pub base: String,
    pub taskset: PathBuf,
    pub schedule: PathBuf,
}

impl SchedulePaths {
    /// `base` may contain directories; the extensions are appended verbatim.
    pub fn from_base(base: &str) -> Self {
        Self {
            base: base.to_string(),
            taskset: PathBuf::from(format!("{base}.{TASKSET_EXTENSION}")),
            schedule: PathBuf::from(format!("{base}.{SCHEDULE_EXTENSION}")),
        }
    }
}

/// Outcome of [`ensure_fresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    UpToDate,
    Regenerated,
}

fn modified(meta: &fs::Metadata) -> Option<SystemTime> {
    meta.modified().ok()
}

/// Make sure the schedule is at least as new as the taskset.
///
/// # Errors
/// * [`LaunchError::FileOpen`] if regeneration is needed but the taskset
///   does not exist.
/// * [`LaunchError::ForkExec`] if the scheduler cannot be started.
pub fn ensure_fresh(
    paths: &SchedulePaths,
    scheduler: &SchedulerCommand,
) -> Result<Freshness, LaunchError> {
    let taskset = fs::metadata(&paths.taskset);
    let schedule = fs::metadata(&paths.schedule);

    let stale = match (&taskset, &schedule) {
        (_, Err(_)) => true,
        (Ok(t), Ok(s)) => modified(t) > modified(s),
        (Err(_), Ok(_)) => false,
    };

    if !stale {
        debug!(schedule = %paths.schedule.display(), "Schedule is up to date");
        return Ok(Freshness::UpToDate);
    }

    if let Err(source) = taskset {
        return Err(LaunchError::FileOpen {
            what: "taskset",
            path: paths.taskset.clone(),
            source,
        });
    }

    info!("Scheduling taskset {} ...", paths.base);
    run_scheduler(scheduler, &paths.base)?;
    Ok(Freshness::Regenerated)
}

/// Run `<program> <args...> <base>` and block until it exits.
fn run_scheduler(scheduler: &SchedulerCommand, base: &str) -> Result<(), LaunchError> {
    let status = Command::new(&scheduler.program)
        .args(&scheduler.args)
        .arg(base)
        .status()
        .map_err(|source| LaunchError::ForkExec {
            program: scheduler.program.clone(),
            source,
        })?;

    if status.success() {
        debug!(scheduler = %scheduler.program, "Scheduler finished");
    } else {
        warn!(scheduler = %scheduler.program, %status, "Scheduler exited unsuccessfully");
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
