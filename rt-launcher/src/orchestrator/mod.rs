/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process orchestration: start every task of a schedule, or none.
//!
//! Tasks are started one at a time in schedule order.  Nothing waits for a
//! task between starts; the barrier the tasks join is what lines up their
//! timed workloads.  The first failure (malformed record, process creation,
//! image replacement) triggers the [`AbortBroadcaster`] once and ends the
//! launch, so no subset of tasks is ever left running on its own.

pub mod abort;
pub mod spawn;

pub use abort::{AbortBroadcaster, ProcessGroupAbort};
pub use spawn::{ExecSpawner, TaskSpawner};

use tracing::{debug, info};

use crate::error::LaunchError;
use crate::projector::project;
use crate::schedule::TaskRecord;

/// A task that was started successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedTask {
    /// 1-based position in the schedule.
    pub index: usize,
    pub program: String,
    pub pid: u32,
}

pub struct Orchestrator<'a, S, A: ?Sized> {
    spawner: S,
    abort: &'a A,
    barrier_name: String,
}

impl<'a, S, A> Orchestrator<'a, S, A>
where
    S: TaskSpawner,
    A: AbortBroadcaster + ?Sized,
{
    pub fn new(spawner: S, abort: &'a A, barrier_name: impl Into<String>) -> Self {
        Self {
            spawner,
            abort,
            barrier_name: barrier_name.into(),
        }
    }

    /// Start every task in `tasks`.
    ///
    /// # Errors
    /// * [`LaunchError::Parse`] if a record fails projection.
    /// * [`LaunchError::ForkExec`] if a task process cannot be started.
    ///
    /// Either way the abort broadcaster has fired before the error returns.
    pub fn launch(&mut self, tasks: &[TaskRecord]) -> Result<Vec<LaunchedTask>, LaunchError> {
        let mut launched = Vec::with_capacity(tasks.len());

        for (i, record) in tasks.iter().enumerate() {
            match self.launch_one(i + 1, record) {
                Ok(task) => launched.push(task),
                Err(e) => {
                    debug!(started = launched.len(), "Aborting launch");
                    self.abort.broadcast();
                    return Err(e);
                }
            }
        }

        Ok(launched)
    }

    fn launch_one(&mut self, index: usize, record: &TaskRecord) -> Result<LaunchedTask, LaunchError> {
        let argv = project(index, record, &self.barrier_name)?;
        let program = argv.program().to_string();

        info!("Forking and execv-ing task {}", program);
        let pid = self
            .spawner
            .spawn(&argv)
            .map_err(|source| LaunchError::ForkExec {
                program: program.clone(),
                source,
            })?;
        debug!(task = %program, pid, "Task started");

        Ok(LaunchedTask { index, program, pid })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
