/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Launcher configuration loading.
//!
//! The configuration file is optional; every field has a default that
//! reproduces the historical launcher behaviour.  The expected YAML structure
//! is:
//! ```yaml
//! barrier_name: RT_GOMP_CLUSTERING_BARRIER
//! barrier_dir: /dev/shm
//! scheduler:
//!   program: python
//!   args: [cluster.py]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Name of the barrier every task joins before starting its timed workload.
pub const DEFAULT_BARRIER_NAME: &str = "RT_GOMP_CLUSTERING_BARRIER";

/// Directory holding named barriers.  On Linux this is the POSIX shared
/// memory mount, so barrier names behave like `shm_open(3)` names.
pub const DEFAULT_BARRIER_DIR: &str = "/dev/shm";

/// Program used to regenerate a stale schedule.
pub const DEFAULT_SCHEDULER_PROGRAM: &str = "python";

/// Arguments placed before the base name on the scheduler command line.
pub const DEFAULT_SCHEDULER_ARGS: &[&str] = &["cluster.py"];

// ── Public data structures ────────────────────────────────────────────────────

/// External offline scheduler invocation: `<program> <args...> <base>`.
///
/// `program` is looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for SchedulerCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_SCHEDULER_PROGRAM.to_string(),
            args: DEFAULT_SCHEDULER_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Runtime settings of the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Barrier identifier handed to every task.
    pub barrier_name: String,

    /// Directory the barrier file is created in.
    pub barrier_dir: PathBuf,

    /// Scheduler run when the `.rtps` file is missing or stale.
    pub scheduler: SchedulerCommand,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            barrier_name: DEFAULT_BARRIER_NAME.to_string(),
            barrier_dir: PathBuf::from(DEFAULT_BARRIER_DIR),
            scheduler: SchedulerCommand::default(),
        }
    }
}

impl LauncherConfig {
    /// Parses `path` into a configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read (the underlying
    /// [`std::io::Error`] stays reachable through `downcast_ref`) or if the
    /// YAML is structurally invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading launcher configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Parses a YAML document.  An empty document yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            debug!("Empty launcher configuration, using defaults");
            return Ok(Self::default());
        }

        let config: LauncherConfig = serde_yaml::from_str(content)?;

        debug!(
            barrier_name = %config.barrier_name,
            barrier_dir = %config.barrier_dir.display(),
            scheduler = %config.scheduler.program,
            scheduler_args = ?config.scheduler.args,
            "Launcher configuration"
        );

        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
