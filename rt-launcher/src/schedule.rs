/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-memory representation of a derived schedule (`.rtps`) file.
//!
//! ```text
//! line 1        schedulability verdict   0 | 1 | >=2
//! line 2        core range               free-form, passed through
//! per task:     command line             program arg1 arg2 ...
//!               timing line              11 numeric tokens
//!               partition line           3 tokens
//! ```
//!
//! The parser only validates the *line* structure.  Field counts inside a
//! task record are checked by the [`projector`](crate::projector) when the
//! task is launched, so a malformed record `k` is detected after records
//! `1..k` have already been started.

use std::fmt;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{LaunchError, ParseError};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Schedulability line + core range line.
pub const HEADER_LINES: usize = 2;

/// Command, timing and partition line of one task.
pub const LINES_PER_TASK: usize = 3;

// ── Schedulability ────────────────────────────────────────────────────────────

/// Verdict written by the offline scheduler on line 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedulability {
    /// `0`: the taskset is schedulable.
    Schedulable,
    /// `1`: the taskset may not be schedulable; launching proceeds.
    Marginal,
    /// Any other value: launching must not start a single task.
    Infeasible(u32),
}

impl Schedulability {
    pub fn from_value(value: u32) -> Self {
        match value {
            0 => Schedulability::Schedulable,
            1 => Schedulability::Marginal,
            other => Schedulability::Infeasible(other),
        }
    }

    /// Numeric value as written in the schedule file.
    pub fn value(self) -> u32 {
        match self {
            Schedulability::Schedulable => 0,
            Schedulability::Marginal => 1,
            Schedulability::Infeasible(v) => v,
        }
    }

    pub fn is_launchable(self) -> bool {
        !matches!(self, Schedulability::Infeasible(_))
    }
}

/// Parse line 1 the way a C++ stream extracts an `unsigned`: leading
/// whitespace is skipped, an optional sign is accepted, then the leading
/// decimal digits are read.  A negative value wraps modulo 2^32, so `-1`
/// reads as `u32::MAX`.  Anything after the digits is ignored.
fn parse_schedulability(line: &str) -> Result<Schedulability, ParseError> {
    let trimmed = line.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();

    let magnitude = unsigned[..digits]
        .parse::<u32>()
        .map_err(|_| ParseError::Schedulability {
            line: line.to_string(),
        })?;
    let value = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Ok(Schedulability::from_value(value))
}

// ── TaskRecord ────────────────────────────────────────────────────────────────

/// The three raw lines describing one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRecord {
    /// `program arg1 arg2 ...`
    pub command_line: String,
    /// Eleven timing tokens; the first four are scheduler-only.
    pub timing_line: String,
    /// Three partition tokens.
    pub partition_line: String,
}

// ── Schedule ──────────────────────────────────────────────────────────────────

/// A parsed `.rtps` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub schedulability: Schedulability,

    /// Line 2, kept verbatim.  The launcher does not interpret it.
    pub core_range: String,

    /// Task records in file order.
    pub tasks: Vec<TaskRecord>,
}

impl Schedule {
    /// Read and parse the schedule at `path`.
    ///
    /// # Errors
    /// * [`LaunchError::FileOpen`] if the file cannot be read.
    /// * [`LaunchError::Parse`] on any line-structure violation.
    pub fn load(path: &Path) -> Result<Self, LaunchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                LaunchError::Parse(ParseError::Encoding)
            } else {
                LaunchError::FileOpen {
                    what: "schedule",
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let schedule = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            tasks = schedule.task_count(),
            core_range = %schedule.core_range,
            "Schedule loaded"
        );
        Ok(schedule)
    }

    /// Parse the text of a schedule file.
    ///
    /// A trailing newline does not count as an extra line; empty lines do.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let total = content.lines().count();
        if total < HEADER_LINES || (total - HEADER_LINES) % LINES_PER_TASK != 0 {
            return Err(ParseError::LineCount { lines: total });
        }
        let task_count = (total - HEADER_LINES) / LINES_PER_TASK;

        let mut lines = content.lines();

        let schedulability = match lines.next() {
            Some(line) => parse_schedulability(line)?,
            None => {
                return Err(ParseError::Schedulability {
                    line: String::new(),
                })
            }
        };

        let core_range = lines
            .next()
            .ok_or(ParseError::MissingCoreRange)?
            .to_string();

        let mut tasks = Vec::with_capacity(task_count);
        for task in 1..=task_count {
            match (lines.next(), lines.next(), lines.next()) {
                (Some(command), Some(timing), Some(partition)) => tasks.push(TaskRecord {
                    command_line: command.to_string(),
                    timing_line: timing.to_string(),
                    partition_line: partition.to_string(),
                }),
                _ => return Err(ParseError::IncompleteTask { task }),
            }
        }

        Ok(Self {
            schedulability,
            core_range,
            tasks,
        })
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Gate launching on the scheduler's verdict.
    ///
    /// `base` only labels the log lines and the error.
    pub fn check_schedulable(&self, base: &str) -> Result<(), LaunchError> {
        if !self.schedulability.is_launchable() {
            return Err(LaunchError::Unschedulable {
                base: base.to_string(),
                value: self.schedulability.value(),
            });
        }

        if self.schedulability == Schedulability::Marginal {
            warn!("Taskset may not be schedulable: {}", base);
        } else {
            info!("Taskset is schedulable: {}", base);
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    /// Renders the schedule back into `.rtps` text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.schedulability.value())?;
        writeln!(f, "{}", self.core_range)?;
        for task in &self.tasks {
            writeln!(f, "{}", task.command_line)?;
            writeln!(f, "{}", task.timing_line)?;
            writeln!(f, "{}", task.partition_line)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
