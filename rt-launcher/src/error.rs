/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the launcher.
//!
//! Three layers:
//!
//! * [`ParseError`]: a structural violation of the `.rtps` line/field-count
//!   contract (or of the child argv contract when decoding it).
//! * [`LaunchError`]: top-level failure returned by
//!   [`launcher::run()`](crate::launcher::run); every variant maps to exactly
//!   one stable [`ExitCode`].
//! * [`ExitCode`]: the process exit status taxonomy shared with the scripts
//!   that drive the launcher.  The numeric values are part of the external
//!   interface and must never be reordered.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::barrier::BarrierError;

// ── Exit codes ────────────────────────────────────────────────────────────────

/// Process exit status of the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    FileOpen = 1,
    FileParse = 2,
    Unschedulable = 3,
    ForkExec = 4,
    BarrierInit = 5,
    Argument = 6,
}

impl ExitCode {
    /// Raw numeric status passed to `exit(3)`.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}

// ── Parse errors ──────────────────────────────────────────────────────────────

/// Which per-task parameter line a field-count error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Timing,
    Partition,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Timing => f.write_str("timing"),
            FieldKind::Partition => f.write_str("partition"),
        }
    }
}

/// Structural violation of the schedule file format.
///
/// Task indices are 1-based, in schedule-file order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid number of lines in schedule file: {lines} (expected 2 header lines plus 3 per task)")]
    LineCount { lines: usize },

    #[error("schedule file is not valid UTF-8 text")]
    Encoding,

    #[error("schedulability improperly specified: '{line}'")]
    Schedulability { line: String },

    #[error("missing system first and last cores line")]
    MissingCoreRange,

    #[error("provide three lines for each task in the schedule file (task {task} is incomplete)")]
    IncompleteTask { task: usize },

    #[error("program name not provided for task {task}")]
    MissingProgram { task: usize },

    #[error("too few {kind} parameters were provided for task {program} (expected {expected}, found {found})")]
    TooFewFields {
        program: String,
        kind: FieldKind,
        expected: usize,
        found: usize,
    },

    #[error("too many {kind} parameters were provided for task {program} (expected {expected}, found {found})")]
    TooManyFields {
        program: String,
        kind: FieldKind,
        expected: usize,
        found: usize,
    },

    /// A child argument vector shorter than the fixed launcher prefix.
    #[error("task argument vector has {found} entries, at least {expected} are required")]
    TruncatedArgv { expected: usize, found: usize },
}

// ── Top-level launcher errors ─────────────────────────────────────────────────

/// Top-level error type returned by [`launcher::run()`](crate::launcher::run).
///
/// | Variant | Exit code |
/// |---|---|
/// | `Argument` | `Argument` |
/// | `FileOpen` | `FileOpen` |
/// | `Config` | `FileOpen` if the file could not be read, `FileParse` otherwise |
/// | `Parse` | `FileParse` |
/// | `Unschedulable` | `Unschedulable` |
/// | `ForkExec` | `ForkExec` |
/// | `BarrierInit` | `BarrierInit` |
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0}")]
    Argument(String),

    #[error("cannot open {what} file {}: {source}", path.display())]
    FileOpen {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid launcher configuration {}: {cause:#}", path.display())]
    Config { path: PathBuf, cause: anyhow::Error },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The offline scheduler marked the taskset infeasible.
    #[error("taskset NOT schedulable: {base} (schedulability = {value})")]
    Unschedulable { base: String, value: u32 },

    /// Process creation or image replacement failed, for the scheduler step
    /// or for a task.
    #[error("failed to fork/exec {program}: {source}")]
    ForkExec {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize barrier: {0}")]
    BarrierInit(#[source] BarrierError),
}

impl LaunchError {
    /// Exit status the launcher process terminates with for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchError::Argument(_) => ExitCode::Argument,
            LaunchError::FileOpen { .. } => ExitCode::FileOpen,
            LaunchError::Config { cause, .. } => {
                if cause.downcast_ref::<io::Error>().is_some() {
                    ExitCode::FileOpen
                } else {
                    ExitCode::FileParse
                }
            }
            LaunchError::Parse(_) => ExitCode::FileParse,
            LaunchError::Unschedulable { .. } => ExitCode::Unschedulable,
            LaunchError::ForkExec { .. } => ExitCode::ForkExec,
            LaunchError::BarrierInit(_) => ExitCode::BarrierInit,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_values_are_stable() {
        assert_eq!(ExitCode::Success.as_u8(), 0);
        assert_eq!(ExitCode::FileOpen.as_u8(), 1);
        assert_eq!(ExitCode::FileParse.as_u8(), 2);
        assert_eq!(ExitCode::Unschedulable.as_u8(), 3);
        assert_eq!(ExitCode::ForkExec.as_u8(), 4);
        assert_eq!(ExitCode::BarrierInit.as_u8(), 5);
        assert_eq!(ExitCode::Argument.as_u8(), 6);
    }

    #[test]
    fn parse_errors_map_to_file_parse() {
        let err = LaunchError::from(ParseError::LineCount { lines: 4 });
        assert_eq!(err.exit_code(), ExitCode::FileParse);
    }

    #[test]
    fn config_read_failure_maps_to_file_open() {
        let cause = Err::<(), _>(io::Error::from(io::ErrorKind::NotFound))
            .context("Cannot open configuration file")
            .unwrap_err();
        let err = LaunchError::Config {
            path: PathBuf::from("/nonexistent.yaml"),
            cause,
        };
        assert_eq!(err.exit_code(), ExitCode::FileOpen);
    }

    #[test]
    fn config_syntax_failure_maps_to_file_parse() {
        let err = LaunchError::Config {
            path: PathBuf::from("launcher.yaml"),
            cause: anyhow::anyhow!("bad yaml"),
        };
        assert_eq!(err.exit_code(), ExitCode::FileParse);
    }

    #[test]
    fn field_count_messages_name_the_task() {
        let err = ParseError::TooManyFields {
            program: "workerA".into(),
            kind: FieldKind::Partition,
            expected: 3,
            found: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("too many partition"), "{msg}");
        assert!(msg.contains("workerA"), "{msg}");
    }
}
