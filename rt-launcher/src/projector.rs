/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Projection of a [`TaskRecord`] onto the argument vector a task binary
//! expects.
//!
//! The layout is fixed by the existing task binaries:
//!
//! ```text
//! argv[0]        program path
//! argv[1..4]     partition fields (3)
//! argv[4..11]    timing fields 4..=10 (7; fields 0..=3 are scheduler-only)
//! argv[11]       barrier name
//! argv[12]       program path again (argv[0] of the task's own arguments)
//! argv[13..]     positional arguments from the command line
//! ```

use tracing::debug;

use crate::error::{FieldKind, ParseError};
use crate::schedule::TaskRecord;

// ── Record shape ──────────────────────────────────────────────────────────────

/// Tokens on a task's timing line.
pub const TIMING_FIELD_COUNT: usize = 11;

/// Leading timing tokens consumed only by the offline scheduler.
pub const SKIPPED_TIMING_FIELDS: usize = 4;

/// Timing tokens forwarded to the task.
pub const FORWARDED_TIMING_FIELDS: usize = TIMING_FIELD_COUNT - SKIPPED_TIMING_FIELDS;

/// Tokens on a task's partition line.
pub const PARTITION_FIELD_COUNT: usize = 3;

const PARTITION_START: usize = 1;
const TIMING_START: usize = PARTITION_START + PARTITION_FIELD_COUNT;
const BARRIER_INDEX: usize = TIMING_START + FORWARDED_TIMING_FIELDS;
const TASK_ARGV0_INDEX: usize = BARRIER_INDEX + 1;

/// Shortest valid vector: no positional arguments.
pub const MIN_ARGV_LEN: usize = TASK_ARGV0_INDEX + 1;

// ── TaskArgv ──────────────────────────────────────────────────────────────────

/// The exact argument vector a task process is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskArgv(Vec<String>);

impl TaskArgv {
    /// Decode an argument vector received by a task process.
    ///
    /// # Errors
    /// [`ParseError::TruncatedArgv`] if `args` is shorter than the fixed
    /// launcher prefix.
    pub fn from_args(args: Vec<String>) -> Result<Self, ParseError> {
        if args.len() < MIN_ARGV_LEN {
            return Err(ParseError::TruncatedArgv {
                expected: MIN_ARGV_LEN,
                found: args.len(),
            });
        }
        Ok(Self(args))
    }

    /// Program path; also the executable that gets started.
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Everything after `argv[0]`.
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn partition_fields(&self) -> &[String] {
        &self.0[PARTITION_START..TIMING_START]
    }

    /// The forwarded timing fields (original positions 4..=10).
    pub fn timing_fields(&self) -> &[String] {
        &self.0[TIMING_START..BARRIER_INDEX]
    }

    pub fn barrier_name(&self) -> &str {
        &self.0[BARRIER_INDEX]
    }

    /// The task's own command line: program path followed by its positional
    /// arguments.
    pub fn task_command(&self) -> &[String] {
        &self.0[TASK_ARGV0_INDEX..]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Build the argument vector for the `task`-th record (1-based).
///
/// Validation order: program name, partition line, timing line.
pub fn project(task: usize, record: &TaskRecord, barrier_name: &str) -> Result<TaskArgv, ParseError> {
    let mut command = record.command_line.split_whitespace();
    let program = command.next().ok_or(ParseError::MissingProgram { task })?;

    let partition = project_partition(program, &record.partition_line)?;
    let timing = project_timing(program, &record.timing_line)?;

    let mut argv = Vec::with_capacity(MIN_ARGV_LEN + 4);
    argv.push(program.to_string());
    argv.extend(partition.iter().map(|s| s.to_string()));
    argv.extend(timing.iter().map(|s| s.to_string()));
    argv.push(barrier_name.to_string());
    argv.push(program.to_string());
    argv.extend(command.map(str::to_string));

    debug!(task, program, argc = argv.len(), "Projected task argument vector");
    Ok(TaskArgv(argv))
}

/// Exactly [`PARTITION_FIELD_COUNT`] tokens, passed through unchanged.
pub fn project_partition<'a>(program: &str, line: &'a str) -> Result<Vec<&'a str>, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    check_count(program, FieldKind::Partition, PARTITION_FIELD_COUNT, fields.len())?;
    Ok(fields)
}

/// Exactly [`TIMING_FIELD_COUNT`] tokens, of which the first
/// [`SKIPPED_TIMING_FIELDS`] are dropped.
pub fn project_timing<'a>(program: &str, line: &'a str) -> Result<Vec<&'a str>, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    check_count(program, FieldKind::Timing, TIMING_FIELD_COUNT, fields.len())?;
    Ok(fields[SKIPPED_TIMING_FIELDS..].to_vec())
}

fn check_count(program: &str, kind: FieldKind, expected: usize, found: usize) -> Result<(), ParseError> {
    if found < expected {
        Err(ParseError::TooFewFields {
            program: program.to_string(),
            kind,
            expected,
            found,
        })
    } else if found > expected {
        Err(ParseError::TooManyFields {
            program: program.to_string(),
            kind,
            expected,
            found,
        })
    } else {
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
