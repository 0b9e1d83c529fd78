/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rt-launcher – starts a precomputed real-time schedule in lockstep
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/         – optional YAML launcher settings
//! ├── error           – error taxonomy and exit codes
//! ├── freshness       – .rtpt / .rtps staleness check, scheduler invocation
//! ├── schedule        – .rtps parser and schedulability gate
//! ├── projector       – task record → task argument vector
//! ├── barrier         – named single-use barrier (init / join)
//! ├── orchestrator/   – per-task process creation, all-or-nothing abort
//! ├── reaper          – wait for every child to exit
//! └── launcher        – the end-to-end sequence
//! ```

pub mod barrier;
pub mod config;
pub mod error;
pub mod freshness;
pub mod launcher;
pub mod orchestrator;
pub mod projector;
pub mod reaper;
pub mod schedule;
