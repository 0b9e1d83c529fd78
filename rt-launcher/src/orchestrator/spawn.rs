/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process creation for tasks.

use std::io;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::projector::TaskArgv;

/// Starts one task process and returns its pid.
///
/// Errors cover both process creation and image replacement: an `exec`
/// failure in the child is reported here and the child never runs launcher
/// code.
pub trait TaskSpawner {
    fn spawn(&mut self, argv: &TaskArgv) -> io::Result<u32>;
}

impl<T: TaskSpawner + ?Sized> TaskSpawner for &mut T {
    fn spawn(&mut self, argv: &TaskArgv) -> io::Result<u32> {
        (**self).spawn(argv)
    }
}

/// Real spawner.  The child inherits the launcher's process group, stdio and
/// environment.  Its exit status is collected later by the
/// [`reaper`](crate::reaper), never through the `Child` handle.
#[derive(Debug, Default)]
pub struct ExecSpawner;

impl TaskSpawner for ExecSpawner {
    fn spawn(&mut self, argv: &TaskArgv) -> io::Result<u32> {
        let child = Command::new(executable_path(argv.program()))
            .arg0(argv.program())
            .args(argv.args())
            .spawn()?;
        Ok(child.id())
    }
}

/// Program paths are never searched on `PATH`: a bare name refers to the
/// working directory.
pub fn executable_path(program: &str) -> PathBuf {
    if program.contains('/') {
        PathBuf::from(program)
    } else {
        Path::new(".").join(program)
    }
}
