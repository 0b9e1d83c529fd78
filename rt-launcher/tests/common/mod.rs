/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared helpers for tests that drive the `rt-launcher` binary.

#![allow(dead_code)]

use std::fs;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

pub const BARRIER: &str = "IT_BARRIER";
pub const TIMING: &str = "0 0 0 0 1 2 3 4 5 6 7";

/// A temporary directory holding a taskset, its schedule, a launcher config
/// and the barrier.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().unwrap(),
        };
        let config = format!(
            "barrier_name: {BARRIER}\nbarrier_dir: {}\nscheduler:\n  program: /nonexistent/scheduler\n",
            ws.dir.path().display()
        );
        fs::write(ws.config_path(), config).unwrap();
        ws
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn base(&self) -> String {
        self.path("ts").to_str().unwrap().to_string()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path("launcher.yaml")
    }

    pub fn write_schedule(&self, content: &str) {
        fs::write(format!("{}.rtps", self.base()), content).unwrap();
    }

    /// Write a shell script run by `/bin/sh`.  Scripts are never executed
    /// directly, so they need no exec permission.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, format!("{body}\n")).unwrap();
        path
    }

    /// Task record running `script` under `/bin/sh`: the script path is
    /// partition field 0, which `/bin/sh` receives as its script operand.
    pub fn sh_task(&self, script: &Path, positional: &str) -> String {
        format!(
            "/bin/sh {positional}\n{TIMING}\n{} p1 p2\n",
            script.display()
        )
    }

    pub fn barrier_path(&self) -> PathBuf {
        self.path(BARRIER)
    }

    /// Run the launcher in a fresh process group so the abort broadcast
    /// never reaches the test harness.
    pub fn launch(&self, args: &[&str]) -> Launch {
        let child = Command::new(env!("CARGO_BIN_EXE_rt-launcher"))
            .args(args)
            .current_dir(self.dir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()
            .unwrap();
        let pgid = child.id();
        let output = child.wait_with_output().unwrap();
        Launch { pgid, output }
    }

    pub fn launch_base(&self) -> Launch {
        let config = self.config_path();
        let base = self.base();
        self.launch(&["-c", config.to_str().unwrap(), base.as_str()])
    }
}

/// Result of one launcher run.
pub struct Launch {
    /// The launcher's pid, which is also the id of its process group.
    pub pgid: u32,
    pub output: Output,
}

impl Launch {
    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }
}

/// Live (non-zombie) processes whose process group is `pgid`.
pub fn live_group_members(pgid: u32) -> Vec<u32> {
    let mut members = Vec::new();
    let Ok(entries) = fs::read_dir("/proc") else {
        return members;
    };
    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };
        let Ok(stat) = fs::read_to_string(entry.path().join("stat")) else {
            continue;
        };
        // "pid (comm) state ppid pgrp ..."; comm may contain spaces.
        let Some(rest) = stat.rfind(')').map(|i| &stat[i + 1..]) else {
            continue;
        };
        let fields: Vec<&str> = rest.split_whitespace().collect();
        if fields.len() > 2 && fields[2] == pgid.to_string() && fields[0] != "Z" {
            members.push(pid);
        }
    }
    members
}

/// Poll until `pgid` has no live members or `timeout` expires.
pub fn wait_for_empty_group(pgid: u32, timeout: Duration) -> Vec<u32> {
    let deadline = Instant::now() + timeout;
    loop {
        let members = live_group_members(pgid);
        if members.is_empty() || Instant::now() >= deadline {
            return members;
        }
        thread::sleep(Duration::from_millis(20));
    }
}
