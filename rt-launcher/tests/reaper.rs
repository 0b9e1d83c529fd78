/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! `reap_all` waits on *any* child of the process, so it gets a test binary
//! of its own.

use std::process::Command;

use rt_launcher::reaper::reap_all;

#[test]
fn reaps_every_child_until_none_remain() {
    for status in 0..3 {
        // Dropping the handle leaves the child for the reaper.
        Command::new("sh")
            .arg("-c")
            .arg(format!("sleep 0.1; exit {status}"))
            .spawn()
            .unwrap();
    }

    assert_eq!(reap_all(), 3);
    assert_eq!(reap_all(), 0, "nothing left to reap");
}
