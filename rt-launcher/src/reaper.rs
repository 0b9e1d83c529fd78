/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Waits for the launcher's children to drain.

use std::io;

use tracing::{debug, warn};

/// Block on "wait for any child" until the kernel reports that no children
/// remain (`ECHILD`).  Returns the number of children reaped.
///
/// Exit statuses are collected only to release the zombies; they are not
/// interpreted.
pub fn reap_all() -> usize {
    let mut reaped = 0;

    loop {
        // SAFETY: waitpid with a null status pointer is always valid.
        let pid = unsafe { libc::waitpid(-1, std::ptr::null_mut(), 0) };
        if pid > 0 {
            reaped += 1;
            debug!(pid, "Child exited");
            continue;
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ECHILD) => break,
            Some(libc::EINTR) => continue,
            _ => {
                warn!(error = %err, "waitpid failed, giving up on remaining children");
                break;
            }
        }
    }

    reaped
}
