/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! All-or-nothing abort: tear down every task already started.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, warn};

/// Capability to terminate every process started so far.
///
/// Implementations must be idempotent: only the first call has an effect.
pub trait AbortBroadcaster {
    fn broadcast(&self);
}

/// Sends `SIGTERM` to the launcher's whole process group.
///
/// The launcher ignores `SIGTERM` itself before broadcasting so that it can
/// still exit with the documented error code.  It exits right after, so the
/// group is torn down either way.
#[derive(Debug, Default)]
pub struct ProcessGroupAbort {
    fired: AtomicBool,
}

impl ProcessGroupAbort {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AbortBroadcaster for ProcessGroupAbort {
    fn broadcast(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        warn!("Broadcasting SIGTERM to the process group");

        // SAFETY: plain syscalls with constant arguments; pid 0 addresses the
        // caller's own process group.
        let rc = unsafe {
            libc::signal(libc::SIGTERM, libc::SIG_IGN);
            libc::kill(0, libc::SIGTERM)
        };
        if rc != 0 {
            error!(error = %io::Error::last_os_error(), "Failed to signal process group");
        }
    }
}
