/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Named single-use barrier shared between the launcher and its tasks.
//!
//! The barrier lives in a small file `<dir>/<name>` that every participant
//! maps `MAP_SHARED`.  With the default directory (`/dev/shm`) this is the
//! same object `shm_open(3)` would hand out for `name`.
//!
//! ```text
//! offset  field          written by
//! 0       magic          launcher (last, with Release ordering)
//! 4       participants   launcher
//! 8       remaining      launcher, then decremented by each joiner
//! 12      released       last joiner
//! ```
//!
//! The launcher only calls [`SingleUseBarrier::init`].  Tasks call
//! [`SingleUseBarrier::join`]: every joiner blocks until the last one
//! arrives, the last joiner releases everybody and unlinks the name, so the
//! barrier can never be joined twice.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use memmap2::MmapMut;
use thiserror::Error;
use tracing::{debug, info, warn};

/// "RTBR" in little-endian byte order.
const BARRIER_MAGIC: u32 = 0x5242_5452;

#[repr(C)]
struct BarrierHeader {
    magic: AtomicU32,
    participants: AtomicU32,
    remaining: AtomicU32,
    released: AtomicU32,
}

const HEADER_LEN: usize = std::mem::size_of::<BarrierHeader>();

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BarrierError {
    #[error("invalid barrier name '{0}'")]
    InvalidName(String),

    #[error("a barrier needs at least one participant")]
    NoParticipants,

    #[error("{0} participants exceed the barrier capacity")]
    TooManyParticipants(usize),

    #[error("barrier {} already exists (left over from an unterminated run?)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("barrier {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a single-use barrier", .0.display())]
    Corrupt(PathBuf),

    #[error("barrier {} has already been consumed", .0.display())]
    Consumed(PathBuf),

    #[error("I/O error on barrier {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ── Shared mapping ────────────────────────────────────────────────────────────

fn map_header(file: &File, path: &Path) -> Result<MmapMut, BarrierError> {
    // SAFETY: the file is at least HEADER_LEN bytes long (checked or set by
    // every caller) and is never truncated while mapped.  Concurrent access
    // from other processes goes through the atomics in `BarrierHeader` only.
    unsafe { MmapMut::map_mut(file) }.map_err(|source| BarrierError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn barrier_header(map: &MmapMut) -> &BarrierHeader {
    // SAFETY: the mapping is page aligned and at least HEADER_LEN bytes long;
    // `BarrierHeader` is `repr(C)` and made of atomics only.
    unsafe { &*(map.as_ptr() as *const BarrierHeader) }
}

/// Sleep until `word` no longer holds `expected` (or a spurious wakeup).
fn futex_wait(word: &AtomicU32, expected: u32) {
    // SAFETY: `word` lives in a MAP_SHARED mapping that outlives the call.
    // A shared (non-private) futex is keyed on the backing page, so waiters
    // in other processes are woken by `futex_wake_all`.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word.as_ptr(),
            libc::FUTEX_WAIT,
            expected,
            std::ptr::null::<libc::timespec>(),
        );
    }
}

fn futex_wake_all(word: &AtomicU32) {
    // SAFETY: see `futex_wait`.
    unsafe {
        libc::syscall(libc::SYS_futex, word.as_ptr(), libc::FUTEX_WAKE, i32::MAX);
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Point-in-time view of a barrier, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierState {
    pub participants: u32,
    pub remaining: u32,
    pub released: bool,
}

// ── SingleUseBarrier ──────────────────────────────────────────────────────────

/// Handle on a named barrier.  Cheap to construct; nothing touches the
/// filesystem until [`init`](Self::init), [`join`](Self::join) or
/// [`inspect`](Self::inspect) is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleUseBarrier {
    dir: PathBuf,
    name: String,
}

impl SingleUseBarrier {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    fn check_name(&self) -> Result<(), BarrierError> {
        if self.name.is_empty() || self.name.contains('/') || self.name == "." || self.name == ".." {
            return Err(BarrierError::InvalidName(self.name.clone()));
        }
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> BarrierError {
        BarrierError::Io {
            path: self.path(),
            source,
        }
    }

    /// Create the barrier for `participants` joiners.
    ///
    /// # Errors
    /// Fails if the count is zero or does not fit the header, if a barrier
    /// with the same name already exists, or on any I/O error.  A partially
    /// created barrier is removed again.
    pub fn init(&self, participants: usize) -> Result<(), BarrierError> {
        self.check_name()?;
        if participants == 0 {
            return Err(BarrierError::NoParticipants);
        }
        let count =
            u32::try_from(participants).map_err(|_| BarrierError::TooManyParticipants(participants))?;

        let path = self.path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .mode(0o666)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => BarrierError::AlreadyExists(path.clone()),
                _ => self.io_error(e),
            })?;

        let result = file
            .set_len(HEADER_LEN as u64)
            .map_err(|e| self.io_error(e))
            .and_then(|()| map_header(&file, &path));

        let mapping = match result {
            Ok(mapping) => mapping,
            Err(e) => {
                let _ = fs::remove_file(&path);
                return Err(e);
            }
        };

        let header = barrier_header(&mapping);
        header.participants.store(count, Ordering::Relaxed);
        header.remaining.store(count, Ordering::Relaxed);
        header.released.store(0, Ordering::Relaxed);
        header.magic.store(BARRIER_MAGIC, Ordering::Release);

        info!(barrier = %self.name, participants = count, "Barrier initialized");
        Ok(())
    }

    fn open(&self) -> Result<(File, MmapMut), BarrierError> {
        self.check_name()?;
        let path = self.path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => BarrierError::NotFound(path.clone()),
                _ => self.io_error(e),
            })?;

        let len = file.metadata().map_err(|e| self.io_error(e))?.len();
        if len < HEADER_LEN as u64 {
            return Err(BarrierError::Corrupt(path));
        }

        let mapping = map_header(&file, &path)?;
        if barrier_header(&mapping).magic.load(Ordering::Acquire) != BARRIER_MAGIC {
            return Err(BarrierError::Corrupt(path));
        }
        Ok((file, mapping))
    }

    /// Read the current state of the barrier.
    pub fn inspect(&self) -> Result<BarrierState, BarrierError> {
        let (_file, mapping) = self.open()?;
        let header = barrier_header(&mapping);
        Ok(BarrierState {
            participants: header.participants.load(Ordering::Acquire),
            remaining: header.remaining.load(Ordering::Acquire),
            released: header.released.load(Ordering::Acquire) != 0,
        })
    }

    /// Arrive at the barrier and block until every participant has arrived.
    ///
    /// The last participant releases the others and unlinks the barrier.
    /// Earlier participants sleep on a futex on the `released` word.
    pub fn join(&self) -> Result<(), BarrierError> {
        let (_file, mapping) = self.open()?;
        let header = barrier_header(&mapping);

        let previous = header
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| r.checked_sub(1))
            .map_err(|_| BarrierError::Consumed(self.path()))?;

        if previous == 1 {
            header.released.store(1, Ordering::Release);
            futex_wake_all(&header.released);
            debug!(barrier = %self.name, "Last participant arrived, releasing barrier");
            if let Err(e) = fs::remove_file(self.path()) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(barrier = %self.name, error = %e, "Failed to unlink barrier");
                }
            }
            return Ok(());
        }

        while header.released.load(Ordering::Acquire) == 0 {
            futex_wait(&header.released, 0);
        }
        Ok(())
    }

    /// Unlink the barrier name.  Used to clean up after an aborted launch.
    pub fn remove(&self) -> Result<(), BarrierError> {
        self.check_name()?;
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn barrier(dir: &TempDir) -> SingleUseBarrier {
        SingleUseBarrier::new(dir.path(), "TEST_BARRIER")
    }

    #[test]
    fn init_sizes_barrier_to_participant_count() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(5).unwrap();

        let state = b.inspect().unwrap();
        assert_eq!(
            state,
            BarrierState {
                participants: 5,
                remaining: 5,
                released: false
            }
        );
    }

    #[test]
    fn init_rejects_zero_participants() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        assert!(matches!(b.init(0), Err(BarrierError::NoParticipants)));
        assert!(!b.path().exists());
    }

    #[test]
    fn init_rejects_name_collision() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(2).unwrap();
        assert!(matches!(b.init(2), Err(BarrierError::AlreadyExists(_))));
    }

    #[test]
    fn init_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        for name in ["", "a/b", ".."] {
            let b = SingleUseBarrier::new(dir.path(), name);
            assert!(matches!(b.init(1), Err(BarrierError::InvalidName(_))), "{name:?}");
        }
    }

    #[test]
    fn init_in_missing_directory_is_io_error() {
        let b = SingleUseBarrier::new("/nonexistent/barrier/dir", "B");
        assert!(matches!(b.init(1), Err(BarrierError::Io { .. })));
    }

    #[test]
    fn single_participant_passes_straight_through() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(1).unwrap();
        b.join().unwrap();
        assert!(!b.path().exists(), "last joiner must unlink the barrier");
    }

    #[test]
    fn joiners_wait_for_the_last_arrival() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(3).unwrap();

        let released = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let b = b.clone();
                let released = Arc::clone(&released);
                thread::spawn(move || {
                    b.join().unwrap();
                    released.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        // Wait until both early joiners have arrived.
        while b.inspect().unwrap().remaining != 1 {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(released.load(Ordering::SeqCst), 0, "released before last arrival");

        b.join().unwrap();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(released.load(Ordering::SeqCst), 2);
        assert!(!b.path().exists());
    }

    fn thread_cpu_time() -> Duration {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid out-pointer for the duration of the call.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
        assert_eq!(rc, 0);
        Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
    }

    #[test]
    fn waiting_joiner_sleeps_instead_of_spinning() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(2).unwrap();

        let early = b.clone();
        let waiter = thread::spawn(move || {
            let before = thread_cpu_time();
            early.join().unwrap();
            thread_cpu_time() - before
        });

        while b.inspect().unwrap().remaining != 1 {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(300));
        b.join().unwrap();

        let cpu = waiter.join().unwrap();
        assert!(cpu < Duration::from_millis(100), "waiter burned {cpu:?} of CPU");
    }

    #[test]
    fn consumed_barrier_cannot_be_joined_again() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(1).unwrap();
        b.join().unwrap();
        assert!(matches!(b.join(), Err(BarrierError::NotFound(_))));
    }

    #[test]
    fn foreign_file_is_not_a_barrier() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        fs::write(b.path(), [0u8; HEADER_LEN]).unwrap();
        assert!(matches!(b.join(), Err(BarrierError::Corrupt(_))));

        fs::write(b.path(), b"RT").unwrap();
        assert!(matches!(b.inspect(), Err(BarrierError::Corrupt(_))));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let b = barrier(&dir);
        b.init(2).unwrap();
        b.remove().unwrap();
        b.remove().unwrap();
        assert!(!b.path().exists());
    }
}
