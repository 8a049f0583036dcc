//! Child process parked in its own network namespace
//!
//! This module uses `unsafe` for fork(), which is only sound while the
//! calling process is single-threaded. Call it before any runtime or
//! worker thread is started.

#![allow(unsafe_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::OwnedFd;

use nix::fcntl::OFlag;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, fork, pause, pipe2};
use tracing::{debug, info, warn};
use tunsplit_core::{Error, ProcessId, Result};

use crate::config::NetnsConfig;
use crate::manager::NetnsManager;

const READY: u8 = b'R';

/// Owns the child process; kills and reaps it on drop
#[derive(Debug)]
pub struct ChildGuard {
    pid: ProcessId,
}

impl ChildGuard {
    /// Child process ID
    #[must_use]
    pub const fn pid(&self) -> ProcessId {
        self.pid
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let pid = self.pid.as_nix_pid();

        if let Err(e) = kill(pid, Signal::SIGKILL) {
            debug!(pid = self.pid.as_raw(), error = %e, "Child already gone");
        }

        match waitpid(pid, None) {
            Ok(status) => debug!(pid = self.pid.as_raw(), ?status, "Child reaped"),
            Err(e) => warn!(pid = self.pid.as_raw(), error = %e, "Failed to reap child"),
        }
    }
}

/// Fork a child that creates its own network namespace and then idles
/// until killed.
///
/// Returns once the child's namespace exists, so the caller can move
/// devices into it right away.
///
/// # Errors
/// Returns error if fork fails or the child cannot set up its namespace
pub fn spawn_isolated_child(config: &NetnsConfig) -> Result<ChildGuard> {
    let (ready_rx, ready_tx) = pipe2(OFlag::O_CLOEXEC)?;

    debug!("Forking isolated child...");

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            drop(ready_tx);
            let guard = ChildGuard {
                pid: ProcessId::from(child),
            };

            wait_until_ready(ready_rx, guard.pid)?;
            info!(pid = guard.pid.as_raw(), "Child namespace ready");

            Ok(guard)
        }
        Ok(ForkResult::Child) => {
            drop(ready_rx);
            child_process(config, ready_tx)
        }
        Err(e) => Err(Error::Namespace {
            message: format!("Fork failed: {e}"),
        }),
    }
}

fn wait_until_ready(ready_rx: OwnedFd, pid: ProcessId) -> Result<()> {
    let mut byte = [0u8; 1];

    File::from(ready_rx)
        .read_exact(&mut byte)
        .map_err(|e| Error::Namespace {
            message: format!("Child {pid} exited before its namespace was ready: {e}"),
        })?;

    if byte[0] != READY {
        return Err(Error::Namespace {
            message: format!("Child {pid} sent unexpected readiness byte {:#04x}", byte[0]),
        });
    }

    Ok(())
}

/// Never returns: either idles forever or exits on setup failure.
/// Dropping the pipe on exit gives the parent EOF instead of a hang.
fn child_process(config: &NetnsConfig, ready_tx: OwnedFd) -> ! {
    let manager = NetnsManager::new(config.clone());

    if let Err(e) = manager.create() {
        eprintln!("child: {e}");
        std::process::exit(1);
    }

    if let Err(e) = File::from(ready_tx).write_all(&[READY]) {
        eprintln!("child: failed to signal readiness: {e}");
        std::process::exit(1);
    }

    loop {
        pause();
    }
}
