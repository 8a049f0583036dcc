//! Checkpoint harness protocol: readiness, resume signal, final verdict

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::{info, warn};
use tunsplit_core::{ProcessId, RunOutcome};

/// Result of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed
    Pass,
    /// At least one check recorded a finding
    Fail,
}

impl Verdict {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Pass => ExitCode::SUCCESS,
            Self::Fail => ExitCode::FAILURE,
        }
    }
}

/// Signal streams for the resume wait.
///
/// Install before announcing readiness: SIGTERM may arrive as soon as the
/// pidfile exists, and its default action would kill us.
pub struct ResumeSignal {
    runtime: Runtime,
    terminate: Signal,
    interrupt: Signal,
}

impl ResumeSignal {
    /// Build a current-thread runtime and register SIGTERM/SIGINT
    pub fn install() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build runtime")?;

        let (terminate, interrupt) = {
            let _guard = runtime.enter();
            (
                signal(SignalKind::terminate()).context("Failed to listen for SIGTERM")?,
                signal(SignalKind::interrupt()).context("Failed to listen for SIGINT")?,
            )
        };

        Ok(Self {
            runtime,
            terminate,
            interrupt,
        })
    }

    /// Block until SIGTERM or SIGINT arrives
    pub fn wait(self) -> Result<()> {
        let Self {
            runtime,
            mut terminate,
            mut interrupt,
        } = self;

        info!("⏸️  Waiting for resume signal (SIGTERM)...");

        runtime.block_on(async {
            tokio::select! {
                _ = terminate.recv() => info!("Received SIGTERM"),
                _ = interrupt.recv() => info!("Received SIGINT"),
            }
        });

        Ok(())
    }
}

/// Tell the harness we are ready to be checkpointed
pub fn announce_ready(pidfile: Option<&Path>) -> Result<()> {
    let pid = ProcessId::current();

    if let Some(path) = pidfile {
        std::fs::write(path, format!("{pid}\n"))
            .with_context(|| format!("Failed to write pidfile {}", path.display()))?;
    }

    info!(pid = pid.as_raw(), "✅ Ready");
    Ok(())
}

/// Print the final verdict with every recorded finding
pub fn report(outcome: &RunOutcome) -> Verdict {
    if outcome.passed() {
        println!("PASS");
        return Verdict::Pass;
    }

    if outcome.checks() == 0 {
        warn!("No checks were recorded");
    }

    println!(
        "FAIL: {} finding(s) in {} check(s)",
        outcome.findings().len(),
        outcome.checks()
    );
    for (checkpoint, finding) in outcome.findings() {
        println!("  [{checkpoint}] {finding}");
    }

    Verdict::Fail
}
