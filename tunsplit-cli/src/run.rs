//! Split scenario: set up, check, wait for resume, check again

use anyhow::{Context, Result};
use tracing::{debug, info};
use tunsplit_check::{KernelBackend, check_split_consistency};
use tunsplit_core::{Checkpoint, Error, Finding, ProcessId, RunOutcome};
use tunsplit_namespace::{IpCommand, NetnsManager, spawn_isolated_child};
use tunsplit_tun::TunDevice;

use crate::cli::RunArgs;
use crate::config::ScenarioConfig;
use crate::harness::{self, ResumeSignal};

pub fn execute(args: &RunArgs) -> Result<RunOutcome> {
    info!("🦀 Starting split TUN check");

    let config = ScenarioConfig::from_args(args)?;
    debug!(?config, "Scenario configuration");

    // Validate we're running as root
    if !nix::unistd::geteuid().is_root() {
        anyhow::bail!("Must run as root. Try: sudo tunsplit run ...");
    }

    // === PARENT NAMESPACE (before the device exists) ===
    NetnsManager::new(config.netns.clone())
        .create()
        .context("Failed to create parent network namespace")?;

    info!("📡 Opening {}", config.tun.name);
    let device = TunDevice::open(&config.tun).context("No tun device")?;

    // === CHILD NAMESPACE (fork happens before any runtime exists) ===
    let child = spawn_isolated_child(&config.netns).context("Failed to start child")?;
    info!("👶 Child {} parked in its own namespace", child.pid());

    IpCommand::from_config(&config.netns)
        .move_link(device.name(), child.pid())
        .context("Can't move to another NS")?;

    info!("🔀 Moved {} into namespace of {}", device.name(), child.pid());

    let backend = KernelBackend::new();
    let parent = ProcessId::current();
    let mut outcome = RunOutcome::new();

    outcome.record(
        Checkpoint::AfterRelocation,
        consistency_findings(&backend, &device, parent, child.pid())?,
    );

    // === SUSPEND POINT ===
    let resume = ResumeSignal::install()?;
    harness::announce_ready(config.pidfile.as_deref())?;

    if config.wait_for_resume {
        resume.wait()?;
    } else {
        info!("⏭️  Not waiting for resume");
    }

    let mut findings: Vec<Finding> = device
        .verify_attachment()
        .into_iter()
        .map(Finding::Attachment)
        .collect();
    findings.extend(consistency_findings(&backend, &device, parent, child.pid())?);

    outcome.record(Checkpoint::AfterResume, findings);

    // The child is killed and reaped here
    drop(child);

    Ok(outcome)
}

/// Run one consistency check; a violated invariant becomes a finding,
/// anything else aborts the run.
fn consistency_findings(
    backend: &KernelBackend,
    device: &TunDevice,
    parent: ProcessId,
    child: ProcessId,
) -> Result<Vec<Finding>> {
    match check_split_consistency(backend, device, parent, child) {
        Ok(()) => Ok(Vec::new()),
        Err(Error::Consistency(violation)) => Ok(vec![Finding::Consistency(violation)]),
        Err(e) => Err(e).context("Consistency check could not run"),
    }
}
