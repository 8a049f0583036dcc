//! Namespace identity lookup

use anyhow::{Context, Result};
use tunsplit_core::ProcessId;
use tunsplit_namespace::{namespace_path, process_namespace_id};

pub fn execute(pid: Option<i32>) -> Result<()> {
    let pid = pid.map_or_else(ProcessId::current, ProcessId::from_raw);

    let id = process_namespace_id(pid)
        .with_context(|| format!("Failed to read {}", namespace_path(pid).display()))?;

    println!("{pid}: {id}");
    Ok(())
}
