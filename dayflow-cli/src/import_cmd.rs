use anyhow::{bail, Result};
use dayflow_ingest::{
    load_snapshot, parse_availability_csv, parse_executions_csv, parse_tasks_csv, save_snapshot,
    Snapshot,
};
use std::path::PathBuf;

use crate::state::resolve_snapshot;

pub fn run(
    tasks: Option<PathBuf>,
    availability: Option<PathBuf>,
    executions: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    if tasks.is_none() && availability.is_none() && executions.is_none() {
        bail!("Nothing to import (pass --tasks, --availability and/or --executions)");
    }

    let mut incoming = Snapshot::default();
    if let Some(p) = &tasks {
        incoming.tasks = parse_tasks_csv(p)?;
        println!("Parsed {} tasks from {}", incoming.tasks.len(), p.display());
    }
    if let Some(p) = &availability {
        incoming.availabilities = parse_availability_csv(p)?;
        println!(
            "Parsed {} availability slots from {}",
            incoming.availabilities.len(),
            p.display()
        );
    }
    if let Some(p) = &executions {
        incoming.executions = parse_executions_csv(p)?;
        println!("Parsed {} sessions from {}", incoming.executions.len(), p.display());
    }

    let out = resolve_snapshot(out)?;
    let mut snapshot = if out.exists() {
        load_snapshot(&out)?
    } else {
        Snapshot::default()
    };
    snapshot.merge(incoming);
    save_snapshot(&out, &snapshot)?;

    tracing::info!(path = %out.display(), tasks = snapshot.tasks.len(), "snapshot written");
    println!("Wrote {}", out.display());
    Ok(())
}
