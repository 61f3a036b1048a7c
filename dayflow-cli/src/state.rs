use anyhow::{bail, Context, Result};
use dayflow_ingest::{load_snapshot, Snapshot};
use std::fs;
use std::path::PathBuf;

/// Overrides `~/.dayflow`, mainly for tests and throwaway runs.
pub const HOME_ENV: &str = "DAYFLOW_HOME";

pub fn dayflow_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".dayflow"))
}

pub fn ensure_dayflow_home() -> Result<PathBuf> {
    let dir = dayflow_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn snapshot_path() -> Result<PathBuf> {
    Ok(ensure_dayflow_home()?.join("snapshot.json"))
}

pub fn model_path() -> Result<PathBuf> {
    Ok(ensure_dayflow_home()?.join("models").join("focus.json"))
}

/// `--input` when given, else the snapshot under the dayflow home.
pub fn resolve_snapshot(input: Option<PathBuf>) -> Result<PathBuf> {
    match input {
        Some(p) => Ok(p),
        None => snapshot_path(),
    }
}

pub fn load_input(input: Option<PathBuf>) -> Result<(PathBuf, Snapshot)> {
    let path = resolve_snapshot(input)?;
    if !path.exists() {
        bail!(
            "No snapshot at {}. Run: dayflow init, or dayflow import-csv",
            path.display()
        );
    }
    let snapshot = load_snapshot(&path)?;
    tracing::debug!(
        path = %path.display(),
        tasks = snapshot.tasks.len(),
        executions = snapshot.executions.len(),
        "loaded snapshot"
    );
    Ok((path, snapshot))
}
