//! Work-session log CSV.
//!
//! Columns: `task_id,started_at,ended_at,energy,focus`. Ratings outside 1-10
//! are kept as unrecorded; a session whose end is not after its start keeps no end.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use dayflow_core::Execution;

use super::{field, parse_datetime, parse_rating};

pub fn parse_executions_csv(path: impl AsRef<Path>) -> Result<Vec<Execution>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    read_executions(file)
}

pub fn read_executions(input: impl io::Read) -> Result<Vec<Execution>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(input);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;

        let task_id = field(&record, 0);
        if task_id.is_empty() {
            continue;
        }
        let Some(started_at) = parse_datetime(field(&record, 1)) else {
            continue;
        };

        let mut execution = Execution::new(task_id, started_at);
        if let Some(ended_at) = parse_datetime(field(&record, 2)).filter(|e| *e > started_at) {
            execution.ended_at = Some(ended_at);
            execution.actual_duration_minutes = u32::try_from((ended_at - started_at).num_minutes()).ok();
        }
        execution.energy_level_during = parse_rating(field(&record, 3));
        execution.focus_score = parse_rating(field(&record, 4));

        out.push(execution);
    }

    Ok(out)
}
