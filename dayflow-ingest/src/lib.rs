//! dayflow-ingest: record mapping between on-disk documents and dayflow-core entities.
//!
//! A [`Snapshot`] is the JSON document the CLI reads and writes. The CSV
//! parsers turn spreadsheet exports into the same entities, skipping rows they
//! cannot make sense of.

pub mod parsers;
pub mod snapshot;

pub use parsers::{parse_availability_csv, parse_executions_csv, parse_tasks_csv};
pub use snapshot::{load_snapshot, save_snapshot, EnergyEntry, Snapshot};
