use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use clap::Subcommand;
use dayflow_core::{
    select_day_inputs, BurnoutForecast, ScoreCalculator, ScoreRecord, ScoreType,
    WeeklySummary,
};
use dayflow_ingest::{save_snapshot, Snapshot};
use std::path::PathBuf;

use crate::config::Config;
use crate::state::load_input;

#[derive(Subcommand, Debug)]
pub enum ScoreCommand {
    /// Score one day and record it in the snapshot
    Daily {
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Aggregate a week of daily scores and record the result
    Weekly {
        /// Monday of the week (default: this week's Monday)
        #[arg(long)]
        week_start: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Recorded daily scores for the last N days
    History {
        #[arg(long, default_value_t = 14)]
        days: u32,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Burnout forecast from recorded daily scores
    Trend {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn run(cfg: &Config, input: Option<PathBuf>, cmd: ScoreCommand) -> Result<()> {
    let (path, mut snapshot) = load_input(input)?;

    match cmd {
        ScoreCommand::Daily { date, json } => {
            let date = match date {
                Some(d) => d,
                None => cfg.today()?,
            };
            let record = score_day(&mut snapshot, date);
            save_snapshot(&path, &snapshot)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&format!("Daily score for {date}"), &record);
            }
        }

        ScoreCommand::Weekly { week_start, json } => {
            let week_start = match week_start {
                Some(d) => d,
                None => monday_of(cfg.today()?),
            };
            let summary = score_week(&mut snapshot, week_start);
            save_snapshot(&path, &snapshot)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_record(
                    &format!("Weekly score {} to {}", summary.week_start, summary.week_end),
                    &summary.record,
                );
            }
        }

        ScoreCommand::History { days, json } => {
            let records = history(&snapshot, cfg.today()?, days);
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("No daily scores in the last {days} days. Run: dayflow score daily");
            }
            for r in &records {
                println!(
                    "{}  {:>6.2}  done {}/{}  burnout {:.2} ({})",
                    r.date,
                    r.total_score,
                    r.tasks_completed,
                    r.tasks_total,
                    r.burnout_risk_index,
                    r.burnout_label()
                );
            }
        }

        ScoreCommand::Trend { json } => {
            let forecast = trend(&snapshot);
            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
                return Ok(());
            }
            match forecast {
                BurnoutForecast::InsufficientData => {
                    println!("Not enough daily scores yet. Run: dayflow score daily");
                }
                BurnoutForecast::Predicted(p) => {
                    println!(
                        "Predicted burnout risk {:.2} ({}), trend {:?} over {} days",
                        p.predicted_risk, p.risk_level, p.trend, p.based_on_days
                    );
                    println!("{}", p.recommendation);
                }
            }
        }
    }

    Ok(())
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Compute and upsert the daily record for `date`.
pub fn score_day(snapshot: &mut Snapshot, date: NaiveDate) -> ScoreRecord {
    let inputs = select_day_inputs(&snapshot.tasks, &snapshot.executions, date);
    let record = ScoreCalculator::compute_daily_score(&inputs.tasks, &inputs.executions, date);

    let mut book = snapshot.score_book();
    if book.upsert(record.clone()).is_some() {
        tracing::debug!(%date, "replaced daily score");
    }
    snapshot.set_scores(book);
    record
}

/// Rescore all seven days of the week starting at `week_start`, then record
/// their aggregate. Days with nothing due or completed count as zero records.
pub fn score_week(snapshot: &mut Snapshot, week_start: NaiveDate) -> WeeklySummary {
    let mut book = snapshot.score_book();
    let mut daily = Vec::with_capacity(7);

    for offset in 0..7 {
        let date = week_start + Duration::days(offset);
        let inputs = select_day_inputs(&snapshot.tasks, &snapshot.executions, date);
        let r = ScoreCalculator::compute_daily_score(&inputs.tasks, &inputs.executions, date);
        if let Some(old) = book.upsert(r.clone()) {
            if old != r {
                tracing::debug!(%date, "daily score changed since last recorded");
            }
        }
        daily.push(r);
    }

    let summary = ScoreCalculator::weekly_summary(&daily, week_start);
    book.upsert(summary.record.clone());
    snapshot.set_scores(book);
    summary
}

/// Daily records from `days` days before `today` up to `today`, oldest first.
pub fn history(snapshot: &Snapshot, today: NaiveDate, days: u32) -> Vec<ScoreRecord> {
    let since = today - Duration::days(i64::from(days));
    snapshot
        .score_book()
        .daily_since(since)
        .into_iter()
        .filter(|r| r.date <= today)
        .collect()
}

pub fn trend(snapshot: &Snapshot) -> BurnoutForecast {
    let daily = snapshot.score_book().daily_since(NaiveDate::MIN);
    ScoreCalculator::predict_burnout(&daily)
}

fn print_record(heading: &str, r: &ScoreRecord) {
    println!("# {heading}\n");
    println!("Total:            {:.2} / 100", r.total_score);
    println!("Completion:       {:.0}%", r.completion_rate * 100.0);
    println!("Discipline:       {:.2} / 10", r.discipline_score);
    println!("Focus:            {:.2} / 10", r.focus_score);
    println!("Energy alignment: {:.0}%", r.energy_alignment_rate * 100.0);
    println!(
        "Burnout risk:     {:.2} ({})",
        r.burnout_risk_index,
        r.burnout_label()
    );
    println!(
        "Tasks:            {} done, {} postponed, {} total",
        r.tasks_completed, r.tasks_postponed, r.tasks_total
    );
}
