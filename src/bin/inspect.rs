//! Runs the task engine over a JSON export of allocation documents and prints
//! tasks, statistics and timeline layout as JSON.
//!
//! Usage: `taskline-inspect <documents.json> (--org <id> | --email <address>)
//!         [--week YYYY-MM-DD] [--shift prev|next]...`
//!
//! Set `RUST_LOG=debug` to see degraded fields and skipped allocations.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use serde_json::json;

use taskline_lib::config::load_config;
use taskline_lib::engine::TaskEngine;

enum Scope {
    Org(String),
    Email(String),
}

struct Args {
    path: PathBuf,
    scope: Scope,
    week: Option<NaiveDate>,
    shifts: Vec<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut path = None;
    let mut scope = None;
    let mut week = None;
    let mut shifts = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--org" => scope = Some(Scope::Org(value(&mut args, "--org")?)),
            "--email" => scope = Some(Scope::Email(value(&mut args, "--email")?)),
            "--week" => {
                let raw = value(&mut args, "--week")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("Invalid --week date: {raw}"))?;
                week = Some(date);
            }
            "--shift" => shifts.push(value(&mut args, "--shift")?),
            other if other.starts_with("--") => bail!("Unknown flag: {other}"),
            other => path = Some(PathBuf::from(other)),
        }
    }

    Ok(Args {
        path: path.ok_or_else(|| anyhow!("Missing documents file"))?,
        scope: scope.ok_or_else(|| anyhow!("Pass --org <id> or --email <address>"))?,
        week,
        shifts,
    })
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next().ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let config = load_config().map_err(|e| anyhow!("{e} ({})", e.recovery_suggestion()))?;

    let engine = TaskEngine::from_path(&args.path, config).map_err(|e| {
        anyhow!("{}: {e} ({})", args.path.display(), e.recovery_suggestion())
    })?;

    let (tasks, summaries) = match &args.scope {
        Scope::Org(org_id) => (
            engine.list_tasks_by_org(org_id),
            engine.document_summaries(org_id),
        ),
        Scope::Email(email) => (engine.list_tasks_by_email(email), Vec::new()),
    };

    let mut window = match args.week {
        Some(date) => engine.window_for(date),
        None => engine.current_window(),
    };
    for direction in &args.shifts {
        window = engine
            .shift_window(&window, direction)
            .map_err(|e| anyhow!("{e} ({})", e.recovery_suggestion()))?;
    }

    let today = chrono::Utc::now()
        .with_timezone(&window.timezone())
        .date_naive();
    let overdue: Vec<&str> = engine
        .overdue_tasks(&tasks)
        .into_iter()
        .map(|t| t.id.as_str())
        .collect();

    let report = json!({
        "tasks": tasks,
        "stats": engine.compute_stats(&tasks),
        "production": engine.production_stats(&tasks),
        "overdue": overdue,
        "documents": summaries,
        "window": {
            "anchor": window.anchor(),
            "start": window.start(),
            "end": window.end(),
            "days": window.days(today),
        },
        "layout": engine.layout_tasks(&tasks, &window),
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
