//! CLI command implementations
//!
//! Every command loads config first, so a bad config is reported before any
//! query is planned.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::batch::{BatchController, PullSource};
use crate::config::ArchiveConfig;
use crate::expr::Expression;
use crate::metadata::StreamCatalog;
use crate::planner::{plan_query, ExplainPlan, QueryPlan};
use crate::range::ScanRange;
use crate::storage::{LogfileRow, MemoryLogfileTable};

use super::args::{Command, QueryArgs};
use super::errors::CliResult;
use super::io::{read_json_file, write_json, write_text};

/// Entry point used by `main`
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Plan { input } => plan(&input),
        Command::Explain { input, json } => explain(&input, json),
        Command::Pull {
            input,
            archive,
            max_batches,
        } => pull(&input, &archive, max_batches),
    }
}

/// Config, catalog and query of one invocation
struct Loaded {
    config: ArchiveConfig,
    catalog: StreamCatalog,
    query: Expression,
}

fn load(input: &QueryArgs) -> CliResult<Loaded> {
    let config = ArchiveConfig::load(&input.config)?;

    let mut catalog = StreamCatalog::from_json_file(&input.catalog)?;
    if config.prefilter.enabled {
        catalog = catalog.with_prefilter(
            config.prefilter.expected_items,
            config.prefilter.false_positive_rate,
        )?;
    }

    let query: Expression = read_json_file(&input.query)?;
    Ok(Loaded {
        config,
        catalog,
        query,
    })
}

fn plan_loaded(loaded: &Loaded) -> CliResult<QueryPlan> {
    let plan = plan_query(
        &loaded.query,
        &loaded.catalog,
        &loaded.config.optimizer(),
        &loaded.config.injector(),
    )?;
    Ok(plan)
}

/// Print the scan ranges as one JSON array
pub fn plan(input: &QueryArgs) -> CliResult<()> {
    let loaded = load(input)?;
    let plan = plan_loaded(&loaded)?;
    let ranges: Vec<ScanRange> = plan.ranges();
    write_json(&ranges)
}

/// Print the explain plan. A rejected query is explained, not failed.
pub fn explain(input: &QueryArgs, json: bool) -> CliResult<()> {
    let loaded = load(input)?;
    let explain = match plan_query(
        &loaded.query,
        &loaded.catalog,
        &loaded.config.optimizer(),
        &loaded.config.injector(),
    ) {
        Ok(plan) => ExplainPlan::from_plan(&plan),
        Err(err) => ExplainPlan::from_error(&err),
    };

    if json {
        write_json(&explain)
    } else {
        write_text(&explain.to_string())
    }
}

/// One delivered batch
#[derive(Debug, Serialize)]
struct BatchLine<'a> {
    session: &'a str,
    batch: usize,
    from: i64,
    to: i64,
    rows: &'a [LogfileRow],
}

/// Drive the pull loop until the source stops advancing
pub fn pull(input: &QueryArgs, archive: &Path, max_batches: Option<usize>) -> CliResult<()> {
    let loaded = load(input)?;
    let plan = plan_loaded(&loaded)?;
    let table = MemoryLogfileTable::from_json_file(archive)?;

    let mut source = BatchController::from_plan(
        &plan,
        table,
        loaded.config.batch_settings(),
        Utc::now().timestamp(),
    );
    let session = source.session_id().to_string();
    drive(&mut source, &session, max_batches)?;
    Ok(())
}

/// initial offset -> increment -> process -> commit, until the offset stops
/// moving or `max_batches` is reached. Returns the batches delivered.
fn drive<P: PullSource>(source: &mut P, session: &str, max_batches: Option<usize>) -> CliResult<usize> {
    let mut offset = source.initial_offset();
    let mut batch = 0usize;
    while max_batches.map_or(true, |max| batch < max) {
        let next = source.increment(offset)?;
        if next == offset {
            break;
        }
        let rows = source.process_between(offset, next)?;
        write_json(&BatchLine {
            session,
            batch,
            from: offset,
            to: next,
            rows: &rows,
        })?;
        source.commit(next);

        offset = next;
        batch += 1;
    }
    Ok(batch)
}
