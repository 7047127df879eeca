// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one run: load the dump, filter by range, annotate tickets, build the forest, arrange, report
// role: processing/orchestrator
// inputs: EffectiveConfig, resolved `now`
// outputs: Report JSON on stdout or in --out
// side_effects: Reads the input file or stdin; writes the report
// invariants:
// - Configuration is validated before any input is read
// - Per-ticket work runs in parallel and only touches its own ticket
// - Forest building and arranging are sequential and move tickets, never clone them
// errors: ConfigError for bad flags; I/O and JSON errors carry the input path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Read;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::arrange::{arrange, Arranged};
use crate::cli::EffectiveConfig;
use crate::hierarchy::{build_forest, count_tickets};
use crate::model::{Ticket, TicketDump};
use crate::params::{build_pipeline_params, PipelineParams};
use crate::render::{build_report, save_report};
use crate::stats::{self, WeeklyStats};

/// Read a ticket dump from a path, or stdin for "-".
pub fn load_tickets(input: &str) -> Result<Vec<Ticket>> {
  let raw = if input == "-" {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).context("reading tickets from stdin")?;
    buf
  } else {
    std::fs::read_to_string(input).with_context(|| format!("reading tickets from {input}"))?
  };

  let dump: TicketDump =
    serde_json::from_str(&raw).with_context(|| format!("parsing ticket dump {input}"))?;
  if let Some(total) = dump.total_count() {
    debug!(total, "tracker reported total_count");
  }
  Ok(dump.into_tickets())
}

#[derive(Debug)]
pub struct Processed {
  pub arranged: Arranged,
  pub root_count: usize,
  pub ticket_count: usize,
  pub stats: Option<WeeklyStats>,
}

/// Range filter, comment selection, annotation, forest, statistics, arrangement.
pub fn run_pipeline(tickets: Vec<Ticket>, params: &PipelineParams) -> Processed {
  let loaded = tickets.len();
  let mut tickets: Vec<Ticket> = match &params.range {
    Some(range) => tickets.into_iter().filter(|t| range.contains(t)).collect(),
    None => tickets,
  };
  debug!(loaded, kept = tickets.len(), "range filter");

  tickets.par_iter_mut().for_each(|t| {
    if let Some(selector) = &params.selector {
      t.comments = selector.filter(&t.comments);
    }
    params.annotator.annotate(t);
  });

  let forest = build_forest(tickets);
  let root_count = forest.len();
  let ticket_count = count_tickets(&forest);
  debug!(root_count, ticket_count, "forest built");

  let stats = params.stats.as_ref().map(|s| stats::compute(&forest, s.window, s.today));
  let arranged = arrange(forest, params.sort, params.group);

  Processed { arranged, root_count, ticket_count, stats }
}

pub fn process(cfg: &EffectiveConfig, now: DateTime<Utc>) -> Result<()> {
  let params = build_pipeline_params(cfg, now)?;
  let tickets = load_tickets(&cfg.input)?;
  info!(input = %cfg.input, count = tickets.len(), "loaded tickets");

  let processed = run_pipeline(tickets, &params);
  let report = build_report(cfg, &params, processed, now);
  save_report(&report, &cfg.out)
}
