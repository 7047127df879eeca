// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shape processed tickets into the report JSON and write it out
// role: rendering/output
// inputs: EffectiveConfig, PipelineParams, Processed tickets, resolved `now`
// outputs: Report { summary, groups?, stats?, tickets }
// side_effects: Writes the report file (creating parent directories) or prints to stdout
// invariants:
// - summary.ticket_count counts every ticket in the output, children included
// - summary mode leaves description and comments out of the tickets
// - An empty report is printed instead of written to --out
// errors: Write failures carry the target path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::arrange::GroupInfo;
use crate::cli::EffectiveConfig;
use crate::extract::{ReportMode, TagOrder, TagRule};
use crate::model::Ticket;
use crate::params::PipelineParams;
use crate::process::Processed;
use crate::stats::WeeklyStats;
use crate::window::{DateField, DateRange};

#[derive(Debug, Serialize)]
pub struct RangeSummary {
  pub field: DateField,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end: Option<String>,
}

impl From<&DateRange> for RangeSummary {
  fn from(r: &DateRange) -> Self {
    RangeSummary {
      field: r.field,
      start: r.start.map(|s| s.to_rfc3339_opts(SecondsFormat::Secs, true)),
      end: r.end.map(|e| e.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
  }
}

/// Options that shaped the report, echoed for readers of the JSON.
#[derive(Debug, Serialize)]
pub struct ReportOptions {
  pub timezone: String,
  pub week_start: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub week: Option<String>,
  pub summary_tag: String,
  pub tags: Vec<TagRule>,
  pub include_comments: bool,
  pub tags_order: TagOrder,
  pub prefer_comments: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comments: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comments_since: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comments_by: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub group_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
  pub generated_at: String,
  pub mode: ReportMode,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub range: Option<RangeSummary>,
  pub ticket_count: usize,
  pub root_count: usize,
  pub options: ReportOptions,
}

#[derive(Debug, Serialize)]
pub struct Report {
  pub summary: Summary,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub groups: Option<Vec<GroupInfo>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stats: Option<WeeklyStats>,
  pub tickets: Vec<Ticket>,
}

/// Drop long-form fields (description, comments) throughout the forest.
fn strip_detail(tickets: &mut [Ticket]) {
  let mut pending: Vec<&mut Ticket> = tickets.iter_mut().collect();
  while let Some(t) = pending.pop() {
    t.description.clear();
    t.comments.clear();
    pending.extend(t.children.iter_mut());
  }
}

pub fn build_report(cfg: &EffectiveConfig, params: &PipelineParams, processed: Processed, now: DateTime<Utc>) -> Report {
  let mut tickets = processed.arranged.tickets;
  if cfg.mode == ReportMode::Summary {
    strip_detail(&mut tickets);
  }

  let options = ReportOptions {
    timezone: params.tz.name().to_string(),
    week_start: cfg.week_start.clone(),
    week: cfg.week.clone(),
    summary_tag: cfg.summary_tag.clone(),
    tags: params.annotator.extractor.rules().to_vec(),
    include_comments: cfg.include_comments,
    tags_order: cfg.tags_order,
    prefer_comments: cfg.prefer_comments,
    comments: cfg.comments.clone(),
    comments_since: params.comments_since.map(|t| t.with_timezone(&params.tz).to_rfc3339_opts(SecondsFormat::Secs, true)),
    comments_by: cfg.comments_by.clone(),
    sort: cfg.sort.clone(),
    group_by: cfg.group_by.clone(),
  };

  Report {
    summary: Summary {
      generated_at: now.with_timezone(&params.tz).to_rfc3339_opts(SecondsFormat::Secs, true),
      mode: cfg.mode,
      range: params.range.as_ref().map(RangeSummary::from),
      ticket_count: processed.ticket_count,
      root_count: processed.root_count,
      options,
    },
    groups: processed.arranged.groups,
    stats: processed.stats,
    tickets,
  }
}

/// Write the report to `out`, or stdout for "-". Empty reports always go to stdout.
pub fn save_report(report: &Report, out: &str) -> Result<()> {
  let json = serde_json::to_string_pretty(report)?;

  if out == "-" || report.summary.ticket_count == 0 {
    if out != "-" {
      info!(out, "no tickets in range; printing instead of writing");
    }
    println!("{}", json);
    return Ok(());
  }

  let out_path = Path::new(out);
  if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(out_path, json).with_context(|| format!("writing report to {out}"))?;
  info!(out, tickets = report.summary.ticket_count, "report written");
  Ok(())
}
