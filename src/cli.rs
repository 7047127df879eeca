use anyhow::{bail, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::{ReportMode, TagOrder, DEFAULT_SUMMARY_TAG};
use crate::window::{parse_day, DateField};

#[derive(Parser, Debug)]
#[command(
    name = "ticket-activity-report",
    version,
    about = "Turn exported issue-tracker tickets into a weekly JSON activity report",
    long_about = None
)]
pub struct Cli {
  /// Ticket dump to read: tracker `issues` response or a bare JSON array ("-" = stdin)
  #[arg(long, default_value = "-")]
  pub input: String,

  /// Output file for the report (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// What to derive per ticket: summary, full, or tags
  #[arg(long, value_enum, default_value_t = ReportMode::Summary)]
  pub mode: ReportMode,

  /// Tags to extract in tags mode, e.g. "Progress:3,Issues" (limit 0 = unlimited)
  #[arg(long)]
  pub tags: Option<String>,

  /// Tag whose first value becomes the ticket summary
  #[arg(long, default_value = DEFAULT_SUMMARY_TAG)]
  pub summary_tag: String,

  /// Also extract tags from (selected) comments
  #[arg(long)]
  pub include_comments: bool,

  /// Presentation order of extracted tag values
  #[arg(long, value_enum, default_value_t = TagOrder::Newest)]
  pub tags_order: TagOrder,

  /// Read the summary/tags from the latest comment with text instead of the description
  #[arg(long)]
  pub prefer_comments: bool,

  /// Regex removed from every subject (repeatable, applied in order)
  #[arg(long = "clean-pattern")]
  pub clean_patterns: Vec<String>,

  /// Report week: last, this, or YYYY-W (e.g. 2025-2)
  #[arg(long)]
  pub week: Option<String>,

  /// First day of the week: mon or sun
  #[arg(long, default_value = "mon")]
  pub week_start: String,

  /// IANA timezone for week boundaries and local dates
  #[arg(long, default_value = "Asia/Tokyo")]
  pub tz: String,

  /// Ticket field the week / since / until range applies to
  #[arg(long, value_enum, default_value_t = DateField::UpdatedOn)]
  pub date_field: DateField,

  /// Range start (YYYY-MM-DD, inclusive); overrides the week start
  #[arg(long)]
  pub since: Option<String>,

  /// Range end (YYYY-MM-DD, inclusive through 23:59:59); overrides the week end
  #[arg(long)]
  pub until: Option<String>,

  /// Comment selection: all, last, or n:<count>
  #[arg(long)]
  pub comments: Option<String>,

  /// Keep comments from this point on: start (range start) or YYYY-MM-DD
  #[arg(long)]
  pub comments_since: Option<String>,

  /// Keep only comments by this author (exact name)
  #[arg(long)]
  pub comments_by: Option<String>,

  /// Sort field, optionally with direction: updated_on, due_date:asc, priority_desc, ...
  #[arg(long)]
  pub sort: Option<String>,

  /// Group tickets by assignee, status, tracker, project, or priority
  #[arg(long)]
  pub group_by: Option<String>,

  /// Add weekly statistics to the report
  #[arg(long)]
  pub stats: bool,

  /// Debug logging on stderr (RUST_LOG overrides)
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for week resolution (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub input: String,
  pub out: String,
  pub mode: ReportMode,
  pub tags: String,
  pub summary_tag: String,
  pub include_comments: bool,
  pub tags_order: TagOrder,
  pub prefer_comments: bool,
  pub clean_patterns: Vec<String>,
  pub week: Option<String>,
  pub week_start: String,
  pub tz: String,
  pub date_field: DateField,
  pub since: Option<String>,
  pub until: Option<String>,
  pub comments: Option<String>,
  pub comments_since: Option<String>,
  pub comments_by: Option<String>,
  pub sort: Option<String>,
  pub group_by: Option<String>,
  pub stats: bool,
  pub now_override: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Explicit range bound: `auto` needs persisted run state, which this tool does not keep.
fn explicit_day(flag: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
  match non_empty(value) {
    Some(v) if v.eq_ignore_ascii_case("auto") => Err(ConfigError::AutoDateUnsupported(flag)),
    Some(v) => Ok(Some(parse_day(flag, &v)?.format("%Y-%m-%d").to_string())),
    None => Ok(None),
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let since = explicit_day("--since", cli.since)?;
  let until = explicit_day("--until", cli.until)?;
  if let (Some(s), Some(u)) = (&since, &until) {
    if s > u {
      bail!("--since {s} is after --until {u}");
    }
  }

  let summary_tag = cli.summary_tag.trim().to_string();
  if summary_tag.is_empty() {
    bail!("--summary-tag must not be empty");
  }

  let mut tags = non_empty(cli.tags).unwrap_or_default();
  if !tags.is_empty() && cli.mode != ReportMode::Tags {
    bail!("--tags only applies with --mode tags");
  }
  if tags.is_empty() && cli.mode == ReportMode::Tags {
    tags = summary_tag.clone();
  }

  Ok(EffectiveConfig {
    input: cli.input,
    out: cli.out,
    mode: cli.mode,
    tags,
    summary_tag,
    include_comments: cli.include_comments,
    tags_order: cli.tags_order,
    prefer_comments: cli.prefer_comments,
    clean_patterns: cli.clean_patterns,
    week: non_empty(cli.week),
    week_start: cli.week_start.trim().to_ascii_lowercase(),
    tz: cli.tz.trim().to_string(),
    date_field: cli.date_field,
    since,
    until,
    comments: non_empty(cli.comments),
    comments_since: non_empty(cli.comments_since),
    comments_by: non_empty(cli.comments_by),
    sort: non_empty(cli.sort),
    group_by: non_empty(cli.group_by),
    stats: cli.stats,
    now_override: cli.now_override,
  })
}
