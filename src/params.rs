use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::arrange::{GroupKey, SortSpec};
use crate::cli::EffectiveConfig;
use crate::comments::CommentSelector;
use crate::error::ConfigError;
use crate::extract::{parse_tag_rules, Annotator, TagExtractor, TagRule, TitleCleaner};
use crate::window::{parse_day, DateRange, WeekCalculator};

/// Window and reference day for the optional statistics block.
#[derive(Debug, Clone)]
pub struct StatsParams {
  pub window: (DateTime<Utc>, DateTime<Utc>),
  pub today: NaiveDate,
}

/// Everything the processing stages need, validated and resolved against `now`.
#[derive(Debug, Clone)]
pub struct PipelineParams {
  pub tz: Tz,
  pub range: Option<DateRange>,
  pub selector: Option<CommentSelector>,
  pub comments_since: Option<DateTime<Utc>>,
  pub annotator: Annotator,
  pub sort: Option<SortSpec>,
  pub group: Option<GroupKey>,
  pub stats: Option<StatsParams>,
}

fn resolve_range(cfg: &EffectiveConfig, calc: &WeekCalculator, now: DateTime<Utc>) -> Result<Option<DateRange>, ConfigError> {
  let mut range = match cfg.week.as_deref() {
    Some(spec) => Some(DateRange::new(cfg.date_field, calc.compute_range(spec, &now)?)),
    None => None,
  };

  if cfg.since.is_some() || cfg.until.is_some() {
    let r = range.get_or_insert(DateRange { field: cfg.date_field, start: None, end: None });
    if let Some(s) = cfg.since.as_deref() {
      r.start = Some(calc.start_of_day(parse_day("--since", s)?));
    }
    if let Some(u) = cfg.until.as_deref() {
      r.end = Some(calc.end_of_day(parse_day("--until", u)?));
    }
    if r.end.is_none() {
      r.end = Some(now.with_timezone(&calc.timezone()));
    }
  }

  Ok(range)
}

fn resolve_comments_since(
  raw: Option<&str>,
  range: Option<&DateRange>,
  calc: &WeekCalculator,
) -> Result<Option<DateTime<Utc>>, ConfigError> {
  let Some(raw) = raw else { return Ok(None) };
  match raw {
    "start" | "auto" => range
      .and_then(|r| r.start)
      .map(|s| Some(s.with_timezone(&Utc)))
      .ok_or_else(|| ConfigError::MissingRangeStart { flag: "--comments-since", value: raw.to_string() }),
    day => Ok(Some(calc.start_of_day(parse_day("--comments-since", day)?).with_timezone(&Utc))),
  }
}

pub fn build_pipeline_params(cfg: &EffectiveConfig, now: DateTime<Utc>) -> Result<PipelineParams, ConfigError> {
  let calc = WeekCalculator::new(&cfg.week_start, &cfg.tz)?;
  let range = resolve_range(cfg, &calc, now)?;
  let comments_since = resolve_comments_since(cfg.comments_since.as_deref(), range.as_ref(), &calc)?;

  let selector = if cfg.comments.is_some() || comments_since.is_some() || cfg.comments_by.is_some() {
    Some(CommentSelector::new(
      cfg.comments.as_deref().unwrap_or(""),
      comments_since,
      cfg.comments_by.clone(),
    )?)
  } else {
    None
  };

  let cap = selector.as_ref().and_then(|s| s.mode().cap());
  let mut rules = parse_tag_rules(&cfg.tags, cap)?;
  if rules.is_empty() {
    rules.push(TagRule { name: cfg.summary_tag.clone(), limit: cap.unwrap_or(0) });
  }
  debug!(?rules, ?cap, "tag rules");

  let cleaner = TitleCleaner::new(&cfg.clean_patterns);
  for (pattern, err) in cleaner.rejected() {
    warn!(%pattern, error = %err, "skipping invalid title cleaning pattern");
  }

  let annotator = Annotator {
    mode: cfg.mode,
    summary_tag: cfg.summary_tag.clone(),
    prefer_comments: cfg.prefer_comments,
    extractor: TagExtractor::new(rules, cfg.include_comments, cfg.tags_order),
    cleaner,
  };

  let sort = cfg.sort.as_deref().map(str::parse::<SortSpec>).transpose()?;
  let group = cfg.group_by.as_deref().map(str::parse::<GroupKey>).transpose()?;

  let stats = cfg.stats.then(|| StatsParams {
    window: range
      .as_ref()
      .map_or((now - Duration::days(7), now), |r| r.bounds_utc(now)),
    today: now.with_timezone(&calc.timezone()).date_naive(),
  });

  Ok(PipelineParams {
    tz: calc.timezone(),
    range,
    selector,
    comments_since,
    annotator,
    sort,
    group,
    stats,
  })
}
