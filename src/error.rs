// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed validation errors raised while turning flags into processing components
// role: errors/validation
// outputs: ConfigError variants with user-facing messages and hints
// invariants: Every variant is fatal for the run; data-quality problems never surface here
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("invalid comment selection mode '{0}'\n  hint: use all, last, or n:<count>")]
  InvalidCommentMode(String),

  #[error("invalid comment count '{0}'\n  hint: n:<count> needs a positive integer")]
  InvalidCommentCount(String),

  #[error("invalid week start '{0}'\n  hint: use mon or sun")]
  InvalidWeekStart(String),

  #[error("unknown timezone '{0}'\n  hint: use an IANA name such as Asia/Tokyo or UTC")]
  UnknownTimezone(String),

  #[error("invalid week '{0}'\n  hint: use last, this, or YYYY-W (e.g. 2025-2)")]
  InvalidWeekSpec(String),

  #[error("invalid limit '{value}' for tag '{name}'\n  hint: limits are integers >= 0 (0 = unlimited)")]
  InvalidTagLimit { name: String, value: String },

  #[error("tag rule '{0}' has no tag name\n  hint: write rules as Name or Name:<limit>")]
  EmptyTagName(String),

  #[error("unknown sort field '{0}'\n  hint: valid fields are updated_on, created_on, due_date, start_date, priority, id")]
  UnknownSortKey(String),

  #[error("unknown sort direction '{0}'\n  hint: use asc or desc")]
  UnknownSortDirection(String),

  #[error("unknown group key '{0}'\n  hint: valid keys are assignee, status, tracker, project, priority")]
  UnknownGroupKey(String),

  #[error("invalid date '{value}' for {flag}\n  hint: expected YYYY-MM-DD")]
  InvalidDate { flag: &'static str, value: String },

  #[error("{flag} {value} needs a range start\n  hint: combine it with --week or --since, or pass a YYYY-MM-DD date")]
  MissingRangeStart { flag: &'static str, value: String },

  #[error("'auto' is not supported for {0}\n  hint: pass an explicit YYYY-MM-DD date")]
  AutoDateUnsupported(&'static str),
}
