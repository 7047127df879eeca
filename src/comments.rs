// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Select which of a ticket's comments survive into the report
// role: filtering/comments
// inputs: Selection mode (all | last | n:K), optional minimum instant, optional exact author
// outputs: A new comment list; input is never mutated
// invariants:
// - Filters apply in order: author, then date, then mode
// - `all` keeps empty-text history events; `last` and `n:K` only count comments with text
// - An active date filter drops comments whose timestamp cannot be parsed
// errors: ConfigError::InvalidCommentMode / InvalidCommentCount at construction only
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ConfigError;
use crate::model::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
  All,
  Last,
  LastN(usize),
}

impl SelectionMode {
  /// Count cap implied by `n:K`; used to bound tag limits.
  pub fn cap(self) -> Option<usize> {
    match self {
      SelectionMode::LastN(n) => Some(n),
      _ => None,
    }
  }
}

impl FromStr for SelectionMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "" | "all" => Ok(SelectionMode::All),
      "last" => Ok(SelectionMode::Last),
      other => {
        let count = other
          .strip_prefix("n:")
          .ok_or_else(|| ConfigError::InvalidCommentMode(other.to_string()))?;
        if count.contains(':') {
          return Err(ConfigError::InvalidCommentMode(other.to_string()));
        }
        match count.parse::<usize>() {
          Ok(n) if n > 0 => Ok(SelectionMode::LastN(n)),
          _ => Err(ConfigError::InvalidCommentCount(count.to_string())),
        }
      }
    }
  }
}

#[derive(Debug, Clone)]
pub struct CommentSelector {
  mode: SelectionMode,
  since: Option<DateTime<Utc>>,
  author: Option<String>,
}

impl CommentSelector {
  pub fn new(mode: &str, since: Option<DateTime<Utc>>, author: Option<String>) -> Result<Self, ConfigError> {
    Ok(Self {
      mode: mode.parse()?,
      since,
      author: author.filter(|a| !a.is_empty()),
    })
  }

  pub fn mode(&self) -> SelectionMode {
    self.mode
  }

  pub fn filter(&self, comments: &[Comment]) -> Vec<Comment> {
    let kept: Vec<&Comment> = comments
      .iter()
      .filter(|c| self.author.as_deref().map_or(true, |a| c.author_name() == a))
      .filter(|c| self.since.map_or(true, |bound| c.created_at().is_some_and(|t| t >= bound)))
      .collect();

    let picked: Vec<&Comment> = match self.mode {
      SelectionMode::All => kept,
      SelectionMode::Last => kept.into_iter().rev().find(|c| c.has_text()).into_iter().collect(),
      SelectionMode::LastN(n) => {
        let with_text: Vec<&Comment> = kept.into_iter().filter(|c| c.has_text()).collect();
        let skip = with_text.len().saturating_sub(n);
        with_text.into_iter().skip(skip).collect()
      }
    };

    picked.into_iter().cloned().collect()
  }
}
