// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Weekly roll-up counts over the report's tickets (status, assignee, deadlines, comments)
// role: stats/aggregation
// inputs: Ticket forest (walked with descendants), counting window, local `today`
// outputs: WeeklyStats (serializable, BTreeMap-ordered for stable JSON)
// invariants:
// - Every ticket in the forest is counted once, children included
// - Created/updated counts use the open interval (start, end)
// - Closed tickets are never overdue or due soon
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::arrange::{UNASSIGNED, UNSET};
use crate::model::Ticket;

const CLOSED_MARKERS: [&str; 6] = ["完了", "終了", "クローズ", "Closed", "Resolved", "Done"];
const UNKNOWN_AUTHOR: &str = "unknown";
const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct CommentStats {
  pub total: usize,
  pub tickets_with_comments: usize,
  pub by_author: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct WeeklyStats {
  pub total: usize,
  pub by_status: BTreeMap<String, usize>,
  pub by_assignee: BTreeMap<String, usize>,
  pub by_tracker: BTreeMap<String, usize>,
  pub by_priority: BTreeMap<String, usize>,
  pub created: usize,
  pub updated: usize,
  pub closed: usize,
  pub overdue_ids: Vec<u64>,
  pub due_soon_ids: Vec<u64>,
  pub comments: CommentStats,
}

pub fn is_closed_status(status: &str) -> bool {
  CLOSED_MARKERS.iter().any(|m| status.contains(m))
}

/// Roll up the forest. `window` bounds the created/updated counts; `today` drives deadline checks.
pub fn compute(roots: &[Ticket], window: (DateTime<Utc>, DateTime<Utc>), today: NaiveDate) -> WeeklyStats {
  let mut stats = WeeklyStats::default();
  // explicit stack keeps the walk pre-order without recursing per level
  let mut pending: Vec<&Ticket> = roots.iter().rev().collect();
  while let Some(t) = pending.pop() {
    tally(t, window, today, &mut stats);
    pending.extend(t.children.iter().rev());
  }
  stats
}

fn tally(t: &Ticket, window: (DateTime<Utc>, DateTime<Utc>), today: NaiveDate, stats: &mut WeeklyStats) {
  let (start, end) = window;
  let inside = |at: Option<DateTime<Utc>>| at.is_some_and(|at| at > start && at < end);

  stats.total += 1;
  let status = t.status_name().unwrap_or(UNSET);
  bump(&mut stats.by_status, status);
  bump(&mut stats.by_assignee, t.assignee_name().unwrap_or(UNASSIGNED));
  bump(&mut stats.by_tracker, t.tracker_name().unwrap_or(UNSET));
  bump(&mut stats.by_priority, t.priority_name().unwrap_or(UNSET));

  if inside(t.created_on) {
    stats.created += 1;
  }
  if inside(t.updated_on) {
    stats.updated += 1;
  }

  let closed = is_closed_status(status);
  if closed {
    stats.closed += 1;
  } else if let Some(due) = t.due_date {
    if due < today {
      stats.overdue_ids.push(t.id);
    } else if due < today + Duration::days(DUE_SOON_DAYS) {
      stats.due_soon_ids.push(t.id);
    }
  }

  let mut with_text = 0;
  for c in t.comments.iter().filter(|c| c.has_text()) {
    with_text += 1;
    let author = Some(c.author_name()).filter(|a| !a.is_empty()).unwrap_or(UNKNOWN_AUTHOR);
    bump(&mut stats.comments.by_author, author);
  }
  stats.comments.total += with_text;
  if with_text > 0 {
    stats.comments.tickets_with_comments += 1;
  }
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str) {
  *map.entry(key.to_string()).or_insert(0) += 1;
}
