// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Order and bucket tickets for presentation (sort by field, group by category)
// role: ordering/grouping
// inputs: Ticket forest; optional SortSpec; optional GroupKey
// outputs: Arranged tickets (flat when sorting or grouping) plus group membership
// invariants:
// - Tickets without the sort field come after those with it, whichever the direction
// - Sorting is stable; equal keys keep their incoming order
// - Buckets appear in first-seen order; a sort applies inside each bucket only
// - Any sort or group request flattens the whole forest and clears children
// errors: ConfigError for unknown sort fields, directions, or group keys
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::ConfigError;
use crate::hierarchy::flatten_forest;
use crate::model::Ticket;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  UpdatedOn,
  CreatedOn,
  DueDate,
  StartDate,
  Priority,
  Id,
}

impl SortKey {
  fn default_descending(self) -> bool {
    matches!(self, SortKey::UpdatedOn | SortKey::CreatedOn | SortKey::Priority)
  }
}

impl FromStr for SortKey {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "updated_on" => Ok(SortKey::UpdatedOn),
      "created_on" => Ok(SortKey::CreatedOn),
      "due_date" => Ok(SortKey::DueDate),
      "start_date" => Ok(SortKey::StartDate),
      "priority" => Ok(SortKey::Priority),
      "id" => Ok(SortKey::Id),
      other => Err(ConfigError::UnknownSortKey(other.to_string())),
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortSpec {
  pub key: SortKey,
  pub descending: bool,
}

impl FromStr for SortSpec {
  type Err = ConfigError;

  /// `field`, `field:asc`, `field:desc`, `field_asc`, or `field_desc`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    let (field, direction) = match s.split_once(':') {
      Some((f, d)) => (f, Some(d)),
      None => match (s.strip_suffix("_asc"), s.strip_suffix("_desc")) {
        (Some(f), _) => (f, Some("asc")),
        (_, Some(f)) => (f, Some("desc")),
        _ => (s, None),
      },
    };

    let key: SortKey = field.parse()?;
    let descending = match direction {
      None => key.default_descending(),
      Some("asc") => false,
      Some("desc") => true,
      Some(other) => return Err(ConfigError::UnknownSortDirection(other.to_string())),
    };
    Ok(SortSpec { key, descending })
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
  Assignee,
  Status,
  Tracker,
  Project,
  Priority,
}

impl FromStr for GroupKey {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "assignee" => Ok(GroupKey::Assignee),
      "status" => Ok(GroupKey::Status),
      "tracker" => Ok(GroupKey::Tracker),
      "project" => Ok(GroupKey::Project),
      "priority" => Ok(GroupKey::Priority),
      other => Err(ConfigError::UnknownGroupKey(other.to_string())),
    }
  }
}

pub const UNASSIGNED: &str = "unassigned";
pub const UNSET: &str = "unset";

impl GroupKey {
  /// Bucket label for a ticket.
  pub fn label_of(self, t: &Ticket) -> String {
    let (name, fallback) = match self {
      GroupKey::Assignee => (t.assignee_name(), UNASSIGNED),
      GroupKey::Status => (t.status_name(), UNSET),
      GroupKey::Tracker => (t.tracker_name(), UNSET),
      GroupKey::Project => (t.project_name(), UNSET),
      GroupKey::Priority => (t.priority_name(), UNSET),
    };
    name.unwrap_or(fallback).to_string()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
  pub key: String,
  pub ticket_ids: Vec<u64>,
}

#[derive(Debug, Default)]
pub struct Arranged {
  pub tickets: Vec<Ticket>,
  pub groups: Option<Vec<GroupInfo>>,
}

/// Sortable value of a ticket for one key.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
  Instant(DateTime<Utc>),
  Day(NaiveDate),
  Number(u64),
}

fn sort_value(key: SortKey, t: &Ticket) -> Option<SortValue> {
  match key {
    SortKey::UpdatedOn => t.updated_on.map(SortValue::Instant),
    SortKey::CreatedOn => t.created_on.map(SortValue::Instant),
    SortKey::DueDate => t.due_date.map(SortValue::Day),
    SortKey::StartDate => t.start_date.map(SortValue::Day),
    SortKey::Priority => t.priority_rank().map(SortValue::Number),
    SortKey::Id => Some(SortValue::Number(t.id)),
  }
}

/// Stable sort; missing values always trail.
pub fn sort_tickets(tickets: &mut [Ticket], spec: SortSpec) {
  tickets.sort_by(|a, b| match (sort_value(spec.key, a), sort_value(spec.key, b)) {
    (Some(x), Some(y)) => {
      if spec.descending {
        y.cmp(&x)
      } else {
        x.cmp(&y)
      }
    }
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  });
}

/// Split into buckets in first-seen order.
pub fn group_tickets(tickets: Vec<Ticket>, key: GroupKey) -> Vec<(String, Vec<Ticket>)> {
  let mut buckets: Vec<(String, Vec<Ticket>)> = Vec::new();
  for t in tickets {
    let label = key.label_of(&t);
    match buckets.iter_mut().find(|(k, _)| *k == label) {
      Some((_, members)) => members.push(t),
      None => buckets.push((label, vec![t])),
    }
  }
  buckets
}

/// Apply the requested sort and grouping. Without either, the forest passes through untouched.
pub fn arrange(forest: Vec<Ticket>, sort: Option<SortSpec>, group: Option<GroupKey>) -> Arranged {
  if sort.is_none() && group.is_none() {
    return Arranged { tickets: forest, groups: None };
  }

  let mut flat = flatten_forest(forest);

  let Some(key) = group else {
    if let Some(spec) = sort {
      sort_tickets(&mut flat, spec);
    }
    return Arranged { tickets: flat, groups: None };
  };

  let mut tickets = Vec::with_capacity(flat.len());
  let mut groups = Vec::new();
  for (label, mut members) in group_tickets(flat, key) {
    if let Some(spec) = sort {
      sort_tickets(&mut members, spec);
    }
    groups.push(GroupInfo { key: label, ticket_ids: members.iter().map(|t| t.id).collect() });
    tickets.extend(members);
  }

  Arranged { tickets, groups: Some(groups) }
}
