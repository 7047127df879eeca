// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the ticket model read from tracker dumps and annotated by every processing stage
// role: model/types
// inputs: Tracker issues JSON (`{"issues": [...]}` or a bare array); field names follow the tracker API
// outputs: Serializable tickets with derived fields (cleaned_subject, summary, extracted_tags, children)
// invariants:
// - Decoding is lenient: null strings become "", unparsable dates become None
// - children is never read from input; only the hierarchy stage fills it
// - Comment timestamps are parsed lazily and cached; failures read as None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize};

/// A name-bearing reference such as a status, tracker or user.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Label {
  #[serde(default)]
  pub id: u64,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TicketRef {
  pub id: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Comment {
  #[serde(default)]
  pub id: u64,
  #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
  pub author: Option<Label>,
  /// Empty for pure field-change events.
  #[serde(rename = "notes", default, deserialize_with = "null_as_empty")]
  pub text: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub created_on: String,
  #[serde(skip)]
  parsed_created_on: OnceCell<Option<DateTime<Utc>>>,
}

impl Comment {
  #[cfg(test)]
  pub fn new(id: u64, author: &str, text: &str, created_on: &str) -> Self {
    Self {
      id,
      author: Some(Label { id: 0, name: author.to_string() }),
      text: text.to_string(),
      created_on: created_on.to_string(),
      parsed_created_on: OnceCell::new(),
    }
  }

  pub fn author_name(&self) -> &str {
    self.author.as_ref().map(|a| a.name.as_str()).unwrap_or("")
  }

  pub fn has_text(&self) -> bool {
    !self.text.is_empty()
  }

  /// Parsed `created_on`; computed on first use.
  pub fn created_at(&self) -> Option<DateTime<Utc>> {
    *self.parsed_created_on.get_or_init(|| parse_timestamp(&self.created_on))
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Ticket {
  pub id: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent: Option<TicketRef>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub subject: String,
  #[serde(default, skip_deserializing)]
  pub cleaned_subject: String,
  #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project: Option<Label>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tracker: Option<Label>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<Label>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<Label>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assigned_to: Option<Label>,
  #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
  pub start_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
  pub due_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
  pub created_on: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
  pub updated_on: Option<DateTime<Utc>>,
  #[serde(rename = "comments", alias = "journals", default, skip_serializing_if = "Vec::is_empty")]
  pub comments: Vec<Comment>,
  #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<Ticket>,
  #[serde(default, skip_deserializing, skip_serializing_if = "BTreeMap::is_empty")]
  pub extracted_tags: BTreeMap<String, Vec<String>>,
  #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
}

impl Ticket {
  #[cfg(test)]
  pub fn new(id: u64, subject: &str) -> Self {
    Self { id, subject: subject.to_string(), ..Self::default() }
  }

  pub fn parent_id(&self) -> Option<u64> {
    self.parent.map(|p| p.id)
  }

  pub fn assignee_name(&self) -> Option<&str> {
    label_name(&self.assigned_to)
  }

  pub fn status_name(&self) -> Option<&str> {
    label_name(&self.status)
  }

  pub fn tracker_name(&self) -> Option<&str> {
    label_name(&self.tracker)
  }

  pub fn project_name(&self) -> Option<&str> {
    label_name(&self.project)
  }

  pub fn priority_name(&self) -> Option<&str> {
    label_name(&self.priority)
  }

  /// Priority label id; trackers number priorities so that higher ids are more urgent.
  pub fn priority_rank(&self) -> Option<u64> {
    self.priority.as_ref().map(|p| p.id)
  }
}

/// Label name, treating a missing label and an empty name alike.
fn label_name(label: &Option<Label>) -> Option<&str> {
  label.as_ref().map(|l| l.name.as_str()).filter(|n| !n.is_empty())
}

/// Tracker API response wrapper; dumps may also be a bare array of tickets.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TicketDump {
  Response {
    issues: Vec<Ticket>,
    #[serde(default)]
    total_count: Option<u64>,
  },
  Bare(Vec<Ticket>),
}

impl TicketDump {
  /// Count the tracker reported for the whole query, when present.
  pub fn total_count(&self) -> Option<u64> {
    match self {
      TicketDump::Response { total_count, .. } => *total_count,
      TicketDump::Bare(_) => None,
    }
  }

  pub fn into_tickets(self) -> Vec<Ticket> {
    match self {
      TicketDump::Response { issues, .. } => issues,
      TicketDump::Bare(issues) => issues,
    }
  }
}

/// Parse an RFC3339 timestamp into UTC; anything else is absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  Ok(raw.as_deref().and_then(parse_timestamp))
}
