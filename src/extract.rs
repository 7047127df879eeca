// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pull literal [Name]...[/Name] tag values out of ticket text and clean ticket titles
// role: extraction/annotation
// inputs: Tag rules (name + limit), description text, selected comments, title cleaning patterns
// outputs: Tag name -> values (newest first unless oldest requested); cleaned subject; one-line summary
// invariants:
// - Values are trimmed; blank values are dropped; tags with no values are omitted
// - Recency: later comments before earlier ones, later occurrences in a block before earlier ones, description last
// - Truncation keeps the most recent values and happens before oldest-first reversal
// - Pure functions of their inputs; no logging here
// errors: parse_tag_rules returns ConfigError::InvalidTagLimit; bad cleaning regexes are collected, not raised
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Comment, Ticket};

pub const DEFAULT_SUMMARY_TAG: &str = "要約";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRule {
  pub name: String,
  /// 0 = unlimited
  pub limit: usize,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TagOrder {
  #[default]
  Newest,
  Oldest,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
  #[default]
  Summary,
  Full,
  Tags,
}

/// All trimmed, non-blank values of `[name]...[/name]` in `text`, left to right.
/// Scanning stops at the first opening marker without a closing one.
pub fn tag_occurrences(text: &str, name: &str) -> Vec<String> {
  let open = format!("[{name}]");
  let close = format!("[/{name}]");
  let mut found = Vec::new();
  let mut rest = text;

  while let Some(start) = rest.find(&open) {
    let body = &rest[start + open.len()..];
    let Some(end) = body.find(&close) else { break };
    let value = body[..end].trim();
    if !value.is_empty() {
      found.push(value.to_string());
    }
    rest = &body[end + close.len()..];
  }

  found
}

/// First trimmed, non-blank value of the tag, if any.
pub fn first_tag_value(text: &str, name: &str) -> Option<String> {
  tag_occurrences(text, name).into_iter().next()
}

/// Parse `Name:3,Other,Third:0`. A comment cap bounds every limit (0 = unlimited defers to the cap).
pub fn parse_tag_rules(spec: &str, cap: Option<usize>) -> Result<Vec<TagRule>, ConfigError> {
  let mut rules = Vec::new();

  for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
    let (name, explicit) = match part.split_once(':') {
      Some((name, raw)) => {
        let name = name.trim();
        let raw = raw.trim();
        let limit = raw
          .parse::<i64>()
          .ok()
          .filter(|n| *n >= 0)
          .ok_or_else(|| ConfigError::InvalidTagLimit { name: name.to_string(), value: raw.to_string() })?;
        (name, limit as usize)
      }
      None => (part, 0),
    };
    if name.is_empty() {
      return Err(ConfigError::EmptyTagName(part.to_string()));
    }

    let limit = match (cap, explicit) {
      (Some(k), l) if l > 0 => l.min(k),
      (Some(k), _) => k,
      (None, l) => l,
    };
    rules.push(TagRule { name: name.to_string(), limit });
  }

  Ok(rules)
}

#[derive(Debug, Clone)]
pub struct TagExtractor {
  rules: Vec<TagRule>,
  include_comments: bool,
  order: TagOrder,
}

impl TagExtractor {
  pub fn new(rules: Vec<TagRule>, include_comments: bool, order: TagOrder) -> Self {
    Self { rules, include_comments, order }
  }

  pub fn rules(&self) -> &[TagRule] {
    &self.rules
  }

  /// Extract every configured tag. `comments` is chronological (oldest first).
  pub fn extract(&self, description: &str, comments: &[Comment]) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();

    for rule in &self.rules {
      let mut values: Vec<String> = Vec::new();

      if self.include_comments {
        for comment in comments.iter().rev() {
          values.extend(tag_occurrences(&comment.text, &rule.name).into_iter().rev());
        }
      }
      values.extend(tag_occurrences(description, &rule.name).into_iter().rev());

      if rule.limit > 0 {
        values.truncate(rule.limit);
      }
      if self.order == TagOrder::Oldest {
        values.reverse();
      }
      if !values.is_empty() {
        out.insert(rule.name.clone(), values);
      }
    }

    out
  }
}

/// Ordered regex removals applied to ticket subjects.
#[derive(Debug, Clone, Default)]
pub struct TitleCleaner {
  patterns: Vec<Regex>,
  rejected: Vec<(String, String)>,
}

impl TitleCleaner {
  /// Compile patterns; empty ones are ignored and invalid ones are kept aside with their error.
  pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
    let mut cleaner = Self::default();
    for raw in patterns.iter().map(|p| p.as_ref()).filter(|p| !p.is_empty()) {
      match Regex::new(raw) {
        Ok(re) => cleaner.patterns.push(re),
        Err(e) => cleaner.rejected.push((raw.to_string(), e.to_string())),
      }
    }
    cleaner
  }

  /// Patterns that failed to compile, with the compiler's message.
  pub fn rejected(&self) -> &[(String, String)] {
    &self.rejected
  }

  pub fn clean(&self, subject: &str) -> String {
    self
      .patterns
      .iter()
      .fold(subject.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
  }
}

/// Text that stands in for the description: the latest comment with text when preferred.
pub fn content_source<'a>(description: &'a str, comments: &'a [Comment], prefer_comments: bool) -> &'a str {
  if prefer_comments {
    if let Some(c) = comments.iter().rev().find(|c| c.has_text()) {
      return &c.text;
    }
  }
  description
}

/// Per-ticket annotation: cleaned title plus summary or tags, depending on the mode.
#[derive(Debug, Clone)]
pub struct Annotator {
  pub mode: ReportMode,
  pub summary_tag: String,
  pub prefer_comments: bool,
  pub extractor: TagExtractor,
  pub cleaner: TitleCleaner,
}

impl Annotator {
  /// Fill `cleaned_subject`, `summary` and, in tags mode, `extracted_tags`.
  /// Expects comment selection to have run already.
  pub fn annotate(&self, ticket: &mut Ticket) {
    ticket.cleaned_subject = self.cleaner.clean(&ticket.subject);
    let source = content_source(&ticket.description, &ticket.comments, self.prefer_comments);

    match self.mode {
      ReportMode::Tags => {
        let tags = self.extractor.extract(source, &ticket.comments);
        ticket.summary = tags.get(&self.summary_tag).and_then(|v| v.first()).cloned();
        ticket.extracted_tags = tags;
      }
      ReportMode::Summary | ReportMode::Full => {
        ticket.summary = first_tag_value(source, &self.summary_tag);
      }
    }
  }
}
