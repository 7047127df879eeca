// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compute weekly report windows (last / this / YYYY-W) and apply date ranges to tickets
// role: windowing/calendar
// inputs: week-start token, IANA timezone, week spec, explicit `now`
// outputs: WeekRange (local 00:00:00 .. local 23:59:59 six days later); DateRange membership checks
// invariants:
// - Every window spans exactly seven local calendar days, end = start + 6d 23:59:59
// - `now` is always an argument; nothing here reads the system clock
// - Week 1 of a year holds at least four days of January (majority rule, any week start)
// errors: ConfigError for unknown week starts, timezones, and malformed week specs
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{
  DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Ticket;

static RE_WEEK_SPEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,4})-(\d{1,2})$").expect("static regex"));

/// Ticket field a date range applies to.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum DateField {
  UpdatedOn,
  CreatedOn,
  StartDate,
  DueDate,
}

/// Inclusive window in the calendar's timezone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekRange {
  pub start: DateTime<Tz>,
  pub end: DateTime<Tz>,
}

/// Inclusive range over one ticket field. A missing bound leaves that side open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
  pub field: DateField,
  pub start: Option<DateTime<Tz>>,
  pub end: Option<DateTime<Tz>>,
}

impl DateRange {
  pub fn new(field: DateField, range: WeekRange) -> Self {
    Self { field, start: Some(range.start), end: Some(range.end) }
  }

  /// Whether the ticket's selected field falls inside the range. Tickets lacking the field are outside.
  pub fn contains(&self, ticket: &Ticket) -> bool {
    match self.field {
      DateField::UpdatedOn => ticket.updated_on.is_some_and(|t| self.contains_instant(t)),
      DateField::CreatedOn => ticket.created_on.is_some_and(|t| self.contains_instant(t)),
      DateField::StartDate => ticket.start_date.is_some_and(|d| self.contains_date(d)),
      DateField::DueDate => ticket.due_date.is_some_and(|d| self.contains_date(d)),
    }
  }

  fn contains_instant(&self, t: DateTime<Utc>) -> bool {
    self.start.map_or(true, |s| t >= s.with_timezone(&Utc)) && self.end.map_or(true, |e| t <= e.with_timezone(&Utc))
  }

  fn contains_date(&self, d: NaiveDate) -> bool {
    self.start.map_or(true, |s| d >= s.date_naive()) && self.end.map_or(true, |e| d <= e.date_naive())
  }

  /// Bounds in UTC; an open start reaches back to the earliest instant, an open end stops at `now`.
  pub fn bounds_utc(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
      self.start.map_or(DateTime::<Utc>::MIN_UTC, |s| s.with_timezone(&Utc)),
      self.end.map_or(now, |e| e.with_timezone(&Utc)),
    )
  }
}

/// Week window calculator parameterized by week start and timezone.
#[derive(Clone, Debug)]
pub struct WeekCalculator {
  week_start: Weekday,
  tz: Tz,
}

impl WeekCalculator {
  pub fn new(week_start: &str, timezone: &str) -> Result<Self, ConfigError> {
    let tz = parse_timezone(timezone)?;
    let week_start = match week_start {
      "mon" => Weekday::Mon,
      "sun" => Weekday::Sun,
      other => return Err(ConfigError::InvalidWeekStart(other.to_string())),
    };
    Ok(Self { week_start, tz })
  }

  pub fn timezone(&self) -> Tz {
    self.tz
  }

  /// Resolve `last`, `this`, or `YYYY-W` against `now`.
  pub fn compute_range<Z: TimeZone>(&self, spec: &str, now: &DateTime<Z>) -> Result<WeekRange, ConfigError> {
    let today = now.with_timezone(&self.tz).date_naive();

    match spec {
      "this" => Ok(self.window(self.start_of_week(today))),
      "last" => Ok(self.window(self.start_of_week(today) - Duration::days(7))),
      other => self.numbered_week(other),
    }
  }

  /// Most recent week-start day on or before `day`.
  fn start_of_week(&self, day: NaiveDate) -> NaiveDate {
    let back = days_between(self.week_start, day.weekday());
    day - Duration::days(back)
  }

  fn numbered_week(&self, spec: &str) -> Result<WeekRange, ConfigError> {
    let invalid = || ConfigError::InvalidWeekSpec(spec.to_string());
    let caps = RE_WEEK_SPEC.captures(spec.trim()).ok_or_else(invalid)?;
    let year: i32 = caps[1].parse().map_err(|_| invalid())?;
    let week: i64 = caps[2].parse().map_err(|_| invalid())?;
    if !(1..=53).contains(&week) {
      return Err(invalid());
    }

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let ahead = days_between(jan1.weekday(), self.week_start);
    let mut first = jan1 + Duration::days(ahead);
    if ahead > 3 {
      first -= Duration::days(7);
    }

    Ok(self.window(first + Duration::days((week - 1) * 7)))
  }

  /// Seven-day window starting at local midnight of `start_day`.
  pub fn window(&self, start_day: NaiveDate) -> WeekRange {
    let end_day = start_day + Duration::days(6);
    WeekRange {
      start: localize(self.tz, start_day.and_time(NaiveTime::MIN)),
      end: localize(self.tz, end_day.and_hms_opt(23, 59, 59).unwrap_or_else(|| end_day.and_time(NaiveTime::MIN))),
    }
  }

  /// Local midnight of `day` in the calendar's timezone.
  pub fn start_of_day(&self, day: NaiveDate) -> DateTime<Tz> {
    localize(self.tz, day.and_time(NaiveTime::MIN))
  }

  /// Local 23:59:59 of `day` in the calendar's timezone.
  pub fn end_of_day(&self, day: NaiveDate) -> DateTime<Tz> {
    localize(self.tz, day.and_hms_opt(23, 59, 59).unwrap_or_else(|| day.and_time(NaiveTime::MIN)))
  }
}

pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
  name.parse::<Tz>().map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// Days to walk forward from `from` to reach `to` (0..=6).
fn days_between(from: Weekday, to: Weekday) -> i64 {
  let from = from.num_days_from_sunday() as i64;
  let to = to.num_days_from_sunday() as i64;
  (to - from).rem_euclid(7)
}

/// Attach a timezone to a wall-clock time. Ambiguous times take the earlier instant;
/// times skipped by a DST jump move forward an hour.
fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
  match tz.from_local_datetime(&naive) {
    LocalResult::Single(t) => t,
    LocalResult::Ambiguous(earliest, _) => earliest,
    LocalResult::None => tz
      .from_local_datetime(&(naive + Duration::hours(1)))
      .earliest()
      .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
  }
}

/// Parse a `--now-override` string.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`, read in `tz`.
pub fn parse_now_override(s: Option<&str>, tz: Tz) -> Option<DateTime<Utc>> {
  s.and_then(|raw| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Utc))
      .or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .map(|ndt| localize(tz, ndt).with_timezone(&Utc))
      })
  })
}

/// Parse a `YYYY-MM-DD` flag value.
pub fn parse_day(flag: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
  NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
    flag,
    value: value.to_string(),
  })
}
