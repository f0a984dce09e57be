//! Age and lifespan computation over incomplete date data.
//!
//! Vital dates come in exact and year-only precision, independently for
//! birth and death. One case ladder resolves them to a `(start, end)`
//! pair; the whole-year age and the year/month/day breakdown both derive
//! from that pair, so the two can never disagree.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::person::Person;

// ─── Span resolution ─────────────────────────────────────────────────────────

impl Person {
  /// Resolve the vital dates to the span both [`Person::age_on`] and
  /// [`Person::lifespan_on`] measure.
  ///
  /// Exact dates always win over year-only values. Year-only values are
  /// anchored to `as_of`'s month and day; a recorded exact death date is
  /// ignored when the birth side is year-only — the year pair rule only
  /// engages when the death is year-only too. Returns `None` when no
  /// birth fact is recorded.
  pub fn vital_span(&self, as_of: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match (self.born_on, self.birth_year, self.died_on, self.death_year) {
      (Some(born), _, Some(died), _) => Some((born, died)),
      (Some(born), _, None, _) => Some((born, as_of)),
      (None, Some(birth_year), None, Some(death_year)) => Some((
        anchor_to_year(birth_year, as_of)?,
        anchor_to_year(death_year, as_of)?,
      )),
      (None, Some(birth_year), _, _) => {
        Some((anchor_to_year(birth_year, as_of)?, as_of))
      }
      (None, None, _, _) => None,
    }
  }

  /// Age in whole years as of `as_of`; `None` (not zero) when no birth
  /// fact exists.
  pub fn age_on(&self, as_of: NaiveDate) -> Option<i32> {
    self
      .vital_span(as_of)
      .map(|(start, end)| whole_years(start, end))
  }

  /// Year/month/day breakdown of the same span [`Person::age_on`]
  /// measures.
  pub fn lifespan_on(&self, as_of: NaiveDate) -> Option<Lifespan> {
    self
      .vital_span(as_of)
      .map(|(start, end)| Lifespan::between(start, end))
  }
}

/// The month-day of `anchor` transplanted into `year`. Feb 29 rolls to
/// Mar 1 when `year` is not a leap year; `None` only for years outside
/// the calendar's range.
fn anchor_to_year(year: i32, anchor: NaiveDate) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, anchor.month(), anchor.day())
    .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Whole calendar years from `start` to `end`; the count ticks over
/// exactly on the anniversary.
pub fn whole_years(start: NaiveDate, end: NaiveDate) -> i32 {
  let mut years = end.year() - start.year();
  if (end.month(), end.day()) < (start.month(), start.day()) {
    years -= 1;
  }
  years
}

// ─── Lifespan ────────────────────────────────────────────────────────────────

/// A human-oriented duration breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lifespan {
  pub years:  i32,
  pub months: u32,
  pub days:   u32,
}

impl Lifespan {
  /// Break the interval between two dates into calendar years, months and
  /// days. The interval is measured in magnitude; a reversed pair is
  /// normalised first.
  pub fn between(a: NaiveDate, b: NaiveDate) -> Self {
    let (start, end) = if b < a { (b, a) } else { (a, b) };

    let years = whole_years(start, end).max(0);
    let anniversary = add_months_clamped(start, years as u32 * 12);

    let mut months = (end.year() - anniversary.year()) * 12
      + end.month() as i32
      - anniversary.month() as i32;
    let mut point = add_months_clamped(anniversary, months.max(0) as u32);
    if point > end {
      months -= 1;
      point = add_months_clamped(anniversary, months.max(0) as u32);
    }

    let days = (end - point).num_days() as u32;
    Lifespan {
      years,
      months: months.max(0) as u32,
      days,
    }
  }
}

/// `date` plus `months`, clamping the day to the end of a shorter month.
fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
  date.checked_add_months(Months::new(months)).unwrap_or(date)
}

impl fmt::Display for Lifespan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}, {}, {}",
      count(self.years as i64, "year"),
      count(self.months as i64, "month"),
      count(self.days as i64, "day"),
    )
  }
}

fn count(n: i64, unit: &str) -> String {
  if n == 1 {
    format!("1 {unit}")
  } else {
    format!("{n} {unit}s")
  }
}
