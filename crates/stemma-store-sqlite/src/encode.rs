//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use stemma_core::{
  person::{GenderRole, Person},
  union::Union,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_uuid_opt(id: Option<Uuid>) -> Option<String> {
  id.map(encode_uuid)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date_opt(d: Option<NaiveDate>) -> Option<String> {
  d.map(encode_date)
}

// ─── GenderRole ──────────────────────────────────────────────────────────────

pub fn encode_gender(g: GenderRole) -> &'static str {
  match g {
    GenderRole::Male => "male",
    GenderRole::Female => "female",
  }
}

pub fn decode_gender(s: &str) -> Result<GenderRole> {
  match s {
    "male" => Ok(GenderRole::Male),
    "female" => Ok(GenderRole::Female),
    other => Err(Error::UnknownGender(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:       String,
  pub created_at:      String,
  pub name:            String,
  pub nickname:        Option<String>,
  pub gender:          String,
  pub birth_order:     i64,
  pub address:         Option<String>,
  pub city:            Option<String>,
  pub phone:           Option<String>,
  pub born_on:         Option<String>,
  pub birth_year:      Option<i32>,
  pub died_on:         Option<String>,
  pub death_year:      Option<i32>,
  pub father_id:       Option<String>,
  pub mother_id:       Option<String>,
  pub parent_union_id: Option<String>,
  pub manager_id:      Option<String>,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:       decode_uuid(&self.person_id)?,
      created_at:      decode_dt(&self.created_at)?,
      name:            self.name,
      nickname:        self.nickname,
      gender:          decode_gender(&self.gender)?,
      birth_order:     self.birth_order,
      address:         self.address,
      city:            self.city,
      phone:           self.phone,
      born_on:         self.born_on.as_deref().map(decode_date).transpose()?,
      birth_year:      self.birth_year,
      died_on:         self.died_on.as_deref().map(decode_date).transpose()?,
      death_year:      self.death_year,
      father_id:       self.father_id.as_deref().map(decode_uuid).transpose()?,
      mother_id:       self.mother_id.as_deref().map(decode_uuid).transpose()?,
      parent_union_id: self
        .parent_union_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      manager_id:      self.manager_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

/// Raw strings read directly from a `unions` row.
pub struct RawUnion {
  pub union_id:   String,
  pub created_at: String,
  pub husband_id: String,
  pub wife_id:    String,
  pub married_on: Option<String>,
  pub manager_id: Option<String>,
}

impl RawUnion {
  pub fn into_union(self) -> Result<Union> {
    Ok(Union {
      union_id:   decode_uuid(&self.union_id)?,
      created_at: decode_dt(&self.created_at)?,
      husband_id: decode_uuid(&self.husband_id)?,
      wife_id:    decode_uuid(&self.wife_id)?,
      married_on: self.married_on.as_deref().map(decode_date).transpose()?,
      manager_id: self.manager_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}
