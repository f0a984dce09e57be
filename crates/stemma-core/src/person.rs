//! Person — the individual node of the relationship graph.
//!
//! A person carries identity, a gender role, vital dates in exact and
//! year-only precision, and up to three lineage references. Everything
//! derived from the graph (children, siblings, descendant counts, age)
//! lives in the engine modules.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Roles ───────────────────────────────────────────────────────────────────

/// The fixed categorisation that decides which lineage and union slots a
/// person may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderRole {
  Male,
  Female,
}

/// The parent-side slot selected by a gender role. `Father` selects
/// `father_id` and the husband slot; `Mother` selects `mother_id` and the
/// wife slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRole {
  Father,
  Mother,
}

impl GenderRole {
  /// The one branch every traversal shares: which parent side this person
  /// queries and occupies. Female resolves to the mother side; anything
  /// else falls back to the father side.
  pub fn parent_role(self) -> ParentRole {
    match self {
      GenderRole::Female => ParentRole::Mother,
      _ => ParentRole::Father,
    }
  }
}

impl fmt::Display for GenderRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GenderRole::Male => f.write_str("male"),
      GenderRole::Female => f.write_str("female"),
    }
  }
}

impl fmt::Display for ParentRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParentRole::Father => f.write_str("father"),
      ParentRole::Mother => f.write_str("mother"),
    }
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// An individual in the relationship graph.
///
/// The four vital-date fields are independent; where both precisions are
/// recorded for the same event, the exact date wins (see
/// [`crate::chronology`]). The gender role must not change once lineage or
/// union records depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:       Uuid,
  pub created_at:      DateTime<Utc>,
  pub name:            String,
  pub nickname:        Option<String>,
  pub gender:          GenderRole,
  /// Position among siblings; child listings sort ascending on this.
  pub birth_order:     i64,
  pub address:         Option<String>,
  pub city:            Option<String>,
  pub phone:           Option<String>,
  pub born_on:         Option<NaiveDate>,
  pub birth_year:      Option<i32>,
  pub died_on:         Option<NaiveDate>,
  pub death_year:      Option<i32>,
  /// Father link; the referenced person must hold the father role.
  pub father_id:       Option<Uuid>,
  /// Mother link; the referenced person must hold the mother role.
  pub mother_id:       Option<Uuid>,
  /// Couple link, used when the individual parent links are not tracked.
  pub parent_union_id: Option<Uuid>,
  /// The actor who recorded this person. Attribution, not ownership.
  pub manager_id:      Option<Uuid>,
}

impl Person {
  /// Whether any lineage link is recorded. Sibling inference has no basis
  /// for comparison without one.
  pub fn has_lineage_link(&self) -> bool {
    self.father_id.is_some()
      || self.mother_id.is_some()
      || self.parent_union_id.is_some()
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::FamilyStore::add_person`].
/// `person_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:            String,
  pub gender:          GenderRole,
  #[serde(default)]
  pub nickname:        Option<String>,
  #[serde(default)]
  pub birth_order:     i64,
  #[serde(default)]
  pub address:         Option<String>,
  #[serde(default)]
  pub city:            Option<String>,
  #[serde(default)]
  pub phone:           Option<String>,
  #[serde(default)]
  pub born_on:         Option<NaiveDate>,
  #[serde(default)]
  pub birth_year:      Option<i32>,
  #[serde(default)]
  pub died_on:         Option<NaiveDate>,
  #[serde(default)]
  pub death_year:      Option<i32>,
  #[serde(default)]
  pub father_id:       Option<Uuid>,
  #[serde(default)]
  pub mother_id:       Option<Uuid>,
  #[serde(default)]
  pub parent_union_id: Option<Uuid>,
  #[serde(default)]
  pub manager_id:      Option<Uuid>,
}

impl NewPerson {
  /// Convenience constructor with every optional field empty.
  pub fn new(name: impl Into<String>, gender: GenderRole) -> Self {
    Self {
      name: name.into(),
      gender,
      nickname: None,
      birth_order: 0,
      address: None,
      city: None,
      phone: None,
      born_on: None,
      birth_year: None,
      died_on: None,
      death_year: None,
      father_id: None,
      mother_id: None,
      parent_union_id: None,
      manager_id: None,
    }
  }
}
