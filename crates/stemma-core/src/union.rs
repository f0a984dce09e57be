//! Union — a recorded marriage between two persons in complementary roles.
//!
//! Unions are created only through [`crate::marital`]; the spouse pair is
//! unique across the store regardless of slot order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A marriage record. Not mutated after creation within this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Union {
  pub union_id:   Uuid,
  pub created_at: DateTime<Utc>,
  pub husband_id: Uuid,
  pub wife_id:    Uuid,
  pub married_on: Option<NaiveDate>,
  /// The actor who recorded this union.
  pub manager_id: Option<Uuid>,
}

impl Union {
  /// True when `person_id` occupies either slot.
  pub fn involves(&self, person_id: Uuid) -> bool {
    self.husband_id == person_id || self.wife_id == person_id
  }

  /// The other spouse, if `person_id` occupies a slot at all.
  pub fn partner_of(&self, person_id: Uuid) -> Option<Uuid> {
    if self.husband_id == person_id {
      Some(self.wife_id)
    } else if self.wife_id == person_id {
      Some(self.husband_id)
    } else {
      None
    }
  }

  /// True when this union pairs `a` and `b`, in either slot order.
  pub fn pairs(&self, a: Uuid, b: Uuid) -> bool {
    (self.husband_id == a && self.wife_id == b)
      || (self.husband_id == b && self.wife_id == a)
  }
}

/// Input to [`crate::store::FamilyStore::add_union`].
/// `union_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUnion {
  pub husband_id: Uuid,
  pub wife_id:    Uuid,
  pub married_on: Option<NaiveDate>,
  pub manager_id: Option<Uuid>,
}
