//! Marital graph manager — union creation and role-aware traversal.
//!
//! Creation operations take an explicit `actor` identity to stamp on the
//! new record; `None` records an unknown actor. Only the acting side's
//! role is validated.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  person::{ParentRole, Person},
  store::{FamilyStore, require_person},
  union::{NewUnion, Union},
};

// ─── Creation ────────────────────────────────────────────────────────────────

/// Record a marriage with `husband_id` in the husband slot.
///
/// Fails without mutation when the husband does not hold the father role
/// or when the pair already has a union in either slot order.
pub async fn add_wife<S: FamilyStore>(
  store: &S,
  actor: Option<Uuid>,
  husband_id: Uuid,
  wife_id: Uuid,
  married_on: Option<NaiveDate>,
) -> Result<Union> {
  let husband = require_person(store, husband_id).await?;
  require_person(store, wife_id).await?;

  if husband.gender.parent_role() != ParentRole::Father {
    return Err(Error::RoleMismatch {
      gender:   husband.gender,
      required: ParentRole::Father,
    });
  }
  ensure_unmarried_pair(store, husband_id, wife_id).await?;

  store
    .add_union(NewUnion {
      husband_id,
      wife_id,
      married_on,
      manager_id: actor,
    })
    .await
    .map_err(Error::store)
}

/// Record a marriage with `wife_id` in the wife slot. Symmetric to
/// [`add_wife`]; requires the mother role of the acting person.
pub async fn add_husband<S: FamilyStore>(
  store: &S,
  actor: Option<Uuid>,
  wife_id: Uuid,
  husband_id: Uuid,
  married_on: Option<NaiveDate>,
) -> Result<Union> {
  let wife = require_person(store, wife_id).await?;
  require_person(store, husband_id).await?;

  if wife.gender.parent_role() != ParentRole::Mother {
    return Err(Error::RoleMismatch {
      gender:   wife.gender,
      required: ParentRole::Mother,
    });
  }
  ensure_unmarried_pair(store, husband_id, wife_id).await?;

  store
    .add_union(NewUnion {
      husband_id,
      wife_id,
      married_on,
      manager_id: actor,
    })
    .await
    .map_err(Error::store)
}

async fn ensure_unmarried_pair<S: FamilyStore>(
  store: &S,
  husband_id: Uuid,
  wife_id: Uuid,
) -> Result<()> {
  if store
    .union_between(husband_id, wife_id)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::DuplicateUnion {
      husband_id,
      wife_id,
    });
  }
  Ok(())
}

// ─── Traversal ───────────────────────────────────────────────────────────────

/// All spouses of `person` — the opposite slot of every union on the
/// person's own role side — in marriage-date order, undated last.
pub async fn spouses_of<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Vec<Person>> {
  let role = person.gender.parent_role();
  let unions = store
    .unions_for(person.person_id, role)
    .await
    .map_err(Error::store)?;

  let mut spouses = Vec::with_capacity(unions.len());
  for union in unions {
    let partner_id = match role {
      ParentRole::Father => union.wife_id,
      ParentRole::Mother => union.husband_id,
    };
    spouses.push(require_person(store, partner_id).await?);
  }
  Ok(spouses)
}

/// All unions `person` participates in on their own role side, in
/// marriage-date order, undated last.
pub async fn unions_of<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Vec<Union>> {
  store
    .unions_for(person.person_id, person.gender.parent_role())
    .await
    .map_err(Error::store)
}

/// Whether a union already pairs `a` and `b`, in either slot order. The
/// guard [`add_wife`] and [`add_husband`] use to reject duplicates.
pub async fn has_union_with<S: FamilyStore>(
  store: &S,
  a: Uuid,
  b: Uuid,
) -> Result<bool> {
  Ok(
    store
      .union_between(a, b)
      .await
      .map_err(Error::store)?
      .is_some(),
  )
}
