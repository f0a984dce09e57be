//! Lineage resolver — parent assignment and child listings.
//!
//! Parent-link direction is never stored twice: every operation resolves
//! the acting person's side through
//! [`crate::person::GenderRole::parent_role`] and reads the matching
//! column, so the one rule that branches on gender lives in exactly one
//! place.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  error::{Error, Result},
  person::{NewPerson, ParentRole, Person},
  store::{FamilyStore, require_person, require_union},
  union::Union,
};

// ─── Candidate ───────────────────────────────────────────────────────────────

/// A parent to link: either a person already in the store, or one the
/// assignment persists first.
#[derive(Debug, Clone)]
pub enum ParentCandidate {
  Existing(Uuid),
  New(NewPerson),
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// Link `candidate` as `child`'s father. Requires the father role.
pub async fn set_father<S: FamilyStore>(
  store: &S,
  child: &Person,
  candidate: ParentCandidate,
) -> Result<Person> {
  assign_parent(store, child, candidate, ParentRole::Father).await
}

/// Link `candidate` as `child`'s mother. Requires the mother role.
pub async fn set_mother<S: FamilyStore>(
  store: &S,
  child: &Person,
  candidate: ParentCandidate,
) -> Result<Person> {
  assign_parent(store, child, candidate, ParentRole::Mother).await
}

enum Resolved {
  Existing(Person),
  New(NewPerson),
}

/// Role-checked parent assignment.
///
/// The role check runs before anything is persisted, so a mismatch never
/// mutates the store. A brand-new candidate is persisted first; if the
/// child link update then fails, the half-linked state is reported as
/// [`Error::InconsistentLineage`] rather than an ordinary store error.
async fn assign_parent<S: FamilyStore>(
  store: &S,
  child: &Person,
  candidate: ParentCandidate,
  role: ParentRole,
) -> Result<Person> {
  let resolved = match candidate {
    ParentCandidate::Existing(id) => {
      Resolved::Existing(require_person(store, id).await?)
    }
    ParentCandidate::New(input) => Resolved::New(input),
  };

  let gender = match &resolved {
    Resolved::Existing(person) => person.gender,
    Resolved::New(input) => input.gender,
  };
  if gender.parent_role() != role {
    return Err(Error::RoleMismatch {
      gender,
      required: role,
    });
  }

  // A candidate already in the store may sit below the child in the
  // lineage forest; refuse the link before touching anything.
  if let Resolved::Existing(parent) = &resolved {
    ensure_no_cycle(store, child, parent).await?;
  }

  let (parent, newly_persisted) = match resolved {
    Resolved::Existing(person) => (person, false),
    Resolved::New(input) => {
      (store.add_person(input).await.map_err(Error::store)?, true)
    }
  };

  let mut updated = child.clone();
  match role {
    ParentRole::Father => updated.father_id = Some(parent.person_id),
    ParentRole::Mother => updated.mother_id = Some(parent.person_id),
  }

  if let Err(e) = store.update_person(&updated).await {
    if newly_persisted {
      return Err(Error::InconsistentLineage {
        child_id:  child.person_id,
        parent_id: parent.person_id,
        source:    Box::new(e),
      });
    }
    return Err(Error::store(e));
  }

  Ok(parent)
}

/// Walk `parent`'s ancestry (father, mother, and parent-union links); if
/// `child` appears, the assignment would create a cycle.
async fn ensure_no_cycle<S: FamilyStore>(
  store: &S,
  child: &Person,
  parent: &Person,
) -> Result<()> {
  let cycle = Error::LineageCycle {
    child_id:  child.person_id,
    parent_id: parent.person_id,
  };

  if parent.person_id == child.person_id {
    return Err(cycle);
  }

  // Visited set so already-corrupt data cannot loop the walk.
  let mut visited: HashSet<Uuid> = HashSet::new();
  let mut frontier = vec![parent.clone()];

  while let Some(current) = frontier.pop() {
    let mut links: Vec<Uuid> = current
      .father_id
      .into_iter()
      .chain(current.mother_id)
      .collect();
    if let Some(union_id) = current.parent_union_id {
      if let Some(union) =
        store.get_union(union_id).await.map_err(Error::store)?
      {
        links.push(union.husband_id);
        links.push(union.wife_id);
      }
    }

    for link in links {
      if link == child.person_id {
        return Err(cycle);
      }
      if visited.insert(link) {
        if let Some(ancestor) =
          store.get_person(link).await.map_err(Error::store)?
        {
          frontier.push(ancestor);
        }
      }
    }
  }

  Ok(())
}

// ─── Traversal ───────────────────────────────────────────────────────────────

/// The ordered children of `person`, selected by the person's own role
/// side: a mother's children are those linked through `mother_id`, anyone
/// else's through `father_id`. Ascending by `birth_order`.
pub async fn children<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Vec<Person>> {
  store
    .children_of(person.person_id, person.gender.parent_role())
    .await
    .map_err(Error::store)
}

/// The recorded father of `person`, if any. A dangling link is an error,
/// not an empty result.
pub async fn father<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Option<Person>> {
  match person.father_id {
    None => Ok(None),
    Some(id) => require_person(store, id).await.map(Some),
  }
}

/// The recorded mother of `person`, if any.
pub async fn mother<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Option<Person>> {
  match person.mother_id {
    None => Ok(None),
    Some(id) => require_person(store, id).await.map(Some),
  }
}

/// The union `person` is recorded as a child of, if any.
pub async fn parent_union<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Option<Union>> {
  match person.parent_union_id {
    None => Ok(None),
    Some(id) => require_union(store, id).await.map(Some),
  }
}
