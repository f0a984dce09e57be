//! Derived queries over the lineage forest — sibling inference and
//! depth-bounded descendant counting. Read-only: nothing here mutates the
//! graph.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::{
  error::{Error, Result},
  person::{ParentRole, Person},
  store::FamilyStore,
};

// ─── Depth limit ─────────────────────────────────────────────────────────────

/// Generation clamp for [`descendant_counts`].
///
/// Clamping changes which bucket a generation's count lands in, never
/// whether deeper generations are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthLimit {
  Unbounded,
  Clamp(u32),
}

impl DepthLimit {
  /// Interpret a raw client-facing limit; any value `<= 0` disables
  /// clamping.
  pub fn from_raw(raw: i64) -> Self {
    if raw > 0 {
      DepthLimit::Clamp(raw as u32)
    } else {
      DepthLimit::Unbounded
    }
  }

  /// The bucket a generation at `depth` accumulates into.
  pub fn bucket(self, depth: u32) -> u32 {
    match self {
      DepthLimit::Unbounded => depth,
      DepthLimit::Clamp(limit) => depth.min(limit),
    }
  }
}

// ─── Siblings ────────────────────────────────────────────────────────────────

/// Everyone sharing a recorded parent link with `person`, ascending by
/// `birth_order`, never including the person itself.
///
/// The three link kinds match disjunctively: one shared father, mother, or
/// parent union is enough. A person with no recorded link has no basis for
/// comparison and gets an empty result, not an error.
pub async fn siblings_of<S: FamilyStore>(
  store: &S,
  person: &Person,
) -> Result<Vec<Person>> {
  if !person.has_lineage_link() {
    return Ok(Vec::new());
  }

  let mut seen: HashSet<Uuid> = HashSet::new();
  let mut siblings: Vec<Person> = Vec::new();

  if let Some(father_id) = person.father_id {
    let batch = store
      .children_of(father_id, ParentRole::Father)
      .await
      .map_err(Error::store)?;
    merge(&mut siblings, &mut seen, person.person_id, batch);
  }
  if let Some(mother_id) = person.mother_id {
    let batch = store
      .children_of(mother_id, ParentRole::Mother)
      .await
      .map_err(Error::store)?;
    merge(&mut siblings, &mut seen, person.person_id, batch);
  }
  if let Some(union_id) = person.parent_union_id {
    let batch = store
      .children_of_union(union_id)
      .await
      .map_err(Error::store)?;
    merge(&mut siblings, &mut seen, person.person_id, batch);
  }

  siblings.sort_by_key(|sibling| sibling.birth_order);
  Ok(siblings)
}

fn merge(
  into: &mut Vec<Person>,
  seen: &mut HashSet<Uuid>,
  exclude: Uuid,
  batch: Vec<Person>,
) {
  for candidate in batch {
    if candidate.person_id != exclude && seen.insert(candidate.person_id) {
      into.push(candidate);
    }
  }
}

// ─── Descendant counts ───────────────────────────────────────────────────────

/// Count descendants per generation, clamped into `limit` buckets.
///
/// The root's direct children land in bucket 0. Every child encountered at
/// traversal depth `d` adds one to bucket `limit.bucket(d)`; the walk
/// continues past the clamp point, so generations beyond the limit merge
/// their counts into the final bucket instead of being cut off. Each
/// descendant is visited exactly once, even where lineage paths converge.
/// Generations with no children contribute no bucket.
pub async fn descendant_counts<S: FamilyStore>(
  store: &S,
  root: &Person,
  limit: DepthLimit,
) -> Result<BTreeMap<u32, u64>> {
  let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
  let mut visited: HashSet<Uuid> = HashSet::from([root.person_id]);
  let mut frontier: Vec<(Person, u32)> = vec![(root.clone(), 0)];

  while let Some((person, depth)) = frontier.pop() {
    let children = store
      .children_of(person.person_id, person.gender.parent_role())
      .await
      .map_err(Error::store)?;

    let bucket = limit.bucket(depth);
    for child in children {
      if !visited.insert(child.person_id) {
        continue;
      }
      *counts.entry(bucket).or_insert(0) += 1;
      frontier.push((child, depth + 1));
    }
  }

  Ok(counts)
}
