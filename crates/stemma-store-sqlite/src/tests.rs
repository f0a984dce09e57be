//! Integration tests for `SqliteStore` and the engine modules against an
//! in-memory database.

use chrono::NaiveDate;
use stemma_core::{
  Error as CoreError,
  descent::{self, DepthLimit},
  lineage::{self, ParentCandidate},
  marital,
  person::{GenderRole, NewPerson, Person},
  store::FamilyStore,
  union::NewUnion,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn add_person(s: &SqliteStore, name: &str, gender: GenderRole) -> Person {
  s.add_person(NewPerson::new(name, gender)).await.unwrap()
}

async fn add_child_of(
  s: &SqliteStore,
  name: &str,
  gender: GenderRole,
  birth_order: i64,
  father: Option<Uuid>,
  mother: Option<Uuid>,
) -> Person {
  let mut input = NewPerson::new(name, gender);
  input.birth_order = birth_order;
  input.father_id = father;
  input.mother_id = mother;
  s.add_person(input).await.unwrap()
}

fn names(persons: &[Person]) -> Vec<&str> {
  persons.iter().map(|p| p.name.as_str()).collect()
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;

  let mut input = NewPerson::new("Alice", GenderRole::Female);
  input.nickname = Some("Ali".into());
  input.birth_order = 2;
  input.city = Some("Utrecht".into());
  input.born_on = Some(date(1970, 4, 2));
  input.death_year = Some(2040);
  let person = s.add_person(input).await.unwrap();

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Alice");
  assert_eq!(fetched.nickname.as_deref(), Some("Ali"));
  assert_eq!(fetched.gender, GenderRole::Female);
  assert_eq!(fetched.birth_order, 2);
  assert_eq!(fetched.city.as_deref(), Some("Utrecht"));
  assert_eq!(fetched.born_on, Some(date(1970, 4, 2)));
  assert_eq!(fetched.death_year, Some(2040));
  assert!(fetched.father_id.is_none());
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn add_person_with_id_rejects_taken_id() {
  let s = store().await;
  let id = Uuid::new_v4();

  s.add_person_with_id(id, NewPerson::new("First", GenderRole::Male))
    .await
    .unwrap();
  let err = s
    .add_person_with_id(id, NewPerson::new("Second", GenderRole::Male))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::PersonExists(taken) if taken == id));
}

#[tokio::test]
async fn list_persons_filtered_by_manager() {
  let s = store().await;
  let actor = Uuid::new_v4();

  let mut managed = NewPerson::new("Managed", GenderRole::Male);
  managed.manager_id = Some(actor);
  s.add_person(managed).await.unwrap();
  add_person(&s, "Unmanaged", GenderRole::Female).await;

  assert_eq!(s.list_persons(None).await.unwrap().len(), 2);
  let mine = s.list_persons(Some(actor)).await.unwrap();
  assert_eq!(names(&mine), ["Managed"]);
}

#[tokio::test]
async fn update_person_roundtrip() {
  let s = store().await;
  let mut person = add_person(&s, "Old Name", GenderRole::Male).await;

  person.name = "New Name".into();
  person.phone = Some("+31 6 1234".into());
  s.update_person(&person).await.unwrap();

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "New Name");
  assert_eq!(fetched.phone.as_deref(), Some("+31 6 1234"));
}

#[tokio::test]
async fn update_missing_person_errors() {
  let s = store().await;
  let mut person = add_person(&s, "Ghost", GenderRole::Male).await;
  person.person_id = Uuid::new_v4();

  let err = s.update_person(&person).await.unwrap_err();
  assert!(matches!(err, crate::Error::PersonNotFound(_)));
}

// ─── Lineage assignment ──────────────────────────────────────────────────────

#[tokio::test]
async fn set_father_links_existing_candidate() {
  let s = store().await;
  let child = add_person(&s, "Child", GenderRole::Female).await;
  let father = add_person(&s, "Father", GenderRole::Male).await;

  let linked = lineage::set_father(
    &s,
    &child,
    ParentCandidate::Existing(father.person_id),
  )
  .await
  .unwrap();
  assert_eq!(linked.person_id, father.person_id);

  let fetched = s.get_person(child.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.father_id, Some(father.person_id));
}

#[tokio::test]
async fn set_father_rejects_wrong_role_without_mutation() {
  let s = store().await;
  let child = add_person(&s, "Child", GenderRole::Male).await;
  let candidate = add_person(&s, "Not a father", GenderRole::Female).await;

  let err = lineage::set_father(
    &s,
    &child,
    ParentCandidate::Existing(candidate.person_id),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::RoleMismatch { .. }));

  let fetched = s.get_person(child.person_id).await.unwrap().unwrap();
  assert!(fetched.father_id.is_none());
}

#[tokio::test]
async fn set_mother_rejects_wrong_role_without_mutation() {
  let s = store().await;
  let child = add_person(&s, "Child", GenderRole::Male).await;
  let candidate = add_person(&s, "Not a mother", GenderRole::Male).await;

  let err = lineage::set_mother(
    &s,
    &child,
    ParentCandidate::Existing(candidate.person_id),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::RoleMismatch { .. }));

  let fetched = s.get_person(child.person_id).await.unwrap().unwrap();
  assert!(fetched.mother_id.is_none());
}

#[tokio::test]
async fn set_mother_persists_new_candidate() {
  let s = store().await;
  let child = add_person(&s, "Child", GenderRole::Male).await;

  let mother = lineage::set_mother(
    &s,
    &child,
    ParentCandidate::New(NewPerson::new("New Mother", GenderRole::Female)),
  )
  .await
  .unwrap();

  // Candidate was persisted and the link points at it.
  let stored = s.get_person(mother.person_id).await.unwrap().unwrap();
  assert_eq!(stored.name, "New Mother");
  let fetched = s.get_person(child.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.mother_id, Some(mother.person_id));
}

#[tokio::test]
async fn set_father_unknown_candidate_errors() {
  let s = store().await;
  let child = add_person(&s, "Child", GenderRole::Male).await;
  let missing = Uuid::new_v4();

  let err =
    lineage::set_father(&s, &child, ParentCandidate::Existing(missing))
      .await
      .unwrap_err();
  assert!(matches!(err, CoreError::PersonNotFound(id) if id == missing));
}

#[tokio::test]
async fn set_father_rejects_descendant_candidate() {
  let s = store().await;
  let grandfather = add_person(&s, "Grandfather", GenderRole::Male).await;
  let father = add_child_of(
    &s,
    "Father",
    GenderRole::Male,
    0,
    Some(grandfather.person_id),
    None,
  )
  .await;
  let child = add_child_of(
    &s,
    "Child",
    GenderRole::Male,
    0,
    Some(father.person_id),
    None,
  )
  .await;

  let err = lineage::set_father(
    &s,
    &grandfather,
    ParentCandidate::Existing(child.person_id),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::LineageCycle { .. }));
}

#[tokio::test]
async fn set_father_rejects_self() {
  let s = store().await;
  let person = add_person(&s, "Ouroboros", GenderRole::Male).await;

  let err = lineage::set_father(
    &s,
    &person,
    ParentCandidate::Existing(person.person_id),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::LineageCycle { .. }));
}

// ─── Children ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn children_ordered_by_birth_order() {
  let s = store().await;
  let father = add_person(&s, "Father", GenderRole::Male).await;

  // Insertion order deliberately scrambled.
  add_child_of(&s, "Third", GenderRole::Male, 3, Some(father.person_id), None)
    .await;
  add_child_of(&s, "First", GenderRole::Female, 1, Some(father.person_id), None)
    .await;
  add_child_of(&s, "Second", GenderRole::Male, 2, Some(father.person_id), None)
    .await;

  let children = lineage::children(&s, &father).await.unwrap();
  assert_eq!(names(&children), ["First", "Second", "Third"]);
}

#[tokio::test]
async fn children_selected_by_own_role_side() {
  let s = store().await;
  let mother = add_person(&s, "Mother", GenderRole::Female).await;
  let other_father = add_person(&s, "Other", GenderRole::Male).await;

  add_child_of(&s, "Hers", GenderRole::Male, 1, None, Some(mother.person_id))
    .await;
  add_child_of(
    &s,
    "Not hers",
    GenderRole::Male,
    2,
    Some(other_father.person_id),
    None,
  )
  .await;

  let children = lineage::children(&s, &mother).await.unwrap();
  assert_eq!(names(&children), ["Hers"]);
}

#[tokio::test]
async fn father_and_mother_accessors() {
  let s = store().await;
  let father = add_person(&s, "Father", GenderRole::Male).await;
  let child = add_child_of(
    &s,
    "Child",
    GenderRole::Female,
    0,
    Some(father.person_id),
    None,
  )
  .await;

  let resolved = lineage::father(&s, &child).await.unwrap().unwrap();
  assert_eq!(resolved.person_id, father.person_id);
  assert!(lineage::mother(&s, &child).await.unwrap().is_none());
}

// ─── Unions ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_wife_round_trip() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  let union = marital::add_wife(
    &s,
    None,
    husband.person_id,
    wife.person_id,
    Some(date(1995, 6, 17)),
  )
  .await
  .unwrap();
  assert_eq!(union.husband_id, husband.person_id);
  assert_eq!(union.wife_id, wife.person_id);
  assert_eq!(union.married_on, Some(date(1995, 6, 17)));

  let his = marital::spouses_of(&s, &husband).await.unwrap();
  assert_eq!(names(&his), ["Wife"]);
  let hers = marital::spouses_of(&s, &wife).await.unwrap();
  assert_eq!(names(&hers), ["Husband"]);
}

#[tokio::test]
async fn add_wife_duplicate_rejected() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  marital::add_wife(&s, None, husband.person_id, wife.person_id, None)
    .await
    .unwrap();
  let err =
    marital::add_wife(&s, None, husband.person_id, wife.person_id, None)
      .await
      .unwrap_err();
  assert!(matches!(err, CoreError::DuplicateUnion { .. }));

  assert_eq!(s.list_unions(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_guard_is_direction_independent() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  marital::add_wife(&s, None, husband.person_id, wife.person_id, None)
    .await
    .unwrap();
  let err =
    marital::add_husband(&s, None, wife.person_id, husband.person_id, None)
      .await
      .unwrap_err();
  assert!(matches!(err, CoreError::DuplicateUnion { .. }));
}

#[tokio::test]
async fn add_wife_requires_the_father_role() {
  let s = store().await;
  let not_a_husband = add_person(&s, "Female acting", GenderRole::Female).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  let err =
    marital::add_wife(&s, None, not_a_husband.person_id, wife.person_id, None)
      .await
      .unwrap_err();
  assert!(matches!(err, CoreError::RoleMismatch { .. }));
  assert!(s.list_unions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_husband_requires_the_mother_role() {
  let s = store().await;
  let not_a_wife = add_person(&s, "Male acting", GenderRole::Male).await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;

  let err = marital::add_husband(
    &s,
    None,
    not_a_wife.person_id,
    husband.person_id,
    None,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::RoleMismatch { .. }));
  assert!(s.list_unions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_wife_unknown_spouse_errors() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let missing = Uuid::new_v4();

  let err = marital::add_wife(&s, None, husband.person_id, missing, None)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::PersonNotFound(id) if id == missing));
}

#[tokio::test]
async fn spouses_ordered_by_marriage_date_undated_last() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let later = add_person(&s, "Later", GenderRole::Female).await;
  let undated = add_person(&s, "Undated", GenderRole::Female).await;
  let earlier = add_person(&s, "Earlier", GenderRole::Female).await;

  marital::add_wife(
    &s,
    None,
    husband.person_id,
    later.person_id,
    Some(date(1990, 1, 1)),
  )
  .await
  .unwrap();
  marital::add_wife(&s, None, husband.person_id, undated.person_id, None)
    .await
    .unwrap();
  marital::add_wife(
    &s,
    None,
    husband.person_id,
    earlier.person_id,
    Some(date(1980, 1, 1)),
  )
  .await
  .unwrap();

  let spouses = marital::spouses_of(&s, &husband).await.unwrap();
  assert_eq!(names(&spouses), ["Earlier", "Later", "Undated"]);
}

#[tokio::test]
async fn unions_of_uses_own_role_side() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  let union =
    marital::add_wife(&s, None, husband.person_id, wife.person_id, None)
      .await
      .unwrap();

  let his = marital::unions_of(&s, &husband).await.unwrap();
  let hers = marital::unions_of(&s, &wife).await.unwrap();
  assert_eq!(his.len(), 1);
  assert_eq!(hers.len(), 1);
  assert_eq!(his[0].union_id, union.union_id);
  assert_eq!(hers[0].union_id, union.union_id);
}

#[tokio::test]
async fn has_union_with_is_direction_independent() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  assert!(
    !marital::has_union_with(&s, husband.person_id, wife.person_id)
      .await
      .unwrap()
  );
  marital::add_wife(&s, None, husband.person_id, wife.person_id, None)
    .await
    .unwrap();
  assert!(
    marital::has_union_with(&s, husband.person_id, wife.person_id)
      .await
      .unwrap()
  );
  assert!(
    marital::has_union_with(&s, wife.person_id, husband.person_id)
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn union_unique_constraint_is_the_race_backstop() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;

  // Bypass the engine guard and hit the store twice, as two racing
  // requests that both passed the check would.
  let input = NewUnion {
    husband_id: husband.person_id,
    wife_id:    wife.person_id,
    married_on: None,
    manager_id: None,
  };
  s.add_union(input.clone()).await.unwrap();
  let err = s.add_union(input).await.unwrap_err();
  assert!(matches!(err, crate::Error::UnionExists { .. }));
}

#[tokio::test]
async fn union_creation_records_the_actor() {
  let s = store().await;
  let actor = Uuid::new_v4();
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;
  let other_wife = add_person(&s, "Other wife", GenderRole::Female).await;

  let attributed = marital::add_wife(
    &s,
    Some(actor),
    husband.person_id,
    wife.person_id,
    None,
  )
  .await
  .unwrap();
  assert_eq!(attributed.manager_id, Some(actor));

  // Unknown actor stays unknown rather than failing the operation.
  let anonymous =
    marital::add_wife(&s, None, husband.person_id, other_wife.person_id, None)
      .await
      .unwrap();
  assert!(anonymous.manager_id.is_none());

  let managed = s.list_unions(Some(actor)).await.unwrap();
  assert_eq!(managed.len(), 1);
  assert_eq!(managed[0].union_id, attributed.union_id);
}

// ─── Siblings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn siblings_empty_without_any_lineage_link() {
  let s = store().await;
  let person = add_person(&s, "Alone", GenderRole::Male).await;
  let siblings = descent::siblings_of(&s, &person).await.unwrap();
  assert!(siblings.is_empty());
}

#[tokio::test]
async fn siblings_share_father_ordered_and_exclude_self() {
  let s = store().await;
  let father = add_person(&s, "Father", GenderRole::Male).await;

  let me =
    add_child_of(&s, "Me", GenderRole::Male, 2, Some(father.person_id), None)
      .await;
  add_child_of(&s, "Elder", GenderRole::Female, 1, Some(father.person_id), None)
    .await;
  add_child_of(
    &s,
    "Younger",
    GenderRole::Male,
    3,
    Some(father.person_id),
    None,
  )
  .await;

  let siblings = descent::siblings_of(&s, &me).await.unwrap();
  assert_eq!(names(&siblings), ["Elder", "Younger"]);
}

#[tokio::test]
async fn siblings_match_disjunctively_and_deduplicate() {
  let s = store().await;
  let father = add_person(&s, "Father", GenderRole::Male).await;
  let mother = add_person(&s, "Mother", GenderRole::Female).await;

  let me = add_child_of(
    &s,
    "Me",
    GenderRole::Male,
    0,
    Some(father.person_id),
    Some(mother.person_id),
  )
  .await;
  add_child_of(
    &s,
    "Paternal half",
    GenderRole::Male,
    1,
    Some(father.person_id),
    None,
  )
  .await;
  add_child_of(
    &s,
    "Maternal half",
    GenderRole::Female,
    2,
    None,
    Some(mother.person_id),
  )
  .await;
  add_child_of(
    &s,
    "Full sibling",
    GenderRole::Female,
    3,
    Some(father.person_id),
    Some(mother.person_id),
  )
  .await;

  let siblings = descent::siblings_of(&s, &me).await.unwrap();
  assert_eq!(
    names(&siblings),
    ["Paternal half", "Maternal half", "Full sibling"]
  );
}

#[tokio::test]
async fn siblings_via_shared_parent_union() {
  let s = store().await;
  let husband = add_person(&s, "Husband", GenderRole::Male).await;
  let wife = add_person(&s, "Wife", GenderRole::Female).await;
  let union =
    marital::add_wife(&s, None, husband.person_id, wife.person_id, None)
      .await
      .unwrap();

  let mut first = NewPerson::new("First", GenderRole::Male);
  first.birth_order = 1;
  first.parent_union_id = Some(union.union_id);
  let first = s.add_person(first).await.unwrap();

  let mut second = NewPerson::new("Second", GenderRole::Female);
  second.birth_order = 2;
  second.parent_union_id = Some(union.union_id);
  s.add_person(second).await.unwrap();

  let siblings = descent::siblings_of(&s, &first).await.unwrap();
  assert_eq!(names(&siblings), ["Second"]);
}

// ─── Descendant counts ───────────────────────────────────────────────────────

/// Root with two children; the first child has three children of its own.
async fn two_generation_tree(s: &SqliteStore) -> (Person, Person) {
  let root = add_person(s, "Root", GenderRole::Male).await;
  let first = add_child_of(
    s,
    "First child",
    GenderRole::Male,
    1,
    Some(root.person_id),
    None,
  )
  .await;
  add_child_of(
    s,
    "Second child",
    GenderRole::Female,
    2,
    Some(root.person_id),
    None,
  )
  .await;
  for (index, name) in ["G1", "G2", "G3"].into_iter().enumerate() {
    add_child_of(
      s,
      name,
      GenderRole::Male,
      index as i64 + 1,
      Some(first.person_id),
      None,
    )
    .await;
  }
  (root, first)
}

#[tokio::test]
async fn descendant_counts_clamp_merges_deeper_generations() {
  let s = store().await;
  let (root, _) = two_generation_tree(&s).await;

  let clamped =
    descent::descendant_counts(&s, &root, DepthLimit::Clamp(1))
      .await
      .unwrap();
  assert_eq!(clamped.into_iter().collect::<Vec<_>>(), [(0, 2), (1, 3)]);

  let unbounded =
    descent::descendant_counts(&s, &root, DepthLimit::Unbounded)
      .await
      .unwrap();
  assert_eq!(unbounded.into_iter().collect::<Vec<_>>(), [(0, 2), (1, 3)]);
}

#[tokio::test]
async fn descendant_counts_keep_traversing_past_the_clamp() {
  let s = store().await;
  let (root, first) = two_generation_tree(&s).await;

  // Extend one branch a generation: G1 gets a child of its own.
  let grandchildren = lineage::children(&s, &first).await.unwrap();
  add_child_of(
    &s,
    "Great grandchild",
    GenderRole::Female,
    1,
    Some(grandchildren[0].person_id),
    None,
  )
  .await;

  let unbounded =
    descent::descendant_counts(&s, &root, DepthLimit::Unbounded)
      .await
      .unwrap();
  assert_eq!(
    unbounded.into_iter().collect::<Vec<_>>(),
    [(0, 2), (1, 3), (2, 1)]
  );

  // The deepest generation is not cut off; it merges into the last bucket.
  let clamped =
    descent::descendant_counts(&s, &root, DepthLimit::Clamp(1))
      .await
      .unwrap();
  assert_eq!(clamped.into_iter().collect::<Vec<_>>(), [(0, 2), (1, 4)]);
}

#[tokio::test]
async fn descendant_counts_empty_for_childless_root() {
  let s = store().await;
  let root = add_person(&s, "Root", GenderRole::Male).await;

  let counts = descent::descendant_counts(&s, &root, DepthLimit::Unbounded)
    .await
    .unwrap();
  assert!(counts.is_empty());
}

#[tokio::test]
async fn descendant_counts_follow_each_generations_own_role() {
  let s = store().await;
  let root = add_person(&s, "Root", GenderRole::Male).await;
  let daughter = add_child_of(
    &s,
    "Daughter",
    GenderRole::Female,
    1,
    Some(root.person_id),
    None,
  )
  .await;
  // The daughter's child is linked through the mother side.
  add_child_of(
    &s,
    "Grandchild",
    GenderRole::Male,
    1,
    None,
    Some(daughter.person_id),
  )
  .await;

  let counts = descent::descendant_counts(&s, &root, DepthLimit::Unbounded)
    .await
    .unwrap();
  assert_eq!(counts.into_iter().collect::<Vec<_>>(), [(0, 1), (1, 1)]);
}
