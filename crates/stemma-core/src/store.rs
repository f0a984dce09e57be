//! The `FamilyStore` trait and the queries the engine needs from a backend.
//!
//! The trait is implemented by storage backends (e.g. `stemma-store-sqlite`).
//! The engine modules (`lineage`, `marital`, `descent`) and any HTTP layer
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::Error,
  person::{NewPerson, ParentRole, Person},
  union::{NewUnion, Union},
};

/// Abstraction over a Stemma persistence backend.
///
/// Each method is one logical unit of work; the engine composes them and
/// reports any backend failure as an explicit error, never a silent no-op.
///
/// Ordering contracts:
/// - child listings are ordered ascending by `birth_order`;
/// - union listings are ordered ascending by `married_on`, with undated
///   unions sorted last.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FamilyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create and persist a new person; the store assigns the id.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Create and persist a person with a caller-supplied id. Returns an
  /// error if the id is already taken.
  fn add_person_with_id(
    &self,
    id: Uuid,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// List all persons, optionally restricted to one recording actor.
  fn list_persons(
    &self,
    manager: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Persist the current state of an existing person. Callers must not
  /// change the gender role once lineage or union records depend on it.
  fn update_person<'a>(
    &'a self,
    person: &'a Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Lineage queries ───────────────────────────────────────────────────

  /// All persons whose father link (or mother link, per `role`) equals
  /// `parent_id`, ordered by `birth_order`.
  fn children_of(
    &self,
    parent_id: Uuid,
    role: ParentRole,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// All persons whose `parent_union_id` equals `union_id`, ordered by
  /// `birth_order`.
  fn children_of_union(
    &self,
    union_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Unions ────────────────────────────────────────────────────────────

  /// Persist a new union; the store assigns the id. The unordered spouse
  /// pair is unique — a lost check-then-insert race must surface as an
  /// error, not a duplicate row.
  fn add_union(
    &self,
    input: NewUnion,
  ) -> impl Future<Output = Result<Union, Self::Error>> + Send + '_;

  /// Retrieve a union by id. Returns `None` if not found.
  fn get_union(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Union>, Self::Error>> + Send + '_;

  /// List all unions, optionally restricted to one recording actor.
  fn list_unions(
    &self,
    manager: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Union>, Self::Error>> + Send + '_;

  /// All unions in which `person_id` occupies the slot selected by `role`
  /// (`Father` = husband slot, `Mother` = wife slot), ordered by
  /// `married_on` with undated unions last.
  fn unions_for(
    &self,
    person_id: Uuid,
    role: ParentRole,
  ) -> impl Future<Output = Result<Vec<Union>, Self::Error>> + Send + '_;

  /// The union pairing `a` and `b`, regardless of slot order.
  fn union_between(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<Option<Union>, Self::Error>> + Send + '_;
}

/// Fetch a person, mapping absence to [`Error::PersonNotFound`].
pub async fn require_person<S: FamilyStore>(
  store: &S,
  id: Uuid,
) -> crate::Result<Person> {
  store
    .get_person(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::PersonNotFound(id))
}

/// Fetch a union, mapping absence to [`Error::UnionNotFound`].
pub async fn require_union<S: FamilyStore>(
  store: &S,
  id: Uuid,
) -> crate::Result<Union> {
  store
    .get_union(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::UnionNotFound(id))
}
