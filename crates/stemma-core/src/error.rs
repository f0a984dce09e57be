//! Error types for `stemma-core`.
//!
//! Every validation failure is a distinct variant; no operation reports
//! failure through an empty result.

use thiserror::Error;
use uuid::Uuid;

use crate::person::{GenderRole, ParentRole};

#[derive(Debug, Error)]
pub enum Error {
  /// A lineage or union operation named a person whose gender role does
  /// not match the slot it was meant to fill. The operation performed no
  /// mutation.
  #[error("gender role {gender} cannot occupy the {required} slot")]
  RoleMismatch {
    gender:   GenderRole,
    required: ParentRole,
  },

  /// The pair already has a recorded union, in either slot order.
  #[error("persons {husband_id} and {wife_id} already have a recorded union")]
  DuplicateUnion {
    husband_id: Uuid,
    wife_id:    Uuid,
  },

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("union not found: {0}")]
  UnionNotFound(Uuid),

  /// Linking the candidate would make the child its own ancestor; the
  /// lineage graph must stay a forest.
  #[error("person {child_id} is already an ancestor of candidate parent {parent_id}")]
  LineageCycle {
    child_id:  Uuid,
    parent_id: Uuid,
  },

  /// A parent candidate was persisted but the child link was not. The
  /// store holds a half-linked state that needs retry or manual repair —
  /// surfaced apart from ordinary store failures so callers can tell the
  /// difference.
  #[error("lineage assignment left parent {parent_id} saved but child {child_id} unlinked")]
  InconsistentLineage {
    child_id:  Uuid,
    parent_id: Uuid,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure from the persistence collaborator.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
