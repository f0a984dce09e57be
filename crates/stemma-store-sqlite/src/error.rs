//! Error type for `stemma-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown gender role: {0:?}")]
  UnknownGender(String),

  /// Attempted to update a person that is not in the store.
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  /// A caller-supplied person id is already taken.
  #[error("person id already taken: {0}")]
  PersonExists(Uuid),

  /// The unordered spouse pair is already recorded. Raised when the
  /// `UNIQUE (husband_id, wife_id)` backstop fires, closing the
  /// check-then-insert race.
  #[error("union already recorded for husband {husband_id} and wife {wife_id}")]
  UnionExists {
    husband_id: Uuid,
    wife_id:    Uuid,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
