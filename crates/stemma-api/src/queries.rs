//! Handlers for the derived query endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/persons/:id/siblings` | Disjunctive shared-link match |
//! | `GET` | `/persons/:id/descendants` | `?depth=<n>`; `n <= 0` unbounded |
//! | `GET` | `/persons/:id/age` | `?as_of=YYYY-MM-DD`, defaults to today |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stemma_core::{
  chronology::Lifespan,
  descent::{self, DepthLimit},
  person::Person,
  store::{FamilyStore, require_person},
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Siblings ─────────────────────────────────────────────────────────────────

/// `GET /persons/:id/siblings`
pub async fn siblings<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  let siblings = descent::siblings_of(store.as_ref(), &person).await?;
  Ok(Json(siblings))
}

// ─── Descendant counts ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DescendantParams {
  pub depth: Option<i64>,
}

/// `GET /persons/:id/descendants[?depth=<n>]` — descendant counts per
/// generation; depths beyond `n` merge into bucket `n`.
pub async fn descendants<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<DescendantParams>,
) -> Result<Json<BTreeMap<u32, u64>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  let limit = DepthLimit::from_raw(params.depth.unwrap_or(-1));
  let counts =
    descent::descendant_counts(store.as_ref(), &person, limit).await?;
  Ok(Json(counts))
}

// ─── Age ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AgeParams {
  pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct AgeResponse {
  /// Whole years; absent when no birth fact is recorded.
  pub age:         Option<i32>,
  pub lifespan:    Option<Lifespan>,
  pub description: Option<String>,
}

/// `GET /persons/:id/age[?as_of=YYYY-MM-DD]`
pub async fn age<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<AgeParams>,
) -> Result<Json<AgeResponse>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  let as_of = params.as_of.unwrap_or_else(|| Utc::now().date_naive());

  let lifespan = person.lifespan_on(as_of);
  Ok(Json(AgeResponse {
    age:         person.age_on(as_of),
    description: lifespan.map(|span| span.to_string()),
    lifespan,
  }))
}
