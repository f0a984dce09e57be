//! Handlers for union creation and role-aware traversal.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/persons/:id/wife` | `:id` acts as husband |
//! | `POST` | `/persons/:id/husband` | `:id` acts as wife |
//! | `GET`  | `/persons/:id/spouses` | Marriage-date order, undated last |
//! | `GET`  | `/persons/:id/unions` | Same ordering |
//! | `GET`  | `/unions` | Optional `?manager=<uuid>` |
//! | `GET`  | `/unions/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use stemma_core::{
  marital,
  person::Person,
  store::{FamilyStore, require_person, require_union},
  union::Union,
};
use uuid::Uuid;

use crate::{actor::actor_from_headers, error::ApiError};

// ─── Creation ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddWifeBody {
  pub wife_id:    Uuid,
  #[serde(default)]
  pub married_on: Option<NaiveDate>,
}

/// `POST /persons/:id/wife` — records a union with `:id` as husband.
pub async fn add_wife<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<AddWifeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let union =
    marital::add_wife(store.as_ref(), actor, id, body.wife_id, body.married_on)
      .await?;
  Ok((StatusCode::CREATED, Json(union)))
}

#[derive(Debug, Deserialize)]
pub struct AddHusbandBody {
  pub husband_id: Uuid,
  #[serde(default)]
  pub married_on: Option<NaiveDate>,
}

/// `POST /persons/:id/husband` — records a union with `:id` as wife.
pub async fn add_husband<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<AddHusbandBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let union = marital::add_husband(
    store.as_ref(),
    actor,
    id,
    body.husband_id,
    body.married_on,
  )
  .await?;
  Ok((StatusCode::CREATED, Json(union)))
}

// ─── Traversal ────────────────────────────────────────────────────────────────

/// `GET /persons/:id/spouses`
pub async fn spouses<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  let spouses = marital::spouses_of(store.as_ref(), &person).await?;
  Ok(Json(spouses))
}

/// `GET /persons/:id/unions`
pub async fn for_person<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Union>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  let unions = marital::unions_of(store.as_ref(), &person).await?;
  Ok(Json(unions))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub manager: Option<Uuid>,
}

/// `GET /unions[?manager=<uuid>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Union>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let unions = store
    .list_unions(params.manager)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(unions))
}

/// `GET /unions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Union>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let union = require_union(store.as_ref(), id).await?;
  Ok(Json(union))
}
