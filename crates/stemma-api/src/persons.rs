//! Handlers for `/persons` and lineage endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons` | Optional `?manager=<uuid>` |
//! | `POST` | `/persons` | Body: a new person; actor stamped from header |
//! | `GET`  | `/persons/:id` | 404 if not found |
//! | `PUT`  | `/persons/:id/father` | Body: `{"existing":"<uuid>"}` or `{"new":{…}}` |
//! | `PUT`  | `/persons/:id/mother` | Symmetric |
//! | `GET`  | `/persons/:id/children` | Ordered by birth order |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use serde::Deserialize;
use stemma_core::{
  lineage::{self, ParentCandidate},
  person::{NewPerson, Person},
  store::{FamilyStore, require_person},
};
use uuid::Uuid;

use crate::{actor::actor_from_headers, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub manager: Option<Uuid>,
}

/// `GET /persons[?manager=<uuid>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let persons = store
    .list_persons(params.manager)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(persons))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons` — body: a [`NewPerson`]; the recording actor comes from
/// the `X-Actor-Id` header, overriding any `manager_id` in the body.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(mut body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if let Some(actor) = actor_from_headers(&headers)? {
    body.manager_id = Some(actor);
  }
  let person = store
    .add_person(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  Ok(Json(person))
}

// ─── Parent assignment ────────────────────────────────────────────────────────

/// Body of the parent-assignment endpoints: either a person already in the
/// store or one to persist as part of the assignment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentBody {
  Existing(Uuid),
  New(NewPerson),
}

impl ParentBody {
  fn into_candidate(self, actor: Option<Uuid>) -> ParentCandidate {
    match self {
      ParentBody::Existing(id) => ParentCandidate::Existing(id),
      ParentBody::New(mut input) => {
        if actor.is_some() {
          input.manager_id = actor;
        }
        ParentCandidate::New(input)
      }
    }
  }
}

/// `PUT /persons/:id/father`
pub async fn set_father<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<ParentBody>,
) -> Result<Json<Person>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let child = require_person(store.as_ref(), id).await?;
  let father =
    lineage::set_father(store.as_ref(), &child, body.into_candidate(actor))
      .await?;
  Ok(Json(father))
}

/// `PUT /persons/:id/mother`
pub async fn set_mother<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<ParentBody>,
) -> Result<Json<Person>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let child = require_person(store.as_ref(), id).await?;
  let mother =
    lineage::set_mother(store.as_ref(), &child, body.into_candidate(actor))
      .await?;
  Ok(Json(mother))
}

// ─── Children ─────────────────────────────────────────────────────────────────

/// `GET /persons/:id/children`
pub async fn children<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = require_person(store.as_ref(), id).await?;
  let children = lineage::children(store.as_ref(), &person).await?;
  Ok(Json(children))
}
