//! JSON REST API for Stemma.
//!
//! Exposes an axum [`Router`] backed by any
//! [`stemma_core::store::FamilyStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; the actor identity is read from the
//! `X-Actor-Id` header and recorded as-is (see [`actor`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stemma_api::api_router(store.clone()))
//! ```

pub mod actor;
pub mod error;
pub mod persons;
pub mod queries;
pub mod unions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use stemma_core::store::FamilyStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FamilyStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route("/persons/{id}", get(persons::get_one::<S>))
    // Lineage
    .route("/persons/{id}/father", put(persons::set_father::<S>))
    .route("/persons/{id}/mother", put(persons::set_mother::<S>))
    .route("/persons/{id}/children", get(persons::children::<S>))
    // Marital graph
    .route("/persons/{id}/wife", post(unions::add_wife::<S>))
    .route("/persons/{id}/husband", post(unions::add_husband::<S>))
    .route("/persons/{id}/spouses", get(unions::spouses::<S>))
    .route("/persons/{id}/unions", get(unions::for_person::<S>))
    .route("/unions", get(unions::list::<S>))
    .route("/unions/{id}", get(unions::get_one::<S>))
    // Derived queries
    .route("/persons/{id}/siblings", get(queries::siblings::<S>))
    .route("/persons/{id}/descendants", get(queries::descendants::<S>))
    .route("/persons/{id}/age", get(queries::age::<S>))
    .with_state(store)
}
