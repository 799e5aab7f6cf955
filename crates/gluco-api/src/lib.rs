//! JSON REST API for the gluco record service.
//!
//! Exposes an axum [`Router`] backed by any [`gluco_core::store::RecordStore`].
//! Versioned-prefix nesting, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", gluco_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod levels;
pub mod threshold;

use std::sync::Arc;

use axum::{Router, routing::get};
use gluco_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Levels
    .route("/levels/", get(levels::list::<S>).post(levels::create::<S>))
    .route("/levels/{id}", get(levels::get_one::<S>))
    // Threshold ratio
    .route("/threshold/", get(threshold::handler::<S>))
    .with_state(store)
}
