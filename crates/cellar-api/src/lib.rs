//! JSON procedure API for Cellar.
//!
//! Exposes an axum [`Router`] backed by any [`cellar_core::store::CellarStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cellar_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod session;
pub mod wine;
pub mod wineries;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cellar_core::store::CellarStore;

pub use error::ApiError;
pub use session::Caller;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Behavioural knobs for the API layer.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Lifetime of a session issued at sign-in.
  pub session_ttl_hours: i64,
  /// Also require ownership on GetBottle, DeleteWine, AddBottles, EditBottle
  /// and DeleteBottle. Off by default.
  pub strict_ownership:  bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { session_ttl_hours: 24 * 30, strict_ownership: false }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CellarStore> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S: CellarStore> AppState<S> {
  pub fn new(store: S, config: ApiConfig) -> Self {
    Self { store: Arc::new(store), config: Arc::new(config) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CellarStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Auth
    .route("/auth/signin", post(auth::sign_in::<S>))
    .route("/auth/signout", post(auth::sign_out::<S>))
    .route("/auth/session", get(auth::current::<S>))
    // Wine queries
    .route("/wine.getWines", get(wine::list_wines::<S>))
    .route("/wine.getWine", get(wine::get_wine::<S>))
    .route("/wine.getBottle", get(wine::get_bottle::<S>))
    .route("/wine.getApplicationVersion", get(wine::get_version::<S>))
    // Wine mutations
    .route("/wine.createWine", post(wine::create_wine::<S>))
    .route("/wine.editWine", post(wine::edit_wine::<S>))
    .route("/wine.deleteWine", post(wine::delete_wine::<S>))
    .route("/wine.addBottle", post(wine::add_bottles::<S>))
    .route("/wine.editWineBottle", post(wine::edit_bottle::<S>))
    .route("/wine.deleteWineBottle", post(wine::delete_bottle::<S>))
    .route("/wine.editApplicationVersion", post(wine::set_version::<S>))
    // Reference data
    .route("/wineries", get(wineries::list))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
