//! The `CellarStore` trait.
//!
//! Implemented by storage backends (e.g. `cellar-store-sqlite`). The API layer
//! depends on this abstraction, not on any concrete backend.
//!
//! Stores do not enforce ownership; that is the caller's job. Update and
//! delete methods return `None` when the target row does not exist.

use std::future::Future;

use uuid::Uuid;

use crate::{
  session::Session,
  user::{AppVersion, NewUser, User},
  wine::{
    BottleUpdate, NewBottles, Wine, WineBottle, WineFields, WineSummary,
  },
};

/// Abstraction over a Cellar storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CellarStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user with the default application version.
  /// Fails if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Exact match on the stored (already normalised) email.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn set_user_version(
    &self,
    id: Uuid,
    version: AppVersion,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn get_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Returns `true` if a session was removed.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Wines ─────────────────────────────────────────────────────────────

  /// All wines owned by `owner`, each with its bottle count, ordered by id.
  fn list_wines(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<WineSummary>, Self::Error>> + Send + '_;

  fn get_wine(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Wine>, Self::Error>> + Send + '_;

  fn create_wine(
    &self,
    owner: Uuid,
    fields: WineFields,
  ) -> impl Future<Output = Result<Wine, Self::Error>> + Send + '_;

  /// Overwrite every mutable field. The owner is never touched.
  fn update_wine(
    &self,
    id: i64,
    fields: WineFields,
  ) -> impl Future<Output = Result<Option<Wine>, Self::Error>> + Send + '_;

  /// Delete a wine and, by cascade, its bottles. Returns the deleted row.
  fn delete_wine(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Wine>, Self::Error>> + Send + '_;

  // ── Bottles ───────────────────────────────────────────────────────────

  /// Bottles of one wine, ordered by ascending counter.
  fn list_bottles(
    &self,
    wine_id: i64,
  ) -> impl Future<Output = Result<Vec<WineBottle>, Self::Error>> + Send + '_;

  fn get_bottle(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<WineBottle>, Self::Error>> + Send + '_;

  /// Highest counter across every bottle of every wine owned by `owner`,
  /// or `0` if the owner has no bottles.
  fn max_bottle_counter(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Insert `quantity` unconsumed bottles with consecutive counters starting
  /// at `first_counter`. The batch is written atomically.
  fn insert_bottles(
    &self,
    input: NewBottles,
  ) -> impl Future<Output = Result<Vec<WineBottle>, Self::Error>> + Send + '_;

  fn update_bottle(
    &self,
    id: i64,
    update: BottleUpdate,
  ) -> impl Future<Output = Result<Option<WineBottle>, Self::Error>> + Send + '_;

  fn delete_bottle(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<WineBottle>, Self::Error>> + Send + '_;
}
