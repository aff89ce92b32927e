//! The `wine.*` procedures.
//!
//! Queries are `GET` with query-string input, mutations are `POST` with a JSON
//! body. Every handler takes a [`Caller`], so an unauthenticated request is
//! rejected before any of this code runs.
//!
//! | Method | Path | Input | Output |
//! |--------|------|-------|--------|
//! | `GET`  | `/wine.getWines` | — | [`WineSummary`]`[]` |
//! | `GET`  | `/wine.getWine` | `?id=` | [`WineDetail`] |
//! | `GET`  | `/wine.getBottle` | `?id=` | [`WineBottle`] or `null` |
//! | `POST` | `/wine.createWine` | [`WineFields`] | [`Wine`] (201) |
//! | `POST` | `/wine.editWine` | [`EditWineBody`] | [`Wine`] |
//! | `POST` | `/wine.deleteWine` | [`IdBody`] | [`Wine`] |
//! | `POST` | `/wine.addBottle` | [`AddBottlesBody`] | [`Wine`] |
//! | `POST` | `/wine.editWineBottle` | [`EditBottleBody`] | [`WineBottle`] |
//! | `POST` | `/wine.deleteWineBottle` | [`IdBody`] | [`WineBottle`] |
//! | `POST` | `/wine.editApplicationVersion` | [`VersionBody`] | [`User`] |
//! | `GET`  | `/wine.getApplicationVersion` | — | `1`, `2` or `null` |
//!
//! GetBottle, DeleteWine, AddBottles, EditBottle and DeleteBottle only check
//! ownership when [`ApiConfig::strict_ownership`](crate::ApiConfig) is set.

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
};
use cellar_core::{
  store::CellarStore,
  user::{AppVersion, User},
  validate::{MAX_BOTTLE_BATCH, ValidationErrors},
  wine::{
    BottleUpdate, NewBottles, Wine, WineBottle, WineDetail, WineFields,
    WineSummary,
  },
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{AppState, error::ApiError, session::Caller};

// ─── Inputs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IdParams {
  pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct IdBody {
  pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct EditWineBody {
  pub id:     i64,
  #[serde(flatten)]
  pub fields: WineFields,
}

#[derive(Debug, Deserialize)]
pub struct AddBottlesBody {
  /// The wine to add bottles to.
  pub id:       i64,
  pub quantity: i64,
  #[serde(default)]
  pub note:     String,
}

#[derive(Debug, Deserialize)]
pub struct EditBottleBody {
  pub id:            i64,
  /// Setting a date marks the bottle consumed; `null` marks it unconsumed.
  #[serde(default)]
  pub date_consumed: Option<DateTime<Utc>>,
  #[serde(default)]
  pub note:          Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VersionBody {
  pub version: i64,
}

// ─── Ownership helpers ───────────────────────────────────────────────────────

/// Load a wine the caller owns. Missing and foreign wines are both
/// [`ApiError::Forbidden`].
async fn owned_wine<S>(
  state: &AppState<S>,
  caller: &Caller,
  id: i64,
) -> Result<Wine, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let wine = state.store.get_wine(id).await.map_err(ApiError::store)?;
  match wine {
    Some(w) if w.owner_id == caller.user_id => Ok(w),
    _ => {
      tracing::warn!(user_id = %caller.user_id, wine_id = id, "wine access denied");
      Err(ApiError::Forbidden)
    }
  }
}

/// In strict mode, require that `bottle` belongs to one of the caller's wines.
async fn check_bottle_owner<S>(
  state: &AppState<S>,
  caller: &Caller,
  bottle: &WineBottle,
) -> Result<(), ApiError>
where
  S: CellarStore + Clone + 'static,
{
  if state.config.strict_ownership {
    owned_wine(state, caller, bottle.wine_id).await?;
  }
  Ok(())
}

/// Load a bottle for mutation, applying the strict-mode owner check.
async fn bottle_for_update<S>(
  state: &AppState<S>,
  caller: &Caller,
  id: i64,
) -> Result<(), ApiError>
where
  S: CellarStore + Clone + 'static,
{
  if !state.config.strict_ownership {
    return Ok(());
  }
  let bottle = state
    .store
    .get_bottle(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("bottle {id} not found")))?;
  check_bottle_owner(state, caller, &bottle).await
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// `GET /wine.getWines`
pub async fn list_wines<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<WineSummary>>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let wines = state
    .store
    .list_wines(caller.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(wines))
}

/// `GET /wine.getWine?id=<id>`
pub async fn get_wine<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  params: Result<Query<IdParams>, QueryRejection>,
) -> Result<Json<WineDetail>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Query(IdParams { id }) = params?;
  let wine = owned_wine(&state, &caller, id).await?;
  let bottles = state
    .store
    .list_bottles(wine.id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(WineDetail { wine, bottles }))
}

/// `GET /wine.getBottle?id=<id>`
pub async fn get_bottle<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  params: Result<Query<IdParams>, QueryRejection>,
) -> Result<Json<Option<WineBottle>>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Query(IdParams { id }) = params?;
  let bottle = state.store.get_bottle(id).await.map_err(ApiError::store)?;
  if let Some(b) = &bottle {
    check_bottle_owner(&state, &caller, b).await?;
  }
  Ok(Json(bottle))
}

// ─── Wine mutations ──────────────────────────────────────────────────────────

/// `POST /wine.createWine` — returns 201 + the stored [`Wine`].
pub async fn create_wine<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<WineFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Wine>), ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(fields) = payload?;
  fields.validate()?;

  let wine = state
    .store
    .create_wine(caller.user_id, fields)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user_id = %caller.user_id, wine_id = wine.id, "wine created");
  Ok((StatusCode::CREATED, Json(wine)))
}

/// `POST /wine.editWine` — full overwrite of every mutable field.
pub async fn edit_wine<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<EditWineBody>, JsonRejection>,
) -> Result<Json<Wine>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(EditWineBody { id, fields }) = payload?;
  fields.validate()?;
  owned_wine(&state, &caller, id).await?;

  let wine = state
    .store
    .update_wine(id, fields)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("wine {id} not found")))?;
  Ok(Json(wine))
}

/// `POST /wine.deleteWine` — bottles go with it.
pub async fn delete_wine<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<IdBody>, JsonRejection>,
) -> Result<Json<Wine>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(IdBody { id }) = payload?;

  if state.config.strict_ownership {
    let existing = state.store.get_wine(id).await.map_err(ApiError::store)?;
    if existing.is_some_and(|w| w.owner_id != caller.user_id) {
      tracing::warn!(user_id = %caller.user_id, wine_id = id, "wine access denied");
      return Err(ApiError::Forbidden);
    }
  }

  let wine = state
    .store
    .delete_wine(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("wine {id} not found")))?;
  tracing::info!(user_id = %caller.user_id, wine_id = id, "wine deleted");
  Ok(Json(wine))
}

// ─── Bottle mutations ────────────────────────────────────────────────────────

/// `POST /wine.addBottle`
///
/// Counters continue from the highest counter among all of the caller's
/// bottles, across every wine. The max lookup and the insert are separate
/// store calls; concurrent batches from one owner may observe the same max.
pub async fn add_bottles<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<AddBottlesBody>, JsonRejection>,
) -> Result<Json<Wine>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(AddBottlesBody { id, quantity, note }) = payload?;

  let quantity = u32::try_from(quantity)
    .ok()
    .filter(|q| (1..=MAX_BOTTLE_BATCH).contains(q))
    .ok_or_else(|| {
      ValidationErrors::single(
        "quantity",
        format!("must be between 1 and {MAX_BOTTLE_BATCH}"),
      )
    })?;

  let wine = state
    .store
    .get_wine(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("wine {id} not found")))?;
  if state.config.strict_ownership && wine.owner_id != caller.user_id {
    tracing::warn!(user_id = %caller.user_id, wine_id = id, "wine access denied");
    return Err(ApiError::Forbidden);
  }

  let max = state
    .store
    .max_bottle_counter(caller.user_id)
    .await
    .map_err(ApiError::store)?;

  let bottles = state
    .store
    .insert_bottles(NewBottles {
      wine_id: id,
      first_counter: max + 1,
      quantity,
      note,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    user_id = %caller.user_id,
    wine_id = id,
    added = bottles.len(),
    first_counter = max + 1,
    "bottles added"
  );
  Ok(Json(wine))
}

/// `POST /wine.editWineBottle`
pub async fn edit_bottle<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<EditBottleBody>, JsonRejection>,
) -> Result<Json<WineBottle>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(EditBottleBody { id, date_consumed, note }) = payload?;
  bottle_for_update(&state, &caller, id).await?;

  let bottle = state
    .store
    .update_bottle(id, BottleUpdate::new(date_consumed, note))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("bottle {id} not found")))?;
  Ok(Json(bottle))
}

/// `POST /wine.deleteWineBottle`
pub async fn delete_bottle<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<IdBody>, JsonRejection>,
) -> Result<Json<WineBottle>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(IdBody { id }) = payload?;
  bottle_for_update(&state, &caller, id).await?;

  let bottle = state
    .store
    .delete_bottle(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("bottle {id} not found")))?;
  Ok(Json(bottle))
}

// ─── Application version ─────────────────────────────────────────────────────

/// `POST /wine.editApplicationVersion`
pub async fn set_version<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  payload: Result<Json<VersionBody>, JsonRejection>,
) -> Result<Json<User>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let Json(VersionBody { version }) = payload?;
  let version = AppVersion::try_from(version)
    .map_err(|e| ValidationErrors::single("version", e.to_string()))?;

  let user = state
    .store
    .set_user_version(caller.user_id, version)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
  Ok(Json(user))
}

/// `GET /wine.getApplicationVersion`
pub async fn get_version<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Option<AppVersion>>, ApiError>
where
  S: CellarStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(caller.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user.and_then(|u| u.version)))
}
