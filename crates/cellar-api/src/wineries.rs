//! Handler for `GET /wineries` — the static winery lookup table.

use axum::Json;
use cellar_core::winery::{WINERIES, Winery};

/// `GET /wineries`. Reference data; no session required.
pub async fn list() -> Json<&'static [Winery]> { Json(WINERIES) }
