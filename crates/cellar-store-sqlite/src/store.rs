//! [`SqliteStore`] — the SQLite implementation of [`CellarStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cellar_core::{
  session::Session,
  store::CellarStore,
  user::{AppVersion, NewUser, User},
  wine::{
    BottleUpdate, NewBottles, Wine, WineBottle, WineFields, WineSummary,
  },
};

use crate::{
  encode::{
    BOTTLE_COLUMNS, RawBottle, RawSession, RawUser, RawWine, RawWineSummary,
    USER_COLUMNS, WINE_COLUMNS, encode_dt, encode_uuid, encode_wine_type,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cellar store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
            rusqlite::params![value],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

fn select_wine(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawWine>> {
  conn
    .query_row(
      &format!("SELECT {WINE_COLUMNS} FROM wines w WHERE w.id = ?1"),
      rusqlite::params![id],
      RawWine::from_row,
    )
    .optional()
}

fn select_bottle(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawBottle>> {
  conn
    .query_row(
      &format!("SELECT {BOTTLE_COLUMNS} FROM wine_bottles WHERE id = ?1"),
      rusqlite::params![id],
      RawBottle::from_row,
    )
    .optional()
}

// ─── CellarStore impl ────────────────────────────────────────────────────────

impl CellarStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      email:         input.email,
      password_hash: input.password_hash,
      version:       Some(AppVersion::default()),
      created_at:    Utc::now(),
    };

    let id_str      = encode_uuid(user.user_id);
    let email       = user.email.clone();
    let hash        = user.password_hash.clone();
    let version     = user.version.map(AppVersion::as_i64);
    let created_str = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, password_hash, version, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, hash, version, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.user_where("user_id", encode_uuid(id)).await
  }

  async fn find_user_by_email<'a>(&'a self, email: &'a str) -> Result<Option<User>> {
    self.user_where("email", email.to_owned()).await
  }

  async fn set_user_version(
    &self,
    id: Uuid,
    version: AppVersion,
  ) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let v      = version.as_i64();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET version = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, v],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_user(id).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, session: Session) -> Result<Session> {
    let hash        = session.token_hash.clone();
    let user_str    = encode_uuid(session.user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session<'a>(&'a self, token_hash: &'a str) -> Result<Option<Session>> {
    let hash = token_hash.to_owned();

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT token_hash, user_id, created_at, expires_at
             FROM sessions WHERE token_hash = ?1",
            rusqlite::params![hash],
            |row| {
              Ok(RawSession {
                token_hash: row.get(0)?,
                user_id:    row.get(1)?,
                created_at: row.get(2)?,
                expires_at: row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session<'a>(&'a self, token_hash: &'a str) -> Result<bool> {
    let hash = token_hash.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![hash],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  // ── Wines ─────────────────────────────────────────────────────────────────

  async fn list_wines(&self, owner: Uuid) -> Result<Vec<WineSummary>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawWineSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {WINE_COLUMNS},
             (SELECT COUNT(*) FROM wine_bottles b WHERE b.wine_id = w.id)
           FROM wines w
           WHERE w.owner_id = ?1
           ORDER BY w.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| {
            Ok(RawWineSummary {
              wine:         RawWine::from_row(row)?,
              bottle_count: row.get(11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWineSummary::into_summary).collect()
  }

  async fn get_wine(&self, id: i64) -> Result<Option<Wine>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_wine(conn, id)?))
      .await?;

    raw.map(RawWine::into_wine).transpose()
  }

  async fn create_wine(&self, owner: Uuid, fields: WineFields) -> Result<Wine> {
    let created_at  = Utc::now();
    let owner_str   = encode_uuid(owner);
    let created_str = encode_dt(created_at);
    let type_str    = encode_wine_type(fields.wine_type);
    let row         = fields.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO wines (
             owner_id, name, image_url, year, wine_type,
             varietal, rating, winery_key, note, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            owner_str,
            row.name,
            row.image_url,
            row.year,
            type_str,
            row.varietal,
            row.rating,
            row.winery_key,
            row.note,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Wine { id, fields, owner_id: owner, created_at })
  }

  async fn update_wine(&self, id: i64, fields: WineFields) -> Result<Option<Wine>> {
    let type_str = encode_wine_type(fields.wine_type);

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE wines SET
             name = ?2, image_url = ?3, year = ?4, wine_type = ?5,
             varietal = ?6, rating = ?7, winery_key = ?8, note = ?9
           WHERE id = ?1",
          rusqlite::params![
            id,
            fields.name,
            fields.image_url,
            fields.year,
            type_str,
            fields.varietal,
            fields.rating,
            fields.winery_key,
            fields.note,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_wine(conn, id)?)
      })
      .await?;

    raw.map(RawWine::into_wine).transpose()
  }

  async fn delete_wine(&self, id: i64) -> Result<Option<Wine>> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx  = conn.transaction()?;
        let raw = select_wine(&tx, id)?;
        if raw.is_some() {
          tx.execute("DELETE FROM wines WHERE id = ?1", rusqlite::params![id])?;
        }
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawWine::into_wine).transpose()
  }

  // ── Bottles ───────────────────────────────────────────────────────────────

  async fn list_bottles(&self, wine_id: i64) -> Result<Vec<WineBottle>> {
    let raws: Vec<RawBottle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BOTTLE_COLUMNS} FROM wine_bottles
           WHERE wine_id = ?1
           ORDER BY counter ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![wine_id], RawBottle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBottle::into_bottle).collect()
  }

  async fn get_bottle(&self, id: i64) -> Result<Option<WineBottle>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_bottle(conn, id)?))
      .await?;

    raw.map(RawBottle::into_bottle).transpose()
  }

  async fn max_bottle_counter(&self, owner: Uuid) -> Result<i64> {
    let owner_str = encode_uuid(owner);

    let max = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(MAX(b.counter), 0)
           FROM wine_bottles b
           JOIN wines w ON w.id = b.wine_id
           WHERE w.owner_id = ?1",
          rusqlite::params![owner_str],
          |row| row.get::<_, i64>(0),
        )?)
      })
      .await?;

    Ok(max)
  }

  async fn insert_bottles(&self, input: NewBottles) -> Result<Vec<WineBottle>> {
    let NewBottles { wine_id, first_counter, quantity, note } = input;

    first_counter
      .checked_add(i64::from(quantity))
      .ok_or(Error::CounterOverflow(first_counter))?;

    let created_at  = Utc::now();
    let created_str = encode_dt(created_at);
    let row_note    = note.clone();

    let ids: Vec<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(quantity as usize);
        {
          let mut stmt = tx.prepare(
            "INSERT INTO wine_bottles (wine_id, counter, consumed, date_consumed, note, created_at)
             VALUES (?1, ?2, 0, NULL, ?3, ?4)",
          )?;
          for counter in first_counter..first_counter + i64::from(quantity) {
            stmt.execute(rusqlite::params![wine_id, counter, row_note, created_str])?;
            ids.push((tx.last_insert_rowid(), counter));
          }
        }
        tx.commit()?;
        Ok(ids)
      })
      .await?;

    Ok(
      ids
        .into_iter()
        .map(|(id, counter)| WineBottle {
          id,
          wine_id,
          counter,
          consumed: false,
          date_consumed: None,
          note: note.clone(),
          created_at,
        })
        .collect(),
    )
  }

  async fn update_bottle(
    &self,
    id: i64,
    update: BottleUpdate,
  ) -> Result<Option<WineBottle>> {
    let consumed = update.consumed();
    let date_str = update.date_consumed.map(encode_dt);
    let note     = update.note;

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE wine_bottles SET consumed = ?2, date_consumed = ?3, note = ?4
           WHERE id = ?1",
          rusqlite::params![id, consumed, date_str, note],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_bottle(conn, id)?)
      })
      .await?;

    raw.map(RawBottle::into_bottle).transpose()
  }

  async fn delete_bottle(&self, id: i64) -> Result<Option<WineBottle>> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx  = conn.transaction()?;
        let raw = select_bottle(&tx, id)?;
        if raw.is_some() {
          tx.execute(
            "DELETE FROM wine_bottles WHERE id = ?1",
            rusqlite::params![id],
          )?;
        }
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawBottle::into_bottle).transpose()
  }
}
