//! Integration tests for `SqliteStore` against an in-memory database.

use cellar_core::{
  session::Session,
  store::CellarStore,
  user::{AppVersion, NewUser, User},
  wine::{BottleUpdate, NewBottles, Wine, WineFields, WineType},
};
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str) -> User {
  s.create_user(NewUser {
    email:         email.into(),
    password_hash: "$argon2id$stub".into(),
  })
  .await
  .unwrap()
}

fn fields(name: &str) -> WineFields {
  WineFields {
    name:       name.into(),
    image_url:  Some("https://files.example.com/label.jpg".into()),
    year:       2018,
    wine_type:  WineType::Red,
    varietal:   "Syrah".into(),
    rating:     4.2,
    winery_key: "e-guigal".into(),
    note:       "peppery".into(),
  }
}

async fn wine_with_bottles(
  s: &SqliteStore,
  owner: Uuid,
  name: &str,
  quantity: u32,
) -> Wine {
  let wine = s.create_wine(owner, fields(name)).await.unwrap();
  if quantity > 0 {
    let first = s.max_bottle_counter(owner).await.unwrap() + 1;
    s.insert_bottles(NewBottles {
      wine_id:       wine.id,
      first_counter: first,
      quantity,
      note:          String::new(),
    })
    .await
    .unwrap();
  }
  wine
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let created = user(&s, "ann@example.com").await;
  assert_eq!(created.version, Some(AppVersion::V1));

  let by_email = s.find_user_by_email("ann@example.com").await.unwrap().unwrap();
  assert_eq!(by_email.user_id, created.user_id);
  assert_eq!(by_email.password_hash, "$argon2id$stub");

  let by_id = s.get_user(created.user_id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "ann@example.com");

  assert!(s.find_user_by_email("bob@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  user(&s, "ann@example.com").await;
  let again = s
    .create_user(NewUser {
      email:         "ann@example.com".into(),
      password_hash: "x".into(),
    })
    .await;
  assert!(again.is_err());
}

#[tokio::test]
async fn set_version_persists() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;

  let updated = s.set_user_version(u.user_id, AppVersion::V2).await.unwrap().unwrap();
  assert_eq!(updated.version, Some(AppVersion::V2));

  let fetched = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.version, Some(AppVersion::V2));

  assert!(s.set_user_version(Uuid::new_v4(), AppVersion::V1).await.unwrap().is_none());
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_lifecycle() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let now = Utc::now();

  s.create_session(Session {
    token_hash: "abc123".into(),
    user_id:    u.user_id,
    created_at: now,
    expires_at: now + Duration::hours(1),
  })
  .await
  .unwrap();

  let fetched = s.get_session("abc123").await.unwrap().unwrap();
  assert_eq!(fetched.user_id, u.user_id);
  assert!(!fetched.is_expired(now));

  assert!(s.delete_session("abc123").await.unwrap());
  assert!(!s.delete_session("abc123").await.unwrap());
  assert!(s.get_session("abc123").await.unwrap().is_none());
}

// ─── Wines ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_wine_roundtrips_fields() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;

  let created = s.create_wine(u.user_id, fields("Cote-Rotie")).await.unwrap();
  assert_eq!(created.fields, fields("Cote-Rotie"));
  assert_eq!(created.owner_id, u.user_id);

  let fetched = s.get_wine(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.fields, fields("Cote-Rotie"));
  assert_eq!(fetched.owner_id, u.user_id);
}

#[tokio::test]
async fn get_missing_wine_returns_none() {
  let s = store().await;
  assert!(s.get_wine(42).await.unwrap().is_none());
}

#[tokio::test]
async fn list_wines_is_owner_scoped_with_counts() {
  let s = store().await;
  let ann = user(&s, "ann@example.com").await;
  let bob = user(&s, "bob@example.com").await;

  let a1 = wine_with_bottles(&s, ann.user_id, "Alpha", 2).await;
  let a2 = wine_with_bottles(&s, ann.user_id, "Bravo", 0).await;
  wine_with_bottles(&s, bob.user_id, "Charlie", 5).await;

  let listed = s.list_wines(ann.user_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].wine.id, a1.id);
  assert_eq!(listed[0].bottle_count, 2);
  assert_eq!(listed[1].wine.id, a2.id);
  assert_eq!(listed[1].bottle_count, 0);
}

#[tokio::test]
async fn update_wine_overwrites_fields_but_not_owner() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let wine = s.create_wine(u.user_id, fields("Before")).await.unwrap();

  let replacement = WineFields {
    name:       "After".into(),
    image_url:  None,
    year:       0,
    wine_type:  WineType::Rose,
    varietal:   "Grenache".into(),
    rating:     3.0,
    winery_key: "domaine-ott".into(),
    note:       String::new(),
  };
  let updated = s.update_wine(wine.id, replacement.clone()).await.unwrap().unwrap();
  assert_eq!(updated.fields, replacement);
  assert_eq!(updated.owner_id, u.user_id);
  assert_eq!(updated.created_at, wine.created_at);

  assert!(s.update_wine(999, replacement).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_wine_cascades_to_bottles() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let wine = wine_with_bottles(&s, u.user_id, "Doomed", 3).await;
  let bottle_id = s.list_bottles(wine.id).await.unwrap()[0].id;

  let deleted = s.delete_wine(wine.id).await.unwrap().unwrap();
  assert_eq!(deleted.id, wine.id);

  assert!(s.get_wine(wine.id).await.unwrap().is_none());
  assert!(s.get_bottle(bottle_id).await.unwrap().is_none());
  assert!(s.delete_wine(wine.id).await.unwrap().is_none());
}

// ─── Bottles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn max_counter_spans_all_owned_wines() {
  let s = store().await;
  let ann = user(&s, "ann@example.com").await;
  let bob = user(&s, "bob@example.com").await;

  assert_eq!(s.max_bottle_counter(ann.user_id).await.unwrap(), 0);

  wine_with_bottles(&s, ann.user_id, "Alpha", 2).await;
  wine_with_bottles(&s, ann.user_id, "Bravo", 3).await;
  wine_with_bottles(&s, bob.user_id, "Charlie", 10).await;

  assert_eq!(s.max_bottle_counter(ann.user_id).await.unwrap(), 5);
  assert_eq!(s.max_bottle_counter(bob.user_id).await.unwrap(), 10);
}

#[tokio::test]
async fn insert_bottles_assigns_consecutive_counters() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let wine = s.create_wine(u.user_id, fields("Batch")).await.unwrap();

  let inserted = s
    .insert_bottles(NewBottles {
      wine_id:       wine.id,
      first_counter: 6,
      quantity:      3,
      note:          "x".into(),
    })
    .await
    .unwrap();

  let counters: Vec<_> = inserted.iter().map(|b| b.counter).collect();
  assert_eq!(counters, [6, 7, 8]);
  assert!(inserted.iter().all(|b| !b.consumed && b.date_consumed.is_none()));
  assert!(inserted.iter().all(|b| b.note == "x"));

  let listed = s.list_bottles(wine.id).await.unwrap();
  assert_eq!(listed, inserted);
}

#[tokio::test]
async fn list_bottles_orders_by_counter() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let wine = s.create_wine(u.user_id, fields("Order")).await.unwrap();

  for first in [20, 1, 10] {
    s.insert_bottles(NewBottles {
      wine_id:       wine.id,
      first_counter: first,
      quantity:      1,
      note:          String::new(),
    })
    .await
    .unwrap();
  }

  let counters: Vec<_> = s
    .list_bottles(wine.id)
    .await
    .unwrap()
    .iter()
    .map(|b| b.counter)
    .collect();
  assert_eq!(counters, [1, 10, 20]);
}

#[tokio::test]
async fn update_bottle_toggles_consumed() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let wine = wine_with_bottles(&s, u.user_id, "Open me", 1).await;
  let bottle = s.list_bottles(wine.id).await.unwrap().remove(0);

  let when = Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap();
  let opened = s
    .update_bottle(bottle.id, BottleUpdate::new(Some(when), Some("y".into())))
    .await
    .unwrap()
    .unwrap();
  assert!(opened.consumed);
  assert_eq!(opened.date_consumed, Some(when));
  assert_eq!(opened.note, "y");
  assert_eq!(opened.counter, bottle.counter);

  let reset = s
    .update_bottle(bottle.id, BottleUpdate::new(None, None))
    .await
    .unwrap()
    .unwrap();
  assert!(!reset.consumed);
  assert!(reset.date_consumed.is_none());
  assert_eq!(reset.note, "");

  assert!(
    s.update_bottle(999, BottleUpdate::new(None, None))
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn delete_bottle_returns_row() {
  let s = store().await;
  let u = user(&s, "ann@example.com").await;
  let wine = wine_with_bottles(&s, u.user_id, "Two", 2).await;
  let bottles = s.list_bottles(wine.id).await.unwrap();

  let deleted = s.delete_bottle(bottles[0].id).await.unwrap().unwrap();
  assert_eq!(deleted, bottles[0]);
  assert_eq!(s.list_bottles(wine.id).await.unwrap().len(), 1);
  assert!(s.delete_bottle(bottles[0].id).await.unwrap().is_none());
}
