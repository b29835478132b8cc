//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use std::{path::PathBuf, sync::Arc};

use amoura_core::{
  matching::PairKey,
  service::SwipeService,
  store::{FeedStore, MatchStore, MessageStore, SwipeStore, UserDirectory},
  swipe::Direction,
  user::NewUser,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> Uuid {
  let input = NewUser::new(
    &format!("{name}-{}@example.com", Uuid::new_v4()),
    name,
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
  )
  .unwrap();
  s.register_user(input).await.unwrap().user_id
}

/// Let the clock move past the store's timestamp precision.
async fn tick() { tokio::time::sleep(std::time::Duration::from_millis(2)).await; }

/// A fresh database file under the system temp dir.
fn temp_db_path() -> PathBuf {
  std::env::temp_dir().join(format!("amoura-test-{}.db", Uuid::new_v4()))
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_user() {
  let s = store().await;
  let input = NewUser::new("Alice@Example.com", "Alice", "hash".into()).unwrap();
  let created = s.register_user(input).await.unwrap();
  assert_eq!(created.email, "alice@example.com");

  let fetched = s.get_user(created.user_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  let creds = s.find_credentials("alice@example.com").await.unwrap().unwrap();
  assert_eq!(creds.user_id, created.user_id);
  assert_eq!(creds.password_hash, "hash");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.register_user(NewUser::new("bob@example.com", "Bob", "h".into()).unwrap())
    .await
    .unwrap();
  let err = s
    .register_user(NewUser::new("BOB@example.com", "Bobby", "h".into()).unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn missing_user_and_credentials_return_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.find_credentials("nobody@example.com").await.unwrap().is_none());
}

// ─── Swipes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_swipe_upserts_per_ordered_pair() {
  let s = store().await;
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);

  let first = s.record_swipe(a, b, Direction::Like).await.unwrap();
  let second = s.record_swipe(a, b, Direction::Pass).await.unwrap();
  assert_eq!(first.direction, Direction::Like);
  assert_eq!(second.direction, Direction::Pass);
  assert!(second.decided_at >= first.decided_at);

  let stored = s.get_swipe(a, b).await.unwrap().unwrap();
  assert_eq!(stored, second);
  // The reverse direction is a separate record that does not exist yet.
  assert!(s.get_swipe(b, a).await.unwrap().is_none());
}

#[tokio::test]
async fn self_swipe_is_invalid_argument() {
  let s = store().await;
  let a = user(&s, "a").await;
  let err = s.record_swipe(a, a, Direction::Like).await.unwrap_err();
  assert!(matches!(
    amoura_core::Error::from(err),
    amoura_core::Error::InvalidArgument(_)
  ));
}

#[tokio::test]
async fn swipe_on_unknown_user_is_invalid_argument() {
  let s = store().await;
  let a = user(&s, "a").await;
  let ghost = Uuid::new_v4();

  let err = s.record_swipe(a, ghost, Direction::Like).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
  assert!(matches!(
    amoura_core::Error::from(err),
    amoura_core::Error::InvalidArgument(_)
  ));

  let err = s.record_swipe(ghost, a, Direction::Like).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
  assert!(s.get_swipe(ghost, a).await.unwrap().is_none());
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_match_if_absent_is_idempotent_in_either_order() {
  let s = store().await;
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);

  let first = s.create_match_if_absent(PairKey::new(a, b).unwrap()).await.unwrap();
  let again = s.create_match_if_absent(PairKey::new(b, a).unwrap()).await.unwrap();
  assert_eq!(first, again);
  assert!(first.active);
  assert_eq!(first.created_at, first.last_activity_at);

  assert_eq!(s.list_matches(a).await.unwrap().len(), 1);
  assert_eq!(s.list_matches(b).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deactivated_match_is_kept_and_does_not_block_rematch() {
  let s = store().await;
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);
  let pair = PairKey::new(a, b).unwrap();

  let original = s.create_match_if_absent(pair).await.unwrap();
  let closed = s.deactivate_match(original.match_id).await.unwrap().unwrap();
  assert!(!closed.active);
  assert!(s.list_matches(a).await.unwrap().is_empty());

  // Deactivation is idempotent and history stays readable.
  let again = s.deactivate_match(original.match_id).await.unwrap().unwrap();
  assert!(!again.active);
  assert!(s.get_match(original.match_id).await.unwrap().is_some());

  let fresh = s.create_match_if_absent(pair).await.unwrap();
  assert_ne!(fresh.match_id, original.match_id);
  assert!(fresh.active);
}

#[tokio::test]
async fn deactivate_unknown_match_returns_none() {
  let s = store().await;
  assert!(s.deactivate_match(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_matches_orders_by_recent_activity() {
  let s = store().await;
  let me = user(&s, "me").await;
  let (x, y, z) = (user(&s, "x").await, user(&s, "y").await, user(&s, "z").await);

  let mx = s.create_match_if_absent(PairKey::new(me, x).unwrap()).await.unwrap();
  tick().await;
  let my = s.create_match_if_absent(PairKey::new(me, y).unwrap()).await.unwrap();
  s.create_match_if_absent(PairKey::new(x, z).unwrap()).await.unwrap();

  // Newest first until a message bumps the older one.
  let ids: Vec<_> = s.list_matches(me).await.unwrap().iter().map(|m| m.match_id).collect();
  assert_eq!(ids, vec![my.match_id, mx.match_id]);

  tick().await;
  s.send_message(mx.match_id, x, "hey".into()).await.unwrap();
  let ids: Vec<_> = s.list_matches(me).await.unwrap().iter().map(|m| m.match_id).collect();
  assert_eq!(ids, vec![mx.match_id, my.match_id]);
}

#[tokio::test]
async fn match_feed_joins_partner_names_in_activity_order() {
  let s = store().await;
  let me = user(&s, "me").await;
  let (x, y, z) = (user(&s, "x").await, user(&s, "y").await, user(&s, "z").await);

  let mx = s.create_match_if_absent(PairKey::new(me, x).unwrap()).await.unwrap();
  tick().await;
  let my = s.create_match_if_absent(PairKey::new(me, y).unwrap()).await.unwrap();
  s.create_match_if_absent(PairKey::new(x, z).unwrap()).await.unwrap();
  tick().await;
  s.send_message(mx.match_id, me, "hey".into()).await.unwrap();

  let feed = s.match_feed(me).await.unwrap();
  let rows: Vec<_> = feed
    .iter()
    .map(|e| (e.record.match_id, e.partner.user_id, e.partner.display_name.as_str()))
    .collect();
  assert_eq!(rows, vec![(mx.match_id, x, "x"), (my.match_id, y, "y")]);

  // The partner is resolved from either side of the pair.
  let from_x = s.match_feed(x).await.unwrap();
  assert!(from_x.iter().any(|e| e.partner.user_id == me && e.partner.display_name == "me"));
  assert!(from_x.iter().any(|e| e.partner.user_id == z));

  s.deactivate_match(my.match_id).await.unwrap();
  assert_eq!(s.match_feed(y).await.unwrap(), vec![]);
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn messages_are_listed_oldest_first_and_bump_activity() {
  let s = store().await;
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);
  let m = s.create_match_if_absent(PairKey::new(a, b).unwrap()).await.unwrap();

  let first = s.send_message(m.match_id, a, "  hello  ".into()).await.unwrap();
  assert_eq!(first.text, "hello");
  let second = s.send_message(m.match_id, b, "hi!".into()).await.unwrap();

  let all = s.list_messages(m.match_id, b, None).await.unwrap();
  assert_eq!(all.iter().map(|m| m.message_id).collect::<Vec<_>>(), vec![
    first.message_id,
    second.message_id
  ]);

  let newer = s.list_messages(m.match_id, a, Some(first.created_at)).await.unwrap();
  assert!(newer.iter().all(|msg| msg.created_at > first.created_at));

  let bumped = s.get_match(m.match_id).await.unwrap().unwrap();
  assert_eq!(bumped.last_activity_at, second.created_at);
  assert_eq!(bumped.created_at, m.created_at);
}

#[tokio::test]
async fn outsiders_cannot_read_or_write() {
  let s = store().await;
  let (a, b, eve) = (user(&s, "a").await, user(&s, "b").await, user(&s, "eve").await);
  let m = s.create_match_if_absent(PairKey::new(a, b).unwrap()).await.unwrap();

  let err = s.send_message(m.match_id, eve, "psst".into()).await.unwrap_err();
  assert!(matches!(err, Error::MatchNotFound(_)));
  let err = s.list_messages(m.match_id, eve, None).await.unwrap_err();
  assert!(matches!(err, Error::MatchNotFound(_)));
  let err = s.send_message(Uuid::new_v4(), a, "hello?".into()).await.unwrap_err();
  assert!(matches!(err, Error::MatchNotFound(_)));
}

#[tokio::test]
async fn inactive_match_rejects_new_messages_but_keeps_history() {
  let s = store().await;
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);
  let m = s.create_match_if_absent(PairKey::new(a, b).unwrap()).await.unwrap();
  s.send_message(m.match_id, a, "before".into()).await.unwrap();
  s.deactivate_match(m.match_id).await.unwrap();

  let err = s.send_message(m.match_id, b, "after".into()).await.unwrap_err();
  assert!(matches!(err, Error::MatchInactive(_)));
  assert_eq!(s.list_messages(m.match_id, b, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_message_is_invalid_argument() {
  let s = store().await;
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);
  let m = s.create_match_if_absent(PairKey::new(a, b).unwrap()).await.unwrap();
  let err = s.send_message(m.match_id, a, "   ".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(amoura_core::Error::InvalidArgument(_))));
}

// ─── Swipe service over SQLite ───────────────────────────────────────────────

#[tokio::test]
async fn re_decision_before_reciprocation_leaves_no_match() {
  let s = Arc::new(store().await);
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);
  let svc = SwipeService::new(Arc::clone(&s));

  svc.swipe(a, b, Direction::Like).await.unwrap();
  svc.swipe(a, b, Direction::Pass).await.unwrap();
  let out = svc.swipe(b, a, Direction::Like).await.unwrap();

  assert!(!out.matched);
  assert!(s.list_matches(a).await.unwrap().is_empty());
  assert_eq!(s.get_swipe(a, b).await.unwrap().unwrap().direction, Direction::Pass);
}

#[tokio::test]
async fn mutual_like_in_either_order_yields_one_match() {
  let s = Arc::new(store().await);
  let svc = SwipeService::new(Arc::clone(&s));

  for flip in [false, true] {
    let (a, b) = (user(&s, "a").await, user(&s, "b").await);
    let (first, second) = if flip { (b, a) } else { (a, b) };

    let out = svc.swipe(first, second, Direction::Like).await.unwrap();
    assert!(!out.matched);
    let out = svc.swipe(second, first, Direction::Like).await.unwrap();
    assert!(out.matched);

    let matches = s.list_matches(a).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].members, PairKey::new(a, b).unwrap());
    assert_eq!(Some(&matches[0]), out.record.as_ref());
  }
}

const STRESS_PAIRS: usize = 50;

/// Fire both sides of many mutual likes at once through two independent
/// connections to the same database file. Every pair must converge on
/// exactly one active match.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutual_likes_converge_on_one_match_per_pair() {
  let path = temp_db_path();
  let left = Arc::new(SqliteStore::open(&path).await.unwrap());
  let right = Arc::new(SqliteStore::open(&path).await.unwrap());

  let mut pairs = Vec::with_capacity(STRESS_PAIRS);
  for i in 0..STRESS_PAIRS {
    pairs.push((user(&left, &format!("l{i}")).await, user(&left, &format!("r{i}")).await));
  }

  let mut handles = Vec::with_capacity(STRESS_PAIRS * 2);
  for &(a, b) in &pairs {
    let svc_a = SwipeService::new(Arc::clone(&left));
    let svc_b = SwipeService::new(Arc::clone(&right));
    handles.push(tokio::spawn(async move { svc_a.swipe(a, b, Direction::Like).await }));
    handles.push(tokio::spawn(async move { svc_b.swipe(b, a, Direction::Superlike).await }));
  }

  let mut matched_calls = 0;
  for handle in handles {
    let out = handle.await.expect("task join").expect("swipe");
    if out.matched {
      matched_calls += 1;
    }
  }
  // At least one side of every pair must have seen the other's swipe.
  assert!(matched_calls >= STRESS_PAIRS);

  for &(a, b) in &pairs {
    let from_a = left.list_matches(a).await.unwrap();
    let from_b = right.list_matches(b).await.unwrap();
    assert_eq!(from_a.len(), 1, "pair {a}/{b} has {} matches", from_a.len());
    assert_eq!(from_a, from_b);
  }

  drop((left, right));
  for suffix in ["", "-wal", "-shm"] {
    let mut p = path.clone().into_os_string();
    p.push(suffix);
    std::fs::remove_file(p).ok();
  }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_creates_return_the_same_match() {
  let s = Arc::new(store().await);
  let (a, b) = (user(&s, "a").await, user(&s, "b").await);

  let handles: Vec<_> = (0..16)
    .map(|i| {
      let s = Arc::clone(&s);
      let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
      let pair = PairKey::new(x, y).unwrap();
      tokio::spawn(async move { s.create_match_if_absent(pair).await })
    })
    .collect();

  let mut ids = Vec::new();
  for h in handles {
    ids.push(h.await.unwrap().unwrap().match_id);
  }
  ids.dedup();
  assert_eq!(ids.len(), 1);
}
