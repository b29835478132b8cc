//! In-memory store used by the core's unit tests.
//!
//! Not a real backend: a single mutex stands in for the storage-level
//! uniqueness a database would provide. The `fail_*` switches simulate an
//! unavailable store.

use std::{
  collections::{HashMap, HashSet},
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  matching::{Match, PairKey},
  store::{MatchStore, StoreBackend, SwipeStore},
  swipe::{Direction, Swipe},
};

#[derive(Default)]
pub struct MemoryStore {
  users:                 Mutex<HashSet<Uuid>>,
  swipes:                Mutex<HashMap<(Uuid, Uuid), Swipe>>,
  matches:               Mutex<Vec<Match>>,
  swipe_reads:           AtomicUsize,
  pub fail_swipe_writes: AtomicBool,
  pub fail_match_writes: AtomicBool,
}

fn unavailable() -> Error { Error::Storage("store unavailable".into()) }

impl MemoryStore {
  pub fn add_user(&self) -> Uuid {
    let id = Uuid::new_v4();
    self.users.lock().unwrap().insert(id);
    id
  }

  pub fn swipe_count(&self) -> usize { self.swipes.lock().unwrap().len() }

  /// How many `get_swipe` calls have been made.
  pub fn swipe_read_count(&self) -> usize { self.swipe_reads.load(Ordering::SeqCst) }

  pub fn match_count(&self) -> usize { self.matches.lock().unwrap().len() }

  pub fn active_match_count(&self) -> usize {
    self.matches.lock().unwrap().iter().filter(|m| m.active).count()
  }
}

impl StoreBackend for MemoryStore {
  type Error = Error;
}

impl SwipeStore for MemoryStore {
  async fn record_swipe(
    &self,
    actor: Uuid,
    target: Uuid,
    direction: Direction,
  ) -> Result<Swipe> {
    if self.fail_swipe_writes.load(Ordering::SeqCst) {
      return Err(unavailable());
    }
    {
      let users = self.users.lock().unwrap();
      if !users.contains(&actor) || !users.contains(&target) {
        return Err(Error::invalid("unknown user"));
      }
    }
    let swipe = Swipe { actor, target, direction, decided_at: Utc::now() };
    self.swipes.lock().unwrap().insert((actor, target), swipe.clone());
    Ok(swipe)
  }

  async fn get_swipe(&self, actor: Uuid, target: Uuid) -> Result<Option<Swipe>> {
    self.swipe_reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.swipes.lock().unwrap().get(&(actor, target)).cloned())
  }
}

impl MatchStore for MemoryStore {
  async fn create_match_if_absent(&self, pair: PairKey) -> Result<Match> {
    if self.fail_match_writes.load(Ordering::SeqCst) {
      return Err(unavailable());
    }
    let mut matches = self.matches.lock().unwrap();
    if let Some(existing) = matches.iter().find(|m| m.active && m.members == pair) {
      return Ok(existing.clone());
    }
    let now = Utc::now();
    let record = Match {
      match_id:         Uuid::new_v4(),
      members:          pair,
      created_at:       now,
      last_activity_at: now,
      active:           true,
    };
    matches.push(record.clone());
    Ok(record)
  }

  async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    Ok(
      self
        .matches
        .lock()
        .unwrap()
        .iter()
        .find(|m| m.match_id == match_id)
        .cloned(),
    )
  }

  async fn list_matches(&self, user: Uuid) -> Result<Vec<Match>> {
    let mut found: Vec<Match> = self
      .matches
      .lock()
      .unwrap()
      .iter()
      .filter(|m| m.active && m.members.contains(user))
      .cloned()
      .collect();
    found.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
    Ok(found)
  }

  async fn deactivate_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    let mut matches = self.matches.lock().unwrap();
    Ok(matches.iter_mut().find(|m| m.match_id == match_id).map(|m| {
      m.active = false;
      m.clone()
    }))
  }
}
