// Shared fakes for pipeline and scheduler tests.
//
// FakeSocial and RecordingNotifier stand in for LinkedIn and Discord.
// TestStore wraps a real in-memory SQLite store and can be told to fail
// individual operations.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use reactwatch::db::models::{PostTally, RecordOutcome, SeenReaction};
use reactwatch::db::schema::create_tables;
use reactwatch::db::sqlite::SqliteDatabase;
use reactwatch::db::DedupStore;
use reactwatch::linkedin::{Reaction, SocialClient};
use reactwatch::notify::Notifier;
use reactwatch::pipeline::PollContext;

pub const POST_DELAY: Duration = Duration::from_secs(2);

// -- Social client --

#[derive(Default)]
pub struct FakeSocial {
    posts: Mutex<Vec<String>>,
    listing_error: Mutex<bool>,
    listing_delay: Mutex<Duration>,
    reactions: Mutex<HashMap<String, Vec<(String, String, String)>>>,
    failing_posts: Mutex<HashSet<String>>,
    pub listing_calls: AtomicUsize,
    /// Post ids in the order their reactions were requested.
    pub reaction_calls: Mutex<Vec<String>>,
    listings_in_flight: AtomicUsize,
    pub max_listings_in_flight: AtomicUsize,
    reactions_in_flight: AtomicUsize,
    pub max_reactions_in_flight: AtomicUsize,
}

impl FakeSocial {
    pub fn set_posts(&self, posts: &[&str]) {
        *self.posts.lock().unwrap() = posts.iter().map(|p| p.to_string()).collect();
    }

    /// Set the reactions for a post as (id, actor, kind) triples.
    pub fn set_reactions(&self, post_id: &str, reactions: &[(&str, &str, &str)]) {
        self.reactions.lock().unwrap().insert(
            post_id.to_string(),
            reactions
                .iter()
                .map(|(id, actor, kind)| (id.to_string(), actor.to_string(), kind.to_string()))
                .collect(),
        );
    }

    pub fn fail_reactions_for(&self, post_id: &str) {
        self.failing_posts.lock().unwrap().insert(post_id.to_string());
    }

    pub fn fail_listing(&self) {
        *self.listing_error.lock().unwrap() = true;
    }

    pub fn set_listing_delay(&self, delay: Duration) {
        *self.listing_delay.lock().unwrap() = delay;
    }
}

fn track_max(current: &AtomicUsize, max: &AtomicUsize) {
    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
    max.fetch_max(now, Ordering::SeqCst);
}

#[async_trait]
impl SocialClient for FakeSocial {
    async fn list_tracked_posts(&self) -> Result<Vec<String>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        track_max(&self.listings_in_flight, &self.max_listings_in_flight);

        let delay = *self.listing_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.listings_in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.listing_error.lock().unwrap() {
            anyhow::bail!("LinkedIn API posts returned 503 Service Unavailable");
        }
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn list_reactions(&self, post_id: &str) -> Result<Vec<Reaction>> {
        self.reaction_calls.lock().unwrap().push(post_id.to_string());
        track_max(&self.reactions_in_flight, &self.max_reactions_in_flight);

        // Simulated network latency
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.reactions_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_posts.lock().unwrap().contains(post_id) {
            anyhow::bail!("LinkedIn API reactions returned 500 Internal Server Error");
        }

        let observed_at = Utc::now();
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .get(post_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|(id, actor_name, kind)| Reaction {
                id,
                post_id: post_id.to_string(),
                actor_name,
                kind,
                observed_at,
            })
            .collect())
    }
}

// -- Notifier --

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
    failing_actors: Mutex<HashSet<String>>,
    pub attempts: AtomicUsize,
}

impl RecordingNotifier {
    pub fn fail_for_actor(&self, actor: &str) {
        self.failing_actors.lock().unwrap().insert(actor.to_string());
    }

    pub fn recover(&self) {
        self.failing_actors.lock().unwrap().clear();
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// How many delivered messages mention this actor.
    pub fn count_for_actor(&self, actor: &str) -> usize {
        let needle = format!("- User: {actor}\n");
        self.messages()
            .iter()
            .filter(|m| m.contains(&needle))
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_actors
            .lock()
            .unwrap()
            .iter()
            .any(|actor| text.contains(&format!("- User: {actor}\n")));
        if failing {
            anyhow::bail!("Discord returned 502 Bad Gateway");
        }
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// -- Dedup store --

/// In-memory SQLite store with switchable failures.
pub struct TestStore {
    inner: SqliteDatabase,
    failing_records: Mutex<HashSet<String>>,
    failing_lookups: Mutex<HashSet<String>>,
    /// Lookups that answer "not seen" regardless of the table, as if another
    /// cycle inserted the key right after the check.
    stale_lookups: Mutex<HashSet<String>>,
    pub record_calls: AtomicUsize,
}

impl TestStore {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        Self {
            inner: SqliteDatabase::new(conn),
            failing_records: Mutex::new(HashSet::new()),
            failing_lookups: Mutex::new(HashSet::new()),
            stale_lookups: Mutex::new(HashSet::new()),
            record_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_record(&self, reaction_id: &str) {
        self.failing_records
            .lock()
            .unwrap()
            .insert(reaction_id.to_string());
    }

    pub fn fail_lookup(&self, reaction_id: &str) {
        self.failing_lookups
            .lock()
            .unwrap()
            .insert(reaction_id.to_string());
    }

    pub fn stale_lookup(&self, reaction_id: &str) {
        self.stale_lookups
            .lock()
            .unwrap()
            .insert(reaction_id.to_string());
    }

    pub fn recover(&self) {
        self.failing_records.lock().unwrap().clear();
        self.failing_lookups.lock().unwrap().clear();
        self.stale_lookups.lock().unwrap().clear();
    }
}

#[async_trait]
impl DedupStore for TestStore {
    async fn table_count(&self) -> Result<i64> {
        self.inner.table_count().await
    }

    async fn has_seen(&self, reaction_id: &str) -> Result<bool> {
        if self.failing_lookups.lock().unwrap().contains(reaction_id) {
            anyhow::bail!("database is locked");
        }
        if self.stale_lookups.lock().unwrap().contains(reaction_id) {
            return Ok(false);
        }
        self.inner.has_seen(reaction_id).await
    }

    async fn record_seen(
        &self,
        reaction_id: &str,
        post_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_records.lock().unwrap().contains(reaction_id) {
            anyhow::bail!("database is locked");
        }
        self.inner
            .record_seen(reaction_id, post_id, observed_at)
            .await
    }

    async fn seen_count(&self) -> Result<i64> {
        self.inner.seen_count().await
    }

    async fn seen_counts_by_post(&self, limit: u32) -> Result<Vec<PostTally>> {
        self.inner.seen_counts_by_post(limit).await
    }

    async fn recent_seen(&self, limit: u32) -> Result<Vec<SeenReaction>> {
        self.inner.recent_seen(limit).await
    }
}

// -- Wiring --

pub struct Harness {
    pub social: Arc<FakeSocial>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<TestStore>,
    pub ctx: Arc<PollContext>,
}

impl Harness {
    pub fn new() -> Self {
        let social = Arc::new(FakeSocial::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Arc::new(TestStore::new());
        let ctx = Arc::new(PollContext {
            social: social.clone(),
            notifier: notifier.clone(),
            store: store.clone(),
            post_delay: POST_DELAY,
        });
        Self {
            social,
            notifier,
            store,
            ctx,
        }
    }
}
