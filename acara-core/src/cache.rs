//! The event cache service.
//!
//! Owns the persisted event collection and its validity window. Reads are
//! served from the cache while it is fresh; a sync replaces the whole
//! collection and stamps a new timestamp. Submits are optimistic: once the
//! webhook accepts the POST, the event is added locally without waiting
//! for the next sync to surface it.

use std::sync::Arc;

use tracing::debug;

use crate::clock::Clock;
use crate::config::AcaraConfig;
use crate::error::{AcaraError, AcaraResult};
use crate::event::Event;
use crate::gateway::EventGateway;
use crate::storage::{self, Storage, keys};
use crate::wire::ApiEvent;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Result of a [`EventCache::fetch_events`] call.
#[derive(Debug)]
pub struct FetchOutcome {
    pub events: Vec<Event>,
    /// Whether the collection came from the local cache (no network call).
    pub from_cache: bool,
    /// Epoch millis of the last successful sync, if any.
    pub last_sync: Option<i64>,
    /// Minutes until the cache goes stale (0 when already stale).
    pub next_sync_in: u32,
}

pub struct EventCache {
    storage: Arc<dyn Storage>,
    gateway: EventGateway,
    config: AcaraConfig,
    clock: Arc<dyn Clock>,
}

impl EventCache {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: EventGateway,
        config: AcaraConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            gateway,
            config,
            clock,
        }
    }

    /// Read the persisted collection; empty when absent or corrupt.
    pub fn load_cached(&self) -> Vec<Event> {
        storage::read_json(self.storage.as_ref(), keys::EVENTS).unwrap_or_default()
    }

    /// Persist the full collection, recovering on storage failure.
    pub fn save_cached(&self, events: &[Event]) {
        storage::write_json(self.storage.as_ref(), keys::EVENTS, &events);
    }

    /// Epoch millis of the last successful sync.
    pub fn last_sync_millis(&self) -> Option<i64> {
        storage::read_json(self.storage.as_ref(), keys::LAST_SYNC)
    }

    fn stamp_sync(&self) {
        storage::write_json(self.storage.as_ref(), keys::LAST_SYNC, &self.clock.now_millis());
    }

    /// Whether the cached collection is still inside its validity window.
    pub fn is_cache_valid(&self) -> bool {
        let Some(last_sync) = self.last_sync_millis() else {
            return false;
        };
        let elapsed = self.clock.now_millis() - last_sync;
        elapsed < i64::from(self.config.cache_minutes) * MILLIS_PER_MINUTE
    }

    /// Minutes until the cache goes stale: ceiling, clamped at 0.
    pub fn minutes_until_next_sync(&self) -> u32 {
        let Some(last_sync) = self.last_sync_millis() else {
            return 0;
        };
        let window = i64::from(self.config.cache_minutes) * MILLIS_PER_MINUTE;
        let remaining = window - (self.clock.now_millis() - last_sync);
        if remaining <= 0 {
            0
        } else {
            remaining.div_ceil(MILLIS_PER_MINUTE) as u32
        }
    }

    /// Return the event collection, syncing from the webhook when the
    /// cache is stale or `force_refresh` is set.
    pub async fn fetch_events(&self, force_refresh: bool) -> AcaraResult<FetchOutcome> {
        if !force_refresh && self.is_cache_valid() {
            debug!("serving events from cache");
            return Ok(FetchOutcome {
                events: self.load_cached(),
                from_cache: true,
                last_sync: self.last_sync_millis(),
                next_sync_in: self.minutes_until_next_sync(),
            });
        }

        let url = self.config.events_url.as_deref().ok_or_else(|| {
            AcaraError::Config("Events URL not set (events_url / ACARA_EVENTS_URL)".into())
        })?;

        let events: Vec<Event> = self
            .gateway
            .list(url)
            .await?
            .into_iter()
            .map(ApiEvent::into_event)
            .collect();

        self.save_cached(&events);
        self.stamp_sync();
        debug!(count = events.len(), "synced events from webhook");

        Ok(FetchOutcome {
            events,
            from_cache: false,
            last_sync: self.last_sync_millis(),
            next_sync_in: self.config.cache_minutes,
        })
    }

    /// Submit a new event to the webhook.
    ///
    /// The local collection is only touched after the webhook accepts the
    /// POST; a failed submit leaves the cache as it was.
    pub async fn submit_event(&self, event: &Event) -> AcaraResult<serde_json::Value> {
        let url = self.config.submit_url.as_deref().ok_or_else(|| {
            AcaraError::Config("Submit URL not set (submit_url / ACARA_SUBMIT_URL)".into())
        })?;

        let ack = self
            .gateway
            .create(url, &ApiEvent::from_event(event))
            .await?;

        let mut events = self.load_cached();
        events.insert(0, event.clone());
        self.save_cached(&events);

        Ok(ack)
    }

    /// Remove an event from the persisted collection. Local only; the
    /// webhook has no delete endpoint.
    pub fn remove_cached(&self, event_id: &str) {
        let mut events = self.load_cached();
        events.retain(|e| e.id != event_id);
        self.save_cached(&events);
    }

    /// Replace an event in the persisted collection by id. Local only.
    pub fn update_cached(&self, updated: &Event) {
        let mut events = self.load_cached();
        for event in &mut events {
            if event.id == updated.id {
                *event = updated.clone();
            }
        }
        self.save_cached(&events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    const T0: i64 = 1_770_000_000_000;

    fn make_cache(server: &MockServer, clock: Arc<ManualClock>) -> EventCache {
        let config = AcaraConfig {
            events_url: Some(server.url("/events")),
            submit_url: Some(server.url("/submit")),
            ..AcaraConfig::default()
        };
        EventCache::new(
            Arc::new(MemoryStorage::new()),
            EventGateway::new(),
            config,
            clock,
        )
    }

    fn make_event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            nama_acara: "Arisan".to_string(),
            tanggal: "2026-04-10".to_string(),
            waktu: "16:00".to_string(),
            lokasi: "Depok".to_string(),
            dresscode: None,
            note: String::new(),
            row_number: None,
        }
    }

    // --- cache validity ---

    #[tokio::test]
    async fn cache_invalid_before_first_sync_valid_after() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(json!([{ "id": "1" }]));
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, Arc::clone(&clock));

        assert!(!cache.is_cache_valid());
        assert_eq!(cache.minutes_until_next_sync(), 0);

        cache.fetch_events(false).await.unwrap();
        assert!(cache.is_cache_valid());
        assert_eq!(cache.minutes_until_next_sync(), 10);

        // One millisecond past the window
        clock.advance(10 * 60_000 + 1);
        assert!(!cache.is_cache_valid());
        assert_eq!(cache.minutes_until_next_sync(), 0);
    }

    #[tokio::test]
    async fn second_fetch_within_window_hits_cache() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(json!([{ "id": "1", "nama acara": "A" }]));
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, Arc::clone(&clock));

        let first = cache.fetch_events(false).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.next_sync_in, 10);

        clock.advance(60_000);
        let second = cache.fetch_events(false).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.events, first.events);
        assert_eq!(second.next_sync_in, 9);
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_valid_cache() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(json!([]));
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, clock);

        cache.fetch_events(false).await.unwrap();
        cache.fetch_events(true).await.unwrap();
        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn stale_cache_syncs_again() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(json!([]));
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, Arc::clone(&clock));

        cache.fetch_events(false).await.unwrap();
        clock.advance(11 * 60_000);
        let outcome = cache.fetch_events(false).await.unwrap();
        assert!(!outcome.from_cache);
        mock.assert_hits(2);
    }

    // --- sync replaces wholesale ---

    #[tokio::test]
    async fn sync_replaces_entire_collection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200)
                .json_body(json!([{ "id": "9", "nama acara": "Server copy" }]));
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, clock);
        cache.save_cached(&[make_event("1"), make_event("2")]);

        let outcome = cache.fetch_events(true).await.unwrap();
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(cache.load_cached().len(), 1);
        assert_eq!(cache.load_cached()[0].id, "9");
    }

    // --- submit ---

    #[tokio::test]
    async fn submit_unshifts_after_webhook_accepts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/submit");
            then.status(200).json_body(json!({ "success": true }));
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, clock);
        cache.save_cached(&[make_event("1")]);

        cache.submit_event(&make_event("2")).await.unwrap();

        let cached = cache.load_cached();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, "2");
        assert_eq!(cached[1].id, "1");
    }

    #[tokio::test]
    async fn failed_submit_leaves_cache_untouched() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/submit");
            then.status(500);
        });

        let clock = Arc::new(ManualClock::new(T0));
        let cache = make_cache(&server, clock);
        cache.save_cached(&[make_event("1")]);

        let err = cache.submit_event(&make_event("2")).await.unwrap_err();
        assert!(matches!(err, AcaraError::Network(_)));
        assert_eq!(cache.load_cached().len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_endpoints_fail_with_config_error() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = EventCache::new(
            Arc::new(MemoryStorage::new()),
            EventGateway::new(),
            AcaraConfig::default(),
            clock,
        );

        let err = cache.fetch_events(false).await.unwrap_err();
        assert!(matches!(err, AcaraError::Config(_)));

        let err = cache.submit_event(&make_event("1")).await.unwrap_err();
        assert!(matches!(err, AcaraError::Config(_)));
    }

    // --- reserved local helpers ---

    #[test]
    fn remove_and_update_touch_only_local_storage() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = EventCache::new(
            Arc::new(MemoryStorage::new()),
            EventGateway::new(),
            AcaraConfig::default(),
            clock,
        );

        cache.save_cached(&[make_event("1"), make_event("2")]);

        let mut renamed = make_event("2");
        renamed.nama_acara = "Arisan keluarga".to_string();
        cache.update_cached(&renamed);
        assert_eq!(cache.load_cached()[1].nama_acara, "Arisan keluarga");

        cache.remove_cached("1");
        let cached = cache.load_cached();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "2");
    }
}
