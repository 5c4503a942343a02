//! The event store: every operation reads the whole persisted document,
//! mutates it in memory, and writes it back. Last writer wins; there is
//! exactly one logical writer per storage backend.

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use thiserror::Error;

use event_types::{HistoricalEvent, HistoricalEventsData, HistoricalLocation};

use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid data format: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct EventStore<S: Storage> {
    storage: S,
}

impl<S: Storage> EventStore<S> {
    pub fn new(storage: S) -> Self {
        EventStore { storage }
    }

    /// The whole persisted document.
    ///
    /// A missing or unreadable document is treated as the empty default,
    /// never as an error: losing a corrupt blob beats refusing to start.
    pub fn get_all(&self) -> HistoricalEventsData {
        match self.storage.get() {
            None => HistoricalEventsData::default(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("stored document is unreadable, starting empty: {e}");
                    HistoricalEventsData::default()
                }
            },
        }
    }

    /// Persist the whole document, stamping `lastUpdated`.
    pub fn save(&mut self, mut data: HistoricalEventsData) -> Result<(), StoreError> {
        data.last_updated = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let json = serde_json::to_string(&data)?;
        self.storage.set(&json)?;
        Ok(())
    }

    pub fn locations(&self) -> Vec<HistoricalLocation> {
        self.get_all().locations
    }

    pub fn location(&self, location_id: &str) -> Option<HistoricalLocation> {
        self.get_all()
            .locations
            .into_iter()
            .find(|l| l.id == location_id)
    }

    /// Insert or replace a location by id.
    pub fn save_location(&mut self, location: HistoricalLocation) -> Result<(), StoreError> {
        let mut data = self.get_all();
        match data.locations.iter_mut().find(|l| l.id == location.id) {
            Some(existing) => *existing = location,
            None => data.locations.push(location),
        }
        self.save(data)
    }

    /// Create and persist a new location with a derived unique id.
    pub fn create_location(
        &mut self,
        name: &str,
        coordinates: (f64, f64),
        events: Vec<HistoricalEvent>,
    ) -> Result<HistoricalLocation, StoreError> {
        let location = HistoricalLocation {
            id: generate_location_id(name),
            name: name.to_string(),
            coordinates,
            events,
        };
        self.save_location(location.clone())?;
        Ok(location)
    }

    /// No-op when the location does not exist.
    pub fn delete_location(&mut self, location_id: &str) -> Result<(), StoreError> {
        let mut data = self.get_all();
        data.locations.retain(|l| l.id != location_id);
        self.save(data)
    }

    /// Merge events into a location, dropping incoming events whose id is
    /// already present. No-op when the location does not exist.
    pub fn add_events_to_location(
        &mut self,
        location_id: &str,
        events: Vec<HistoricalEvent>,
    ) -> Result<(), StoreError> {
        let mut data = self.get_all();
        let Some(location) = data.locations.iter_mut().find(|l| l.id == location_id) else {
            return Ok(());
        };

        let existing: HashSet<String> = location.events.iter().map(|e| e.id.clone()).collect();
        location
            .events
            .extend(events.into_iter().filter(|e| !existing.contains(&e.id)));
        self.save(data)
    }

    /// Replace an event in place by id. No-op when either the location or
    /// the event is missing.
    pub fn update_event(
        &mut self,
        location_id: &str,
        event: HistoricalEvent,
    ) -> Result<(), StoreError> {
        let mut data = self.get_all();
        let Some(location) = data.locations.iter_mut().find(|l| l.id == location_id) else {
            return Ok(());
        };
        let Some(slot) = location.events.iter_mut().find(|e| e.id == event.id) else {
            return Ok(());
        };
        *slot = event;
        self.save(data)
    }

    /// Remove an event by id. No-op when the location is missing.
    pub fn delete_event(&mut self, location_id: &str, event_id: &str) -> Result<(), StoreError> {
        let mut data = self.get_all();
        let Some(location) = data.locations.iter_mut().find(|l| l.id == location_id) else {
            return Ok(());
        };
        location.events.retain(|e| e.id != event_id);
        self.save(data)
    }

    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.get_all())?)
    }

    /// Replace the stored document from serialized JSON.
    ///
    /// The input must carry a `version` and a `locations` array; anything
    /// else fails without touching the existing data.
    pub fn import_json(&mut self, json: &str) -> Result<(), StoreError> {
        let data: HistoricalEventsData =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidFormat(e.to_string()))?;
        if data.version.is_empty() {
            return Err(StoreError::InvalidFormat("missing version field".into()));
        }
        self.save(data)
    }

    /// Drop the persisted document entirely.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        Ok(self.storage.remove()?)
    }
}

// ── Id generation ──────────────────────────────────────────────────────

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}

/// URL-safe id from a name, with a timestamp suffix for uniqueness:
/// "Promontory Summit" → "promontory-summit-k3xq".
pub fn generate_location_id(name: &str) -> String {
    let mut base = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !base.is_empty() {
                base.push('-');
            }
            pending_dash = false;
            base.push(ch);
        } else {
            pending_dash = true;
        }
    }

    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let stamp = to_base36(millis);
    let suffix = &stamp[stamp.len().saturating_sub(4)..];
    format!("{base}-{suffix}")
}

/// "event-{millis}-{7 random base-36 chars}".
pub fn generate_event_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0);
    let mut rng = rand::thread_rng();
    let rand_part: String = (0..7)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("event-{millis}-{rand_part}")
}
