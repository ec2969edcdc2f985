// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-tab sync messages and their transports.
//!
//! Every tab holds a [`SyncLink`]. Local mutations are posted as JSON
//! envelopes `{ "type", "payload", "timestamp" }`; remote envelopes are
//! drained and applied by the store. There is no acknowledgement, replay or
//! conflict resolution: the last write to arrive wins.
//!
//! Two transports exist. [`ChannelEndpoint`] is the native one, a fan-out over
//! `crossbeam-channel` queues registered in a [`BroadcastHub`].
//! [`StoragePingTransport`] is the fallback: a short message log kept in
//! shared [`KeyValueStorage`](crate::KeyValueStorage).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::storage::SharedStorage;
use crate::surface::{AppMode, Surface, SurfaceId};

/// Messages kept in the storage-ping log.
pub const STORAGE_PING_CAPACITY: usize = 64;

/// A state change shared between tabs.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncMessage {
    /// `SURFACE_UPDATED`: the full, updated record.
    SurfaceUpdated(Surface),
    /// `SURFACE_ADDED`: the new record.
    SurfaceAdded(Surface),
    /// `SURFACE_DELETED`
    SurfaceDeleted {
        /// Removed surface.
        id: SurfaceId,
    },
    /// `SURFACE_SELECTED`
    SurfaceSelected {
        /// New selection, `None` to clear it.
        id: Option<SurfaceId>,
    },
    /// `MODE_CHANGED`
    ModeChanged {
        /// New application mode.
        mode: AppMode,
    },
}

impl SyncMessage {
    /// The wire name of this message type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SurfaceUpdated(_) => "SURFACE_UPDATED",
            Self::SurfaceAdded(_) => "SURFACE_ADDED",
            Self::SurfaceDeleted { .. } => "SURFACE_DELETED",
            Self::SurfaceSelected { .. } => "SURFACE_SELECTED",
            Self::ModeChanged { .. } => "MODE_CHANGED",
        }
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        Ok(match self {
            Self::SurfaceUpdated(surface) | Self::SurfaceAdded(surface) => {
                serde_json::to_value(surface)?
            }
            Self::SurfaceDeleted { id } => json!({ "id": id }),
            Self::SurfaceSelected { id } => json!({ "id": id }),
            Self::ModeChanged { mode } => json!({ "mode": mode }),
        })
    }

    fn from_parts(kind: &str, payload: Value) -> Result<Option<Self>, serde_json::Error> {
        #[derive(Deserialize)]
        struct IdPayload<T> {
            id: T,
        }
        #[derive(Deserialize)]
        struct ModePayload {
            mode: AppMode,
        }

        Ok(Some(match kind {
            "SURFACE_UPDATED" => Self::SurfaceUpdated(serde_json::from_value(payload)?),
            "SURFACE_ADDED" => Self::SurfaceAdded(serde_json::from_value(payload)?),
            "SURFACE_DELETED" => Self::SurfaceDeleted {
                id: serde_json::from_value::<IdPayload<SurfaceId>>(payload)?.id,
            },
            "SURFACE_SELECTED" => Self::SurfaceSelected {
                id: serde_json::from_value::<IdPayload<Option<SurfaceId>>>(payload)?.id,
            },
            "MODE_CHANGED" => Self::ModeChanged {
                mode: serde_json::from_value::<ModePayload>(payload)?.mode,
            },
            _ => return Ok(None),
        }))
    }
}

#[derive(Serialize, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    timestamp: u64,
}

/// A message with its send time.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncEnvelope {
    /// The state change.
    pub message: SyncMessage,
    /// Milliseconds since the Unix epoch at the sender.
    pub timestamp: u64,
}

impl SyncEnvelope {
    /// Wraps `message` with the current time.
    #[must_use]
    pub fn now(message: SyncMessage) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self { message, timestamp }
    }

    /// Encodes the envelope as JSON.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&RawEnvelope {
            kind: self.message.kind().to_owned(),
            payload: self.message.payload()?,
            timestamp: self.timestamp,
        })
    }

    /// Decodes an envelope.
    ///
    /// Unknown message types and malformed input yield `None`.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        let envelope: RawEnvelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!("dropping malformed sync envelope: {err}");
                return None;
            }
        };
        match SyncMessage::from_parts(&envelope.kind, envelope.payload) {
            Ok(Some(message)) => Some(Self {
                message,
                timestamp: envelope.timestamp,
            }),
            Ok(None) => {
                debug!("ignoring sync message of unknown type `{}`", envelope.kind);
                None
            }
            Err(err) => {
                debug!("dropping `{}` with malformed payload: {err}", envelope.kind);
                None
            }
        }
    }
}

/// Delivers encoded envelopes to the other tabs.
pub trait SyncTransport: fmt::Debug {
    /// Sends `message` to every other endpoint. Fire and forget.
    fn post(&mut self, message: &str);

    /// Takes every message received since the last call, oldest first.
    fn drain(&mut self) -> Vec<String>;
}

#[derive(Debug)]
struct Peer {
    id: Uuid,
    sender: Sender<String>,
}

/// Registry of native channel endpoints, shared by every tab of a process.
#[derive(Clone, Debug, Default)]
pub struct BroadcastHub {
    channels: Arc<Mutex<HashMap<String, Vec<Peer>>>>,
}

impl BroadcastHub {
    /// Creates a hub with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the channel `name`.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> ChannelEndpoint {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = Uuid::new_v4();
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_owned())
            .or_default()
            .push(Peer { id, sender });
        ChannelEndpoint {
            id,
            name: name.to_owned(),
            hub: self.clone(),
            receiver,
        }
    }

    /// Number of endpoints joined to `name`.
    #[must_use]
    pub fn endpoint_count(&self, name: &str) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .map_or(0, Vec::len)
    }
}

/// One tab's membership in a [`BroadcastHub`] channel.
///
/// Posts reach every other endpoint of the channel, never the sender.
/// Dropping the endpoint leaves the channel.
#[derive(Debug)]
pub struct ChannelEndpoint {
    id: Uuid,
    name: String,
    hub: BroadcastHub,
    receiver: Receiver<String>,
}

impl SyncTransport for ChannelEndpoint {
    fn post(&mut self, message: &str) {
        let channels = self.hub.channels.lock().unwrap_or_else(|e| e.into_inner());
        for peer in channels.get(&self.name).into_iter().flatten() {
            if peer.id != self.id && peer.sender.send(message.to_owned()).is_err() {
                debug!("sync peer {} on `{}` is gone", peer.id, self.name);
            }
        }
    }

    fn drain(&mut self) -> Vec<String> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for ChannelEndpoint {
    fn drop(&mut self) {
        let mut channels = self.hub.channels.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(peers) = channels.get_mut(&self.name) {
            peers.retain(|peer| peer.id != self.id);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PingEntry {
    seq: u64,
    origin: Uuid,
    message: String,
}

/// Fallback transport over shared storage.
///
/// The storage key holds the last [`STORAGE_PING_CAPACITY`] messages with
/// increasing sequence numbers. Each endpoint remembers the highest sequence
/// it has seen and delivers newer entries from other origins. A log whose
/// newest sequence is below that mark was reset and is read from the start.
/// Entries that are evicted before an endpoint drains are lost.
pub struct StoragePingTransport {
    storage: SharedStorage,
    key: String,
    origin: Uuid,
    last_seen: u64,
}

impl fmt::Debug for StoragePingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoragePingTransport")
            .field("storage", &"..")
            .field("key", &self.key)
            .field("origin", &self.origin)
            .field("last_seen", &self.last_seen)
            .finish()
    }
}

impl StoragePingTransport {
    /// Attaches to the log under `key`. Messages already in the log are
    /// not delivered.
    #[must_use]
    pub fn new(storage: SharedStorage, key: &str) -> Self {
        let mut transport = Self {
            storage,
            key: key.to_owned(),
            origin: Uuid::new_v4(),
            last_seen: 0,
        };
        transport.last_seen = transport.read_log().last().map_or(0, |e| e.seq);
        transport
    }

    fn read_log(&self) -> Vec<PingEntry> {
        let Some(raw) = self.storage.get(&self.key) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("sync log under `{}` is corrupt ({err}), resetting it", self.key);
            Vec::new()
        })
    }
}

impl SyncTransport for StoragePingTransport {
    fn post(&mut self, message: &str) {
        let mut log = self.read_log();
        let seq = log.last().map_or(0, |e| e.seq) + 1;
        log.push(PingEntry {
            seq,
            origin: self.origin,
            message: message.to_owned(),
        });
        let excess = log.len().saturating_sub(STORAGE_PING_CAPACITY);
        let log = log.split_off(excess);
        let written = serde_json::to_string(&log)
            .map_err(|err| err.to_string())
            .and_then(|raw| self.storage.set(&self.key, &raw).map_err(|err| err.to_string()));
        if let Err(err) = written {
            warn!("could not post sync message: {err}");
        }
    }

    fn drain(&mut self) -> Vec<String> {
        let log = self.read_log();
        let head = log.last().map_or(0, |e| e.seq);
        if head < self.last_seen {
            debug!("sync log under `{}` restarted, rereading from the start", self.key);
            self.last_seen = 0;
        }
        let mut out = Vec::new();
        for entry in log {
            if entry.seq <= self.last_seen {
                continue;
            }
            self.last_seen = entry.seq;
            if entry.origin != self.origin {
                out.push(entry.message);
            }
        }
        out
    }
}

/// A tab's connection to the other tabs.
#[derive(Debug)]
pub struct SyncLink {
    transport: Box<dyn SyncTransport>,
    native: bool,
}

impl SyncLink {
    /// Connects over `hub` when one is available, otherwise over the
    /// storage-ping fallback in `storage`. Both use the channel `name`.
    #[must_use]
    pub fn connect(hub: Option<&BroadcastHub>, storage: SharedStorage, name: &str) -> Self {
        match hub {
            Some(hub) => Self {
                transport: Box::new(hub.endpoint(name)),
                native: true,
            },
            None => {
                info!("no broadcast channel available, syncing `{name}` through storage");
                Self {
                    transport: Box::new(StoragePingTransport::new(storage, name)),
                    native: false,
                }
            }
        }
    }

    /// Wraps a custom transport.
    #[must_use]
    pub fn with_transport(transport: Box<dyn SyncTransport>) -> Self {
        Self {
            transport,
            native: false,
        }
    }

    /// Returns `true` when connected through a [`BroadcastHub`].
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.native
    }

    /// Sends `message`, stamped with the current time.
    pub fn send(&mut self, message: SyncMessage) {
        match SyncEnvelope::now(message).encode() {
            Ok(raw) => self.transport.post(&raw),
            Err(err) => warn!("could not encode sync message: {err}"),
        }
    }

    /// Takes every decodable message received since the last call.
    pub fn receive(&mut self) -> Vec<SyncEnvelope> {
        self.transport
            .drain()
            .iter()
            .filter_map(|raw| SyncEnvelope::decode(raw))
            .collect()
    }
}
