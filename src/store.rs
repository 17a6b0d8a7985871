//! The persisted slot: one named key holding the whole workout collection
//! as a single JSON blob.

use crate::dlog;
use crate::error::StorageError;
use crate::types::{Coords, MetricInputs, Workout, WorkoutId, WorkoutKind};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

/// Key/value storage with whole-value overwrite semantics.
pub trait SlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

pub struct SqliteSlotStore {
    conn: Connection,
}

impl SqliteSlotStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Unavailable(format!("opening {}: {e}", path.display()))
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS slots (
              key         TEXT PRIMARY KEY,
              value       TEXT NOT NULL,
              updated_at  INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| StorageError::Unavailable(format!("ensuring slot schema: {e}")))?;
        Ok(Self { conn })
    }
}

impl SlotStore for SqliteSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySlotStore {
    slots: HashMap<String, String>,
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Saves and restores the workout collection under one slot key.
///
/// When the backing slot becomes unavailable the store falls back to an
/// in-memory slot for the rest of the session instead of failing.
pub struct WorkoutStore {
    slot: Box<dyn SlotStore>,
    key: String,
    degraded: bool,
}

impl WorkoutStore {
    pub fn new(slot: Box<dyn SlotStore>, key: &str) -> Self {
        Self {
            slot,
            key: key.to_string(),
            degraded: false,
        }
    }

    pub fn in_memory(key: &str) -> Self {
        Self::new(Box::new(MemorySlotStore::default()), key)
    }

    /// A session that never had durable storage.
    pub fn unavailable(key: &str, err: &StorageError) -> Self {
        tracing::warn!(err = %err, key, "persisted slot unavailable; workouts kept in memory only");
        let mut store = Self::in_memory(key);
        store.degraded = true;
        store
    }

    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrites the slot with the full collection.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), StorageError> {
        let blob = encode(workouts)?;
        match self.slot.set(&self.key, &blob) {
            Ok(()) => {}
            Err(e) if e.is_unavailable() => {
                self.degrade(&e);
                self.slot.set(&self.key, &blob)?;
            }
            Err(e) => return Err(e),
        }
        dlog!("saved key={} workouts={} bytes={}", self.key, workouts.len(), blob.len());
        Ok(())
    }

    /// Reads the slot. A missing slot is an empty collection.
    pub fn load(&mut self) -> Result<Vec<Workout>, StorageError> {
        let blob = match self.slot.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(Vec::new()),
            Err(e) if e.is_unavailable() => {
                self.degrade(&e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        decode(&blob)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        match self.slot.remove(&self.key) {
            Ok(()) => Ok(()),
            Err(e) if e.is_unavailable() => {
                self.degrade(&e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn degrade(&mut self, err: &StorageError) {
        tracing::warn!(err = %err, key = %self.key, "persisted slot failed; continuing in memory");
        self.slot = Box::new(MemorySlotStore::default());
        self.degraded = true;
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<W> {
    version: u32,
    workouts: Vec<W>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    #[serde(default)]
    description: String,
    #[serde(flatten)]
    metrics: StoredMetrics,
}

// Derived values are written for readers of the blob but ignored on load.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum StoredMetrics {
    #[serde(rename_all = "camelCase")]
    Running {
        cadence_spm: f64,
        #[serde(default)]
        pace_min_per_km: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain_m: f64,
        #[serde(default)]
        speed_km_per_h: f64,
    },
}

impl From<&Workout> for StoredWorkout {
    fn from(w: &Workout) -> Self {
        let metrics = match w.kind() {
            WorkoutKind::Running => StoredMetrics::Running {
                cadence_spm: w.variable_value(),
                pace_min_per_km: w.pace().unwrap_or_default(),
            },
            WorkoutKind::Cycling => StoredMetrics::Cycling {
                elevation_gain_m: w.variable_value(),
                speed_km_per_h: w.speed().unwrap_or_default(),
            },
        };
        Self {
            id: w.id().clone(),
            created_at: w.created_at(),
            coords: w.coords(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            description: w.description().to_string(),
            metrics,
        }
    }
}

impl StoredWorkout {
    fn restore(self) -> Result<Workout, String> {
        let (kind, variable) = match self.metrics {
            StoredMetrics::Running { cadence_spm, .. } => (WorkoutKind::Running, cadence_spm),
            StoredMetrics::Cycling {
                elevation_gain_m, ..
            } => (WorkoutKind::Cycling, elevation_gain_m),
        };
        Workout::create(
            kind,
            self.id,
            self.created_at,
            self.coords,
            MetricInputs {
                distance_km: self.distance_km,
                duration_min: self.duration_min,
                variable,
            },
        )
        .map_err(|e| e.to_string())
    }
}

/// Record shape written by the browser version of the app.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyWorkout {
    id: String,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    #[serde(rename = "type")]
    kind: WorkoutKind,
    cadence: Option<f64>,
    elevation_gain: Option<f64>,
}

impl LegacyWorkout {
    fn restore(self) -> Result<Workout, String> {
        let variable = match self.kind {
            WorkoutKind::Running => self.cadence,
            WorkoutKind::Cycling => self.elevation_gain,
        }
        .ok_or_else(|| format!("missing {}", self.kind.variable_field()))?;
        Workout::create(
            self.kind,
            WorkoutId::from(self.id),
            self.date,
            self.coords,
            MetricInputs {
                distance_km: self.distance,
                duration_min: self.duration,
                variable,
            },
        )
        .map_err(|e| e.to_string())
    }
}

pub fn encode(workouts: &[Workout]) -> Result<String, StorageError> {
    let envelope = Envelope {
        version: SCHEMA_VERSION,
        workouts: workouts.iter().map(StoredWorkout::from).collect::<Vec<_>>(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decodes a slot value. Accepts the versioned envelope and the bare
/// array written by the browser app.
pub fn decode(blob: &str) -> Result<Vec<Workout>, StorageError> {
    let value: JsonValue =
        serde_json::from_str(blob).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    match value {
        JsonValue::Array(entries) => Ok(restore_all(entries, LegacyWorkout::restore)),
        JsonValue::Object(_) => {
            let envelope: Envelope<JsonValue> = serde_json::from_value(value)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            if envelope.version > SCHEMA_VERSION {
                return Err(StorageError::Corrupt(format!(
                    "unsupported schema version {} (newest known is {SCHEMA_VERSION})",
                    envelope.version
                )));
            }
            Ok(restore_all(envelope.workouts, StoredWorkout::restore))
        }
        other => Err(StorageError::Corrupt(format!(
            "expected an object or array, found {other}"
        ))),
    }
}

/// Parses a browser export (the raw `workouts` localStorage value).
pub fn decode_legacy(json: &str) -> Result<Vec<Workout>, StorageError> {
    let entries: Vec<JsonValue> = serde_json::from_str(json)?;
    Ok(restore_all(entries, LegacyWorkout::restore))
}

fn restore_all<R, F>(entries: Vec<JsonValue>, restore: F) -> Vec<Workout>
where
    R: for<'de> Deserialize<'de>,
    F: Fn(R) -> Result<Workout, String>,
{
    let total = entries.len();
    let mut out = Vec::with_capacity(total);
    for (idx, entry) in entries.into_iter().enumerate() {
        let restored = serde_json::from_value::<R>(entry)
            .map_err(|e| e.to_string())
            .and_then(&restore);
        match restored {
            Ok(w) => out.push(w),
            Err(reason) => {
                tracing::warn!(idx, reason = %reason, "skipping unreadable saved workout");
            }
        }
    }
    dlog!("restored {} of {} saved workouts", out.len(), total);
    out
}
