// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! JSON File Memory Store
//!
//! Filesystem-backed implementation of `MemoryStore` for single-node
//! operation. The whole document is replaced on every write: the new
//! content goes to a sibling temp file first and is renamed over the
//! live path, so a crash mid-write can never leave a torn document.
//! An interior mutex serializes access, keeping the single-writer
//! discipline even when multiple orchestrator runs share one store.
//!
//! **Migration:** a legacy document that is a bare episode list loads
//! transparently as `{episodes: <list>, heuristics: []}` and is
//! re-persisted in the current shape immediately.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::context::EpisodeContext;
use crate::domain::heuristic::Heuristic;
use crate::domain::memory::{Episode, MemoryDocument, MemoryError, MemoryStore, Outcome};
use crate::domain::release::Decision;

/// Durable JSON-file store for episodes and learned heuristics.
#[derive(Debug)]
pub struct JsonFileMemoryStore {
    path: PathBuf,
    document: Mutex<MemoryDocument>,
}

impl JsonFileMemoryStore {
    /// Open the store at `path`, creating an empty document in memory if
    /// the file does not exist yet.
    ///
    /// Unreadable or unrecognized content is fatal here; the raw text is
    /// carried in the error for diagnosis.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let path = path.into();
        let document = Self::load(&path)?;
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    fn load(path: &Path) -> Result<MemoryDocument, MemoryError> {
        if !path.exists() {
            debug!(path = %path.display(), "memory document absent, starting empty");
            return Ok(MemoryDocument::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| MemoryError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let corrupt = || MemoryError::Corrupt {
            path: path.display().to_string(),
            raw: raw.clone(),
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            // Current shape. An object carrying neither known key is not
            // a memory document; refusing it keeps a mis-shaped file from
            // silently opening empty and being overwritten on next write.
            Ok(serde_json::Value::Object(ref map))
                if map.contains_key("episodes") || map.contains_key("heuristics") =>
            {
                serde_json::from_str::<MemoryDocument>(&raw).map_err(|_| corrupt())
            }
            // Legacy shape: a bare episode list.
            Ok(serde_json::Value::Array(_)) => {
                let episodes =
                    serde_json::from_str::<Vec<Episode>>(&raw).map_err(|_| corrupt())?;
                info!(
                    path = %path.display(),
                    episodes = episodes.len(),
                    "upgrading legacy list-shaped memory document"
                );
                let document = MemoryDocument {
                    episodes,
                    heuristics: Vec::new(),
                };
                Self::persist(path, &document)?;
                Ok(document)
            }
            _ => Err(corrupt()),
        }
    }

    /// Whole-document replace via temp file + atomic rename.
    fn persist(path: &Path, document: &MemoryDocument) -> Result<(), MemoryError> {
        let serialized =
            serde_json::to_string_pretty(document).map_err(|e| MemoryError::Corrupt {
                path: path.display().to_string(),
                raw: e.to_string(),
            })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serialized).map_err(|source| MemoryError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| MemoryError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl MemoryStore for JsonFileMemoryStore {
    fn episodes(&self) -> Vec<Episode> {
        self.document.lock().episodes.clone()
    }

    fn heuristics(&self) -> Vec<Heuristic> {
        self.document.lock().heuristics.clone()
    }

    fn write_episode(
        &self,
        context: EpisodeContext,
        decision: Decision,
        outcome: Outcome,
    ) -> Result<(), MemoryError> {
        let mut document = self.document.lock();
        document.episodes.push(Episode {
            context,
            decision,
            outcome,
            timestamp: Utc::now(),
        });
        Self::persist(&self.path, &document)
    }

    fn add_heuristic(&self, heuristic: Heuristic) -> Result<(), MemoryError> {
        info!(?heuristic, "admitting heuristic to memory");
        let mut document = self.document.lock();
        document.heuristics.push(heuristic);
        Self::persist(&self.path, &document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::release::{DayOfWeek, RiskLevel};
    use serde_json::json;
    use tempfile::TempDir;

    fn context() -> EpisodeContext {
        EpisodeContext {
            feature_risk: RiskLevel::Low,
            day_of_week: DayOfWeek::Mon,
            service_criticality: RiskLevel::Low,
        }
    }

    #[test]
    fn round_trips_episodes_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");

        let store = JsonFileMemoryStore::open(&path).unwrap();
        for _ in 0..3 {
            store
                .write_episode(context(), Decision::Go, Outcome::Success)
                .unwrap();
        }
        let written = store.episodes();

        let reloaded = JsonFileMemoryStore::open(&path).unwrap();
        assert_eq!(reloaded.episodes(), written);
        assert!(reloaded.heuristics().is_empty());
    }

    #[test]
    fn upgrades_legacy_bare_list_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");

        let legacy = json!([
            {
                "context": {
                    "feature_risk": "LOW",
                    "day_of_week": "MON",
                    "service_criticality": "LOW"
                },
                "decision": "GO",
                "outcome": "SUCCESS",
                "timestamp": "2026-01-05T08:00:00Z"
            },
            {
                "context": {
                    "feature_risk": "HIGH",
                    "day_of_week": "FRI",
                    "service_criticality": "HIGH"
                },
                "decision": "ABORT",
                "outcome": "ABORTED",
                "timestamp": "2026-01-09T16:00:00Z"
            }
        ]);
        std::fs::write(&path, legacy.to_string()).unwrap();

        let store = JsonFileMemoryStore::open(&path).unwrap();
        assert_eq!(store.episodes().len(), 2);
        assert!(store.heuristics().is_empty());

        // The upgrade re-persists the current shape.
        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk.get("episodes").is_some());
        assert!(on_disk.get("heuristics").is_some());
    }

    #[test]
    fn corrupt_document_is_fatal_at_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let err = JsonFileMemoryStore::open(&path).unwrap_err();
        match err {
            MemoryError::Corrupt { raw, .. } => assert!(raw.contains("not json")),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_object_shape_is_fatal_not_emptied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");

        // Object with neither "episodes" nor "heuristics": must not open
        // as an empty document, or the next persist would erase it.
        let original = json!({ "epsiodes": [{"decision": "GO"}], "version": 9 }).to_string();
        std::fs::write(&path, &original).unwrap();

        let err = JsonFileMemoryStore::open(&path).unwrap_err();
        assert!(matches!(err, MemoryError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn persist_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");

        let store = JsonFileMemoryStore::open(&path).unwrap();
        store
            .write_episode(context(), Decision::Abort, Outcome::Aborted)
            .unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn heuristics_persist_alongside_episodes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");

        let store = JsonFileMemoryStore::open(&path).unwrap();
        store
            .write_episode(context(), Decision::Go, Outcome::Success)
            .unwrap();

        let mut when = serde_json::Map::new();
        when.insert("feature_risk".to_string(), serde_json::Value::from("LOW"));
        store
            .add_heuristic(Heuristic {
                when,
                recommendation: crate::domain::heuristic::Recommendation::Go,
                confidence: 0.6,
                supporting_episodes: 2,
            })
            .unwrap();

        let reloaded = JsonFileMemoryStore::open(&path).unwrap();
        assert_eq!(reloaded.episodes().len(), 1);
        assert_eq!(reloaded.heuristics().len(), 1);
    }
}
