// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Episodic memory domain model.
//!
//! Episodes are immutable records of completed pipeline runs; heuristics
//! are the rules induced from them. Both live in one durable
//! `MemoryDocument` aggregate behind the `MemoryStore` trait, so the
//! orchestrator never touches storage details and tests can substitute
//! an in-memory double.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::context::EpisodeContext;
use crate::domain::heuristic::Heuristic;
use crate::domain::release::Decision;

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Aborted,
}

/// Immutable record of one completed pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub context: EpisodeContext,
    pub decision: Decision,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

/// Durable aggregate persisted by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(default)]
    pub heuristics: Vec<Heuristic>,
}

/// Errors raised at the storage boundary.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("failed to access memory document at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted document is unreadable or not in a recognized
    /// shape. Fatal at store initialization; carries the raw text for
    /// diagnosis.
    #[error("memory document at {path} is not in a recognized shape: {raw}")]
    Corrupt { path: String, raw: String },
}

/// Single-writer store for episodes and learned heuristics.
///
/// Persistence is whole-document replace; implementations must
/// serialize access so concurrent runs cannot tear the document.
pub trait MemoryStore: Send + Sync {
    /// Read-only view of all stored episodes, oldest first.
    fn episodes(&self) -> Vec<Episode>;

    /// Read-only view of all admitted heuristics, oldest first.
    fn heuristics(&self) -> Vec<Heuristic>;

    /// Append a new episode with a generated timestamp and persist.
    fn write_episode(
        &self,
        context: EpisodeContext,
        decision: Decision,
        outcome: Outcome,
    ) -> Result<(), MemoryError>;

    /// Append an admitted heuristic and persist.
    fn add_heuristic(&self, heuristic: Heuristic) -> Result<(), MemoryError>;
}
