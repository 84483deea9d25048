// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Reflection Trigger (Application Service)
//!
//! After each completed run writes its episode, the trigger fires iff
//! the total stored-episode count is a positive multiple of the window
//! size. It hands the most recent window to the synthesis oracle,
//! validates every returned candidate and admits only the valid ones.
//! One invalid candidate never blocks admission of the others.
//!
//! The count is cumulative over all episodes ever written, not episodes
//! since the last reflection; with one episode per run this fires every
//! fifth run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::orchestrator::PipelineError;
use crate::domain::heuristic::HeuristicCandidate;
use crate::domain::memory::MemoryStore;
use crate::domain::oracle::SynthesisOracle;

/// Number of recent episodes each reflection pass generalizes over.
pub const REFLECTION_WINDOW: usize = 5;

/// True when the stored-episode count sits on a window boundary.
pub fn should_reflect(episode_count: usize) -> bool {
    episode_count > 0 && episode_count % REFLECTION_WINDOW == 0
}

/// What a reflection pass did, reported back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReflectionSummary {
    pub ran: bool,
    pub added: usize,
}

/// Evaluate the trigger and, when it fires, synthesize and admit
/// heuristics from the latest window of episodes.
pub async fn evaluate_trigger(
    memory: &dyn MemoryStore,
    synthesizer: &dyn SynthesisOracle,
) -> Result<ReflectionSummary, PipelineError> {
    let episodes = memory.episodes();
    if !should_reflect(episodes.len()) {
        debug!(episodes = episodes.len(), "reflection window not reached");
        return Ok(ReflectionSummary {
            ran: false,
            added: 0,
        });
    }

    let window_start = episodes.len() - REFLECTION_WINDOW;
    let recent = &episodes[window_start..];
    let candidates = synthesizer.synthesize(recent).await?;
    info!(candidates = candidates.len(), "reflection synthesized heuristic candidates");

    let mut added = 0;
    for candidate in candidates {
        let parsed: HeuristicCandidate = match serde_json::from_value(candidate.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%candidate, error = %e, "dropping malformed heuristic candidate");
                continue;
            }
        };
        match parsed.into_heuristic() {
            Ok(heuristic) => {
                memory.add_heuristic(heuristic)?;
                added += 1;
            }
            Err(e) => {
                warn!(%candidate, rule = %e, "heuristic candidate failed admission");
            }
        }
    }

    Ok(ReflectionSummary { ran: true, added })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::EpisodeContext;
    use crate::domain::memory::{Episode, Outcome};
    use crate::domain::oracle::OracleError;
    use crate::domain::release::{DayOfWeek, Decision, RiskLevel};
    use crate::infrastructure::json_memory::JsonFileMemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    struct ScriptedSynthesizer {
        candidates: Vec<Value>,
    }

    #[async_trait]
    impl SynthesisOracle for ScriptedSynthesizer {
        async fn synthesize(&self, _episodes: &[Episode]) -> Result<Vec<Value>, OracleError> {
            Ok(self.candidates.clone())
        }
    }

    fn seeded_store(dir: &TempDir, episodes: usize) -> JsonFileMemoryStore {
        let store = JsonFileMemoryStore::open(dir.path().join("memory.json")).unwrap();
        for _ in 0..episodes {
            store
                .write_episode(
                    EpisodeContext {
                        feature_risk: RiskLevel::Low,
                        day_of_week: DayOfWeek::Mon,
                        service_criticality: RiskLevel::Low,
                    },
                    Decision::Go,
                    Outcome::Success,
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn fires_only_on_positive_multiples_of_the_window() {
        assert!(!should_reflect(0));
        assert!(!should_reflect(4));
        assert!(should_reflect(5));
        assert!(!should_reflect(6));
        assert!(should_reflect(10));
    }

    #[tokio::test]
    async fn does_not_run_off_the_window_boundary() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 4);
        let oracle = ScriptedSynthesizer { candidates: vec![] };

        let summary = evaluate_trigger(&store, &oracle).await.unwrap();
        assert!(!summary.ran);
        assert_eq!(summary.added, 0);
    }

    #[tokio::test]
    async fn admits_valid_candidates_and_drops_invalid_ones() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 5);
        let oracle = ScriptedSynthesizer {
            candidates: vec![
                json!({
                    "when": {"feature_risk": "LOW"},
                    "recommendation": "GO",
                    "confidence": 0.6,
                    "supporting_episodes": 2
                }),
                // Too confident for its support: must be dropped.
                json!({
                    "when": {"feature_risk": "HIGH"},
                    "recommendation": "NO_GO",
                    "confidence": 0.9,
                    "supporting_episodes": 1
                }),
                // Not even candidate-shaped: must be dropped.
                json!("nonsense"),
                json!({
                    "when": {"day_of_week": "FRI"},
                    "recommendation": "DELAY",
                    "confidence": 0.8,
                    "supporting_episodes": 4
                }),
            ],
        };

        let summary = evaluate_trigger(&store, &oracle).await.unwrap();
        assert!(summary.ran);
        assert_eq!(summary.added, 2);
        assert_eq!(store.heuristics().len(), 2);
    }
}
