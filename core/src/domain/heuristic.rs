// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Learned decision heuristics.
//!
//! A heuristic is a conjunctive rule induced from past episodes: when
//! every attribute in its `when` clause matches the current decision
//! context, its recommendation is surfaced to the planner as advice.
//! Candidates synthesized by the reflection oracle pass through
//! admission validation before they are stored; a candidate failing any
//! rule is dropped without touching the rest of its batch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Minimum confidence for a stored heuristic to be considered applicable.
pub const CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Supporting-episode count below which confidence is capped at 0.6.
const LOW_SUPPORT_CUTOFF: u32 = 3;

/// Recommendation vocabulary shared by heuristics and the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Go,
    NoGo,
    Delay,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Recommendation::Go => "GO",
            Recommendation::NoGo => "NO_GO",
            Recommendation::Delay => "DELAY",
        };
        write!(f, "{}", s)
    }
}

/// A validated, stored decision rule.
///
/// Immutable after admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heuristic {
    /// Conjunctive match clause: attribute name -> required value.
    pub when: Map<String, Value>,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub supporting_episodes: u32,
}

impl Heuristic {
    /// True when every `when` key is present in `context` with an equal
    /// value. A key absent from the context makes the rule inapplicable;
    /// there is no wildcard.
    pub fn applies(&self, context: &Map<String, Value>) -> bool {
        self.when
            .iter()
            .all(|(key, value)| context.get(key) == Some(value))
    }
}

/// Filter stored heuristics down to those applicable to `context`.
///
/// Keeps input order; performs no deduplication or ranking.
pub fn applicable_heuristics(
    heuristics: &[Heuristic],
    context: &Map<String, Value>,
) -> Vec<Heuristic> {
    heuristics
        .iter()
        .filter(|h| h.confidence >= CONFIDENCE_THRESHOLD && h.applies(context))
        .cloned()
        .collect()
}

/// Admission rule violated by a heuristic candidate.
#[derive(Debug, Error)]
pub enum HeuristicValidationError {
    #[error("when clause must be a non-empty attribute mapping")]
    EmptyWhen,

    #[error("unknown recommendation: {0}")]
    UnknownRecommendation(String),

    #[error("confidence {0} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),

    #[error("supporting_episodes must be >= 1, got {0}")]
    TooFewSupportingEpisodes(i64),

    #[error(
        "confidence {confidence} exceeds 0.6 with only {supporting_episodes} supporting episodes"
    )]
    OverconfidentForSupport {
        confidence: f64,
        supporting_episodes: u32,
    },
}

/// Unvalidated heuristic as produced by the synthesis oracle.
///
/// Field values are kept loose on purpose: a candidate with an
/// out-of-vocabulary recommendation or a bad count is an admission
/// failure, not an oracle protocol error.
#[derive(Debug, Clone, Deserialize)]
pub struct HeuristicCandidate {
    #[serde(default)]
    pub when: Map<String, Value>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub supporting_episodes: i64,
}

impl HeuristicCandidate {
    /// Validate admission rules in order and produce a stored heuristic.
    pub fn into_heuristic(self) -> Result<Heuristic, HeuristicValidationError> {
        if self.when.is_empty() {
            return Err(HeuristicValidationError::EmptyWhen);
        }

        let recommendation = match self.recommendation.as_str() {
            "GO" => Recommendation::Go,
            "NO_GO" => Recommendation::NoGo,
            "DELAY" => Recommendation::Delay,
            other => {
                return Err(HeuristicValidationError::UnknownRecommendation(
                    other.to_string(),
                ))
            }
        };

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(HeuristicValidationError::ConfidenceOutOfRange(
                self.confidence,
            ));
        }

        if self.supporting_episodes < 1 {
            return Err(HeuristicValidationError::TooFewSupportingEpisodes(
                self.supporting_episodes,
            ));
        }
        let supporting_episodes = self.supporting_episodes as u32;

        if supporting_episodes < LOW_SUPPORT_CUTOFF && self.confidence > CONFIDENCE_THRESHOLD {
            return Err(HeuristicValidationError::OverconfidentForSupport {
                confidence: self.confidence,
                supporting_episodes,
            });
        }

        Ok(Heuristic {
            when: self.when,
            recommendation,
            confidence: self.confidence,
            supporting_episodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn when(key: &str, value: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), Value::from(value));
        map
    }

    fn context(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn matches_when_every_clause_key_agrees() {
        let h = Heuristic {
            when: when("feature_risk", "HIGH"),
            recommendation: Recommendation::NoGo,
            confidence: 0.7,
            supporting_episodes: 3,
        };

        let ctx = context(&[("feature_risk", "HIGH"), ("day_of_week", "FRI")]);
        assert!(h.applies(&ctx));
        assert_eq!(applicable_heuristics(&[h.clone()], &ctx).len(), 1);

        let ctx = context(&[("feature_risk", "LOW")]);
        assert!(!h.applies(&ctx));
    }

    #[test]
    fn absent_context_key_is_not_a_wildcard() {
        let h = Heuristic {
            when: when("day_of_week", "FRI"),
            recommendation: Recommendation::Delay,
            confidence: 0.9,
            supporting_episodes: 5,
        };

        let ctx = context(&[("feature_risk", "HIGH")]);
        assert!(!h.applies(&ctx));
    }

    #[test]
    fn low_confidence_heuristics_are_never_applicable() {
        let h = Heuristic {
            when: when("feature_risk", "HIGH"),
            recommendation: Recommendation::NoGo,
            confidence: 0.5,
            supporting_episodes: 2,
        };

        let ctx = context(&[("feature_risk", "HIGH")]);
        assert!(applicable_heuristics(&[h], &ctx).is_empty());
    }

    #[test]
    fn filter_preserves_input_order() {
        let first = Heuristic {
            when: when("feature_risk", "HIGH"),
            recommendation: Recommendation::NoGo,
            confidence: 0.8,
            supporting_episodes: 4,
        };
        let second = Heuristic {
            when: when("day_of_week", "FRI"),
            recommendation: Recommendation::Delay,
            confidence: 0.7,
            supporting_episodes: 3,
        };

        let ctx = context(&[("feature_risk", "HIGH"), ("day_of_week", "FRI")]);
        let matched = applicable_heuristics(&[first.clone(), second.clone()], &ctx);
        assert_eq!(matched, vec![first, second]);
    }

    fn candidate(confidence: f64, supporting_episodes: i64) -> HeuristicCandidate {
        serde_json::from_value(json!({
            "when": {"feature_risk": "HIGH"},
            "recommendation": "NO_GO",
            "confidence": confidence,
            "supporting_episodes": supporting_episodes,
        }))
        .unwrap()
    }

    #[test]
    fn validator_rejects_overconfident_low_support() {
        let err = candidate(0.8, 2).into_heuristic().unwrap_err();
        assert!(matches!(
            err,
            HeuristicValidationError::OverconfidentForSupport { .. }
        ));
    }

    #[test]
    fn validator_accepts_capped_confidence_with_low_support() {
        let h = candidate(0.5, 2).into_heuristic().unwrap();
        assert_eq!(h.recommendation, Recommendation::NoGo);
        assert_eq!(h.supporting_episodes, 2);
    }

    #[test]
    fn validator_rejects_empty_when_first() {
        let c: HeuristicCandidate = serde_json::from_value(json!({
            "when": {},
            "recommendation": "BOGUS",
            "confidence": 7.0,
            "supporting_episodes": 0,
        }))
        .unwrap();
        assert!(matches!(
            c.into_heuristic().unwrap_err(),
            HeuristicValidationError::EmptyWhen
        ));
    }

    #[test]
    fn validator_rejects_unknown_recommendation() {
        let c: HeuristicCandidate = serde_json::from_value(json!({
            "when": {"feature_risk": "HIGH"},
            "recommendation": "MAYBE",
            "confidence": 0.5,
            "supporting_episodes": 3,
        }))
        .unwrap();
        assert!(matches!(
            c.into_heuristic().unwrap_err(),
            HeuristicValidationError::UnknownRecommendation(_)
        ));
    }

    #[test]
    fn validator_rejects_out_of_range_confidence() {
        assert!(matches!(
            candidate(1.2, 5).into_heuristic().unwrap_err(),
            HeuristicValidationError::ConfidenceOutOfRange(_)
        ));
        assert!(matches!(
            candidate(0.0, 0).into_heuristic().unwrap_err(),
            HeuristicValidationError::TooFewSupportingEpisodes(0)
        ));
    }
}
