// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Decision and episode context snapshots.
//!
//! A `DecisionContext` is the typed view of a release the oracles see at
//! a choice point; an `EpisodeContext` is the smaller subset recorded
//! into episodic memory. Both serialize to flat snake_case JSON maps, and
//! the flat map is also the representation heuristic `when` clauses are
//! matched against.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::release::{DayOfWeek, ReleaseState, RiskLevel};
use crate::domain::scenario::ReleaseSnapshot;

/// Context submitted to the planning, confirmation and critique oracles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    pub feature_risk: RiskLevel,
    pub day_of_week: DayOfWeek,
    pub service_criticality: RiskLevel,
    /// Full ordered clash-outcome sequence from the environment snapshot.
    pub clash_detected: Vec<bool>,
    pub env: String,
}

impl DecisionContext {
    /// Build the oracle-facing context from the current state and the
    /// run's environment snapshot.
    pub fn from_state(state: &ReleaseState, snapshot: &ReleaseSnapshot) -> Self {
        Self {
            feature_risk: state.feature_risk,
            day_of_week: state.day_of_week,
            service_criticality: state.service_criticality,
            clash_detected: snapshot.clash_outcomes.clone(),
            env: state.env.clone(),
        }
    }

    /// Flat attribute map used for heuristic matching.
    pub fn as_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct with named fields always serializes to an object.
            _ => Map::new(),
        }
    }
}

/// Context subset persisted into an episode record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeContext {
    pub feature_risk: RiskLevel,
    pub day_of_week: DayOfWeek,
    pub service_criticality: RiskLevel,
}

impl EpisodeContext {
    pub fn from_state(state: &ReleaseState) -> Self {
        Self {
            feature_risk: state.feature_risk,
            day_of_week: state.day_of_week,
            service_criticality: state.service_criticality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::release::{ReleaseRequest, Stage};

    #[test]
    fn decision_context_flattens_to_snake_case_map() {
        let mut state = ReleaseState::new(ReleaseRequest {
            release_id: "SVC-1.0.0".to_string(),
            application: "SVC".to_string(),
            env: "prod".to_string(),
        });
        state.feature_risk = RiskLevel::High;
        state.day_of_week = DayOfWeek::Fri;
        state.stage = Stage::Scheduling;

        let snapshot = ReleaseSnapshot {
            feature_risk: RiskLevel::High,
            service_criticality: RiskLevel::High,
            day_of_week: DayOfWeek::Fri,
            hour_of_day: 16,
            clash_outcomes: vec![true, false],
            conflicting_services: vec!["PAYMENTS-SERVICE".to_string()],
        };

        let map = DecisionContext::from_state(&state, &snapshot).as_map();
        assert_eq!(map.get("feature_risk"), Some(&Value::from("HIGH")));
        assert_eq!(map.get("day_of_week"), Some(&Value::from("FRI")));
        assert_eq!(map.get("env"), Some(&Value::from("prod")));
        assert_eq!(
            map.get("clash_detected"),
            Some(&Value::from(vec![true, false]))
        );
    }
}
