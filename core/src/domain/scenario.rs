// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Environment snapshot consumed by the stage-transition function.
//!
//! A snapshot is fixture data from the orchestrator's point of view: it
//! carries the risk/time signals `evaluate_risk` copies into the release
//! state and the ordered clash sequences `check_clash` reads.

use serde::{Deserialize, Serialize};

use crate::domain::release::{DayOfWeek, RiskLevel};

/// External environment snapshot for one pipeline run.
///
/// `check_clash` consumes only the first element of `clash_outcomes` and
/// `conflicting_services`; the rest of each sequence is carried for
/// context only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSnapshot {
    pub feature_risk: RiskLevel,
    pub service_criticality: RiskLevel,
    pub day_of_week: DayOfWeek,
    /// Hour of day in [0, 23]; -1 means unset.
    pub hour_of_day: i8,
    pub clash_outcomes: Vec<bool>,
    pub conflicting_services: Vec<String>,
}
