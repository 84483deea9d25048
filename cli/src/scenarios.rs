// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Demo scenario registry.
//!
//! Named environment-snapshot fixtures the CLI and demo API run the
//! pipeline against. Lookup by unknown id falls back to the first entry.

use serde::Serialize;

use greenlight_core::domain::release::{DayOfWeek, RiskLevel};
use greenlight_core::domain::scenario::ReleaseSnapshot;

#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub label: &'static str,
    pub data: ReleaseSnapshot,
}

pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "low-risk-monday",
            label: "Low risk Monday",
            data: ReleaseSnapshot {
                feature_risk: RiskLevel::Low,
                service_criticality: RiskLevel::Low,
                day_of_week: DayOfWeek::Mon,
                hour_of_day: 8,
                clash_outcomes: vec![false],
                conflicting_services: vec!["".to_string()],
            },
        },
        Scenario {
            id: "low-risk-weekday",
            label: "Low risk weekday",
            data: ReleaseSnapshot {
                feature_risk: RiskLevel::Low,
                service_criticality: RiskLevel::Medium,
                day_of_week: DayOfWeek::Tue,
                hour_of_day: 10,
                clash_outcomes: vec![false],
                conflicting_services: vec!["".to_string()],
            },
        },
        Scenario {
            id: "low-risk-friday",
            label: "Low risk Friday",
            data: ReleaseSnapshot {
                feature_risk: RiskLevel::Low,
                service_criticality: RiskLevel::Low,
                day_of_week: DayOfWeek::Fri,
                hour_of_day: 16,
                clash_outcomes: vec![false],
                conflicting_services: vec!["".to_string()],
            },
        },
        Scenario {
            id: "low-risk-saturday",
            label: "Low risk Saturday",
            data: ReleaseSnapshot {
                feature_risk: RiskLevel::Low,
                service_criticality: RiskLevel::Low,
                day_of_week: DayOfWeek::Sat,
                hour_of_day: 16,
                clash_outcomes: vec![false],
                conflicting_services: vec!["".to_string()],
            },
        },
        Scenario {
            id: "high-risk-friday",
            label: "High risk Friday",
            data: ReleaseSnapshot {
                feature_risk: RiskLevel::High,
                service_criticality: RiskLevel::High,
                day_of_week: DayOfWeek::Fri,
                hour_of_day: 16,
                clash_outcomes: vec![true, false],
                conflicting_services: vec!["PAYMENTS-SERVICE".to_string()],
            },
        },
    ]
}

/// Look up a scenario by id, falling back to the first entry.
pub fn resolve_scenario(id: Option<&str>) -> Scenario {
    let scenarios = builtin_scenarios();
    id.and_then(|wanted| scenarios.iter().find(|s| s.id == wanted).cloned())
        .unwrap_or_else(|| scenarios.into_iter().next().expect("registry is non-empty"))
}
