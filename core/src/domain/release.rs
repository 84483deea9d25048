// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Release Domain Model
//!
//! Defines the release pipeline's core entities: the mutable `ReleaseState`
//! record, the closed stage/risk/day/decision enumerations, and the pure
//! stage-transition function.
//!
//! # Architectural Context
//!
//! - **Bounded Context:** Release Pipeline
//! - **Aggregate Root:** ReleaseState
//!
//! # Design Principles
//!
//! 1. **Closed vocabularies:** every categorical field is a tagged enum,
//!    validated at the serde boundary
//! 2. **Pure transitions:** `ReleaseState::apply` mutates only the fields
//!    its action documents and never consults an oracle
//! 3. **Auditable:** every applied action, including no-ops, is appended
//!    to the state's history before any other mutation

use serde::{Deserialize, Serialize};

use crate::domain::scenario::ReleaseSnapshot;

// ============================================================================
// Value Objects: Closed Enumerations
// ============================================================================

/// Named point in the release pipeline's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Start,
    RiskEval,
    Scheduling,
    Decision,
    Reflect,
    Done,
    Aborted,
}

impl Stage {
    /// Terminal stages end the pipeline run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Start => "START",
            Stage::RiskEval => "RISK_EVAL",
            Stage::Scheduling => "SCHEDULING",
            Stage::Decision => "DECISION",
            Stage::Reflect => "REFLECT",
            Stage::Done => "DONE",
            Stage::Aborted => "ABORTED",
        };
        write!(f, "{}", s)
    }
}

/// Risk signal level for a feature or a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Unknown
    }
}

/// Day of week in the release's time context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Unknown,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Default for DayOfWeek {
    fn default() -> Self {
        DayOfWeek::Unknown
    }
}

/// Tri-state scheduling-clash flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClashState {
    Unknown,
    True,
    False,
}

impl From<bool> for ClashState {
    fn from(value: bool) -> Self {
        if value {
            ClashState::True
        } else {
            ClashState::False
        }
    }
}

/// Final go/no-go outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Undecided,
    Go,
    Delay,
    Abort,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Decision::Undecided => "UNDECIDED",
            Decision::Go => "GO",
            Decision::Delay => "DELAY",
            Decision::Abort => "ABORT",
        };
        write!(f, "{}", s)
    }
}

/// Pipeline action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    EvaluateRisk,
    CheckClash,
    Reschedule,
    ApproveRelease,
    AbortRelease,
    Finish,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::EvaluateRisk => "evaluate_risk",
            Action::CheckClash => "check_clash",
            Action::Reschedule => "reschedule",
            Action::ApproveRelease => "approve_release",
            Action::AbortRelease => "abort_release",
            Action::Finish => "finish",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Value Object: ReleaseRequest
// ============================================================================

/// Identity of the release a pipeline run evaluates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub release_id: String,
    pub application: String,
    pub env: String,
}

// ============================================================================
// Aggregate Root: ReleaseState
// ============================================================================

/// Mutable record of one release's progress through the pipeline.
///
/// # Invariants
/// - `stage` only advances along the fixed transition graph
/// - `decision` is set only by a transition into a terminal stage
/// - `history` is append-only; every applied action is recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseState {
    pub release_id: String,
    pub application: String,
    pub env: String,

    pub stage: Stage,

    // Risk signals
    pub feature_risk: RiskLevel,
    pub service_criticality: RiskLevel,

    // Time context
    pub day_of_week: DayOfWeek,
    /// Hour of day in [0, 23]; -1 means unset.
    pub hour_of_day: i8,

    // Scheduling context
    pub clash: ClashState,
    pub conflicting_service: String,

    // Outcome
    pub decision: Decision,
    pub history: Vec<String>,
}

impl ReleaseState {
    /// Create a fresh state at `START` with all signals unset.
    pub fn new(request: ReleaseRequest) -> Self {
        Self {
            release_id: request.release_id,
            application: request.application,
            env: request.env,
            stage: Stage::Start,
            feature_risk: RiskLevel::Unknown,
            service_criticality: RiskLevel::Unknown,
            day_of_week: DayOfWeek::Unknown,
            hour_of_day: -1,
            clash: ClashState::Unknown,
            conflicting_service: String::new(),
            decision: Decision::Undecided,
            history: Vec::new(),
        }
    }

    /// Apply one pipeline action: the stage-transition function.
    ///
    /// Always appends `ACTION: <name>` to the history first. An action
    /// whose precondition does not hold is a defined no-op transition:
    /// the history grows, every other field stays untouched.
    pub fn apply(&mut self, action: Action, snapshot: &ReleaseSnapshot) {
        self.history.push(format!("ACTION: {}", action));

        match action {
            Action::EvaluateRisk if self.stage == Stage::Start => {
                self.feature_risk = snapshot.feature_risk;
                self.service_criticality = snapshot.service_criticality;
                self.day_of_week = snapshot.day_of_week;
                self.hour_of_day = snapshot.hour_of_day;
                self.stage = Stage::RiskEval;
            }
            Action::CheckClash if self.stage == Stage::RiskEval => {
                self.clash = snapshot
                    .clash_outcomes
                    .first()
                    .copied()
                    .map(ClashState::from)
                    .unwrap_or(ClashState::Unknown);
                self.conflicting_service = snapshot
                    .conflicting_services
                    .first()
                    .cloned()
                    .unwrap_or_default();
                self.stage = Stage::Scheduling;
            }
            Action::Reschedule
                if self.stage == Stage::Scheduling && self.clash == ClashState::True =>
            {
                self.clash = ClashState::False;
                self.stage = Stage::Decision;
            }
            Action::ApproveRelease if !self.stage.is_terminal() => {
                self.decision = Decision::Go;
                self.stage = Stage::Done;
            }
            Action::AbortRelease if !self.stage.is_terminal() => {
                self.decision = Decision::Abort;
                self.stage = Stage::Aborted;
            }
            Action::Finish if !self.stage.is_terminal() => {
                self.stage = Stage::Done;
            }
            _ => {
                // Defined no-op: precondition unmet, only the history grew.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ReleaseSnapshot {
        ReleaseSnapshot {
            feature_risk: RiskLevel::High,
            service_criticality: RiskLevel::High,
            day_of_week: DayOfWeek::Fri,
            hour_of_day: 16,
            clash_outcomes: vec![true, false],
            conflicting_services: vec!["PAYMENTS-SERVICE".to_string()],
        }
    }

    fn state() -> ReleaseState {
        ReleaseState::new(ReleaseRequest {
            release_id: "SVC-1.0.0".to_string(),
            application: "SVC".to_string(),
            env: "prod".to_string(),
        })
    }

    #[test]
    fn evaluate_risk_copies_signals_and_advances() {
        let mut s = state();
        s.apply(Action::EvaluateRisk, &snapshot());

        assert_eq!(s.stage, Stage::RiskEval);
        assert_eq!(s.feature_risk, RiskLevel::High);
        assert_eq!(s.service_criticality, RiskLevel::High);
        assert_eq!(s.day_of_week, DayOfWeek::Fri);
        assert_eq!(s.hour_of_day, 16);
        assert_eq!(s.history, vec!["ACTION: evaluate_risk".to_string()]);
    }

    #[test]
    fn check_clash_consumes_first_outcome_only() {
        let mut s = state();
        s.apply(Action::EvaluateRisk, &snapshot());
        s.apply(Action::CheckClash, &snapshot());

        assert_eq!(s.stage, Stage::Scheduling);
        assert_eq!(s.clash, ClashState::True);
        assert_eq!(s.conflicting_service, "PAYMENTS-SERVICE");
    }

    #[test]
    fn check_clash_with_empty_sequences_stays_unknown() {
        let mut snap = snapshot();
        snap.clash_outcomes.clear();
        snap.conflicting_services.clear();

        let mut s = state();
        s.apply(Action::EvaluateRisk, &snap);
        s.apply(Action::CheckClash, &snap);

        assert_eq!(s.clash, ClashState::Unknown);
        assert_eq!(s.conflicting_service, "");
    }

    #[test]
    fn reschedule_requires_scheduling_stage_with_clash() {
        let mut s = state();
        s.apply(Action::EvaluateRisk, &snapshot());
        s.apply(Action::CheckClash, &snapshot());
        s.apply(Action::Reschedule, &snapshot());

        assert_eq!(s.stage, Stage::Decision);
        assert_eq!(s.clash, ClashState::False);
    }

    #[test]
    fn reschedule_without_clash_is_a_noop() {
        let mut snap = snapshot();
        snap.clash_outcomes = vec![false];

        let mut s = state();
        s.apply(Action::EvaluateRisk, &snap);
        s.apply(Action::CheckClash, &snap);
        let before = s.clone();
        s.apply(Action::Reschedule, &snap);

        assert_eq!(s.stage, before.stage);
        assert_eq!(s.clash, before.clash);
        assert_eq!(
            s.history.last().map(String::as_str),
            Some("ACTION: reschedule")
        );
        assert_eq!(s.history.len(), before.history.len() + 1);
    }

    #[test]
    fn approve_is_legal_from_any_non_terminal_stage() {
        let mut s = state();
        s.apply(Action::ApproveRelease, &snapshot());

        assert_eq!(s.stage, Stage::Done);
        assert_eq!(s.decision, Decision::Go);
    }

    #[test]
    fn abort_is_legal_from_any_non_terminal_stage() {
        let mut s = state();
        s.apply(Action::EvaluateRisk, &snapshot());
        s.apply(Action::AbortRelease, &snapshot());

        assert_eq!(s.stage, Stage::Aborted);
        assert_eq!(s.decision, Decision::Abort);
    }

    #[test]
    fn finish_sets_done_without_touching_decision() {
        let mut s = state();
        s.apply(Action::Finish, &snapshot());

        assert_eq!(s.stage, Stage::Done);
        assert_eq!(s.decision, Decision::Undecided);
    }

    #[test]
    fn actions_on_terminal_stage_only_grow_history() {
        let mut s = state();
        s.apply(Action::AbortRelease, &snapshot());
        let before = s.clone();

        s.apply(Action::ApproveRelease, &snapshot());
        assert_eq!(s.stage, Stage::Aborted);
        assert_eq!(s.decision, Decision::Abort);
        assert_eq!(s.history.len(), before.history.len() + 1);
    }

    #[test]
    fn transitions_are_deterministic() {
        let snap = snapshot();
        let mut a = state();
        let mut b = state();

        for action in [Action::EvaluateRisk, Action::CheckClash, Action::AbortRelease] {
            a.apply(action, &snap);
            b.apply(action, &snap);
        }

        assert_eq!(a.stage, b.stage);
        assert_eq!(a.decision, b.decision);
        assert_eq!(a.history, b.history);
    }
}
