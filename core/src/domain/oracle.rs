// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Oracle Capability Interfaces (Anti-Corruption Layer)
//!
//! The pipeline consults four external decision-making collaborators:
//! a planner, a confirmation reviewer (reflection gate), an advisory
//! critique reviewer and a heuristic synthesizer. Their reasoning is out
//! of scope here; these traits pin down the deterministic contract the
//! core requires — what is sent, what shape must come back, and which
//! deviations are fatal.
//!
//! Implementations in `infrastructure/llm/`. Deterministic test doubles
//! substitute for the live adapters in the integration tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::context::DecisionContext;
use crate::domain::heuristic::{Heuristic, Recommendation};
use crate::domain::memory::Episode;

/// Decision labels the planner may return.
pub const ALLOWED_DECISIONS: [Recommendation; 3] = [
    Recommendation::Go,
    Recommendation::NoGo,
    Recommendation::Delay,
];

/// Errors raised by oracle calls.
///
/// Each call is attempted exactly once; nothing here is retried.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Response unparseable as the documented shape, or an enumerated
    /// field took an out-of-domain value. Fatal to the current run; the
    /// raw payload is surfaced verbatim for diagnosis.
    #[error("oracle returned an out-of-contract response: {raw}")]
    Protocol { raw: String },

    /// Network failure or timeout reaching the oracle.
    #[error("oracle transport failure: {0}")]
    Transport(String),
}

/// Planner verdict for one choice point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerVerdict {
    pub decision: Recommendation,
    pub reason: String,
}

/// Confirmation-oracle answer for the reflection gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirm: bool,
    pub reason: String,
}

/// Risk level assessed by the critique reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CritiqueRisk {
    Low,
    Medium,
    High,
}

/// Action the critique reviewer would take instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CritiqueAction {
    None,
    Delay,
    NoGo,
}

/// Advisory critique of a proposed decision. Recorded in the step
/// trace, never acted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritiqueReport {
    pub concerns: Vec<String>,
    pub risk_level: CritiqueRisk,
    pub suggested_action: CritiqueAction,
}

/// Execution evidence handed to the critique reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub clash_detected: Vec<bool>,
    pub freeze_window: bool,
    pub missing_info: Vec<String>,
}

/// Proposes a deployment decision for the current context.
#[async_trait]
pub trait PlannerOracle: Send + Sync {
    async fn plan(
        &self,
        context: &DecisionContext,
        allowed: &[Recommendation],
        heuristics: &[Heuristic],
    ) -> Result<PlannerVerdict, OracleError>;
}

/// Second-pass safety check applied before a production approval.
#[async_trait]
pub trait ConfirmationOracle: Send + Sync {
    async fn confirm(
        &self,
        prior_decision: Recommendation,
        context: &DecisionContext,
    ) -> Result<Confirmation, OracleError>;
}

/// Adversarial reviewer of a proposed decision (advisory only).
///
/// A multi-element batch response is a protocol error; a single-element
/// batch is unwrapped.
#[async_trait]
pub trait CritiqueOracle: Send + Sync {
    async fn review(
        &self,
        context: &DecisionContext,
        decision: Recommendation,
        evidence: &Evidence,
    ) -> Result<CritiqueReport, OracleError>;
}

/// Induces heuristic candidates from a window of recent episodes.
///
/// Candidates come back as raw JSON values; admission validation happens
/// at the caller so one bad candidate never poisons its batch.
#[async_trait]
pub trait SynthesisOracle: Send + Sync {
    async fn synthesize(&self, episodes: &[Episode]) -> Result<Vec<Value>, OracleError>;
}
