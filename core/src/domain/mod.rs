// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: release pipeline entities, memory records and oracle
//! contracts.

pub mod context;
pub mod heuristic;
pub mod memory;
pub mod oracle;
pub mod release;
pub mod scenario;

pub use context::{DecisionContext, EpisodeContext};
pub use heuristic::{
    applicable_heuristics, Heuristic, HeuristicCandidate, HeuristicValidationError,
    Recommendation, CONFIDENCE_THRESHOLD,
};
pub use memory::{Episode, MemoryDocument, MemoryError, MemoryStore, Outcome};
pub use oracle::{
    Confirmation, ConfirmationOracle, CritiqueAction, CritiqueOracle, CritiqueReport,
    CritiqueRisk, Evidence, OracleError, PlannerOracle, PlannerVerdict, SynthesisOracle,
    ALLOWED_DECISIONS,
};
pub use release::{
    Action, ClashState, DayOfWeek, Decision, ReleaseRequest, ReleaseState, RiskLevel, Stage,
};
pub use scenario::ReleaseSnapshot;
