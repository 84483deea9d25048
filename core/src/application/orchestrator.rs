// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Orchestrator Loop (Application Service)
//!
//! Drives one release through the pipeline state machine to a terminal
//! stage, then finalizes: writes the episode and evaluates the
//! reflection trigger.
//!
//! # Tick Loop
//!
//! ```text
//! while stage is not terminal {
//!     if the stage has a fixed observation action (evaluate_risk,
//!     check_clash), apply it directly;
//!     otherwise this is a choice point:
//!         build context
//!         fetch applicable heuristics (advisory)
//!         ask the planner, normalize GO/DELAY/NO_GO into an action
//!         reflection gate before a production approval
//!         apply the transition
//!         record the advisory critique
//!     append a step trace
//! }
//! write episode; evaluate reflection trigger
//! ```
//!
//! A run is strictly sequential: each oracle call blocks the loop, and
//! no step starts before the previous transition completed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::reflection::{self, ReflectionSummary};
use crate::domain::context::{DecisionContext, EpisodeContext};
use crate::domain::heuristic::{applicable_heuristics, Heuristic, Recommendation};
use crate::domain::memory::{MemoryError, MemoryStore, Outcome};
use crate::domain::oracle::{
    ConfirmationOracle, CritiqueOracle, CritiqueReport, Evidence, OracleError, PlannerOracle,
    PlannerVerdict, SynthesisOracle, ALLOWED_DECISIONS,
};
use crate::domain::release::{Action, Decision, ReleaseRequest, ReleaseState, Stage};
use crate::domain::scenario::ReleaseSnapshot;

/// Upper bound on pipeline steps; a planner that keeps proposing
/// inapplicable actions would otherwise spin forever on no-op
/// transitions.
const MAX_STEPS: usize = 24;

/// Environment name that arms the reflection gate.
const PRODUCTION_ENV: &str = "prod";

/// Fatal pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("pipeline made no progress after {steps} steps")]
    Stalled { steps: usize },
}

/// Orchestrator lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Running,
    Finalizing,
    Complete,
}

/// One recorded pipeline step.
///
/// Observation steps carry no verdict; choice points record the
/// planner's raw decision and the advisory critique. `stage` is the
/// stage before the transition was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTrace {
    pub context: DecisionContext,
    pub heuristics: Vec<Heuristic>,
    pub verdict: Option<PlannerVerdict>,
    pub critique: Option<CritiqueReport>,
    pub action: Action,
    pub stage: Stage,
}

/// Structured result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub decision: Decision,
    pub history: Vec<String>,
    pub steps: Vec<StepTrace>,
    pub reflection: ReflectionSummary,
}

/// Map a planner decision label onto a pipeline action.
pub fn normalize_action(decision: Recommendation) -> Action {
    match decision {
        Recommendation::Go => Action::ApproveRelease,
        Recommendation::Delay => Action::Reschedule,
        Recommendation::NoGo => Action::AbortRelease,
    }
}

/// Fixed observation action for stages that are not choice points.
fn observation_action(stage: Stage) -> Option<Action> {
    match stage {
        Stage::Start => Some(Action::EvaluateRisk),
        Stage::RiskEval => Some(Action::CheckClash),
        _ => None,
    }
}

/// Composes the state machine, the memory store and the oracles into
/// one release-approval pipeline.
///
/// All collaborators are injected at construction; there is no ambient
/// global state.
pub struct Orchestrator {
    memory: Arc<dyn MemoryStore>,
    planner: Arc<dyn PlannerOracle>,
    confirmer: Arc<dyn ConfirmationOracle>,
    critic: Option<Arc<dyn CritiqueOracle>>,
    synthesizer: Arc<dyn SynthesisOracle>,
}

impl Orchestrator {
    pub fn new(
        memory: Arc<dyn MemoryStore>,
        planner: Arc<dyn PlannerOracle>,
        confirmer: Arc<dyn ConfirmationOracle>,
        critic: Option<Arc<dyn CritiqueOracle>>,
        synthesizer: Arc<dyn SynthesisOracle>,
    ) -> Self {
        Self {
            memory,
            planner,
            confirmer,
            critic,
            synthesizer,
        }
    }

    /// Run one release through the pipeline to completion.
    ///
    /// Oracle protocol errors abort the run immediately; no partial
    /// episode is written. The release state is owned by this call and
    /// discarded once the episode is recorded.
    pub async fn run(
        &self,
        request: ReleaseRequest,
        snapshot: &ReleaseSnapshot,
    ) -> Result<RunReport, PipelineError> {
        let mut phase = RunPhase::Running;
        let mut state = ReleaseState::new(request);

        // Seed the signals the first choice point will see; evaluate_risk
        // re-copies them as part of its documented transition.
        state.feature_risk = snapshot.feature_risk;
        state.service_criticality = snapshot.service_criticality;
        state.day_of_week = snapshot.day_of_week;
        state.hour_of_day = snapshot.hour_of_day;

        info!(
            release_id = %state.release_id,
            env = %state.env,
            ?phase,
            "starting pipeline run"
        );

        let mut steps: Vec<StepTrace> = Vec::new();

        while !state.stage.is_terminal() {
            if steps.len() >= MAX_STEPS {
                return Err(PipelineError::Stalled { steps: steps.len() });
            }

            let pre_stage = state.stage;
            let context = DecisionContext::from_state(&state, snapshot);

            // Observation stages carry a fixed next action; the oracle is
            // consulted only at choice points.
            if let Some(action) = observation_action(state.stage) {
                debug!(stage = %pre_stage, %action, "observation step");
                state.apply(action, snapshot);
                steps.push(StepTrace {
                    context,
                    heuristics: Vec::new(),
                    verdict: None,
                    critique: None,
                    action,
                    stage: pre_stage,
                });
                continue;
            }

            let matched = applicable_heuristics(&self.memory.heuristics(), &context.as_map());
            debug!(matched = matched.len(), stage = %pre_stage, "heuristics applicable");

            // Heuristics are advisory: the planner may diverge from them
            // without penalty at this layer.
            let verdict = self
                .planner
                .plan(&context, &ALLOWED_DECISIONS, &matched)
                .await?;
            info!(decision = %verdict.decision, reason = %verdict.reason, "planner verdict");

            let mut action = normalize_action(verdict.decision);

            // Reflection gate: one non-retried confirmation check before a
            // production approval is executed.
            if action == Action::ApproveRelease && state.env == PRODUCTION_ENV {
                let confirmation = self
                    .confirmer
                    .confirm(verdict.decision, &context)
                    .await?;
                if !confirmation.confirm {
                    info!(reason = %confirmation.reason, "reflection gate rejected approval");
                    action = Action::AbortRelease;
                }
            }

            state.apply(action, snapshot);

            let critique = match &self.critic {
                Some(critic) => {
                    let evidence = Evidence {
                        clash_detected: snapshot.clash_outcomes.clone(),
                        freeze_window: false,
                        missing_info: Vec::new(),
                    };
                    match critic.review(&context, verdict.decision, &evidence).await {
                        Ok(report) => Some(report),
                        Err(e) => {
                            // Advisory only: a malformed critique is dropped,
                            // the run continues.
                            warn!(error = %e, "critique oracle rejected");
                            None
                        }
                    }
                }
                None => None,
            };

            steps.push(StepTrace {
                context,
                heuristics: matched,
                verdict: Some(verdict),
                critique,
                action,
                stage: pre_stage,
            });
        }

        phase = RunPhase::Finalizing;
        debug!(?phase, stage = %state.stage, "pipeline reached terminal stage");

        let outcome = if state.decision == Decision::Abort {
            Outcome::Aborted
        } else {
            Outcome::Success
        };
        self.memory
            .write_episode(EpisodeContext::from_state(&state), state.decision, outcome)?;

        let reflection =
            reflection::evaluate_trigger(&*self.memory, &*self.synthesizer).await?;

        phase = RunPhase::Complete;
        info!(
            ?phase,
            decision = %state.decision,
            steps = steps.len(),
            reflection_ran = reflection.ran,
            "pipeline run complete"
        );

        Ok(RunReport {
            decision: state.decision,
            history: state.history,
            steps,
            reflection,
        })
    }
}
