// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Gemini-backed oracle implementations.
//!
//! Each oracle renders a prompt template, requests a JSON-mode
//! completion through `GeminiClient`, and validates the reply against
//! the documented shape. Any deviation — unparseable text, an
//! out-of-vocabulary enum value, a multi-element critique batch — is an
//! `OracleError::Protocol` carrying the raw reply.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::context::DecisionContext;
use crate::domain::heuristic::{Heuristic, Recommendation};
use crate::domain::memory::Episode;
use crate::domain::oracle::{
    Confirmation, ConfirmationOracle, CritiqueOracle, CritiqueReport, Evidence, OracleError,
    PlannerOracle, PlannerVerdict, SynthesisOracle,
};

use super::gemini::GeminiClient;

const PLANNER_PROMPT: &str = r#"
You are a deployment decision planner.

Context:
{context}

Applicable heuristics:
{heuristics}

Rules:
- If a heuristic applies, you MUST follow its recommendation unless there is a strong reason not to.
- If you override a heuristic, explain why.
- Be conservative with production releases
- Return JSON only.
- Produce EXACTLY ONE decision.

Output format (single object only):
{
  "decision": "GO | NO_GO | DELAY",
  "reason": "short explanation"
}
"#;

const CONFIRMATION_PROMPT: &str = r#"
You are a final safety reviewer for a production release approval.

A prior decision of {decision} is about to be executed.

Context:
{context}

Rules:
- Confirm only if the context gives no reason to doubt the approval.
- When in doubt, do not confirm.
- Return JSON only.

Output format:
{
  "confirm": true,
  "reason": "short explanation"
}
"#;

const RED_TEAM_PROMPT: &str = r#"
You are a red-team reviewer for a production deployment decision.

Your role:
- Assume the decision could be wrong.
- Look for missing information, risky assumptions, or edge cases.
- Be conservative and adversarial.

Context:
{context}

Decision proposed:
{decision}

Execution evidence:
{evidence}

Rules:
- If risks are severe or information is missing, suggest DELAY or NO_GO.
- If risks are minor, suggest NONE.
- Do NOT invent facts.
- Return a SINGLE JSON OBJECT (not an array).

Output format:
{
  "concerns": ["..."],
  "risk_level": "LOW | MEDIUM | HIGH",
  "suggested_action": "NONE | DELAY | NO_GO"
}
"#;

const REFLECTION_PROMPT: &str = r#"
You are extracting reusable decision heuristics from past episodes.

Episodes:
{episodes}

Rules:
- Only generalise across shared context attributes.
- Do NOT invent new attributes.
- If fewer than 3 supporting episodes exist, confidence MUST be <= 0.6.
- Return JSON only. No explanation.

Output format:
{
  "heuristics": [
    {
      "when": { "...": "..." },
      "recommendation": "GO | NO_GO | DELAY",
      "confidence": 0.5,
      "supporting_episodes": 1
    }
  ]
}
"#;

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn parse_reply<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, OracleError> {
    serde_json::from_str(raw).map_err(|_| OracleError::Protocol {
        raw: raw.to_string(),
    })
}

#[async_trait]
impl PlannerOracle for GeminiClient {
    async fn plan(
        &self,
        context: &DecisionContext,
        allowed: &[Recommendation],
        heuristics: &[Heuristic],
    ) -> Result<PlannerVerdict, OracleError> {
        let prompt = PLANNER_PROMPT
            .replace("{context}", &pretty(context))
            .replace("{heuristics}", &pretty(&heuristics));

        let raw = self.generate_json(&prompt, None).await?;
        debug!(reply = %raw, "planner oracle replied");

        let verdict: PlannerVerdict = parse_reply(&raw)?;
        if !allowed.contains(&verdict.decision) {
            return Err(OracleError::Protocol { raw });
        }
        Ok(verdict)
    }
}

#[async_trait]
impl ConfirmationOracle for GeminiClient {
    async fn confirm(
        &self,
        prior_decision: Recommendation,
        context: &DecisionContext,
    ) -> Result<Confirmation, OracleError> {
        let prompt = CONFIRMATION_PROMPT
            .replace("{decision}", &prior_decision.to_string())
            .replace("{context}", &pretty(context));

        let raw = self.generate_json(&prompt, Some(0.0)).await?;
        debug!(reply = %raw, "confirmation oracle replied");
        parse_reply(&raw)
    }
}

#[async_trait]
impl CritiqueOracle for GeminiClient {
    async fn review(
        &self,
        context: &DecisionContext,
        decision: Recommendation,
        evidence: &Evidence,
    ) -> Result<CritiqueReport, OracleError> {
        let prompt = RED_TEAM_PROMPT
            .replace("{context}", &pretty(context))
            .replace("{decision}", &decision.to_string())
            .replace("{evidence}", &pretty(evidence));

        let raw = self.generate_json(&prompt, None).await?;
        debug!(reply = %raw, "critique oracle replied");

        // A single-element batch is unwrapped; anything longer is rejected.
        let value = match parse_reply::<Value>(&raw)? {
            Value::Array(items) => {
                if items.len() != 1 {
                    return Err(OracleError::Protocol { raw });
                }
                items.into_iter().next().unwrap_or(Value::Null)
            }
            other => other,
        };

        serde_json::from_value(value).map_err(|_| OracleError::Protocol { raw })
    }
}

#[derive(Deserialize)]
struct SynthesisReply {
    #[serde(default)]
    heuristics: Vec<Value>,
}

#[async_trait]
impl SynthesisOracle for GeminiClient {
    async fn synthesize(&self, episodes: &[Episode]) -> Result<Vec<Value>, OracleError> {
        let prompt = REFLECTION_PROMPT.replace("{episodes}", &pretty(&episodes));

        let raw = self.generate_json(&prompt, Some(0.0)).await?;
        debug!(reply = %raw, "synthesis oracle replied");

        let reply: SynthesisReply = parse_reply(&raw)?;
        Ok(reply.heuristics)
    }
}
