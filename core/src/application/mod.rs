// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod orchestrator;
pub mod reflection;

// Re-export the pipeline surface for convenience
pub use orchestrator::{Orchestrator, PipelineError, RunReport, StepTrace};
pub use reflection::{ReflectionSummary, REFLECTION_WINDOW};
