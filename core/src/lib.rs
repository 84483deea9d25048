// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0
//! greenlight-core
//!
//! Staged release-approval pipeline: a finite-stage state machine,
//! persisted episodic memory with learned heuristics, and a
//! reflection-gate safety check, composed by an orchestrator that
//! consults external decision oracles at each choice point.
//!
//! # Architecture
//!
//! - **domain** — release state machine, memory records, oracle contracts
//! - **application** — orchestrator loop and reflection trigger
//! - **infrastructure** — JSON file store, Gemini oracle adapters

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
