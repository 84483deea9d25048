// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

// LLM Oracle Infrastructure - Anti-Corruption Layer Implementations
//
// The Gemini adapter translates between the domain oracle traits and the
// external generateContent API.

pub mod gemini;
pub mod oracles;

pub use gemini::GeminiClient;
