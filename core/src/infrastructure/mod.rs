// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod json_memory;
pub mod llm;

pub use json_memory::JsonFileMemoryStore;
pub use llm::GeminiClient;
