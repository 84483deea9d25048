// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Demo API server.
//!
//! Serves the scenario registry and on-demand pipeline runs over HTTP:
//!
//! - `GET /api/scenarios` — list the built-in fixtures
//! - `GET /api/run?scenario=<id>` — run the pipeline and return the report
//!
//! Run failures map to a 500 with a JSON `{error}` body; CORS is
//! permissive since this is a local demo surface.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use greenlight_core::application::Orchestrator;
use greenlight_core::domain::release::ReleaseRequest;

use crate::scenarios::{builtin_scenarios, resolve_scenario};

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub release: ReleaseRequest,
}

#[derive(Deserialize)]
struct RunParams {
    scenario: Option<String>,
}

pub async fn serve(host: &str, port: u16, state: Arc<AppState>) -> Result<()> {
    let app = Router::new()
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/run", get(run_scenario))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "serving demo API");

    axum::serve(listener, app).await.context("server error")
}

async fn list_scenarios() -> impl IntoResponse {
    Json(json!({ "scenarios": builtin_scenarios() }))
}

async fn run_scenario(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunParams>,
) -> impl IntoResponse {
    let scenario = resolve_scenario(params.scenario.as_deref());

    match state
        .orchestrator
        .run(state.release.clone(), &scenario.data)
        .await
    {
        Ok(report) => {
            let mut body = serde_json::to_value(&report).unwrap_or_else(|_| json!({}));
            if let Some(map) = body.as_object_mut() {
                map.insert("scenario_id".to_string(), json!(scenario.id));
                map.insert("scenario".to_string(), json!(scenario.data));
            }
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            error!(scenario = scenario.id, error = %e, "pipeline run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
