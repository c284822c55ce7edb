// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health check handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::AppState;

/// GET /health - liveness plus a database round trip.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let version = env!("CARGO_PKG_VERSION");
	match state.repo.total_occurrences().await {
		Ok(_) => (
			StatusCode::OK,
			Json(serde_json::json!({
				"status": "ok",
				"version": version,
				"database": "ok",
			})),
		),
		Err(e) => {
			tracing::warn!(error = %e, "health check database probe failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(serde_json::json!({
					"status": "degraded",
					"version": version,
					"database": "unavailable",
				})),
			)
		}
	}
}
