// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Dump upload handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flare_server_ingest::IngestOutcome;

use crate::api::AppState;
use crate::error::ServerError;

/// POST / - ingest one compressed crash dump.
///
/// 201 with the new record when this is a first occurrence, 204 when the
/// fault was already on file.
pub async fn upload_dump(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Response, ServerError> {
	let outcome = state.ingest.ingest(&body).await?;

	let response = match outcome {
		IngestOutcome::AlreadyKnown { .. } => StatusCode::NO_CONTENT.into_response(),
		IngestOutcome::Recorded {
			record_id,
			external_reference,
		} => (
			StatusCode::CREATED,
			Json(serde_json::json!({
				"record_id": record_id.map(|id| id.to_string()),
				"external_reference": external_reference,
			})),
		)
			.into_response(),
	};

	Ok(response)
}
