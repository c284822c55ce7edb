// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP error mapping for the ingestion API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flare_core::DumpError;
use flare_server_ingest::IngestError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("not found: {0}")]
	NotFound(String),
	#[error("bad request: {0}")]
	BadRequest(String),
	#[error(transparent)]
	Ingest(#[from] IngestError),
}

/// Stable error code for a rejected dump, discriminating which pipeline
/// stage failed so clients can tell corrupt uploads from engine bugs.
fn dump_error_code(e: &DumpError) -> &'static str {
	if e.is_decompression() {
		"bad_body_compression"
	} else if e.is_malformed_container() {
		"bad_body"
	} else {
		"bad_crash_context"
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
			ServerError::Ingest(IngestError::Dump(e)) => {
				(StatusCode::BAD_REQUEST, dump_error_code(e), e.to_string())
			}
			ServerError::Ingest(e) => {
				tracing::error!(error = %e, "internal error handling request");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal",
					"internal server error".to_string(),
				)
			}
		};

		let body = Json(serde_json::json!({
			"error": code,
			"message": message,
		}));

		(status, body).into_response()
	}
}
