// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fault browsing and resolution handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use flare_server_ingest::{FaultRecord, FaultRecordId};

use crate::api::AppState;
use crate::error::ServerError;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct ListParams {
	pub limit: Option<u32>,
}

fn parse_id(raw: &str) -> Result<FaultRecordId, ServerError> {
	raw.parse()
		.map_err(|_| ServerError::BadRequest(format!("invalid fault id '{raw}'")))
}

/// GET /faults - most recently seen faults first.
pub async fn list_faults(
	State(state): State<AppState>,
	Query(params): Query<ListParams>,
) -> Result<Json<Vec<FaultRecord>>, ServerError> {
	let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
	let faults = state.repo.list_faults(limit).await.map_err(ServerError::Ingest)?;
	Ok(Json(faults))
}

/// GET /faults/{id}
pub async fn get_fault(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<FaultRecord>, ServerError> {
	let id = parse_id(&id)?;
	let fault = state
		.repo
		.get_fault(id)
		.await
		.map_err(ServerError::Ingest)?
		.ok_or_else(|| ServerError::NotFound(format!("no fault with id {id}")))?;
	Ok(Json(fault))
}

/// POST /faults/{id}/resolve
pub async fn resolve_fault(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	set_resolved(&state, &id, true).await
}

/// DELETE /faults/{id}/resolve
pub async fn unresolve_fault(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	set_resolved(&state, &id, false).await
}

async fn set_resolved(
	state: &AppState,
	raw_id: &str,
	resolved: bool,
) -> Result<StatusCode, ServerError> {
	let id = parse_id(raw_id)?;
	let updated = state
		.repo
		.set_resolved(id, resolved)
		.await
		.map_err(ServerError::Ingest)?;

	if updated {
		Ok(StatusCode::NO_CONTENT)
	} else {
		Err(ServerError::NotFound(format!("no fault with id {id}")))
	}
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
	let total = state
		.repo
		.total_occurrences()
		.await
		.map_err(ServerError::Ingest)?;
	Ok(Json(serde_json::json!({ "total_occurrences": total })))
}
