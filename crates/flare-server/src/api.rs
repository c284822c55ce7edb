// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router assembly and shared application state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use flare_server_config::ServerConfig;
use flare_server_ingest::{
	FaultRepository, IngestOptions, IngestService, LogNotifier, Notifier, SqliteFaultRepository,
	WebhookNotifier,
};
use sqlx::SqlitePool;

use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub ingest: Arc<IngestService>,
	pub repo: Arc<dyn FaultRepository>,
	/// Request-body cap for the upload route. The decompression limit is
	/// the real guard; the compressed body is never larger than what it
	/// inflates to, so the same configured bound applies.
	pub max_body_bytes: usize,
}

/// Build the application state from resolved configuration.
///
/// Picks the webhook notifier when a URL is configured, the logging
/// fallback otherwise.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let repo: Arc<dyn FaultRepository> = Arc::new(SqliteFaultRepository::new(pool));

	let notifier: Arc<dyn Notifier> = match &config.notify.webhook_url {
		Some(url) => Arc::new(WebhookNotifier::new(
			url.clone(),
			config.notify.webhook_secret.clone(),
			Duration::from_secs(config.notify.timeout_secs),
		)),
		None => Arc::new(LogNotifier),
	};

	let options = IngestOptions {
		max_decompressed_bytes: config.ingest.max_decompressed_bytes,
		log_file: config.ingest.log_file.clone(),
	};

	let ingest = Arc::new(IngestService::new(Arc::clone(&repo), notifier, options));

	AppState {
		ingest,
		repo,
		max_body_bytes: config.ingest.max_decompressed_bytes as usize,
	}
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		// The framework's default body limit is far below a realistic
		// compressed dump; uploads are bounded by the configured cap instead.
		.route(
			"/",
			post(routes::ingest::upload_dump)
				.layer(DefaultBodyLimit::max(state.max_body_bytes)),
		)
		.route("/health", get(routes::health::health_check))
		.route("/faults", get(routes::faults::list_faults))
		.route("/faults/{id}", get(routes::faults::get_fault))
		.route(
			"/faults/{id}/resolve",
			post(routes::faults::resolve_fault).delete(routes::faults::unresolve_fault),
		)
		.route("/stats", get(routes::faults::stats))
		.with_state(state)
}
