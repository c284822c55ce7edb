// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Flare crash-dump ingestion server.
//!
//! This crate provides an HTTP server that accepts compressed crash dumps,
//! deduplicates them by call-stack signature and notifies a webhook sink
//! about first occurrences.

pub mod api;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use error::ServerError;
pub use flare_server_config::ServerConfig;
