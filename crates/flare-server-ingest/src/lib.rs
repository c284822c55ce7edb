// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash ingestion server implementation for Flare.
//!
//! This crate provides the server-side half of the ingestion pipeline:
//!
//! - Repository layer for fault records with transactional dedup
//! - Notification dispatch to an external webhook sink
//! - The [`IngestService`] pipeline tying decompression, parsing,
//!   dedup and dispatch together

pub mod db;
pub mod error;
pub mod notify;
pub mod repository;
pub mod service;
pub mod testing;

pub use db::{create_pool, run_migrations};
pub use error::{IngestError, Result};
pub use notify::{
	compute_hmac_sha256, FaultNotification, LogNotifier, Notifier, WebhookNotifier,
	DISPLAY_STACK_MAX_CHARS, SIGNATURE_HEADER,
};
pub use repository::{
	FaultRecord, FaultRecordId, FaultRepository, Occurrence, SqliteFaultRepository,
};
pub use service::{IngestOptions, IngestOutcome, IngestService};
