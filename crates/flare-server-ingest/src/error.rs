// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for ingestion server operations.

use thiserror::Error;

/// Errors that can occur in ingestion server operations.
#[derive(Debug, Error)]
pub enum IngestError {
	/// Decompression, container or metadata failure; terminal for the
	/// request, the payload must not be retried unmodified.
	#[error(transparent)]
	Dump(#[from] flare_core::DumpError),

	/// Persistence failure. Swallowed at the dedup step (logged, processing
	/// continues) per the ingestion policy.
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// Notification dispatch failure; surfaced to the uploader, since the
	/// fault was never announced and retry is meaningful.
	#[error("notification dispatch failed: {0}")]
	Dispatch(String),

	#[error("invalid UUID: {0}")]
	InvalidUuid(#[from] uuid::Error),

	#[error("invalid datetime: {0}")]
	InvalidDateTime(String),
}

/// Result type for ingestion server operations.
pub type Result<T> = std::result::Result<T, IngestError>;
