// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The ingestion pipeline: decompress, parse, dedup, dispatch.

use std::sync::Arc;

use tracing::{error, instrument, warn};

use flare_core::{decompress, extract_context, parse_container};

use crate::error::Result;
use crate::notify::{FaultNotification, Notifier};
use crate::repository::{FaultRecordId, FaultRepository};

/// Tunables for one ingestion service instance.
#[derive(Debug, Clone)]
pub struct IngestOptions {
	/// Cap on the inflated payload size, in bytes.
	pub max_decompressed_bytes: u64,
	/// File-table entry name whose content is attached to notifications.
	pub log_file: String,
}

impl Default for IngestOptions {
	fn default() -> Self {
		Self {
			max_decompressed_bytes: 32 * 1024 * 1024,
			log_file: "Client.log".to_string(),
		}
	}
}

/// What happened to an accepted dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
	/// The signature was already on file; the counter was bumped, nothing
	/// was dispatched.
	AlreadyKnown { record_id: FaultRecordId },
	/// First occurrence: a notification went out. `record_id` is absent
	/// when the dedup store was unavailable and the occurrence could not
	/// be recorded.
	Recorded {
		record_id: Option<FaultRecordId>,
		external_reference: String,
	},
}

/// Crash-dump ingestion service.
///
/// Ties the pure pipeline stages to the dedup store and the notification
/// sink. One instance is shared across requests.
pub struct IngestService {
	repository: Arc<dyn FaultRepository>,
	notifier: Arc<dyn Notifier>,
	options: IngestOptions,
}

impl IngestService {
	pub fn new(
		repository: Arc<dyn FaultRepository>,
		notifier: Arc<dyn Notifier>,
		options: IngestOptions,
	) -> Self {
		Self {
			repository,
			notifier,
			options,
		}
	}

	/// Ingest one compressed dump payload.
	///
	/// Malformed payloads reject the request. A dedup-store failure does
	/// not: the occurrence is treated as an unrecorded first occurrence and
	/// the notification still goes out, so a storage outage degrades to
	/// duplicate messages rather than silence. Dispatch failures surface to
	/// the uploader; nothing was announced, so a retry is meaningful.
	#[instrument(skip(self, raw), fields(raw_len = raw.len()))]
	pub async fn ingest(&self, raw: &[u8]) -> Result<IngestOutcome> {
		let payload = decompress(raw, self.options.max_decompressed_bytes)?;
		let container = parse_container(&payload)?;

		if container.declared_length as usize != payload.len() {
			// Known client bug: the declared length counts characters, not
			// bytes, so it rarely matches. Diagnostic only.
			warn!(
				declared = container.declared_length,
				actual = payload.len(),
				"container declared length differs from payload size"
			);
		}

		let context = extract_context(&container.files, &self.options.log_file)?;

		let record_id = match self.repository.record_occurrence(&context.stack_signature).await {
			Ok(occurrence) if !occurrence.first_occurrence => {
				return Ok(IngestOutcome::AlreadyKnown {
					record_id: occurrence.record_id,
				});
			}
			Ok(occurrence) => Some(occurrence.record_id),
			Err(e) => {
				// Unrecorded first occurrence: still dispatch, never block
				// the notification on storage.
				error!(error = %e, "dedup store unavailable, proceeding without a record");
				None
			}
		};

		let notification = FaultNotification {
			dump_id: container.dump_id.clone(),
			attributes: context.attributes,
			log_text: context.log_text,
			stack: context.stack_signature,
		};
		let external_reference = self.notifier.dispatch(&notification).await?;

		if let Some(id) = record_id {
			if let Err(e) = self
				.repository
				.attach_external_reference(id, &external_reference)
				.await
			{
				// The message is already out; losing the back-reference is
				// not worth failing the upload.
				warn!(error = %e, record_id = %id, "failed to attach external reference");
			}
		}

		Ok(IngestOutcome::Recorded {
			record_id,
			external_reference,
		})
	}
}

impl std::fmt::Debug for IngestService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IngestService")
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}
