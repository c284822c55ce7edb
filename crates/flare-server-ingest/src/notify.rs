// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification dispatch for first-seen faults.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::error::{IngestError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Character budget for the stack shown in a notification message. Smaller
/// than the dedup key so the fenced code block wrapping it fits the same
/// downstream field limit.
pub const DISPLAY_STACK_MAX_CHARS: usize = 1015;

/// Header carrying the hex HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "X-Flare-Signature";

/// Everything the notification sink gets told about a new fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultNotification {
	pub dump_id: String,
	/// Display-ordered label/value pairs describing the faulting machine.
	pub attributes: Vec<(String, String)>,
	pub log_text: Option<String>,
	pub stack: String,
}

/// Sink for first-occurrence notifications.
///
/// `dispatch` returns the sink's reference for the created message; the
/// caller attaches it to the fault record for later correlation.
#[async_trait]
pub trait Notifier: Send + Sync {
	async fn dispatch(&self, notification: &FaultNotification) -> Result<String>;
}

/// Compute an HMAC-SHA256 signature for a payload.
///
/// Returns the hex-encoded signature without any prefix.
pub fn compute_hmac_sha256(secret: &[u8], payload: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
	mac.update(payload);
	let result = mac.finalize();
	hex::encode(result.into_bytes())
}

/// Webhook-backed notifier.
///
/// Posts a JSON message to the configured URL and reads the sink's message
/// id out of the response body. When a secret is configured the body is
/// signed with HMAC-SHA256 and the hex digest sent in [`SIGNATURE_HEADER`].
pub struct WebhookNotifier {
	client: reqwest::Client,
	url: String,
	secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DispatchResponse {
	message_id: String,
}

impl WebhookNotifier {
	pub fn new(url: String, secret: Option<String>, timeout: Duration) -> Self {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.unwrap_or_default();
		Self {
			client,
			url,
			secret,
		}
	}

	fn build_payload(notification: &FaultNotification) -> serde_json::Value {
		let stack = display_stack(&notification.stack);
		let fields: Vec<serde_json::Value> = notification
			.attributes
			.iter()
			.map(|(name, value)| {
				serde_json::json!({
					"name": name,
					"value": value,
					"inline": true,
				})
			})
			.collect();

		let mut payload = serde_json::json!({
			"title": format!("Crash report {}", notification.dump_id),
			"fields": fields,
			"log": notification.log_text,
		});

		// Metadata-less dumps have no stack; an empty fenced block would
		// render as a bare code frame, so the description is omitted.
		if !stack.is_empty() {
			payload["description"] = serde_json::Value::String(format!("```\n{stack}\n```"));
		}

		payload
	}
}

#[async_trait]
impl Notifier for WebhookNotifier {
	#[instrument(skip(self, notification), fields(dump_id = %notification.dump_id))]
	async fn dispatch(&self, notification: &FaultNotification) -> Result<String> {
		let payload = Self::build_payload(notification);
		let body = serde_json::to_vec(&payload)
			.map_err(|e| IngestError::Dispatch(format!("payload serialization: {e}")))?;

		let mut request = self
			.client
			.post(&self.url)
			.header(reqwest::header::CONTENT_TYPE, "application/json")
			.body(body.clone());

		if let Some(secret) = &self.secret {
			let signature = compute_hmac_sha256(secret.as_bytes(), &body);
			request = request.header(SIGNATURE_HEADER, signature);
		}

		let response = request
			.send()
			.await
			.map_err(|e| IngestError::Dispatch(format!("webhook request failed: {e}")))?;

		let status = response.status();
		if !status.is_success() {
			return Err(IngestError::Dispatch(format!(
				"webhook returned status {status}"
			)));
		}

		let parsed: DispatchResponse = response
			.json()
			.await
			.map_err(|e| IngestError::Dispatch(format!("webhook response body: {e}")))?;

		debug!(message_id = %parsed.message_id, "notification dispatched");
		Ok(parsed.message_id)
	}
}

/// Fallback notifier used when no webhook URL is configured.
///
/// Logs the notification and hands back a locally generated reference so
/// the rest of the pipeline behaves the same either way.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
	async fn dispatch(&self, notification: &FaultNotification) -> Result<String> {
		tracing::info!(
			dump_id = %notification.dump_id,
			stack = %display_stack(&notification.stack),
			attributes = ?notification.attributes,
			"new fault (no webhook configured)"
		);
		Ok(format!("log-{}", uuid::Uuid::now_v7()))
	}
}

fn display_stack(stack: &str) -> &str {
	match stack.char_indices().nth(DISPLAY_STACK_MAX_CHARS) {
		Some((idx, _)) => &stack[..idx],
		None => stack,
	}
}
