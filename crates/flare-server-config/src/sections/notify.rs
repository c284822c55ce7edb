// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification sink configuration.

use serde::Deserialize;

/// Notification configuration (runtime, fully resolved).
///
/// `webhook_url` is optional; without it the server logs first-seen faults
/// instead of posting them anywhere.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
	pub webhook_url: Option<String>,
	pub webhook_secret: Option<String>,
	pub timeout_secs: u64,
}

impl Default for NotifyConfig {
	fn default() -> Self {
		Self {
			webhook_url: None,
			webhook_secret: None,
			timeout_secs: 30,
		}
	}
}

/// Notification configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfigLayer {
	#[serde(default)]
	pub webhook_url: Option<String>,
	#[serde(default)]
	pub webhook_secret: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl NotifyConfigLayer {
	pub fn merge(&mut self, other: NotifyConfigLayer) {
		if other.webhook_url.is_some() {
			self.webhook_url = other.webhook_url;
		}
		if other.webhook_secret.is_some() {
			self.webhook_secret = other.webhook_secret;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> NotifyConfig {
		NotifyConfig {
			webhook_url: self.webhook_url,
			webhook_secret: self.webhook_secret,
			timeout_secs: self.timeout_secs.unwrap_or(30),
		}
	}
}
