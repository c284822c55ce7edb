// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ingestion pipeline configuration.

use serde::Deserialize;

/// Ingestion configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct IngestConfig {
	/// Cap on the inflated dump size, in bytes.
	pub max_decompressed_bytes: u64,
	/// Name of the client log entry in the dump file table.
	pub log_file: String,
}

impl Default for IngestConfig {
	fn default() -> Self {
		Self {
			max_decompressed_bytes: 32 * 1024 * 1024,
			log_file: "Client.log".to_string(),
		}
	}
}

/// Ingestion configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfigLayer {
	#[serde(default)]
	pub max_decompressed_bytes: Option<u64>,
	#[serde(default)]
	pub log_file: Option<String>,
}

impl IngestConfigLayer {
	pub fn merge(&mut self, other: IngestConfigLayer) {
		if other.max_decompressed_bytes.is_some() {
			self.max_decompressed_bytes = other.max_decompressed_bytes;
		}
		if other.log_file.is_some() {
			self.log_file = other.log_file;
		}
	}

	pub fn finalize(self) -> IngestConfig {
		let defaults = IngestConfig::default();
		IngestConfig {
			max_decompressed_bytes: self
				.max_decompressed_bytes
				.unwrap_or(defaults.max_decompressed_bytes),
			log_file: self.log_file.unwrap_or(defaults.log_file),
		}
	}
}
