// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for dump decompression and parsing.

use thiserror::Error;

/// Errors produced while turning an uploaded payload into a fault context.
///
/// Variants fall into three categories, which callers map to distinct
/// rejection codes: decompression failures, malformed container failures,
/// and malformed crash-context metadata failures.
#[derive(Debug, Error)]
pub enum DumpError {
	#[error("payload is not a valid deflate stream: {0}")]
	Decompression(#[source] std::io::Error),

	#[error("decompressed payload exceeds the {limit} byte limit")]
	DecompressionLimit { limit: u64 },

	#[error("container too short: {len} bytes")]
	ContainerTooShort { len: usize },

	#[error("bad container magic, expected \"CR1\"")]
	BadMagic,

	#[error("container truncated: needed {needed} more bytes at offset {offset}")]
	ContainerTruncated { offset: usize, needed: usize },

	#[error("crash context document is not valid XML: {0}")]
	MetadataXml(#[from] quick_xml::Error),

	#[error("crash context document missing required field {0}")]
	MetadataField(&'static str),
}

impl DumpError {
	/// True for variants caused by an invalid or oversized compressed stream.
	pub fn is_decompression(&self) -> bool {
		matches!(
			self,
			DumpError::Decompression(_) | DumpError::DecompressionLimit { .. }
		)
	}

	/// True for variants caused by a malformed `CR1` container.
	pub fn is_malformed_container(&self) -> bool {
		matches!(
			self,
			DumpError::ContainerTooShort { .. }
				| DumpError::BadMagic
				| DumpError::ContainerTruncated { .. }
		)
	}

	/// True for variants caused by a malformed crash context document.
	pub fn is_malformed_metadata(&self) -> bool {
		matches!(
			self,
			DumpError::MetadataXml(_) | DumpError::MetadataField(_)
		)
	}
}

/// Result type for dump parsing operations.
pub type Result<T> = std::result::Result<T, DumpError>;
