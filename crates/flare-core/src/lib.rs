// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Flare crash ingestion system.
//!
//! This crate provides the pure, I/O-free half of the ingestion pipeline:
//!
//! - Decompression of uploaded payloads ([`inflate::decompress`])
//! - Parsing of the `CR1` dump container format ([`container::parse_container`])
//! - Extraction of a normalized fault context from the embedded crash
//!   context document ([`context::extract_context`])
//!
//! Everything here operates on in-memory byte slices and string tables.
//! Persistence and notification dispatch live in `flare-server-ingest`.

pub mod container;
pub mod context;
pub mod error;
pub mod inflate;

pub use container::{encode_container, parse_container, DumpContainer};
pub use context::{
	extract_context, truncate_signature, FaultContext, CONTEXT_FILE_NAME, SIGNATURE_MAX_CHARS,
};
pub use error::{DumpError, Result};
pub use inflate::decompress;
