// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload decompression with a decompression-bomb guard.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{DumpError, Result};

/// Inflate a zlib-wrapped DEFLATE payload.
///
/// The output is capped at `max_len` bytes; a stream that inflates past the
/// cap is rejected the same way as a corrupt one, since both are useless to
/// the rest of the pipeline. The input is fully buffered, so this never
/// blocks on I/O.
pub fn decompress(raw: &[u8], max_len: u64) -> Result<Vec<u8>> {
	let mut out = Vec::new();
	let mut decoder = ZlibDecoder::new(raw).take(max_len.saturating_add(1));

	decoder
		.read_to_end(&mut out)
		.map_err(DumpError::Decompression)?;

	if out.len() as u64 > max_len {
		return Err(DumpError::DecompressionLimit { limit: max_len });
	}

	Ok(out)
}
