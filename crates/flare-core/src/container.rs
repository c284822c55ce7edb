// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parser for the `CR1` dump container format.
//!
//! The container is a little-endian binary envelope produced by crashing
//! clients: a 3-byte magic tag, two length-prefixed header strings, two
//! header integers, and a table of named text entries. Strings are encoded
//! as a `u32` length followed by that many bytes, one character per byte;
//! NUL bytes are read but dropped from the decoded string rather than
//! terminating it. Existing producers rely on that exact quirk, so it is
//! kept and isolated in [`Cursor::read_string`].

use std::collections::HashMap;

use crate::error::{DumpError, Result};

const MAGIC: &[u8; 3] = b"CR1";

/// A parsed dump container: header fields plus a virtual file table.
///
/// `declared_length` is carried over from the header verbatim. It is never
/// validated against the actual payload size; callers that care emit a
/// diagnostic instead of rejecting (the field is informational on the wire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpContainer {
	pub dump_id: String,
	pub source_filename: String,
	pub declared_length: u32,
	pub files: HashMap<String, String>,
}

/// Bounds-checked reader over the container payload.
///
/// Every read validates the remaining buffer first, so a hostile length
/// field fails with [`DumpError::ContainerTruncated`] instead of reading
/// out of bounds.
struct Cursor<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	fn new(buf: &'a [u8], pos: usize) -> Self {
		Self { buf, pos }
	}

	fn need(&self, n: usize) -> Result<()> {
		let remaining = self.buf.len() - self.pos;
		if remaining < n {
			return Err(DumpError::ContainerTruncated {
				offset: self.pos,
				needed: n - remaining,
			});
		}
		Ok(())
	}

	fn read_u32(&mut self) -> Result<u32> {
		self.need(4)?;
		let bytes = [
			self.buf[self.pos],
			self.buf[self.pos + 1],
			self.buf[self.pos + 2],
			self.buf[self.pos + 3],
		];
		self.pos += 4;
		Ok(u32::from_le_bytes(bytes))
	}

	fn skip(&mut self, n: usize) -> Result<()> {
		self.need(n)?;
		self.pos += n;
		Ok(())
	}

	/// Read a length-prefixed string, dropping NUL bytes.
	///
	/// Each byte is decoded independently as one character (Latin-1 style,
	/// matching the producer's narrow-string serialization). A zero byte is
	/// consumed but contributes nothing to the decoded string.
	fn read_string(&mut self) -> Result<String> {
		let len = self.read_u32()? as usize;
		self.need(len)?;

		let mut out = String::with_capacity(len);
		for &b in &self.buf[self.pos..self.pos + len] {
			if b > 0 {
				out.push(char::from(b));
			}
		}
		self.pos += len;
		Ok(out)
	}
}

/// Parse a decompressed payload into a [`DumpContainer`].
///
/// Fails atomically: any out-of-bounds read or bad magic rejects the whole
/// payload, no partial container is ever returned. Trailing bytes beyond
/// the last entry are ignored.
pub fn parse_container(payload: &[u8]) -> Result<DumpContainer> {
	if payload.len() < MAGIC.len() {
		return Err(DumpError::ContainerTooShort { len: payload.len() });
	}
	if &payload[..MAGIC.len()] != MAGIC {
		return Err(DumpError::BadMagic);
	}

	let mut cursor = Cursor::new(payload, MAGIC.len());

	let dump_id = cursor.read_string()?;
	let source_filename = cursor.read_string()?;
	let declared_length = cursor.read_u32()?;
	let file_count = cursor.read_u32()?;

	// Reserved field after the count; unknown semantics, skipped opaquely.
	cursor.skip(4)?;

	let mut files = HashMap::new();
	for i in 0..file_count {
		let name = cursor.read_string()?;
		let content = cursor.read_string()?;

		// Reserved separator between entries, absent after the last one.
		if i + 1 < file_count {
			cursor.skip(4)?;
		}

		// A repeated name overwrites the earlier entry.
		files.insert(name, content);
	}

	Ok(DumpContainer {
		dump_id,
		source_filename,
		declared_length,
		files,
	})
}

/// Encode a container in the `CR1` wire format.
///
/// Producers are normally crashing game clients; this encoder exists for
/// tests and local tooling. Characters above U+00FF cannot be represented
/// in the narrow wire encoding and are replaced with `?`.
pub fn encode_container(
	dump_id: &str,
	source_filename: &str,
	declared_length: u32,
	files: &[(&str, &str)],
) -> Vec<u8> {
	fn push_string(out: &mut Vec<u8>, s: &str) {
		let bytes: Vec<u8> = s
			.chars()
			.map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
			.collect();
		out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
		out.extend_from_slice(&bytes);
	}

	let mut out = Vec::new();
	out.extend_from_slice(MAGIC);
	push_string(&mut out, dump_id);
	push_string(&mut out, source_filename);
	out.extend_from_slice(&declared_length.to_le_bytes());
	out.extend_from_slice(&(files.len() as u32).to_le_bytes());
	out.extend_from_slice(&0u32.to_le_bytes());

	for (i, (name, content)) in files.iter().enumerate() {
		push_string(&mut out, name);
		push_string(&mut out, content);
		if i + 1 < files.len() {
			out.extend_from_slice(&0u32.to_le_bytes());
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn rejects_empty_payload() {
		assert!(matches!(
			parse_container(&[]),
			Err(DumpError::ContainerTooShort { len: 0 })
		));
	}

	#[test]
	fn rejects_short_payload() {
		assert!(matches!(
			parse_container(b"CR"),
			Err(DumpError::ContainerTooShort { len: 2 })
		));
	}

	#[test]
	fn rejects_bad_magic() {
		let payload = encode_container("id", "file.dmp", 0, &[]);
		let mut payload = payload;
		payload[0] = b'X';
		assert!(matches!(parse_container(&payload), Err(DumpError::BadMagic)));
	}

	#[test]
	fn parses_empty_file_table() {
		let payload = encode_container("dump-42", "crash.dmp", 1234, &[]);
		let container = parse_container(&payload).unwrap();
		assert_eq!(container.dump_id, "dump-42");
		assert_eq!(container.source_filename, "crash.dmp");
		assert_eq!(container.declared_length, 1234);
		assert!(container.files.is_empty());
	}

	#[test]
	fn roundtrip_with_files() {
		let payload = encode_container(
			"UE-CrashReport-9f2",
			"UEMinidump.dmp",
			9000,
			&[
				("CrashContext.runtime-xml", "<FGenericCrashContext/>"),
				("Client.log", "log line one\nlog line two"),
			],
		);
		let container = parse_container(&payload).unwrap();
		assert_eq!(container.dump_id, "UE-CrashReport-9f2");
		assert_eq!(container.source_filename, "UEMinidump.dmp");
		assert_eq!(container.declared_length, 9000);
		assert_eq!(container.files.len(), 2);
		assert_eq!(
			container.files["CrashContext.runtime-xml"],
			"<FGenericCrashContext/>"
		);
		assert_eq!(container.files["Client.log"], "log line one\nlog line two");
	}

	#[test]
	fn nul_bytes_are_dropped_not_terminating() {
		// "a\0b" on the wire decodes as "ab": the NUL is consumed but
		// contributes no character.
		let mut payload = Vec::new();
		payload.extend_from_slice(b"CR1");
		payload.extend_from_slice(&3u32.to_le_bytes());
		payload.extend_from_slice(b"a\0b");
		payload.extend_from_slice(&0u32.to_le_bytes()); // empty filename
		payload.extend_from_slice(&0u32.to_le_bytes()); // declared_length
		payload.extend_from_slice(&0u32.to_le_bytes()); // file_count
		payload.extend_from_slice(&0u32.to_le_bytes()); // reserved

		let container = parse_container(&payload).unwrap();
		assert_eq!(container.dump_id, "ab");
	}

	#[test]
	fn duplicate_file_names_overwrite() {
		let payload = encode_container(
			"id",
			"crash.dmp",
			0,
			&[("Client.log", "first"), ("Client.log", "second")],
		);
		let container = parse_container(&payload).unwrap();
		assert_eq!(container.files.len(), 1);
		assert_eq!(container.files["Client.log"], "second");
	}

	#[test]
	fn trailing_bytes_are_ignored() {
		let mut payload = encode_container("id", "crash.dmp", 0, &[("a", "b")]);
		payload.extend_from_slice(b"junk past the last entry");
		let container = parse_container(&payload).unwrap();
		assert_eq!(container.files["a"], "b");
	}

	#[test]
	fn oversized_string_length_is_rejected() {
		let mut payload = Vec::new();
		payload.extend_from_slice(b"CR1");
		payload.extend_from_slice(&u32::MAX.to_le_bytes());
		payload.extend_from_slice(b"short");
		assert!(matches!(
			parse_container(&payload),
			Err(DumpError::ContainerTruncated { .. })
		));
	}

	#[test]
	fn truncated_header_is_rejected() {
		let full = encode_container("dump-id", "crash.dmp", 7, &[("x", "y")]);
		// Every strict prefix longer than the magic must fail cleanly.
		for cut in 3..full.len() {
			let result = parse_container(&full[..cut]);
			assert!(
				matches!(result, Err(DumpError::ContainerTruncated { .. })),
				"prefix of {cut} bytes did not fail as truncated"
			);
		}
	}

	#[test]
	fn file_count_larger_than_payload_is_rejected() {
		let mut payload = Vec::new();
		payload.extend_from_slice(b"CR1");
		payload.extend_from_slice(&0u32.to_le_bytes()); // dump_id
		payload.extend_from_slice(&0u32.to_le_bytes()); // filename
		payload.extend_from_slice(&0u32.to_le_bytes()); // declared_length
		payload.extend_from_slice(&u32::MAX.to_le_bytes()); // file_count
		payload.extend_from_slice(&0u32.to_le_bytes()); // reserved
		assert!(matches!(
			parse_container(&payload),
			Err(DumpError::ContainerTruncated { .. })
		));
	}

	proptest! {
		#[test]
		fn parser_never_panics(payload in proptest::collection::vec(proptest::num::u8::ANY, 0..2048)) {
			let _ = parse_container(&payload);
		}

		#[test]
		fn roundtrip_preserves_headers(
			dump_id in "[ -~]{0,64}",
			filename in "[ -~]{0,64}",
			declared_length in proptest::num::u32::ANY,
			content in "[ -~]{0,256}",
		) {
			let payload = encode_container(&dump_id, &filename, declared_length, &[("entry", &content)]);
			let container = parse_container(&payload).unwrap();
			prop_assert_eq!(container.dump_id, dump_id);
			prop_assert_eq!(container.source_filename, filename);
			prop_assert_eq!(container.declared_length, declared_length);
			prop_assert_eq!(&container.files["entry"], &content);
		}
	}
}
