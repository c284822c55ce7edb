// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fault-context extraction from the embedded crash context document.
//!
//! The container may carry a `CrashContext.runtime-xml` entry, an XML
//! document written by the crashing engine. A fixed set of field paths under
//! `FGenericCrashContext` yields the call stack (the dedup key) and the
//! descriptive attributes shown in notifications. Dumps without the
//! entry are still valid; they collapse into the empty-signature fault.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DumpError, Result};

/// Well-known name of the crash context entry in the file table.
pub const CONTEXT_FILE_NAME: &str = "CrashContext.runtime-xml";

/// Maximum length of the deduplication key, in characters.
pub const SIGNATURE_MAX_CHARS: usize = 1023;

const ROOT: &str = "FGenericCrashContext";
const CALL_STACK: &str = "RuntimeProperties/CallStack";
const GPU_BRAND: &str = "RuntimeProperties/Misc.PrimaryGPUBrand";
const GPU_DRIVER: &str = "EngineData/RHI.UserDriverVersion";
const GPU_DRIVER_DATE: &str = "EngineData/RHI.DriverDate";
const CPU_BRAND: &str = "RuntimeProperties/Misc.CPUBrand";
const OS_VERSION: &str = "RuntimeProperties/Misc.OSVersionMajor";
const PAGE_SIZE: &str = "RuntimeProperties/MemoryStats.PageSize";
const TOTAL_MEMORY: &str = "RuntimeProperties/MemoryStats.TotalPhysicalGB";
const UPTIME: &str = "RuntimeProperties/SecondsSinceStart";

/// Context derived from one dump, consumed by dedup and dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultContext {
	/// Raw call-stack text as written by the client; empty when the dump
	/// carries no crash context document. Truncated by the dedup store,
	/// not here.
	pub stack_signature: String,
	/// Display attributes in notification order.
	pub attributes: Vec<(String, String)>,
	/// Raw client log, attached to notifications only, never persisted.
	pub log_text: Option<String>,
}

/// Truncate a signature to [`SIGNATURE_MAX_CHARS`] characters.
///
/// Character-count truncation (not bytes, not hashing): signatures that
/// agree on their first 1023 characters map to the same fault.
pub fn truncate_signature(signature: &str) -> &str {
	match signature.char_indices().nth(SIGNATURE_MAX_CHARS) {
		Some((idx, _)) => &signature[..idx],
		None => signature,
	}
}

/// Extract a [`FaultContext`] from a parsed file table.
///
/// A missing crash context entry is not an error; not every dump format
/// version carries one. A present entry that fails to parse, or that lacks
/// any of the required field paths, rejects the dump.
pub fn extract_context(files: &HashMap<String, String>, log_file: &str) -> Result<FaultContext> {
	let log_text = files.get(log_file).cloned();

	let Some(document) = files.get(CONTEXT_FILE_NAME) else {
		return Ok(FaultContext {
			log_text,
			..FaultContext::default()
		});
	};

	let fields = collect_fields(document)?;
	let lookup = |path: &'static str| -> Result<&str> {
		fields
			.get(path)
			.map(String::as_str)
			.ok_or(DumpError::MetadataField(path))
	};

	// The stack is the dedup key and passes through byte-for-byte; only
	// display attributes get whitespace-trimmed.
	let stack_signature = lookup(CALL_STACK)?.to_string();
	let attr = |path: &'static str| -> Result<String> { Ok(lookup(path)?.trim().to_string()) };
	let attributes = vec![
		("GPU".to_string(), attr(GPU_BRAND)?),
		("GPU Driver".to_string(), attr(GPU_DRIVER)?),
		("GPU Driver Date".to_string(), attr(GPU_DRIVER_DATE)?),
		("CPU".to_string(), attr(CPU_BRAND)?),
		("OS".to_string(), attr(OS_VERSION)?),
		("Page Size (MB)".to_string(), attr(PAGE_SIZE)?),
		("Memory (GB)".to_string(), attr(TOTAL_MEMORY)?),
		("Seconds Since Start".to_string(), attr(UPTIME)?),
	];

	Ok(FaultContext {
		stack_signature,
		attributes,
		log_text,
	})
}

/// Walk the document once, collecting text at `Section/Field` paths under
/// the root element.
fn collect_fields(document: &str) -> Result<HashMap<String, String>> {
	let mut reader = Reader::from_str(document);
	let mut path: Vec<String> = Vec::new();
	let mut fields: HashMap<String, String> = HashMap::new();

	loop {
		match reader.read_event()? {
			Event::Start(e) => {
				path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
			}
			Event::Empty(e) => {
				// Self-closing leaf: present but empty.
				if path.len() == 2 && path[0] == ROOT {
					let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
					let key = format!("{}/{}", path[1], name);
					fields.entry(key).or_default();
				}
			}
			Event::Text(e) => {
				if path.len() == 3 && path[0] == ROOT {
					let text = e.unescape().map_err(quick_xml::Error::from)?;
					let key = format!("{}/{}", path[1], path[2]);
					fields.entry(key).or_default().push_str(&text);
				}
			}
			Event::CData(e) => {
				if path.len() == 3 && path[0] == ROOT {
					let key = format!("{}/{}", path[1], path[2]);
					fields
						.entry(key)
						.or_default()
						.push_str(&String::from_utf8_lossy(&e));
				}
			}
			Event::End(_) => {
				path.pop();
			}
			Event::Eof => break,
			_ => {}
		}
	}

	Ok(fields)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_document() -> String {
		r#"<?xml version="1.0" encoding="UTF-8"?>
<FGenericCrashContext>
	<RuntimeProperties>
		<CallStack>engine!boot() [core.cpp:10]
engine!tick() [core.cpp:55]</CallStack>
		<Misc.PrimaryGPUBrand>NVIDIA GeForce RTX 3080</Misc.PrimaryGPUBrand>
		<Misc.CPUBrand>AMD Ryzen 9 5950X</Misc.CPUBrand>
		<Misc.OSVersionMajor>Windows 10</Misc.OSVersionMajor>
		<MemoryStats.PageSize>4096</MemoryStats.PageSize>
		<MemoryStats.TotalPhysicalGB>32</MemoryStats.TotalPhysicalGB>
		<SecondsSinceStart>811</SecondsSinceStart>
	</RuntimeProperties>
	<EngineData>
		<RHI.UserDriverVersion>531.29</RHI.UserDriverVersion>
		<RHI.DriverDate>3-14-2023</RHI.DriverDate>
	</EngineData>
</FGenericCrashContext>"#
			.to_string()
	}

	fn files_with(document: Option<String>) -> HashMap<String, String> {
		let mut files = HashMap::new();
		if let Some(doc) = document {
			files.insert(CONTEXT_FILE_NAME.to_string(), doc);
		}
		files
	}

	#[test]
	fn absent_document_yields_empty_context() {
		let context = extract_context(&files_with(None), "Client.log").unwrap();
		assert_eq!(context.stack_signature, "");
		assert!(context.attributes.is_empty());
		assert!(context.log_text.is_none());
	}

	#[test]
	fn absent_document_still_carries_log() {
		let mut files = files_with(None);
		files.insert("Client.log".to_string(), "last lines".to_string());
		let context = extract_context(&files, "Client.log").unwrap();
		assert_eq!(context.stack_signature, "");
		assert_eq!(context.log_text.as_deref(), Some("last lines"));
	}

	#[test]
	fn extracts_stack_and_attributes() {
		let context = extract_context(&files_with(Some(sample_document())), "Client.log").unwrap();
		assert!(context.stack_signature.starts_with("engine!boot()"));
		assert!(context.stack_signature.contains("engine!tick()"));

		let labels: Vec<&str> = context.attributes.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(
			labels,
			vec![
				"GPU",
				"GPU Driver",
				"GPU Driver Date",
				"CPU",
				"OS",
				"Page Size (MB)",
				"Memory (GB)",
				"Seconds Since Start",
			]
		);
		assert_eq!(context.attributes[0].1, "NVIDIA GeForce RTX 3080");
		assert_eq!(context.attributes[4].1, "Windows 10");
		assert_eq!(context.attributes[7].1, "811");
	}

	#[test]
	fn stack_text_passes_through_raw() {
		let document = sample_document().replace(
			"<CallStack>engine!boot() [core.cpp:10]",
			"<CallStack>\n  engine!boot() [core.cpp:10]",
		);
		let context = extract_context(&files_with(Some(document)), "Client.log").unwrap();
		assert!(context.stack_signature.starts_with("\n  engine!boot()"));
	}

	#[test]
	fn attribute_values_are_trimmed() {
		let document = sample_document().replace(
			"<Misc.CPUBrand>AMD Ryzen 9 5950X</Misc.CPUBrand>",
			"<Misc.CPUBrand>  AMD Ryzen 9 5950X  </Misc.CPUBrand>",
		);
		let context = extract_context(&files_with(Some(document)), "Client.log").unwrap();
		assert_eq!(context.attributes[3].1, "AMD Ryzen 9 5950X");
	}

	#[test]
	fn invalid_xml_is_rejected() {
		let files = files_with(Some("<FGenericCrashContext><broken".to_string()));
		let result = extract_context(&files, "Client.log");
		assert!(matches!(result, Err(DumpError::MetadataXml(_))));
	}

	#[test]
	fn missing_required_field_is_rejected() {
		let document = sample_document().replace(
			"<Misc.CPUBrand>AMD Ryzen 9 5950X</Misc.CPUBrand>",
			"",
		);
		let result = extract_context(&files_with(Some(document)), "Client.log");
		assert!(matches!(
			result,
			Err(DumpError::MetadataField(
				"RuntimeProperties/Misc.CPUBrand"
			))
		));
	}

	#[test]
	fn self_closing_field_counts_as_present_and_empty() {
		let document = sample_document().replace(
			"<RHI.DriverDate>3-14-2023</RHI.DriverDate>",
			"<RHI.DriverDate/>",
		);
		let context = extract_context(&files_with(Some(document)), "Client.log").unwrap();
		assert_eq!(context.attributes[2], ("GPU Driver Date".to_string(), String::new()));
	}

	#[test]
	fn escaped_text_is_unescaped() {
		let document = sample_document().replace(
			"AMD Ryzen 9 5950X",
			"AMD &amp; Friends &lt;Turbo&gt;",
		);
		let context = extract_context(&files_with(Some(document)), "Client.log").unwrap();
		assert_eq!(context.attributes[3].1, "AMD & Friends <Turbo>");
	}

	#[test]
	fn truncate_signature_short_input_unchanged() {
		assert_eq!(truncate_signature("abc"), "abc");
	}

	#[test]
	fn truncate_signature_counts_characters() {
		let long = "A".repeat(2000);
		let truncated = truncate_signature(&long);
		assert_eq!(truncated.len(), SIGNATURE_MAX_CHARS);
		assert!(truncated.chars().all(|c| c == 'A'));
	}

	#[test]
	fn truncate_signature_is_multibyte_safe() {
		let long = "é".repeat(2000);
		let truncated = truncate_signature(&long);
		assert_eq!(truncated.chars().count(), SIGNATURE_MAX_CHARS);
	}

	#[test]
	fn truncate_signature_at_exact_boundary() {
		let exact = "B".repeat(SIGNATURE_MAX_CHARS);
		assert_eq!(truncate_signature(&exact), exact.as_str());
	}
}
