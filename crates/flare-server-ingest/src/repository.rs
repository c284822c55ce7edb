// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layer for fault records.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;
use uuid::Uuid;

use flare_core::truncate_signature;

use crate::error::{IngestError, Result};

/// Fault record ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FaultRecordId(pub Uuid);

impl FaultRecordId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for FaultRecordId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for FaultRecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for FaultRecordId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// One distinct fault: a truncated stack signature plus occurrence state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FaultRecord {
	pub id: FaultRecordId,
	pub stack_signature: String,
	pub occurrence_count: u64,
	pub first_seen: DateTime<Utc>,
	pub last_seen: DateTime<Utc>,
	/// Notification-sink message id, set once after the first successful
	/// dispatch; absent if dispatch failed or has not happened yet.
	pub external_reference: Option<String>,
	pub resolved: bool,
}

/// Outcome of recording one occurrence of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
	pub record_id: FaultRecordId,
	pub first_occurrence: bool,
}

/// Repository trait for fault operations.
#[async_trait]
pub trait FaultRepository: Send + Sync {
	/// Atomic find-or-create for one signature occurrence.
	///
	/// The signature is truncated to the dedup key length before lookup.
	/// An existing record gets its count incremented and `last_seen`
	/// refreshed; otherwise a new record is inserted with count 1. Both
	/// happen inside one transaction so concurrent ingestions of the same
	/// signature cannot create two records.
	async fn record_occurrence(&self, signature: &str) -> Result<Occurrence>;

	/// Best-effort attachment of the notification sink's reference.
	async fn attach_external_reference(
		&self,
		id: FaultRecordId,
		reference: &str,
	) -> Result<()>;

	async fn get_fault(&self, id: FaultRecordId) -> Result<Option<FaultRecord>>;
	async fn get_fault_by_signature(&self, signature: &str) -> Result<Option<FaultRecord>>;
	async fn list_faults(&self, limit: u32) -> Result<Vec<FaultRecord>>;

	/// Sum of all occurrence counters across fault records.
	async fn total_occurrences(&self) -> Result<u64>;

	/// Flip the resolved flag; returns false when the record is unknown.
	async fn set_resolved(&self, id: FaultRecordId, resolved: bool) -> Result<bool>;
}

/// SQLite implementation of the fault repository.
#[derive(Clone)]
pub struct SqliteFaultRepository {
	pool: SqlitePool,
}

impl SqliteFaultRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl FaultRepository for SqliteFaultRepository {
	#[instrument(skip(self, signature))]
	async fn record_occurrence(&self, signature: &str) -> Result<Occurrence> {
		let key = truncate_signature(signature);
		let now = Utc::now().to_rfc3339();

		let mut tx = self.pool.begin().await?;

		let existing = sqlx::query_as::<_, (String, i64)>(
			r#"
			SELECT id, count FROM faults WHERE stack = ?
			"#,
		)
		.bind(key)
		.fetch_optional(&mut *tx)
		.await?;

		let occurrence = match existing {
			Some((id, count)) => {
				sqlx::query(
					r#"
					UPDATE faults SET count = ?, last_seen = ? WHERE id = ?
					"#,
				)
				.bind(count + 1)
				.bind(&now)
				.bind(&id)
				.execute(&mut *tx)
				.await?;

				Occurrence {
					record_id: FaultRecordId(id.parse()?),
					first_occurrence: false,
				}
			}
			None => {
				let id = FaultRecordId::new();
				sqlx::query(
					r#"
					INSERT INTO faults (id, stack, count, first_seen, last_seen)
					VALUES (?, ?, 1, ?, ?)
					"#,
				)
				.bind(id.to_string())
				.bind(key)
				.bind(&now)
				.bind(&now)
				.execute(&mut *tx)
				.await?;

				Occurrence {
					record_id: id,
					first_occurrence: true,
				}
			}
		};

		tx.commit().await?;
		Ok(occurrence)
	}

	#[instrument(skip(self, reference), fields(record_id = %id))]
	async fn attach_external_reference(
		&self,
		id: FaultRecordId,
		reference: &str,
	) -> Result<()> {
		sqlx::query(
			r#"
			UPDATE faults SET external_ref = ? WHERE id = ?
			"#,
		)
		.bind(reference)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self), fields(record_id = %id))]
	async fn get_fault(&self, id: FaultRecordId) -> Result<Option<FaultRecord>> {
		let row = sqlx::query_as::<_, FaultRow>(
			r#"
			SELECT id, stack, count, first_seen, last_seen, external_ref, resolved
			FROM faults
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self, signature))]
	async fn get_fault_by_signature(&self, signature: &str) -> Result<Option<FaultRecord>> {
		let row = sqlx::query_as::<_, FaultRow>(
			r#"
			SELECT id, stack, count, first_seen, last_seen, external_ref, resolved
			FROM faults
			WHERE stack = ?
			"#,
		)
		.bind(truncate_signature(signature))
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self))]
	async fn list_faults(&self, limit: u32) -> Result<Vec<FaultRecord>> {
		let rows = sqlx::query_as::<_, FaultRow>(
			r#"
			SELECT id, stack, count, first_seen, last_seen, external_ref, resolved
			FROM faults
			ORDER BY last_seen DESC
			LIMIT ?
			"#,
		)
		.bind(limit as i32)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self))]
	async fn total_occurrences(&self) -> Result<u64> {
		let total = sqlx::query_scalar::<_, i64>(
			r#"
			SELECT COALESCE(SUM(count), 0) FROM faults
			"#,
		)
		.fetch_one(&self.pool)
		.await?;

		Ok(total as u64)
	}

	#[instrument(skip(self), fields(record_id = %id))]
	async fn set_resolved(&self, id: FaultRecordId, resolved: bool) -> Result<bool> {
		let result = sqlx::query(
			r#"
			UPDATE faults SET resolved = ? WHERE id = ?
			"#,
		)
		.bind(resolved as i32)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}
}

// ============================================================================
// Row types for SQLite
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct FaultRow {
	id: String,
	stack: String,
	count: i64,
	first_seen: String,
	last_seen: String,
	external_ref: Option<String>,
	resolved: i32,
}

impl TryFrom<FaultRow> for FaultRecord {
	type Error = IngestError;

	fn try_from(row: FaultRow) -> Result<Self> {
		Ok(FaultRecord {
			id: FaultRecordId(row.id.parse()?),
			stack_signature: row.stack,
			occurrence_count: row.count as u64,
			first_seen: parse_datetime(&row.first_seen)?,
			last_seen: parse_datetime(&row.last_seen)?,
			external_reference: row.external_ref,
			resolved: row.resolved != 0,
		})
	}
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(s)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| IngestError::InvalidDateTime(s.to_string()))
}
