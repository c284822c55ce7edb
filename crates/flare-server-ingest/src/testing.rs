// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test helpers shared by this crate's tests and the server crate.

use sqlx::sqlite::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
	let pool = SqlitePool::connect(":memory:").await.unwrap();
	create_faults_table(&pool).await;
	pool
}

pub async fn create_faults_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS faults (
			id TEXT PRIMARY KEY,
			stack TEXT NOT NULL UNIQUE,
			count INTEGER NOT NULL DEFAULT 1,
			first_seen TEXT NOT NULL,
			last_seen TEXT NOT NULL,
			external_ref TEXT UNIQUE,
			resolved INTEGER NOT NULL DEFAULT 0
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}
