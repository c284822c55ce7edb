// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, each with a resolved struct and a mergeable layer.

pub mod database;
pub mod http;
pub mod ingest;
pub mod logging;
pub mod notify;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use ingest::{IngestConfig, IngestConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use notify::{NotifyConfig, NotifyConfigLayer};
