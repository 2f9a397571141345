//! gridwatch Core Library
//!
//! Read-only access to a data-grid cluster through the JMX-over-HTTP
//! management bridge each node exposes. This crate provides:
//! - Management-object query construction (`query`)
//! - Per-host HTTP session reuse (`session`)
//! - Response envelope validation (`client`)
//! - Cluster metric aggregators: member count, regions, bucket snapshots,
//!   async event queue depth (`cluster`)
//! - Common error handling

pub mod client;
pub mod cluster;
pub mod error;
pub mod query;
pub mod session;

pub use client::{BridgeClient, BridgeResponse};
pub use cluster::{BucketKey, BucketSnapshot};
pub use error::{ErrorKind, GridError, Result};
pub use query::{escape_region_name, Mode, QueryOptions, QueryTarget, UnknownMode};
pub use session::{Session, SessionCache};

/// Port the management bridge listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 8778;

/// Context path under which the bridge serves its read/exec/list/search endpoints
pub const DEFAULT_CONTEXT: &str = "bridge";
