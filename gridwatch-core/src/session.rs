//! Per-host HTTP sessions
//!
//! The first query to a host creates a session; every later query to
//! that host reuses it, so connection setup happens once per host for
//! the life of the cache. The cache is an ordinary value: construct one
//! per run and share it by reference.

use crate::error::{GridError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// An open HTTP connection context for one host
#[derive(Debug)]
pub struct Session {
    host: String,
    client: reqwest::Client,
    created_at: Instant,
}

impl Session {
    fn open(host: &str, request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|source| GridError::Session {
            host: host.to_string(),
            source,
        })?;

        Ok(Self {
            host: host.to_string(),
            client,
            created_at: Instant::now(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Host name -> session mapping
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    /// Applied to sessions created after it is set; `None` keeps the transport default
    request_timeout: Option<Duration>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose sessions time out requests after `timeout`
    pub fn with_request_timeout(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            request_timeout: Some(timeout),
        }
    }

    /// Get the session for `host`, creating it on first use
    pub fn get_session(&self, host: &str) -> Result<Arc<Session>> {
        if let Some(session) = self.sessions.read().get(host) {
            return Ok(Arc::clone(session));
        }

        let mut sessions = self.sessions.write();
        if let Some(session) = sessions.get(host) {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(Session::open(host, self.request_timeout)?);
        debug!(host = %host, timeout = ?self.request_timeout, "Created bridge session");
        sessions.insert(host.to_string(), Arc::clone(&session));

        Ok(session)
    }

    /// Number of hosts with an open session
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.sessions.read().contains_key(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_reused_per_host() {
        let cache = SessionCache::new();
        assert!(cache.is_empty());

        let first = cache.get_session("node1").unwrap();
        let second = cache.get_session("node1").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.host(), "node1");
    }

    #[test]
    fn test_distinct_sessions_per_host() {
        let cache = SessionCache::new();

        let a = cache.get_session("node1").unwrap();
        let b = cache.get_session("node2").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("node1"));
        assert!(cache.contains("node2"));
        assert!(!cache.contains("node3"));
    }

    #[test]
    fn test_timeout_cache_creates_sessions() {
        let cache = SessionCache::with_request_timeout(Duration::from_secs(2));
        let session = cache.get_session("locator").unwrap();
        assert!(session.created_at() <= Instant::now());
        assert_eq!(cache.len(), 1);
    }
}
