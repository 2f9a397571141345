//! Management-object queries
//!
//! A query names a host, a port, a bridge mode and an object path such as
//! `GemFire:service=System,type=Distributed/MemberCount,LocatorCount`.
//! The object path is passed to the bridge verbatim; callers escape
//! path-significant characters themselves (see [`escape_region_name`]).

use crate::DEFAULT_PORT;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bridge operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Read attributes (the only mode the aggregators use)
    #[default]
    Read,
    /// Invoke an operation
    Exec,
    /// List available management objects
    List,
    /// Search object names by pattern
    Search,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Read, Mode::Exec, Mode::List, Mode::Search];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Read => "read",
            Mode::Exec => "exec",
            Mode::List => "list",
            Mode::Search => "search",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string is not one of read/exec/list/search
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown bridge mode: {0} (expected read, exec, list or search)")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// Per-call query options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Bridge port (default 8778)
    pub port: u16,
    /// Bridge mode (default read)
    pub mode: Mode,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: Mode::Read,
        }
    }
}

impl QueryOptions {
    /// Read-mode options against the given port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

/// A fully-specified management object to query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub host: String,
    pub port: u16,
    pub mode: Mode,
    pub object_path: String,
}

impl QueryTarget {
    pub fn new(host: &str, object_path: &str, options: &QueryOptions) -> Self {
        Self {
            host: host.to_string(),
            port: options.port,
            mode: options.mode,
            object_path: object_path.to_string(),
        }
    }

    /// Build the request URL: `http://{host}:{port}/{context}/{mode}/{object_path}`
    pub fn url(&self, context: &str) -> String {
        format!(
            "http://{}:{}/{}/{}/{}",
            self.host, self.port, context, self.mode, self.object_path
        )
    }
}

/// Escape a region path for embedding in a wildcard object name.
///
/// The bridge treats `/` as the separator between object name and
/// attribute list, so every `/` in a region path becomes `!/`.
pub fn escape_region_name(region: &str) -> String {
    region.replace('/', "!/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.port, 8778);
        assert_eq!(options.mode, Mode::Read);
    }

    #[test]
    fn test_url_construction() {
        let target = QueryTarget::new(
            "node1",
            "GemFire:service=System,type=Distributed/MemberCount,LocatorCount",
            &QueryOptions::default(),
        );
        assert_eq!(
            target.url("bridge"),
            "http://node1:8778/bridge/read/GemFire:service=System,type=Distributed/MemberCount,LocatorCount"
        );
    }

    #[test]
    fn test_url_with_port_and_mode() {
        let options = QueryOptions::with_port(9999).mode(Mode::Search);
        let target = QueryTarget::new("10.0.0.5", "GemFire:*", &options);
        assert_eq!(target.url("bridge"), "http://10.0.0.5:9999/bridge/search/GemFire:*");
        assert_eq!(target.url("jolokia"), "http://10.0.0.5:9999/jolokia/search/GemFire:*");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("read".parse::<Mode>().unwrap(), Mode::Read);
        assert_eq!("EXEC".parse::<Mode>().unwrap(), Mode::Exec);
        assert_eq!("list".parse::<Mode>().unwrap(), Mode::List);
        assert_eq!("search".parse::<Mode>().unwrap(), Mode::Search);
        assert_eq!(
            "write".parse::<Mode>().unwrap_err(),
            UnknownMode("write".to_string())
        );
    }

    #[test]
    fn test_mode_display_roundtrips() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_escape_region_name() {
        assert_eq!(escape_region_name("/parent/child"), "!/parent!/child");
        assert_eq!(escape_region_name("/orders-2024"), "!/orders-2024");
        assert_eq!(escape_region_name("*"), "*");
        assert_eq!(escape_region_name(""), "");
    }
}
