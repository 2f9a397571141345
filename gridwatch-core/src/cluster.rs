//! Cluster metric aggregators
//!
//! Read-only views of cluster state built on single bridge queries:
//! - member count (locators excluded)
//! - region full paths
//! - per-member, per-region bucket counts
//! - async event queue depth
//!
//! Wildcard queries return `value` as an object mapping each matched
//! object name to its attribute map. The aggregators walk that object in
//! the order the bridge sent it.

use crate::client::BridgeClient;
use crate::error::{GridError, Result};
use crate::query::{escape_region_name, Mode, QueryOptions};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument};

/// Distributed-system object exposing member and locator counts
pub const MEMBER_COUNT_OBJECT: &str =
    "GemFire:service=System,type=Distributed/MemberCount,LocatorCount";

/// Every distributed region, full path attribute only
pub const REGION_PATHS_OBJECT: &str = "GemFire:type=Distributed,service=Region,*/FullPath";

/// Per-member region objects for `region` (wildcard `*` selects all regions)
pub fn member_regions_object(region: &str) -> String {
    format!(
        "GemFire:service=Region,type=Member,name={},member=*/Member,FullPath,BucketCount",
        escape_region_name(region)
    )
}

/// Per-member objects for the async event queue `queue`
pub fn queue_size_object(queue: &str) -> String {
    format!(
        "GemFire:service=AsyncEventQueue,queue={},type=Member,member=*/EventQueueSize",
        queue
    )
}

// =============================================================================
// BUCKET SNAPSHOTS
// =============================================================================

/// Identifies one member's share of one region
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub member: String,
    pub region: String,
}

impl BucketKey {
    pub fn new(member: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            region: region.into(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.member, self.region)
    }
}

/// Bucket counts per member and region at one instant
#[derive(Debug, Clone)]
pub struct BucketSnapshot {
    counts: HashMap<BucketKey, u64>,
    taken_at: Instant,
}

impl BucketSnapshot {
    /// Snapshot stamped with the current instant
    pub fn new(counts: HashMap<BucketKey, u64>) -> Self {
        Self::at(counts, Instant::now())
    }

    pub fn at(counts: HashMap<BucketKey, u64>, taken_at: Instant) -> Self {
        Self { counts, taken_at }
    }

    pub fn get(&self, key: &BucketKey) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, u64)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn taken_at(&self) -> Instant {
        self.taken_at
    }

    /// Sum of bucket counts across every member and region, saturating at `u64::MAX`
    pub fn total_buckets(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |total, count| total.saturating_add(*count))
    }
}

impl FromIterator<(BucketKey, u64)> for BucketSnapshot {
    fn from_iter<I: IntoIterator<Item = (BucketKey, u64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// =============================================================================
// AGGREGATORS
// =============================================================================

impl BridgeClient {
    /// Number of data-holding members: `MemberCount - LocatorCount`
    #[instrument(skip(self))]
    pub async fn member_count(&self, host: &str, port: u16) -> Result<i64> {
        let value = self.read_value(host, MEMBER_COUNT_OBJECT, port).await?;
        let members = parse_member_count(&value)?;
        debug!(members, "Member count");
        Ok(members)
    }

    /// Full paths of every region, in the order the bridge listed them
    #[instrument(skip(self))]
    pub async fn list_regions(&self, host: &str, port: u16) -> Result<Vec<String>> {
        let value = self.read_value(host, REGION_PATHS_OBJECT, port).await?;
        let regions = parse_region_paths(&value)?;
        debug!(count = regions.len(), "Listed regions");
        Ok(regions)
    }

    /// Bucket counts for every member hosting `region`
    #[instrument(skip(self))]
    pub async fn snapshot_buckets(
        &self,
        host: &str,
        port: u16,
        region: &str,
    ) -> Result<BucketSnapshot> {
        let object = member_regions_object(region);
        let value = self.read_value(host, &object, port).await?;
        let snapshot: BucketSnapshot = parse_bucket_counts(&value)?.into_iter().collect();
        debug!(
            entries = snapshot.len(),
            buckets = snapshot.total_buckets(),
            "Took bucket snapshot"
        );
        Ok(snapshot)
    }

    /// Outstanding events in `queue`, summed across all members
    #[instrument(skip(self))]
    pub async fn queue_depth(&self, host: &str, port: u16, queue: &str) -> Result<u64> {
        let value = self.read_value(host, &queue_size_object(queue), port).await?;
        let depth = parse_queue_depth(&value)?;
        debug!(depth, "Async event queue depth");
        Ok(depth)
    }

    /// Arbitrary query in any mode, returning the untouched `value`
    pub async fn raw(&self, host: &str, port: u16, mode: Mode, object_path: &str) -> Result<Value> {
        let options = QueryOptions::with_port(port).mode(mode);
        Ok(self.query(host, object_path, &options).await?.into_value())
    }
}

// =============================================================================
// VALUE PARSING
// =============================================================================

pub fn parse_member_count(value: &Value) -> Result<i64> {
    let attributes = as_object(MEMBER_COUNT_OBJECT, "value", value)?;
    let members = int_attribute(MEMBER_COUNT_OBJECT, attributes, "MemberCount")?;
    let locators = int_attribute(MEMBER_COUNT_OBJECT, attributes, "LocatorCount")?;
    members
        .checked_sub(locators)
        .ok_or_else(|| GridError::malformed(MEMBER_COUNT_OBJECT, "MemberCount", "overflow"))
}

pub fn parse_region_paths(value: &Value) -> Result<Vec<String>> {
    entries(REGION_PATHS_OBJECT, value)?
        .map(|(object, attributes)| str_attribute(object, attributes, "FullPath"))
        .collect()
}

pub fn parse_bucket_counts(value: &Value) -> Result<Vec<(BucketKey, u64)>> {
    entries("member regions", value)?
        .map(|(object, attributes)| {
            let member = str_attribute(object, attributes, "Member")?;
            let region = str_attribute(object, attributes, "FullPath")?;
            let buckets = count_attribute(object, attributes, "BucketCount")?;
            Ok((BucketKey::new(member, region), buckets))
        })
        .collect()
}

pub fn parse_queue_depth(value: &Value) -> Result<u64> {
    entries("async event queues", value)?.try_fold(0u64, |depth, (object, attributes)| {
        let size = count_attribute(object, attributes, "EventQueueSize")?;
        depth
            .checked_add(size)
            .ok_or_else(|| GridError::malformed(object, "EventQueueSize", "overflow"))
    })
}

fn as_object<'a>(object: &str, attribute: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| GridError::malformed(object, attribute, "expected a JSON object"))
}

/// (object name, attribute map) pairs of a wildcard query result
fn entries<'a>(
    what: &str,
    value: &'a Value,
) -> Result<impl Iterator<Item = (&'a str, &'a Map<String, Value>)>> {
    let matched = as_object(what, "value", value)?;
    let mut pairs = Vec::with_capacity(matched.len());
    for (object, attributes) in matched {
        pairs.push((object.as_str(), as_object(object, "attributes", attributes)?));
    }
    Ok(pairs.into_iter())
}

fn str_attribute(object: &str, attributes: &Map<String, Value>, name: &str) -> Result<String> {
    match attributes.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(GridError::malformed(object, name, "expected a string")),
        None => Err(GridError::malformed(object, name, "attribute missing")),
    }
}

/// Integer attribute; numeric strings are accepted as well
fn int_attribute(object: &str, attributes: &Map<String, Value>, name: &str) -> Result<i64> {
    let parsed = match attributes.get(name) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
        None => return Err(GridError::malformed(object, name, "attribute missing")),
    };
    parsed.ok_or_else(|| GridError::malformed(object, name, "expected an integer"))
}

fn count_attribute(object: &str, attributes: &Map<String, Value>, name: &str) -> Result<u64> {
    let n = int_attribute(object, attributes, name)?;
    u64::try_from(n).map_err(|_| GridError::malformed(object, name, format!("negative count {n}")))
}
