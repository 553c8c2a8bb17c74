//! Cache hit/miss policy.

use crate::cache::{CacheRecord, StatusCache};
use serde_json::Value;

/// Outcome of checking an entry against the status cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision<'c> {
    /// The cached record is still current; reuse its hash.
    Hit(&'c CacheRecord),
    /// No record, or the remote timestamp changed; the archive must be fetched.
    Miss,
}

/// Decide whether the cached record for `attachment_id` is still valid.
///
/// Timestamps are compared for equality only. Any difference, including a
/// remote timestamp older than the cached one, is a miss. A blank record
/// (no hash, no timestamp) counts as absent.
pub fn decide<'c>(
    cache: &'c StatusCache,
    attachment_id: &str,
    remote_timestamp: &Value,
) -> Decision<'c> {
    match cache.get(attachment_id) {
        Some(record) if !record.is_blank() && &record.timestamp == remote_timestamp => {
            Decision::Hit(record)
        }
        _ => Decision::Miss,
    }
}
