//! Per-type grouping of catalog entries and hash lines.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Everything collected for one normalized type during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeBucket {
    /// Original catalog items keyed by entry key, in catalog order.
    pub entries: Map<String, Value>,
    /// `"<md5> <mod-id>"` lines, in catalog order.
    pub hash_lines: Vec<String>,
}

impl TypeBucket {
    /// Hash listing file contents: lines joined by `\n`, no trailing newline.
    pub fn hash_listing(&self) -> String {
        self.hash_lines.join("\n")
    }
}

/// Buckets keyed by singular type name. Rebuilt from scratch every run.
#[derive(Debug, Default)]
pub struct TypeBuckets {
    buckets: BTreeMap<String, TypeBucket>,
}

impl TypeBuckets {
    /// Record a catalog entry under its type, creating the bucket on first use.
    pub fn add_entry(&mut self, type_name: &str, key: &str, item: &Value) {
        self.bucket_mut(type_name)
            .entries
            .insert(key.to_string(), item.clone());
    }

    /// Record a hash line for a mod under its type.
    pub fn add_hash(&mut self, type_name: &str, md5: &str, mod_id: &str) {
        self.bucket_mut(type_name)
            .hash_lines
            .push(format!("{md5} {mod_id}"));
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeBucket> {
        self.buckets.get(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeBucket)> {
        self.buckets.iter().map(|(name, bucket)| (name.as_str(), bucket))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn bucket_mut(&mut self, type_name: &str) -> &mut TypeBucket {
        self.buckets.entry(type_name.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut buckets = TypeBuckets::default();
        buckets.add_entry("player", "zeta", &json!({ "n": 1 }));
        buckets.add_entry("player", "alpha", &json!({ "n": 2 }));

        let bucket = buckets.get("player").unwrap();
        let keys: Vec<&str> = bucket.entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_hash_listing() {
        let mut buckets = TypeBuckets::default();
        buckets.add_entry("skin", "k1", &json!({}));
        buckets.add_hash("skin", "abc", "s1");
        buckets.add_hash("skin", "def", "s2");

        assert_eq!(buckets.get("skin").unwrap().hash_listing(), "abc s1\ndef s2");
    }

    #[test]
    fn test_bucket_without_hashes() {
        let mut buckets = TypeBuckets::default();
        buckets.add_entry("card", "k1", &json!({}));

        let bucket = buckets.get("card").unwrap();
        assert_eq!(bucket.entries.len(), 1);
        assert_eq!(bucket.hash_listing(), "");
    }

    #[test]
    fn test_types_are_separate() {
        let mut buckets = TypeBuckets::default();
        buckets.add_entry("player", "k1", &json!({}));
        buckets.add_entry("skin", "k2", &json!({}));

        assert_eq!(buckets.len(), 2);
        assert!(buckets.get("player").unwrap().entries.contains_key("k1"));
        assert!(!buckets.get("player").unwrap().entries.contains_key("k2"));
    }
}
