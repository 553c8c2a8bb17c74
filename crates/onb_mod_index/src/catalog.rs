//! Remote mod catalog model.
//!
//! The catalog is a JSON object mapping an opaque entry key to an item record:
//!
//! ```json
//! {
//!   "42": {
//!     "data": { "type": "players", "id": "com.example.megaman", "name": "..." },
//!     "attachment_data": { "attachment_id": 1337, "timestamp": 1700000000 }
//!   }
//! }
//! ```
//!
//! Item records are kept as raw [`serde_json::Value`]s so the per-type catalogs
//! can be written back out exactly as they were received. [`ModEntry`] only
//! borrows the handful of fields the indexer needs.

use camino::{Utf8Component, Utf8Path};
use serde_json::{Map, Value};

/// Catalog entries in the order the server returned them.
pub type Catalog = Map<String, Value>;

/// Type name used when an entry carries no usable `data.type`.
pub const UNKNOWN_TYPE: &str = "unknown";

/// The fields of a catalog entry that drive indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct ModEntry<'a> {
    pub key: &'a str,
    pub item: &'a Value,
    /// Pluralized category name as sent by the server (`"players"`).
    pub mod_type: &'a str,
    /// The mod identifier rendered as text, used in hash lines.
    pub mod_id: String,
    /// The mod identifier as it appears in the catalog, stored in the cache.
    pub mod_id_value: &'a Value,
    /// The attachment identifier rendered as text, used as cache key and in URLs.
    pub attachment_id: String,
    /// Opaque last-modified marker; `null` when absent.
    pub timestamp: &'a Value,
}

/// Why a catalog entry could not be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEntry {
    MissingModId,
    MissingAttachmentId,
    /// The type does not yield a plain file name for the output files.
    UnusableType,
}

impl std::fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidEntry::MissingModId => f.write_str("missing mod ID"),
            InvalidEntry::MissingAttachmentId => f.write_str("missing attachment ID"),
            InvalidEntry::UnusableType => f.write_str("type is not a plain file name"),
        }
    }
}

impl<'a> ModEntry<'a> {
    /// Extract the indexing fields from a catalog item.
    pub fn parse(key: &'a str, item: &'a Value) -> Result<Self, InvalidEntry> {
        let data = item.get("data");
        let attachment = item.get("attachment_data");

        let mod_type = data
            .and_then(|d| d.get("type"))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_TYPE);
        if !is_plain_file_stem(singular_type_name(mod_type)) {
            return Err(InvalidEntry::UnusableType);
        }

        let mod_id_value = data
            .and_then(|d| d.get("id"))
            .ok_or(InvalidEntry::MissingModId)?;
        let mod_id = identifier_text(mod_id_value).ok_or(InvalidEntry::MissingModId)?;

        let attachment_id = attachment
            .and_then(|a| a.get("attachment_id"))
            .and_then(identifier_text)
            .ok_or(InvalidEntry::MissingAttachmentId)?;

        let timestamp = attachment
            .and_then(|a| a.get("timestamp"))
            .unwrap_or(&Value::Null);

        Ok(Self {
            key,
            item,
            mod_type,
            mod_id,
            mod_id_value,
            attachment_id,
            timestamp,
        })
    }

    /// The bucket this entry belongs to.
    pub fn singular_type(&self) -> &'a str {
        singular_type_name(self.mod_type)
    }
}

/// Render an identifier as text.
///
/// Only non-empty strings and non-zero numbers qualify; `null`, `false`, `""`,
/// `0` and structured values are treated as missing.
fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a pluralized type name into the bucket name by dropping one trailing `s`.
///
/// `"players"` -> `"player"`, `"skins"` -> `"skin"`. Irregular plurals are not
/// handled and names that merely end in `s` lose it too (`"class"` -> `"clas"`);
/// downstream consumers rely on exactly this output.
pub fn singular_type_name(type_name: &str) -> &str {
    type_name.strip_suffix('s').unwrap_or(type_name)
}

/// Whether `name` is a single normal path component, usable as a file stem
/// inside the output directory.
fn is_plain_file_stem(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Utf8Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(stem)), None) if stem == name
    )
}
