//! Incremental indexer for the ONB mod catalog.
//!
//! Given the remote mod list, this crate produces the artifacts a publishing
//! pipeline needs to tell what changed since the previous run:
//!
//! - **Status cache** (`status_cache.json`): attachment ID -> last seen
//!   timestamp, archive MD5 and mod ID. Archives are only downloaded again when
//!   their timestamp changes.
//! - **Per-type catalogs** (`<type>.json`): the catalog split by singular type
//!   name (`players` -> `player.json`).
//! - **Per-type hash listings** (`<type>_hash.txt`): one `"<md5> <mod-id>"` line
//!   per mod with a known hash.
//!
//! # Example
//!
//! ```no_run
//! use onb_mod_index::{HttpModSource, IndexOptions, ModIndexer};
//! use onb_mod_index::source::{DEFAULT_CATALOG_URL, DEFAULT_DOWNLOAD_TEMPLATE};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpModSource::new(DEFAULT_CATALOG_URL, DEFAULT_DOWNLOAD_TEMPLATE, None)?;
//! let report = ModIndexer::new(source, IndexOptions::default()).run()?;
//! println!(
//!     "{} cache hits, {} downloads, {} failures",
//!     report.cache_hits, report.downloaded, report.failed_downloads
//! );
//! # Ok(())
//! # }
//! ```

pub mod buckets;
pub mod cache;
pub mod catalog;
pub mod decider;
pub mod error;
pub mod hasher;
pub mod indexer;
pub mod output;
pub mod source;


pub use buckets::{TypeBucket, TypeBuckets};
pub use cache::{CacheRecord, StatusCache};
pub use catalog::{singular_type_name, Catalog, ModEntry};
pub use error::{Error, Result};
pub use indexer::{IndexOptions, IndexReport, ModIndexer};
pub use source::{HttpModSource, ModSource};
