//! The indexing pass.
//!
//! [`ModIndexer::run`] walks the catalog once, in order:
//!
//! 1. Fetch the catalog (fatal on failure) and load the status cache.
//! 2. For each entry, skip it if it has no mod or attachment ID or its type
//!    would not make a plain file name, otherwise bucket it under its singular
//!    type.
//! 3. Reuse the cached hash if the remote timestamp is unchanged; otherwise
//!    download and hash the archive. A failed download only drops that entry's
//!    hash line for this run, the cache keeps whatever it had.
//! 4. Write the cache (only if something changed) and every bucket.

use crate::buckets::TypeBuckets;
use crate::cache::{CacheRecord, StatusCache};
use crate::catalog::ModEntry;
use crate::decider::{decide, Decision};
use crate::error::{Error, Result};
use crate::hasher::ArchiveHasher;
use crate::output;
use crate::source::ModSource;
use camino::Utf8PathBuf;

/// Default name of the status cache file.
pub const DEFAULT_CACHE_FILE: &str = "status_cache.json";

/// Where a run reads and writes its files.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Status cache location.
    pub cache_file: Utf8PathBuf,
    /// Directory receiving `<type>.json` and `<type>_hash.txt`.
    pub output_dir: Utf8PathBuf,
    /// Directory for temporary archives; system temp directory when `None`.
    pub work_dir: Option<Utf8PathBuf>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            cache_file: Utf8PathBuf::from(DEFAULT_CACHE_FILE),
            output_dir: Utf8PathBuf::from("."),
            work_dir: None,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Entries in the remote catalog.
    pub total_entries: usize,
    /// Entries dropped for missing IDs or an unusable type.
    pub skipped_entries: usize,
    /// Entries whose cached hash was reused.
    pub cache_hits: usize,
    /// Archives downloaded and hashed.
    pub downloaded: usize,
    /// Archives that could not be downloaded or hashed.
    pub failed_downloads: usize,
    /// Whether the status cache file was rewritten.
    pub cache_written: bool,
    /// Per-type files written, in write order.
    pub files_written: Vec<Utf8PathBuf>,
}

/// State threaded through a single pass over the catalog.
struct RunContext {
    cache: StatusCache,
    buckets: TypeBuckets,
    report: IndexReport,
}

/// Drives one indexing run against a [`ModSource`].
pub struct ModIndexer<S> {
    source: S,
    options: IndexOptions,
    hasher: ArchiveHasher,
}

impl<S: ModSource> ModIndexer<S> {
    pub fn new(source: S, options: IndexOptions) -> Self {
        let hasher = ArchiveHasher::new(options.work_dir.clone());
        Self {
            source,
            options,
            hasher,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Run the full pipeline.
    ///
    /// Fails without writing anything if the catalog cannot be fetched or the
    /// cache file cannot be read. Per-entry problems are logged and skipped.
    pub fn run(&self) -> Result<IndexReport> {
        let catalog = self.source.fetch_catalog()?;
        tracing::info!("Fetched {} catalog entries", catalog.len());

        let cache = StatusCache::load(&self.options.cache_file)?;
        tracing::debug!("Loaded {} cached records", cache.len());

        let mut ctx = RunContext {
            cache,
            buckets: TypeBuckets::default(),
            report: IndexReport {
                total_entries: catalog.len(),
                ..IndexReport::default()
            },
        };

        for (key, item) in &catalog {
            match ModEntry::parse(key, item) {
                Ok(entry) => self.index_entry(&mut ctx, &entry),
                Err(reason) => {
                    tracing::warn!("Skipping entry {}: {}", key, reason);
                    ctx.report.skipped_entries += 1;
                }
            }
        }

        self.write_outputs(ctx)
    }

    fn index_entry(&self, ctx: &mut RunContext, entry: &ModEntry<'_>) {
        let type_name = entry.singular_type();
        ctx.buckets.add_entry(type_name, entry.key, entry.item);

        let hash = match decide(&ctx.cache, &entry.attachment_id, entry.timestamp) {
            Decision::Hit(record) => {
                tracing::debug!("Cache hit for {} ({})", entry.mod_id, entry.attachment_id);
                ctx.report.cache_hits += 1;
                record.hash().map(str::to_string)
            }
            Decision::Miss => {
                tracing::info!(
                    "Processing new/updated mod: {} (type: {})",
                    entry.mod_id,
                    entry.mod_type
                );
                match self.refresh_entry(&mut ctx.cache, entry) {
                    Ok(md5) => {
                        ctx.report.downloaded += 1;
                        Some(md5)
                    }
                    Err(Error::DownloadRejected { url, status }) => {
                        tracing::warn!("Failed to download {} (status: {})", url, status);
                        ctx.report.failed_downloads += 1;
                        None
                    }
                    Err(e) => {
                        tracing::warn!("Error processing {}: {}", entry.mod_id, e);
                        ctx.report.failed_downloads += 1;
                        None
                    }
                }
            }
        };

        if let Some(md5) = hash {
            ctx.buckets.add_hash(type_name, &md5, &entry.mod_id);
        }
    }

    /// Download and hash an entry's archive, recording the result in the cache.
    ///
    /// The cache is only touched once the hash is known.
    fn refresh_entry(&self, cache: &mut StatusCache, entry: &ModEntry<'_>) -> Result<String> {
        let md5 = self.hasher.fetch_and_hash(&self.source, &entry.attachment_id)?;
        tracing::info!("MD5 of {}: {}", entry.mod_id, md5);

        cache.update(
            entry.attachment_id.clone(),
            CacheRecord {
                timestamp: entry.timestamp.clone(),
                md5: md5.clone(),
                id: entry.mod_id_value.clone(),
            },
        );
        Ok(md5)
    }

    fn write_outputs(&self, ctx: RunContext) -> Result<IndexReport> {
        let RunContext {
            cache,
            buckets,
            mut report,
        } = ctx;

        if cache.is_dirty() {
            tracing::info!("Updating status cache file {}", self.options.cache_file);
            cache.save(&self.options.cache_file)?;
            report.cache_written = true;
        } else {
            tracing::info!("No new downloads required");
        }

        report.files_written = output::write_buckets(&self.options.output_dir, &buckets)?;
        Ok(report)
    }
}
