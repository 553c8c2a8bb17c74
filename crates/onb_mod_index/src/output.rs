//! Writing run artifacts to disk.
//!
//! Every file is a total overwrite; nothing is merged with previous output.

use crate::buckets::{TypeBucket, TypeBuckets};
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};

/// Path of the per-type catalog (`<type>.json`).
pub fn catalog_path(output_dir: &Utf8Path, type_name: &str) -> Utf8PathBuf {
    output_dir.join(format!("{type_name}.json"))
}

/// Path of the per-type hash listing (`<type>_hash.txt`).
pub fn hash_listing_path(output_dir: &Utf8Path, type_name: &str) -> Utf8PathBuf {
    output_dir.join(format!("{type_name}_hash.txt"))
}

/// Write both files for one bucket, returning the written paths.
pub fn write_bucket(
    output_dir: &Utf8Path,
    type_name: &str,
    bucket: &TypeBucket,
) -> Result<[Utf8PathBuf; 2]> {
    let json_path = catalog_path(output_dir, type_name);
    let contents = serde_json::to_string_pretty(&bucket.entries)?;
    std::fs::write(json_path.as_std_path(), contents)?;
    tracing::info!("Saved {}", json_path);

    let hash_path = hash_listing_path(output_dir, type_name);
    std::fs::write(hash_path.as_std_path(), bucket.hash_listing())?;
    tracing::info!("Saved {}", hash_path);

    Ok([json_path, hash_path])
}

/// Write the catalog and hash listing of every bucket into `output_dir`.
pub fn write_buckets(output_dir: &Utf8Path, buckets: &TypeBuckets) -> Result<Vec<Utf8PathBuf>> {
    std::fs::create_dir_all(output_dir.as_std_path())?;

    let mut written = Vec::with_capacity(buckets.len() * 2);
    for (type_name, bucket) in buckets.iter() {
        written.extend(write_bucket(output_dir, type_name, bucket)?);
    }
    Ok(written)
}
