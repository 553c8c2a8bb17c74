//! Archive download and content hashing.

use crate::error::Result;
use crate::source::ModSource;
use camino::Utf8PathBuf;
use md5::{Digest, Md5};
use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

const READ_CHUNK_SIZE: usize = 4096;

/// Downloads archives into scoped temporary files and hashes them.
///
/// The temporary file only lives for the duration of
/// [`fetch_and_hash`](Self::fetch_and_hash): it is deleted when that call
/// returns, whether it succeeded or not.
#[derive(Debug, Clone, Default)]
pub struct ArchiveHasher {
    work_dir: Option<Utf8PathBuf>,
}

impl ArchiveHasher {
    /// Create a hasher that stages archives in `work_dir`, or the system temp
    /// directory when `None`.
    pub fn new(work_dir: Option<Utf8PathBuf>) -> Self {
        Self { work_dir }
    }

    /// Download the archive for `attachment_id` and return its MD5 as lower-case hex.
    pub fn fetch_and_hash<S: ModSource + ?Sized>(
        &self,
        source: &S,
        attachment_id: &str,
    ) -> Result<String> {
        let mut archive = self.temp_archive(attachment_id)?;

        let size = source.download_archive(attachment_id, archive.as_file_mut())?;
        tracing::debug!(
            "Downloaded {} bytes for attachment {} to {}",
            size,
            attachment_id,
            archive.path().display()
        );

        let file = archive.as_file_mut();
        file.flush()?;
        file.seek(SeekFrom::Start(0))?;
        let digest = md5_hex(file)?;

        archive.close()?;
        Ok(digest)
    }

    fn temp_archive(&self, attachment_id: &str) -> io::Result<NamedTempFile> {
        let prefix = format!("{}-", file_name_safe(attachment_id));
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".zip");

        match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir.as_std_path())?;
                builder.tempfile_in(dir.as_std_path())
            }
            None => builder.tempfile(),
        }
    }
}

/// MD5 of everything `reader` yields, as lower-case hex.
///
/// Reads in fixed-size chunks; the digest does not depend on how the stream is
/// split.
pub fn md5_hex<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn file_name_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::Error;
    use camino::Utf8Path;
    use tempfile::TempDir;

    /// Serves a fixed body, or fails part-way through.
    struct FixedSource {
        body: Vec<u8>,
        fail_after_write: bool,
    }

    impl ModSource for FixedSource {
        fn fetch_catalog(&self) -> Result<Catalog> {
            Ok(Catalog::new())
        }

        fn download_archive(&self, _attachment_id: &str, sink: &mut dyn Write) -> Result<u64> {
            sink.write_all(&self.body)?;
            if self.fail_after_write {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset").into());
            }
            Ok(self.body.len() as u64)
        }
    }

    fn work_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().join("work")).unwrap()
    }

    fn dir_is_empty(dir: &Utf8Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_md5_known_vectors() {
        assert_eq!(
            md5_hex(&b""[..]).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            md5_hex(&b"The quick brown fox jumps over the lazy dog"[..]).unwrap(),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_md5_spans_chunks() {
        let data: Vec<u8> = (0..READ_CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let expected = hex::encode(Md5::digest(&data));
        assert_eq!(md5_hex(&data[..]).unwrap(), expected);
    }

    #[test]
    fn test_fetch_and_hash_cleans_up() {
        let temp = TempDir::new().unwrap();
        let dir = work_dir(&temp);
        let hasher = ArchiveHasher::new(Some(dir.clone()));
        let source = FixedSource {
            body: b"The quick brown fox jumps over the lazy dog".to_vec(),
            fail_after_write: false,
        };

        let digest = hasher.fetch_and_hash(&source, "a1").unwrap();
        assert_eq!(digest, "9e107d9d372bb6826bd81d3542a419d6");
        assert!(dir_is_empty(&dir));
    }

    #[test]
    fn test_fetch_and_hash_cleans_up_on_error() {
        let temp = TempDir::new().unwrap();
        let dir = work_dir(&temp);
        let hasher = ArchiveHasher::new(Some(dir.clone()));
        let source = FixedSource {
            body: vec![1, 2, 3],
            fail_after_write: true,
        };

        let result = hasher.fetch_and_hash(&source, "a1");
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(dir_is_empty(&dir));
    }

    #[test]
    fn test_file_name_safe() {
        assert_eq!(file_name_safe("1337"), "1337");
        assert_eq!(file_name_safe("../evil/id"), ".._evil_id");
    }
}
