//! OpenSubtitles movie hash.
//!
//! The hash is the file size plus the wrapping 64-bit sum of the first and
//! last 64 KiB of the file read as little-endian words. Matching is done
//! server-side against hashes uploaded for known releases.

use crate::error::Result;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

const CHUNK_SIZE: u64 = 65536;

/// Compute the OpenSubtitles hash of a video file.
///
/// Returns `None` for files smaller than 128 KiB, which the protocol cannot
/// hash; anything that small is not a real video anyway.
pub fn movie_hash(path: &Path) -> Result<Option<String>> {
    let mut file = File::open(path)?;
    let filesize = file.metadata()?.len();

    if filesize < CHUNK_SIZE * 2 {
        debug!(
            "File too small to hash: {} bytes ({})",
            filesize,
            path.display()
        );
        return Ok(None);
    }

    let mut hash = filesize;
    hash = add_chunk(hash, &mut file)?;
    file.seek(SeekFrom::End(-(CHUNK_SIZE as i64)))?;
    hash = add_chunk(hash, &mut file)?;

    Ok(Some(format!("{:016x}", hash)))
}

fn add_chunk(mut hash: u64, reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    for _ in 0..(CHUNK_SIZE / 8) {
        reader.read_exact(&mut buf)?;
        hash = hash.wrapping_add(u64::from_le_bytes(buf));
    }
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with_bytes(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_hash_of_zeros_is_filesize() {
        // All words sum to zero, leaving just the size term
        let file = file_with_bytes(&vec![0u8; 131072]);

        let hash = movie_hash(file.path()).unwrap().unwrap();
        assert_eq!(hash, "0000000000020000");
    }

    #[test]
    fn test_hash_includes_word_sums() {
        let mut bytes = vec![0u8; 131072];
        // First little-endian word = 1
        bytes[0] = 1;

        let file = file_with_bytes(&bytes);
        let hash = movie_hash(file.path()).unwrap().unwrap();
        assert_eq!(hash, "0000000000020001");
    }

    #[test]
    fn test_last_chunk_contributes() {
        let mut bytes = vec![0u8; 200_000];
        // Word entirely inside the trailing 64 KiB window
        bytes[199_992] = 2;

        let file = file_with_bytes(&bytes);
        let plain = movie_hash(file_with_bytes(&vec![0u8; 200_000]).path())
            .unwrap()
            .unwrap();
        let tweaked = movie_hash(file.path()).unwrap().unwrap();

        assert_ne!(plain, tweaked);
    }

    #[test]
    fn test_small_file_yields_none() {
        let file = file_with_bytes(&vec![0u8; 1000]);
        assert!(movie_hash(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = movie_hash(Path::new("/nonexistent/video.mkv"));
        assert!(result.is_err());
    }
}
