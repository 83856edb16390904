//! Content signature for change detection.
//!
//! Hashing whole files is too costly for large video collections, so the
//! signature covers the file size and mtime plus the first 8 KiB of content,
//! and the last 8 KiB for files larger than 16 KiB. Enough to catch edits
//! and truncations without reading gigabytes.

use md5::{Digest, Md5};
use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::UNIX_EPOCH;

const CHUNK_SIZE: u64 = 8192;

pub fn file_signature(path: &Path, metadata: &Metadata) -> io::Result<String> {
    let size = metadata.len();
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut hasher = Md5::new();
    hasher.update(format!("{}_{}", size, mtime).as_bytes());

    let mut file = File::open(path)?;
    let mut chunk = Vec::with_capacity(CHUNK_SIZE as usize);
    file.by_ref().take(CHUNK_SIZE).read_to_end(&mut chunk)?;
    hasher.update(&chunk);

    if size > CHUNK_SIZE * 2 {
        file.seek(SeekFrom::Start(size - CHUNK_SIZE))?;
        chunk.clear();
        file.read_to_end(&mut chunk)?;
        hasher.update(&chunk);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn signature_is_stable_for_unchanged_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bin");
        fs::write(&path, b"hello world").unwrap();

        let meta = fs::metadata(&path).unwrap();
        let first = file_signature(&path, &meta).unwrap();
        let second = file_signature(&path, &meta).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn signature_changes_with_content() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, b"content one").unwrap();
        fs::write(&b, b"content two").unwrap();

        let sig_a = file_signature(&a, &fs::metadata(&a).unwrap()).unwrap();
        let sig_b = file_signature(&b, &fs::metadata(&b).unwrap()).unwrap();
        assert_ne!(sig_a, sig_b);
    }

    #[test]
    fn signature_covers_tail_of_large_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");

        // Same head, different tail, same size; only the tail chunk differs.
        let mut data = vec![0u8; 32 * 1024];
        fs::write(&a, &data).unwrap();
        *data.last_mut().unwrap() = 1;
        fs::write(&b, &data).unwrap();

        let sig_a = file_signature(&a, &fs::metadata(&a).unwrap()).unwrap();
        let sig_b = file_signature(&b, &fs::metadata(&b).unwrap()).unwrap();
        assert_ne!(sig_a, sig_b);
    }
}
