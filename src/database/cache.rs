//! Persistent cache (spec.md §4.5): a versioned, LZ4-compressed bincode
//! payload carrying a metadata record (source directory, file count,
//! per-file content hash) plus the `by_file` index, which is sufficient
//! to regenerate `by_name` and `by_qualified` on load.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::CallTreeError;
use crate::model::FunctionInfo;

/// Magic bytes identifying an LZ4-framed cache payload.
const LZ4_MAGIC: &[u8; 4] = b"CTC1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheMetadata {
    pub source_directory: String,
    pub file_count: usize,
    pub file_hashes: HashMap<String, u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachePayload {
    metadata: CacheMetadata,
    by_file: HashMap<String, Vec<FunctionInfo>>,
}

/// Strip the `\\?\` extended-length path prefix Windows' `canonicalize`
/// adds, so cached and freshly-computed paths compare equal.
pub fn clean_path(p: &str) -> String {
    p.strip_prefix(r"\\?\").unwrap_or(p).to_string()
}

/// Fast, non-cryptographic 64-bit content hash (FNV-1a). Used only for
/// cache-invalidation, never for security purposes.
pub fn stable_hash(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

pub fn default_cache_path(source_dir: &Path) -> PathBuf {
    source_dir.join(".cache").join("function_db.bin")
}

pub fn compute_metadata(source_dir: &Path, file_contents: &[(String, String)]) -> CacheMetadata {
    let source_directory = std::fs::canonicalize(source_dir)
        .map(|p| clean_path(&p.to_string_lossy()))
        .unwrap_or_else(|_| clean_path(&source_dir.to_string_lossy()));
    let file_hashes = file_contents
        .iter()
        .map(|(path, contents)| (path.clone(), stable_hash(contents.as_bytes())))
        .collect();
    CacheMetadata {
        source_directory,
        file_count: file_contents.len(),
        file_hashes,
    }
}

/// Save `by_file` plus its metadata to `path`, creating the parent
/// directory if needed. I/O errors are the caller's to downgrade to a
/// warning — a failed cache write must never fail a `build`.
pub fn save(
    path: &Path,
    metadata: &CacheMetadata,
    by_file: &HashMap<String, Vec<FunctionInfo>>,
) -> Result<(), CallTreeError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let payload = CachePayload {
        metadata: metadata.clone(),
        by_file: by_file.clone(),
    };

    // Atomic write: serialize to a temp file in the same directory, then
    // rename over the final path (rename is atomic within one filesystem).
    let tmp_path = path.with_extension("bin.tmp");
    {
        let file = std::fs::File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(LZ4_MAGIC)?;
        let encoder = lz4_flex::frame::FrameEncoder::new(writer);
        let mut encoder = encoder;
        bincode::serialize_into(&mut encoder, &payload)?;
        let mut writer = encoder
            .finish()
            .map_err(|e| CallTreeError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        writer.flush()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

pub enum LoadOutcome {
    Hit(CacheMetadata, HashMap<String, Vec<FunctionInfo>>),
    Miss,
}

/// Deserialize the cache file at `path`. Any I/O or format error is
/// downgraded to `Miss` — per spec.md §4.5 a corrupt cache never aborts
/// a build, it just forces a full reparse.
pub fn load(path: &Path) -> LoadOutcome {
    let start = Instant::now();
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return LoadOutcome::Miss,
    };
    let mut reader = BufReader::new(file);
    let mut magic = [0u8; 4];
    if reader.read_exact(&mut magic).is_err() || &magic != LZ4_MAGIC {
        return LoadOutcome::Miss;
    }

    let decoder = lz4_flex::frame::FrameDecoder::new(reader);
    match bincode::deserialize_from::<_, CachePayload>(decoder) {
        Ok(payload) => {
            tracing::debug!(elapsed_ms = %start.elapsed().as_millis(), "cache payload decoded");
            LoadOutcome::Hit(payload.metadata, payload.by_file)
        }
        Err(_) => LoadOutcome::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionKind, Parameter};

    fn sample_function(name: &str, file: &str) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            file_path: file.to_string(),
            line_number: 3,
            return_type: "void".to_string(),
            is_static: false,
            kind: FunctionKind::TraditionalC,
            memory_class: None,
            macro_type: None,
            parameters: vec![Parameter {
                name: "x".to_string(),
                base_type: "int".to_string(),
                is_pointer: false,
                is_const: false,
                memory_class: None,
            }],
            calls: vec![],
            called_by: vec![],
            qualified_name: Some(FunctionInfo::compute_qualified_name(file, name)),
            sw_module: None,
        }
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        let a = stable_hash(b"hello world");
        let b = stable_hash(b"hello world");
        let c = stable_hash(b"hello worlD");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join(".cache").join("function_db.bin");

        let mut by_file = HashMap::new();
        by_file.insert("demo.c".to_string(), vec![sample_function("Demo_Init", "demo.c")]);

        let metadata = CacheMetadata {
            source_directory: clean_path(&dir.path().to_string_lossy()),
            file_count: 1,
            file_hashes: HashMap::from([("demo.c".to_string(), stable_hash(b"contents"))]),
        };

        save(&cache_path, &metadata, &by_file).unwrap();

        match load(&cache_path) {
            LoadOutcome::Hit(loaded_meta, loaded_files) => {
                assert_eq!(loaded_meta, metadata);
                assert_eq!(loaded_files, by_file);
            }
            LoadOutcome::Miss => panic!("expected cache hit"),
        }
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        assert!(matches!(load(&path), LoadOutcome::Miss));
    }

    #[test]
    fn corrupt_file_is_a_miss_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.bin");
        std::fs::write(&path, b"not a real cache file").unwrap();
        assert!(matches!(load(&path), LoadOutcome::Miss));
    }
}
