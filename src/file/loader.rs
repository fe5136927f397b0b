//! YAML file loading.
//!
//! This module reads YAML streams from files or stdin into a
//! `DocumentStore`. Every document of every input becomes one entry in the
//! store, indexed continuously across inputs in the order they were read.

use crate::document::tree::DocumentStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loads every document from each file into one store.
///
/// Files ending in `.gz` are decompressed first.
///
/// # Examples
///
/// ```no_run
/// use quillq::file::loader::load_documents;
///
/// let store = load_documents(&["base.yaml", "overrides.yaml.gz"]).unwrap();
/// println!("{} documents", store.len());
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - A file does not exist or cannot be read
/// - A gzipped file is corrupted
/// - A file is not valid YAML
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<DocumentStore> {
    let mut store = DocumentStore::new();
    for path in paths {
        let path = path.as_ref();
        let content = read_file(path)?;
        let added = store
            .append_yaml(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?;
        tracing::debug!(path = %path.display(), documents = added, "loaded file");
    }
    Ok(store)
}

/// Loads a single file into its own store.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DocumentStore> {
    load_documents(&[path])
}

/// Loads every document from standard input.
///
/// Gzip input is detected by its magic bytes.
pub fn load_documents_from_stdin() -> Result<DocumentStore> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    let store = parse_bytes(buffer).context("Failed to parse YAML from stdin")?;
    tracing::debug!(documents = store.len(), "loaded stdin");
    Ok(store)
}

/// Parses raw input, gunzipping it when it starts with the gzip magic bytes.
pub fn parse_bytes(bytes: Vec<u8>) -> Result<DocumentStore> {
    let content = if bytes.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&bytes)?
    } else {
        String::from_utf8(bytes).context("Invalid UTF-8 in input")?
    };
    Ok(DocumentStore::from_yaml(&content)?)
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false)
}

fn read_file(path: &Path) -> Result<String> {
    if is_gzipped(path) {
        read_gzipped_file(path)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
    }
}

/// Reads and decompresses a gzipped file.
fn read_gzipped_file(path: &Path) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open gzipped file {}", path.display()))?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped input")?;
    Ok(content)
}
