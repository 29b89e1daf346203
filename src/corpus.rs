//! Reference-corpus management.
//!
//! The spelling model is trained on a plain-text corpus. This module
//! locates the corpus on disk and, with the `download` feature, fetches
//! the default one over HTTP on first use.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the default reference corpus (Norvig's concatenation of
/// public-domain books).
pub const DEFAULT_CORPUS: &str = "big.txt";

/// Where the default corpora are published.
#[cfg(feature = "download")]
const CORPUS_BASE_URL: &str = "https://norvig.com";

/// Errors raised while locating or fetching a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Network error during download.
    #[error("network error: {0}")]
    Network(String),
    /// Error reading or writing the corpus file.
    #[error("io error: {0}")]
    Io(String),
    /// The corpus file does not exist.
    #[error("corpus not found: {0}")]
    NotFound(String),
}

/// Default base path for downloaded corpora.
pub fn default_base_path() -> PathBuf {
    #[cfg(feature = "download")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typeahead-rs")
            .join("corpus")
    }
    #[cfg(not(feature = "download"))]
    {
        PathBuf::from(".")
    }
}

/// Path of a named corpus under `base_path` (or the default base).
pub fn corpus_path(name: &str, base_path: Option<&Path>) -> PathBuf {
    let base = base_path
        .map(PathBuf::from)
        .unwrap_or_else(default_base_path);
    base.join(name)
}

/// Check if a named corpus exists locally.
pub fn corpus_exists(name: &str, base_path: Option<&Path>) -> bool {
    corpus_path(name, base_path).is_file()
}

/// Read a corpus file into memory.
pub fn load_corpus(path: &Path) -> Result<String, CorpusError> {
    if !path.is_file() {
        return Err(CorpusError::NotFound(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|e| CorpusError::Io(e.to_string()))
}

/// Download a named corpus, returning its local path. Already-present
/// corpora are not fetched again.
#[cfg(feature = "download")]
pub fn download_corpus(name: &str, base_path: Option<&Path>) -> Result<PathBuf, CorpusError> {
    let base = base_path
        .map(PathBuf::from)
        .unwrap_or_else(default_base_path);
    fs::create_dir_all(&base).map_err(|e| CorpusError::Io(e.to_string()))?;

    let path = base.join(name);
    if path.is_file() {
        return Ok(path);
    }

    let url = format!("{CORPUS_BASE_URL}/{name}");
    log::info!("downloading corpus {name} from {url}");

    let client = reqwest::blocking::Client::builder()
        .user_agent("typeahead-rs")
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .map_err(|e| CorpusError::Network(e.to_string()))?;

    let response = client
        .get(&url)
        .send()
        .map_err(|e| CorpusError::Network(e.to_string()))?;
    if !response.status().is_success() {
        return Err(CorpusError::Network(format!(
            "failed to download corpus: HTTP {}",
            response.status()
        )));
    }

    let text = response
        .text()
        .map_err(|e| CorpusError::Network(e.to_string()))?;
    fs::write(&path, text).map_err(|e| CorpusError::Io(e.to_string()))?;

    log::info!("corpus {name} downloaded");
    Ok(path)
}

/// Get the default corpus, downloading it if necessary.
#[cfg(feature = "download")]
pub fn get_default_corpus() -> Result<PathBuf, CorpusError> {
    download_corpus(DEFAULT_CORPUS, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_path() {
        let path = default_base_path();
        assert!(path.to_string_lossy().contains("typeahead"));
    }

    #[test]
    fn test_corpus_path_uses_name() {
        let path = corpus_path("big.txt", None);
        assert!(path.to_string_lossy().ends_with("big.txt"));
    }

    #[test]
    fn test_corpus_path_honors_base_override() {
        let path = corpus_path("big.txt", Some(Path::new("/tmp/corpora")));
        assert_eq!(path, PathBuf::from("/tmp/corpora/big.txt"));
    }

    #[test]
    fn test_load_missing_corpus_is_not_found() {
        let err = load_corpus(Path::new("/nonexistent/corpus.txt")).unwrap_err();
        assert!(matches!(err, CorpusError::NotFound(_)));
    }
}
