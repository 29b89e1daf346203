//! Error types shared across the engine.

use thiserror::Error;

/// Errors surfaced by the trie index, the query pipeline, and the adapters.
///
/// Deleting or searching a term that does not exist is never an error; those
/// operations are silent no-ops that return empty results.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Structurally invalid argument, such as an empty term.
    #[error("invalid input: {0}")]
    InputShape(String),

    /// A configuration setter was called with an out-of-range value.
    /// The previous value is retained.
    #[error("configuration out of bounds: {0}")]
    ConfigBounds(String),

    /// A serialized snapshot could not be decoded. Any partially
    /// reconstructed trie is discarded.
    #[error("malformed snapshot: {0}")]
    SnapshotDecode(String),

    /// Opaque I/O failure reported by a persistence or cache adapter.
    #[error("adapter failure: {0}")]
    AdapterFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::ConfigBounds("should return at least 1 result".to_string());
        assert_eq!(
            err.to_string(),
            "configuration out of bounds: should return at least 1 result"
        );
    }
}
