use serde::Deserialize;

/// Batch sizing for the copy and sync pipelines.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Number of rows moved per multi-row insert during the initial copy.
    pub create_size: usize,
    /// Number of `(id, fingerprint)` pairs scanned per diff-detection window.
    pub search_size: usize,
    /// Number of divergent rows reconciled per chunk.
    pub update_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            create_size: 1000,
            search_size: 10000,
            update_size: 100,
        }
    }
}
