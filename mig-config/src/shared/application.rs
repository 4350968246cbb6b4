use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    3000
}

fn default_max_table_workers() -> usize {
    8
}

/// HTTP listener and worker fan-out settings.
///
/// Loaded from `APP_HOST`, `APP_PORT` and `APP_MAX_TABLE_WORKERS`, all
/// optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApplicationSettings {
    /// Host address the control API listens on.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number the control API listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of per-table workers running at a time.
    #[serde(default = "default_max_table_workers")]
    pub max_table_workers: usize,
}
