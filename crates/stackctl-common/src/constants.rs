//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Fallback data directory when no home directory can be determined.
pub const FALLBACK_DATA_DIR: &str = ".stackctl";

/// Returns the data directory, preferring `$HOME/.stackctl`.
fn resolve_data_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_or_else(
            |_| PathBuf::from(FALLBACK_DATA_DIR),
            |home| PathBuf::from(home).join(".stackctl"),
        )
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default configuration file path.
pub fn default_config_file() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the default credential cache path.
pub fn default_credentials_file() -> PathBuf {
    data_dir().join("credentials.json")
}

/// Default API server endpoint.
pub const DEFAULT_SERVER: &str = "http://localhost:8083";

/// Catalog used for service operations unless another is named.
pub const DEFAULT_CATALOG: &str = "user";

/// Catalog whose modification requires administrator credentials.
pub const SYSTEM_CATALOG: &str = "system";

/// Account name used for administrator logins.
pub const ADMIN_USER: &str = "admin";

/// File extension accepted for service and project definitions.
pub const DEFINITION_EXTENSION: &str = "json";

/// Unit attached to volume sizes given on the command line.
pub const VOLUME_SIZE_UNIT: &str = "GB";

/// Separator for the `--opt` optional service list.
pub const OPTIONAL_SEPARATOR: char = ',';

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stackctl";
