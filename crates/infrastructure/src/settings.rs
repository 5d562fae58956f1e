//! Configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, then `WARDEN_*` environment variables (`__` separates nesting, so
//! `WARDEN_ENDPOINTS__LOGIN` sets `endpoints.login`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use thiserror::Error;
use tracing::debug;
use warden_application::SessionConfig;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "WARDEN";

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "warden.toml";

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or merged.
    #[error("failed to build config: {0}")]
    Build(#[source] config::ConfigError),

    /// The merged values do not fit [`SessionConfig`].
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[source] config::ConfigError),
}

/// Loads the session configuration.
///
/// An explicit `path` must exist. Without one, `warden.toml` in the working
/// directory is used if present.
///
/// # Errors
///
/// Returns an error if a source is unreadable or a value has the wrong type.
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig, ConfigError> {
    load_with(path, environment())
}

/// `WARDEN_` prefix, `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with(
    path: Option<&Path>,
    environment: Environment,
) -> Result<SessionConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()
        .map_err(ConfigError::Build)?;

    let session: SessionConfig = config
        .try_deserialize()
        .map_err(ConfigError::Deserialize)?;
    debug!(base_url = %session.base_url, "Configuration loaded");
    Ok(session)
}

/// Default location of the session file: `<data dir>/warden/session.json`.
///
/// Falls back to the working directory when the platform has no data dir.
#[must_use]
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("warden")
        .join("session.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
base_url = "https://api.example.com/api/v1"
refresh_field = "refresh_token"
refresh_timeout_secs = 5

[endpoints]
token_refresh = "/auth/token/refresh/"
"#,
        );

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.base_url, "https://api.example.com/api/v1");
        assert_eq!(config.refresh_field, "refresh_token");
        assert_eq!(config.refresh_timeout_secs, 5);
        assert_eq!(config.endpoints.token_refresh, "/auth/token/refresh/");
        assert_eq!(config.endpoints.login, "/auth/login");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();

        let result = load_config(Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, Err(ConfigError::Build(_))));
    }

    #[test]
    fn test_wrong_type_is_a_deserialize_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "refresh_timeout_secs = \"soon\"\n");

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    fn environment_of(vars: &[(&str, &str)]) -> Environment {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(vars))
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "base_url = \"https://file.example.com\"\nrefresh_timeout_secs = 5\n",
        );
        let environment = environment_of(&[
            ("WARDEN_BASE_URL", "https://env.example.com/api"),
            ("WARDEN_ENDPOINTS__LOGIN", "/session/login"),
            ("WARDEN_REQUEST_TIMEOUT_SECS", "12"),
        ]);

        let config = load_with(Some(&path), environment).unwrap();

        assert_eq!(config.base_url, "https://env.example.com/api");
        assert_eq!(config.endpoints.login, "/session/login");
        assert_eq!(config.request_timeout_secs, 12);
        assert_eq!(config.refresh_timeout_secs, 5);
        assert_eq!(config.endpoints.logout, "/auth/logout");
    }

    #[test]
    fn test_environment_ignores_other_prefixes() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let environment = environment_of(&[
            ("WARDENX_BASE_URL", "https://other.example.com"),
            ("BASE_URL", "https://bare.example.com"),
        ]);

        let config = load_with(Some(&path), environment).unwrap();

        assert_eq!(config.base_url, SessionConfig::default().base_url);
    }

    #[test]
    fn test_default_store_path_file_name() {
        let path = default_store_path();
        assert!(path.ends_with("warden/session.json"));
    }
}
