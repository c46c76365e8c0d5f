//! Client configuration loaded via OrthoConfig.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

/// Backend root used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MIRROR_DIR: &str = ".unbind";

/// Raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The backend URL does not parse.
    #[error("invalid API base URL '{value}': {message}")]
    InvalidBaseUrl {
        /// Rejected value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Settings for reaching the backend and storing the session mirror.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "UNBIND")]
pub struct ClientSettings {
    /// Root URL of the backend API.
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Directory holding the session mirror.
    pub mirror_dir: Option<String>,
}

impl ClientSettings {
    /// Return the backend root, falling back to the local development server.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the configured value is
    /// not an absolute URL.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw.trim()).map_err(|err| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Return the request timeout; zero is raised to one second.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
            .max(1);
        Duration::from_secs(secs)
    }

    /// Return the mirror directory, falling back to `.unbind`.
    #[must_use]
    pub fn mirror_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.mirror_dir.as_deref().unwrap_or(DEFAULT_MIRROR_DIR))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("unbind")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("UNBIND_API_BASE_URL", None::<String>),
            ("UNBIND_REQUEST_TIMEOUT_SECS", None::<String>),
            ("UNBIND_MIRROR_DIR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("default parses").as_str(),
            DEFAULT_API_BASE_URL
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.mirror_dir(), Utf8PathBuf::from(".unbind"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "UNBIND_API_BASE_URL",
                Some("https://unbind.example/api/".to_owned()),
            ),
            ("UNBIND_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("UNBIND_MIRROR_DIR", Some("/tmp/unbind-state".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("override parses").as_str(),
            "https://unbind.example/api/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.mirror_dir(), Utf8PathBuf::from("/tmp/unbind-state"));
    }

    #[rstest]
    fn invalid_base_url_is_reported() {
        let _guard = lock_env([
            ("UNBIND_API_BASE_URL", Some("not a url".to_owned())),
            ("UNBIND_REQUEST_TIMEOUT_SECS", None::<String>),
            ("UNBIND_MIRROR_DIR", None::<String>),
        ]);

        let err = load_from_empty_args()
            .api_base_url()
            .expect_err("relative URL must fail");
        assert!(matches!(err, SettingsError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    fn zero_timeout_is_raised_to_one_second() {
        let settings = ClientSettings {
            api_base_url: None,
            request_timeout_secs: Some(0),
            mirror_dir: None,
        };
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    }
}
