use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use rest_client::RetryPolicy;
use runtime::ConfigProvider;
use serde::{Deserialize, Serialize};

pub const MODULE_NAME: &str = "clinic_api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// One file per key under `session_dir`.
    File,
    /// Kept in process memory only.
    Memory,
}

/// Configuration for the clinic_api module (`modules.clinic_api`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClinicApiConfig {
    #[serde(default = "default_session_backend")]
    pub session_backend: SessionBackend,
    /// Relative paths are resolved against `client.home_dir`.
    #[serde(default = "default_session_dir")]
    pub session_dir: String,
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// OTP endpoints sit outside the versioned API prefix. Unset means
    /// `/api/otp` on the same origin as `client.base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_base_url: Option<String>,
}

impl Default for ClinicApiConfig {
    fn default() -> Self {
        Self {
            session_backend: default_session_backend(),
            session_dir: default_session_dir(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            otp_base_url: None,
        }
    }
}

fn default_session_backend() -> SessionBackend {
    SessionBackend::File
}

fn default_session_dir() -> String {
    "session".to_string()
}

fn default_retry_max_attempts() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    250
}

impl ClinicApiConfig {
    /// Read `modules.clinic_api`; a missing section means defaults, an
    /// invalid one is an error.
    pub fn from_provider(provider: &dyn ConfigProvider) -> anyhow::Result<Self> {
        match provider.get_module_config(MODULE_NAME) {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .with_context(|| format!("invalid modules.{MODULE_NAME} config")),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retry_max_attempts <= 1 {
            return RetryPolicy::none();
        }
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    pub fn session_path(&self, home_dir: &Path) -> PathBuf {
        let dir = Path::new(&self.session_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            home_dir.join(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::AppConfig;
    use serde_json::json;

    #[test]
    fn missing_section_uses_defaults() {
        let app = AppConfig::default();
        let cfg = ClinicApiConfig::from_provider(&app).unwrap();
        assert_eq!(cfg, ClinicApiConfig::default());
        assert_eq!(cfg.session_backend, SessionBackend::File);
        assert_eq!(cfg.retry_policy(), RetryPolicy::none());
    }

    #[test]
    fn partial_section_fills_defaults() {
        let mut app = AppConfig::default();
        app.modules.insert(
            MODULE_NAME.to_string(),
            json!({"session_backend": "memory", "retry_max_attempts": 3}),
        );

        let cfg = ClinicApiConfig::from_provider(&app).unwrap();
        assert_eq!(cfg.session_backend, SessionBackend::Memory);
        assert_eq!(cfg.session_dir, "session");
        assert_eq!(
            cfg.retry_policy(),
            RetryPolicy::new(3, Duration::from_millis(250))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut app = AppConfig::default();
        app.modules
            .insert(MODULE_NAME.to_string(), json!({"sesion_dir": "typo"}));
        assert!(ClinicApiConfig::from_provider(&app).is_err());
    }

    #[test]
    fn session_path_resolves_against_home() {
        let cfg = ClinicApiConfig::default();
        assert_eq!(
            cfg.session_path(Path::new("/home/pat/.clinic")),
            PathBuf::from("/home/pat/.clinic/session")
        );

        let abs = ClinicApiConfig {
            session_dir: "/var/lib/clinic".into(),
            ..Default::default()
        };
        assert_eq!(
            abs.session_path(Path::new("/ignored")),
            PathBuf::from("/var/lib/clinic")
        );
    }
}
