use hemograma_subscriptions::AuthHeader;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

/// Path the notification handler is mounted on.
pub const NOTIFICATION_PATH: &str = "/hemogramas/notifications";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fhir: FhirSettings,
    #[serde(default)]
    pub callback: CallbackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        self.addr()?;
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        let fhir_url = url::Url::parse(&self.fhir.server_url)
            .map_err(|e| format!("fhir.server_url is not a valid URL: {e}"))?;
        if !matches!(fhir_url.scheme(), "http" | "https") {
            return Err("fhir.server_url must use http or https".into());
        }
        if self.fhir.timeout_ms == Some(0) {
            return Err("fhir.timeout_ms must be > 0 when set".into());
        }
        if self.fhir.password.is_some() && self.fhir.username.is_none() {
            return Err("fhir.password requires fhir.username".into());
        }
        if let Some(ref public_url) = self.callback.public_url {
            url::Url::parse(public_url)
                .map_err(|e| format!("callback.public_url is not a valid URL: {e}"))?;
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    /// Listen address. `server.host` must be an IP literal.
    pub fn addr(&self) -> Result<SocketAddr, String> {
        let host: IpAddr = self.server.host.parse().map_err(|_| {
            format!(
                "server.host must be an IP address, got {:?}",
                self.server.host
            )
        })?;
        Ok(SocketAddr::from((host, self.server.port)))
    }

    /// URL the FHIR server should deliver notifications to.
    ///
    /// If `callback.public_url` is configured, returns that; otherwise the FHIR
    /// server is assumed to run in a container next to this host.
    pub fn callback_url(&self) -> String {
        self.callback.public_url.clone().unwrap_or_else(|| {
            format!(
                "http://host.docker.internal:{}{}",
                self.server.port, NOTIFICATION_PATH
            )
        })
    }

    pub fn fhir_timeout(&self) -> Option<Duration> {
        self.fhir.timeout_ms.map(Duration::from_millis)
    }

    /// Authorization for FHIR requests. A bearer token wins over Basic credentials.
    pub fn fhir_auth(&self) -> Option<AuthHeader> {
        if let Some(token) = &self.fhir.bearer_token {
            return Some(AuthHeader::Bearer {
                token: token.clone(),
            });
        }
        self.fhir
            .username
            .as_ref()
            .map(|username| AuthHeader::Basic {
                username: username.clone(),
                password: self.fhir.password.clone().unwrap_or_default(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8081
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirSettings {
    /// FHIR base URL, e.g. `http://localhost:8080/fhir`
    #[serde(default = "default_fhir_server_url")]
    pub server_url: String,
    /// Request timeout; unset keeps the HTTP client default
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// For security, prefer HEMOGRAMA__FHIR__BEARER_TOKEN over the file
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// HTTP Basic credentials, used when no bearer token is set
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_fhir_server_url() -> String {
    "http://localhost:8080/fhir".into()
}

impl Default for FhirSettings {
    fn default() -> Self {
        Self {
            server_url: default_fhir_server_url(),
            timeout_ms: None,
            bearer_token: None,
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CallbackConfig {
    /// Externally reachable notification URL registered with the FHIR server
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "hemograma.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., HEMOGRAMA__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("HEMOGRAMA")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr().unwrap().port(), 8081);
        assert_eq!(cfg.fhir_timeout(), None);
    }

    #[test]
    fn test_callback_url_defaults_to_docker_host() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.callback_url(),
            "http://host.docker.internal:8081/hemogramas/notifications"
        );

        let mut cfg = AppConfig::default();
        cfg.callback.public_url = Some("https://lab.example.org/hook".into());
        assert_eq!(cfg.callback_url(), "https://lab.example.org/hook");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.fhir.server_url = "localhost:8080".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.fhir.timeout_ms = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.host = "localhost".into();
        assert!(cfg.validate().is_err());
        assert!(cfg.addr().is_err());
    }

    #[test]
    fn test_fhir_auth_prefers_bearer() {
        let mut cfg = AppConfig::default();
        assert!(cfg.fhir_auth().is_none());

        cfg.fhir.username = Some("lab".into());
        cfg.fhir.password = Some("secret".into());
        assert!(matches!(
            cfg.fhir_auth(),
            Some(AuthHeader::Basic { ref username, ref password })
                if username == "lab" && password == "secret"
        ));

        cfg.fhir.bearer_token = Some("tok".into());
        assert!(matches!(
            cfg.fhir_auth(),
            Some(AuthHeader::Bearer { ref token }) if token == "tok"
        ));

        let mut cfg = AppConfig::default();
        cfg.fhir.password = Some("secret".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_addr_uses_configured_host() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.server.port = 9000;
        assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:9000");

        cfg.server.host = "::1".into();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr().unwrap().to_string(), "[::1]:9000");
    }
}
