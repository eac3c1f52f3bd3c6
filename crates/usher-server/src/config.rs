use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use usher_gateways::{DirectorySettings, EventsSettings, MailSettings};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Filesystem cache for resolved avatar payloads
    #[serde(default)]
    pub blobs: BlobConfig,
    /// Upstream user directory (remote users and avatar images)
    #[serde(default)]
    pub directory: DirectorySettings,
    /// Welcome mail delivery
    #[serde(default)]
    pub mail: MailSettings,
    /// Signup event delivery
    #[serde(default)]
    pub events: EventsSettings,
}

// Default derived via field defaults

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Blob cache validation
        if self.blobs.dir.trim().is_empty() {
            return Err("blobs.dir must not be empty".into());
        }
        // Directory validation
        url::Url::parse(&self.directory.base_url)
            .map_err(|e| format!("directory.base_url is not a valid URL: {e}"))?;
        if self.directory.timeout_ms == 0 {
            return Err("directory.timeout_ms must be > 0".into());
        }
        // Mail validation
        if self.mail.enabled {
            if self.mail.smtp_host.is_empty() {
                return Err("mail.enabled=true requires mail.smtp_host".into());
            }
            if self.mail.timeout_ms == 0 {
                return Err("mail.timeout_ms must be > 0".into());
            }
        }
        // Events validation
        if self.events.enabled {
            let endpoint = self.events.endpoint.as_deref().unwrap_or("");
            if endpoint.is_empty() {
                return Err("events.enabled=true requires events.endpoint".into());
            }
            url::Url::parse(endpoint)
                .map_err(|e| format!("events.endpoint is not a valid URL: {e}"))?;
            if self.events.timeout_ms == 0 {
                return Err("events.timeout_ms must be > 0".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
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
    8080
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    #[serde(default = "default_blob_dir")]
    pub dir: String,
}
fn default_blob_dir() -> String {
    "avatars".into()
}
impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            dir: default_blob_dir(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("usher.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., USHER__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("USHER")
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
