use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Maximum file size in bytes (default: 10MB)
    pub max_file_size: usize,

    /// Bearer tokens accepted by the server
    pub tokens: Vec<TokenConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,

    /// Application the token was issued to; selects its `app` namespace
    pub app_id: String,

    /// Whether the token may use the shared `drive` root
    #[serde(default)]
    pub drive_access: bool,
}

// Keep tokens out of logs.
impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("drive_access", &self.drive_access)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: 10 * 1024 * 1024, // 10MB
            tokens: vec![],
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // Try to load from config file, fallback to default
        let config_path =
            std::env::var("NFS_CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        // Override bind address with environment variable if set
        if let Ok(addr) = std::env::var("NFS_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
            tracing::info!("Bind address overridden by NFS_BIND_ADDR: {}", config.bind_addr);
        }

        config.validate()?;
        if config.tokens.is_empty() {
            tracing::warn!("No tokens configured, every NFS request will be rejected");
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_file_size == 0 {
            anyhow::bail!("max_file_size must be greater than zero");
        }

        let mut seen = HashSet::new();
        for entry in &self.tokens {
            if entry.token.is_empty() || entry.app_id.is_empty() {
                anyhow::bail!("tokens entries need a non-empty token and app_id");
            }
            if !seen.insert(entry.token.as_str()) {
                anyhow::bail!("duplicate token configured for app '{}'", entry.app_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn token(token: &str, app_id: &str) -> TokenConfig {
        TokenConfig {
            token: token.to_string(),
            app_id: app_id.to_string(),
            drive_access: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.tokens.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_addr = "0.0.0.0:8080"

[[tokens]]
token = "secret"
app_id = "demo-app"
drive_access = true

[[tokens]]
token = "other"
app_id = "second-app"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.tokens.len(), 2);
        assert!(config.tokens[0].drive_access);
        assert!(!config.tokens[1].drive_access);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.max_file_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tokens = vec![token("same", "a"), token("same", "b")];
        assert!(config.validate().is_err());

        config.tokens = vec![token("", "a")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let rendered = format!("{:?}", token("very-secret", "app"));
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("app"));
    }
}
