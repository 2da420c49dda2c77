use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Centralized configuration for the blog service.
///
/// Loaded from `~/.blogicum/config.toml` (every section optional), then
/// overridden by environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub auth: AuthSection,
    pub media: MediaSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Allow any origin. Development only.
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/blogicum".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// HMAC secret for session tokens. Prefer `BLOGICUM_SECRET` over the file.
    pub secret: Option<String>,
    pub session_hours: i64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            secret: None,
            session_hours: 24 * 14,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSection {
    pub root: PathBuf,
    pub max_image_bytes: usize,
}

impl Default for MediaSection {
    fn default() -> Self {
        Self {
            root: BlogConfig::home_dir().join("media"),
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

impl BlogConfig {
    /// Load config from `~/.blogicum/config.toml` and the process environment.
    ///
    /// A missing file is not an error: defaults apply.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path(), |key| std::env::var(key).ok())
    }

    /// Load from an explicit path with an injectable environment lookup.
    pub fn load_from<F>(path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|source| CoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_env(env)?;
        Ok(config)
    }

    /// Base directory: `~/.blogicum`
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".blogicum")
    }

    /// Config file path: `~/.blogicum/config.toml`
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = env("BLOGICUM_BIND") {
            self.server.bind = bind
                .parse()
                .map_err(|_| CoreError::config(format!("BLOGICUM_BIND is not a socket address: {bind}")))?;
        }
        if let Some(url) = env("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = env("BLOGICUM_SECRET") {
            self.auth.secret = Some(secret);
        }
        if let Some(root) = env("BLOGICUM_MEDIA_ROOT") {
            self.media.root = PathBuf::from(root);
        }
        Ok(())
    }

    /// The session secret, or an actionable error when none is configured.
    pub fn require_secret(&self) -> Result<&str> {
        match self.auth.secret.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(CoreError::config(
                "auth.secret is not set. Export BLOGICUM_SECRET or add [auth] secret to ~/.blogicum/config.toml",
            )),
        }
    }

    /// Write config as TOML, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BlogConfig::load_from(&dir.path().join("nope.toml"), no_env).unwrap();

        assert_eq!(config.server.bind.port(), 8000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.session_hours, 336);
        assert!(config.auth.secret.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[database]\nurl = \"postgres://db/blog\"\n").unwrap();

        let config = BlogConfig::load_from(&path, no_env).unwrap();
        assert_eq!(config.database.url, "postgres://db/blog");
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.server.cors_permissive);
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[auth]\nsecret = \"from-file\"\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("BLOGICUM_SECRET", "from-env"),
            ("BLOGICUM_BIND", "0.0.0.0:9000"),
            ("DATABASE_URL", "postgres://env/blog"),
        ]
        .into_iter()
        .collect();

        let config =
            BlogConfig::load_from(&path, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.auth.secret.as_deref(), Some("from-env"));
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.database.url, "postgres://env/blog");
    }

    #[test]
    fn bad_bind_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BlogConfig::load_from(&dir.path().join("x.toml"), |k| {
            (k == "BLOGICUM_BIND").then(|| "not-an-addr".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nbind = ").unwrap();

        let err = BlogConfig::load_from(&path, no_env).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn require_secret_rejects_blank() {
        let mut config = BlogConfig::default();
        assert!(config.require_secret().is_err());

        config.auth.secret = Some("   ".into());
        assert!(config.require_secret().is_err());

        config.auth.secret = Some("s3cret".into());
        assert_eq!(config.require_secret().unwrap(), "s3cret");
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = BlogConfig::default();
        config.database.url = "postgres://saved/blog".into();
        config.save_to(&path).unwrap();

        let loaded = BlogConfig::load_from(&path, no_env).unwrap();
        assert_eq!(loaded.database.url, "postgres://saved/blog");
    }
}
