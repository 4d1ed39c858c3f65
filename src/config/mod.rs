use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Supabase project settings. The service-role key is used exclusively for
/// token validation against GoTrue and must never be sent to the browser.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default)]
    pub service_role_key: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    /// Secret used to sign the session cookie. When unset, a random
    /// per-process key is generated and sessions do not survive restarts.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| "Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over the config file, matching how the
    /// Supabase keys are usually provisioned in deployment.
    fn apply_env_overrides(&mut self) {
        env_override("SUPABASE_URL", &mut self.supabase.url);
        env_override("SUPABASE_ANON_KEY", &mut self.supabase.anon_key);
        env_override("SUPABASE_SERVICE_ROLE", &mut self.supabase.service_role_key);
        if let Ok(secret) = std::env::var("ORCAFLOW_SESSION_SECRET") {
            if !secret.is_empty() {
                self.session.secret = Some(secret);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.supabase.url.is_empty()
            || self.supabase.anon_key.is_empty()
            || self.supabase.service_role_key.is_empty()
        {
            bail!(
                "SUPABASE_URL, SUPABASE_ANON_KEY and SUPABASE_SERVICE_ROLE must be set \
                 (environment or [supabase] section of the config file)"
            );
        }
        Ok(())
    }
}

fn env_override(var: &str, slot: &mut String) {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            *slot = value;
        }
    }
}
