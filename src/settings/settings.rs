use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub store: Store,
    pub directory: Directory,
    pub auth: Auth,
    #[serde(default)]
    pub demo: Demo,
    pub seed: Seed,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    /// Serve plain HTTP when either path is missing.
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    #[serde(default)]
    pub redis_dsn: String,
    pub op_timeout_ms: u64,
}

impl Store {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct Directory {
    pub backend: String, // "memory" or "mysql"
    #[serde(default)]
    pub mysql_dsn: String,
    pub op_timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Directory {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

#[derive(Deserialize)]
pub struct Auth {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub identity_ttl_secs: u64,
    #[serde(default)]
    pub leeway_secs: i64,
    pub access_prefix: String,
    pub refresh_prefix: String,
    pub identity_prefix: String,
    pub refresh_cookie: String,
    /// Login attempts allowed per client address within one window.
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u64,
    #[serde(default = "default_login_rate_window_secs")]
    pub login_rate_window_secs: u64,
    #[serde(default = "default_rate_limit_prefix")]
    pub rate_limit_prefix: String,
}

// keeps the secret out of the startup log
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("identity_ttl_secs", &self.identity_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("access_prefix", &self.access_prefix)
            .field("refresh_prefix", &self.refresh_prefix)
            .field("identity_prefix", &self.identity_prefix)
            .field("refresh_cookie", &self.refresh_cookie)
            .field("login_rate_limit", &self.login_rate_limit)
            .field("login_rate_window_secs", &self.login_rate_window_secs)
            .field("rate_limit_prefix", &self.rate_limit_prefix)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Demo {
    pub enabled: bool,
    /// `"METHOD /path"` pairs still allowed to write while demo mode is on.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Deserialize)]
pub struct Seed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seed")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_login_rate_limit() -> u64 {
    5
}

fn default_login_rate_window_secs() -> u64 {
    60
}

fn default_rate_limit_prefix() -> String {
    "rate_limit".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Load the TOML file, then let `HINTDESK_<SECTION>__<KEY>` variables override it,
/// e.g. `HINTDESK_AUTH__SECRET`.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix("HINTDESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
