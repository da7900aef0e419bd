use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub session: Session,
    pub transport: Transport,
    pub reconcile: Reconcile,
    pub cache: Cache,
    pub log: Log,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub refresh_path: String,
    pub login_path: String,
    pub logout_path: String,
    pub me_path: String,
    /// Where the user is sent when the session cannot be renewed.
    pub login_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transport {
    pub backend: String, // "fake" or "real"
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reconcile {
    pub interval_secs: u64, // 0 disables
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl Reconcile {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
    pub stale_after_secs: u64, // 0 keeps entries until invalidated
}

impl Cache {
    pub fn stale_after(&self) -> Option<chrono::TimeDelta> {
        match self.stale_after_secs {
            0 => None,
            secs => chrono::TimeDelta::try_seconds(i64::try_from(secs).ok()?),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Reads the TOML file, then `ARMETA__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix("ARMETA")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_settings_load() {
        let settings = parse_settings(Some(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/settings/dev.toml"
        )))
        .unwrap();
        assert_eq!(settings.transport.backend, "fake");
        assert_eq!(settings.session.refresh_path, "/auth/refresh");
        assert!(settings.reconcile.interval().is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }

    #[test]
    fn zero_disables_staleness_and_reconcile() {
        assert!(Cache { stale_after_secs: 0 }.stale_after().is_none());
        assert_eq!(
            Cache { stale_after_secs: 30 }.stale_after(),
            chrono::TimeDelta::try_seconds(30)
        );
        let reconcile = Reconcile {
            interval_secs: 0,
            prefixes: vec![],
        };
        assert!(reconcile.interval().is_none());
    }
}
