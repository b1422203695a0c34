use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Parses `server_url`; only absolute http(s) URLs are accepted.
    pub fn server_url(&self) -> Result<Url> {
        let url = Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("server url '{url}' must use http or https");
        }
        Ok(url)
    }

    fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
        if let Some(v) = file_cfg.get("server_url") {
            self.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("log_filter") {
            self.log_filter = v.clone();
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("SWIPE_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = var("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = var("SWIPE_LOG") {
            self.log_filter = v;
        }
        if let Some(v) = var("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

/// Defaults, then `path` if it exists, then environment.
///
/// A settings file that fails to parse is skipped; its error comes back
/// alongside the settings so the caller can report it once logging is up.
pub fn load_settings(path: &Path) -> (Settings, Option<anyhow::Error>) {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: &Path,
    var: impl Fn(&str) -> Option<String>,
) -> (Settings, Option<anyhow::Error>) {
    let mut settings = Settings::default();
    let mut file_error = None;

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(err) = settings.apply_file(&raw) {
            file_error = Some(err.context(format!("settings file {}", path.display())));
        }
    }
    settings.apply_env(var);

    (settings, file_error)
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_file(contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("swipe_terminal_settings_{suffix}.toml"));
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let (settings, err) = load_settings_with(Path::new("/nonexistent/swipe.toml"), |_| None);
        assert_eq!(settings, Settings::default());
        assert!(err.is_none());
    }

    #[test]
    fn file_then_env_override_defaults() {
        let path = temp_file("server_url = \"http://votes.local:9000\"\nlog_filter = \"debug\"\n");

        let (from_file, err) = load_settings_with(&path, |_| None);
        assert!(err.is_none());
        assert_eq!(from_file.server_url, "http://votes.local:9000");
        assert_eq!(from_file.log_filter, "debug");

        let (from_env, _) = load_settings_with(&path, |key| {
            (key == "APP__SERVER_URL").then(|| "https://votes.example".to_string())
        });
        assert_eq!(from_env.server_url, "https://votes.example");
        assert_eq!(from_env.log_filter, "debug");

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn malformed_file_is_skipped_and_reported() {
        let path = temp_file("server_url = [1, 2]");
        let (settings, err) = load_settings_with(&path, |key| {
            (key == "SWIPE_LOG").then(|| "debug".to_string())
        });
        assert_eq!(settings.server_url, Settings::default().server_url);
        assert_eq!(settings.log_filter, "debug");

        let err = err.expect("parse error reported");
        assert!(
            format!("{err:#}").contains(&path.display().to_string()),
            "unexpected error: {err:#}"
        );
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn server_url_must_be_http() {
        let mut settings = Settings::default();
        assert!(settings.server_url().is_ok());

        settings.server_url = "ftp://votes.local".into();
        assert!(settings.server_url().is_err());

        settings.server_url = "votes.local".into();
        assert!(settings.server_url().is_err());
    }
}
