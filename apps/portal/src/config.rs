use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub log_filter: String,
    pub assume_yes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5001".into(),
            log_filter: "info".into(),
            assume_yes: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    log_filter: Option<String>,
    assume_yes: Option<bool>,
}

/// Command-line values; they win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub server_url: Option<String>,
    pub log_filter: Option<String>,
    pub assume_yes: bool,
}

pub fn load_settings(cli: &CliOverrides) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match &cli.config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(Path::new(DEFAULT_CONFIG_FILE)) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    apply_cli(&mut settings, cli);

    settings.server_url = normalize_server_url(&settings.server_url)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file.assume_yes {
        settings.assume_yes = v;
    }
    Ok(())
}

/// `APP__*` names take precedence over the short `PORTAL_*` ones.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("PORTAL_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("PORTAL_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

fn apply_cli(settings: &mut Settings, cli: &CliOverrides) {
    if let Some(v) = &cli.server_url {
        settings.server_url = v.clone();
    }
    if let Some(v) = &cli.log_filter {
        settings.log_filter = v.clone();
    }
    if cli.assume_yes {
        settings.assume_yes = true;
    }
}

pub fn normalize_server_url(raw_server_url: &str) -> anyhow::Result<String> {
    let raw_server_url = raw_server_url.trim();
    if raw_server_url.is_empty() {
        return Ok(Settings::default().server_url);
    }

    let parsed = Url::parse(raw_server_url)
        .with_context(|| format!("invalid server url '{raw_server_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "server url '{raw_server_url}' must use http:// or https://"
        ));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
