use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::models::{AllowedChannels, ChannelOverride, GroupTable, OverrideTable};

/// On-disk configuration (`m3u-curator.toml`). Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub groups: GroupTable,
    /// Replaces the built-in override table when present
    pub overrides: Option<BTreeMap<String, ChannelOverride>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    #[serde(default = "default_fetch_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    /// Permission bits applied after writing (Unix only)
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            attribution: default_attribution(),
            file_mode: default_file_mode(),
        }
    }
}

/// Values supplied on the command line or through the environment.
/// They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
    pub source_url: Option<String>,
    /// JSON object of group name to channel names
    pub channel_groups: Option<String>,
    pub output_path: Option<PathBuf>,
    /// False when the playlist is read from a local file
    pub require_source_url: bool,
}

/// Validated, immutable settings for one run
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    pub source: SourceSettings,
    pub output: OutputConfig,
    pub groups: GroupTable,
    pub allowed: AllowedChannels,
    pub overrides: OverrideTable,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub url: Option<Url>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Config {
    /// Read the config file. A missing file yields the defaults; a file that
    /// exists but cannot be read or parsed is a configuration error.
    pub fn load_from_file(config_file: &Path) -> AppResult<Self> {
        if !config_file.exists() {
            debug!(
                "Config file {} not found, using defaults",
                config_file.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_file).map_err(|e| {
            AppError::configuration(format!("Failed to read {}: {e}", config_file.display()))
        })?;
        let config = Self::from_toml(&contents).map_err(|e| match e {
            AppError::Configuration { message } => {
                AppError::configuration(format!("{}: {message}", config_file.display()))
            }
            other => other,
        })?;
        info!("Configuration loaded from: {}", config_file.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::configuration(format!("Invalid config file: {e}")))
    }

    /// Apply runtime overrides, validate, and build the run configuration
    pub fn resolve(self, overrides: RuntimeOverrides) -> AppResult<CuratorConfig> {
        let raw_url = overrides
            .source_url
            .filter(|url| !url.trim().is_empty())
            .or(self.source.url.filter(|url| !url.trim().is_empty()));

        let url = match raw_url {
            Some(raw) => Some(parse_source_url(&raw)?),
            None if overrides.require_source_url => {
                return Err(AppError::configuration(format!(
                    "{SOURCE_URL_ENV} is not set (use --source-url, the {SOURCE_URL_ENV} variable or [source].url)"
                )));
            }
            None => None,
        };

        let groups = match overrides
            .channel_groups
            .filter(|json| !json.trim().is_empty())
        {
            Some(json) => parse_channel_groups(&json)?,
            None => self.groups,
        };
        if groups.is_empty() {
            return Err(AppError::configuration(format!(
                "{CHANNEL_GROUPS_ENV} is not set (use --channel-groups, the {CHANNEL_GROUPS_ENV} variable or a [groups] table)"
            )));
        }
        if let Some((_, channels)) = groups.iter().find(|(group, _)| group.is_empty()) {
            return Err(AppError::configuration(format!(
                "Channel group with an empty name (channels: {})",
                channels.join(", ")
            )));
        }

        let overrides_table = match self.overrides {
            Some(entries) => OverrideTable::from_entries(entries),
            None => builtin_overrides(),
        };

        let mut output = self.output;
        if let Some(path) = overrides.output_path {
            output.path = path;
        }
        if output.path.file_name().is_none() {
            return Err(AppError::configuration(format!(
                "Output path {} does not name a file",
                output.path.display()
            )));
        }

        let allowed = groups.allowed_channels();
        info!(
            "Configuration resolved: groups={} allowed_channels={} overrides={} output={}",
            groups.len(),
            allowed.len(),
            overrides_table.len(),
            output.path.display()
        );

        Ok(CuratorConfig {
            source: SourceSettings {
                url,
                timeout: self.source.timeout,
                user_agent: self.source.user_agent,
            },
            output,
            groups,
            allowed,
            overrides: overrides_table,
        })
    }
}

/// Parse the `CHANNEL_GROUPS` JSON object
pub fn parse_channel_groups(json: &str) -> AppResult<GroupTable> {
    serde_json::from_str::<GroupTable>(json)
        .map_err(|e| AppError::configuration(format!("Invalid {CHANNEL_GROUPS_ENV} format: {e}")))
}

fn parse_source_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::configuration(format!("Invalid {SOURCE_URL_ENV}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::configuration(format!(
            "Invalid {SOURCE_URL_ENV}: unsupported scheme '{scheme}'"
        ))),
    }
}
