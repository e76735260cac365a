/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{ChannelOverride, OverrideTable};

// File and environment
pub const DEFAULT_CONFIG_FILE: &str = "m3u-curator.toml";
pub const SOURCE_URL_ENV: &str = "SOURCE_URL";
pub const CHANNEL_GROUPS_ENV: &str = "CHANNEL_GROUPS";

// Source defaults
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

// Output defaults
pub const DEFAULT_OUTPUT_FILE: &str = "Sony.m3u";
pub const DEFAULT_ATTRIBUTION: &str = "Himanshu";
pub const DEFAULT_FILE_MODE: u32 = 0o666;

pub fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

pub fn default_user_agent() -> String {
    format!("m3u-curator/{}", env!("CARGO_PKG_VERSION"))
}

pub fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

pub fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

pub fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

/// Override table used when the config file has no `[overrides]` section
pub fn builtin_overrides() -> OverrideTable {
    OverrideTable::from_entries([
        (
            "sony yay",
            ChannelOverride::new(
                "",
                "Sony Yay",
                "http://jiotv.catchup.cdn.jio.com/dare_images/images/Sony_Yay_Hindi.png",
                "Sony Yay",
            ),
        ),
        (
            "sony max hd",
            ChannelOverride::new(
                "sonymaxhd.in",
                "Sony Max HD",
                "https://watchindia.net/images/channels/hindi/Sony_Max_HD.png",
                "Sony MAX HD",
            ),
        ),
        (
            "sony max",
            ChannelOverride::new(
                "",
                "Sony MAX",
                "http://jiotv.catchup.cdn.jio.com/dare_images/images/SET_MAX.png",
                "Sony MAX",
            ),
        ),
        (
            "sony sab hd",
            ChannelOverride::new(
                "sonysabhd.in",
                "Sony Sab HD",
                "https://watchindia.net/images/channels/hindi/Sony_Sab_HD.png",
                "Sony SAB HD",
            ),
        ),
        (
            "set hd",
            ChannelOverride::new(
                "sonyhd.in",
                "Sony TV HD",
                "https://watchindia.net/images/channels/hindi/Sony_TV_HD.png",
                "SET HD",
            ),
        ),
        (
            "sony pal",
            ChannelOverride::new(
                "",
                "Sony Pal",
                "http://jiotv.catchup.cdn.jio.com/dare_images/images/Sony_Pal.png",
                "Sony Pal",
            ),
        ),
        (
            "sony bbc earth hd",
            ChannelOverride::new(
                "",
                "Sony BBC Earth HD",
                "http://jiotv.catchup.cdn.jio.com/dare_images/images/Sony_BBC_Earth_HD.png",
                "Sony BBC Earth HD",
            ),
        ),
    ])
}
