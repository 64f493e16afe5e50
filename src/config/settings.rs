//! User configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `VNSTAT_STATUS_*` environment variables.
//!
//! ```toml
//! cache_timeout = 60
//! format = '[\?color=daily_total {daily_total} {daily_total_unit}]'
//! thresholds = [[838860800, "degraded"], [943718400, "bad"]]
//!
//! [colors]
//! good = "#8EC07C"
//! ```

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::formatting::colors::ColorPalette;
use crate::formatting::thresholds::ThresholdSpec;

/// Default status template
pub const DEFAULT_FORMAT: &str = "vnStat \
[\\?color=good {daily_rx} {daily_rx_unit}] \
[\\?color=bad {daily_tx} {daily_tx_unit}] \
[\\?color=darkgray {daily_total} {daily_total_unit}]";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "VNSTAT_STATUS";

/// Block configuration as written by the user
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Refresh interval in seconds
    pub cache_timeout: u64,
    /// Status template
    pub format: String,
    /// Color thresholds applied to raw byte counts
    pub thresholds: ThresholdSpec,
    /// vnstat executable name or path
    pub command: String,
    /// Interface passed to vnstat with `-i`
    pub interface: Option<String>,
    /// Hex values for `good`, `degraded` and `bad`
    pub colors: ColorPalette,
    /// Deprecated: `d` for daily or `m` for monthly `{up}`/`{down}`/`{total}`
    pub statistics_type: Option<String>,
    /// Deprecated: MiB limit to color map applied to `{total}`
    pub coloring: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_timeout: 180,
            format: DEFAULT_FORMAT.to_string(),
            thresholds: ThresholdSpec::default(),
            command: "vnstat".to_string(),
            interface: None,
            colors: ColorPalette::default(),
            statistics_type: None,
            coloring: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path` (or the default location) and the environment
    ///
    /// An explicitly given file must exist. The default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading overrides from `env` instead of the
    /// process environment when given
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    debug!("Looking for optional configuration at {}", default_path.display());
                    builder = builder
                        .add_source(File::from(default_path).format(FileFormat::Toml).required(false));
                }
            }
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(env))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Parses settings from a TOML string, without environment overrides
    pub fn from_toml(source: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

/// `$XDG_CONFIG_HOME/vnstat-status/config.toml`, falling back to `~/.config`
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;

    Some(base.join("vnstat-status").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").expect("empty config is valid");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache_timeout, 180);
        assert_eq!(settings.command, "vnstat");
        assert!(settings.thresholds.is_empty());
        assert!(settings.format.starts_with("vnStat [\\?color=good {daily_rx}"));
    }

    #[test]
    fn test_global_thresholds() {
        let settings = Settings::from_toml(
            r#"
            format = '[\?color=daily_total {daily_total} {daily_total_unit}]'
            thresholds = [[838860800, "degraded"], [943718400, "bad"]]
            "#,
        )
        .expect("config should parse");

        assert_eq!(
            settings.thresholds,
            ThresholdSpec::Global(vec![
                (838_860_800.0, "degraded".to_string()),
                (943_718_400.0, "bad".to_string()),
            ])
        );
        assert_eq!(
            settings.format,
            "[\\?color=daily_total {daily_total} {daily_total_unit}]"
        );
    }

    #[test]
    fn test_per_placeholder_thresholds_and_palette() {
        let settings = Settings::from_toml(
            r##"
            cache_timeout = 30
            interface = "eno1"

            [thresholds]
            daily_rx = [[0, "good"], [1048576, "bad"]]

            [colors]
            good = "#8EC07C"
            "##,
        )
        .expect("config should parse");

        assert_eq!(settings.cache_timeout, 30);
        assert_eq!(settings.interface.as_deref(), Some("eno1"));
        assert_eq!(settings.colors.good, "#8EC07C");
        assert_eq!(settings.colors.bad, "#FF0000");
        match settings.thresholds {
            ThresholdSpec::PerPlaceholder(table) => {
                assert_eq!(table["daily_rx"].len(), 2);
            }
            other => panic!("expected per-placeholder thresholds, got {:?}", other),
        }
    }

    #[test]
    fn test_deprecated_options() {
        let settings = Settings::from_toml(
            r#"
            statistics_type = "m"
            format = "{total}"

            [coloring]
            800 = "degraded"
            900 = "bad"
            "#,
        )
        .expect("config should parse");

        assert_eq!(settings.statistics_type.as_deref(), Some("m"));
        assert_eq!(settings.coloring.len(), 2);
        assert_eq!(settings.coloring["800"], "degraded");
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        assert!(Settings::from_toml("cache_timeout = \"soon\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "cache_timeout = 45").expect("write config");
        writeln!(file, "command = \"/opt/vnstat/bin/vnstat\"").expect("write config");

        let settings = Settings::load(Some(file.path())).expect("config should load");
        assert_eq!(settings.cache_timeout, 45);
        assert_eq!(settings.command, "/opt/vnstat/bin/vnstat");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "cache_timeout = 45").expect("write config");
        writeln!(file, "interface = \"eno1\"").expect("write config");

        let env: Map<String, String> = [
            ("VNSTAT_STATUS_CACHE_TIMEOUT", "60"),
            ("VNSTAT_STATUS_INTERFACE", "wlan0"),
            ("UNRELATED_CACHE_TIMEOUT", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let settings =
            Settings::load_with_env(Some(file.path()), Some(env)).expect("config should load");
        assert_eq!(settings.cache_timeout, 60);
        assert_eq!(settings.interface.as_deref(), Some("wlan0"));
        assert_eq!(settings.command, "vnstat");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }
}
