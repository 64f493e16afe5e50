//! One-time configuration normalization
//!
//! Turns user [`Settings`] into the [`ModuleConfig`] the block runs with:
//! checks that vnstat is installed, parses the template, migrates deprecated
//! options and derives threshold rules.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

use crate::collectors::vnstat::collector::CommandLocator;
use crate::collectors::vnstat::errors::VnstatError;
use crate::config::settings::Settings;
use crate::formatting::colors::ColorPalette;
use crate::formatting::template::Template;
use crate::formatting::thresholds::{ThresholdSpec, Thresholds};

/// Bytes per MiB, the unit of the deprecated `coloring` option
const MIB: f64 = 1024.0 * 1024.0;

/// Validated configuration of the vnstat block
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    pub cache_timeout: u64,
    pub template: Template,
    /// Placeholders referenced by the template, in order
    pub placeholders: Vec<String>,
    pub thresholds: Thresholds,
    /// Template color names that may receive a threshold color
    pub threshold_targets: Vec<String>,
    /// Field prefix used for the legacy `{up}`, `{down}` and `{total}`
    pub statistics_prefix: &'static str,
    /// Whether the deprecated `coloring` option colors the whole block
    pub legacy_coloring: bool,
    pub command: String,
    pub interface: Option<String>,
    pub palette: ColorPalette,
}

impl ModuleConfig {
    /// Validates and normalizes user settings
    ///
    /// Fails with `not installed` when the vnstat command cannot be found.
    pub fn normalize(settings: Settings, locator: &dyn CommandLocator) -> Result<Self> {
        match locator.locate(&settings.command) {
            Some(path) => debug!("Using vnstat at {}", path.display()),
            None => {
                warn!("'{}' was not found on PATH", settings.command);
                return Err(VnstatError::NotInstalled(settings.command).into());
            }
        }

        let template = Template::parse(&settings.format)
            .with_context(|| format!("Invalid format '{}'", settings.format))?;
        let placeholders = template.placeholders();

        let statistics_prefix = statistics_prefix(settings.statistics_type.as_deref());

        let (thresholds, legacy_coloring) =
            migrate_coloring(settings.thresholds, &settings.coloring, &placeholders)?;

        let threshold_targets = template.color_names();

        info!(
            "Normalized configuration: {} placeholders, {} color names, legacy_coloring={}, cache_timeout={}s",
            placeholders.len(),
            threshold_targets.len(),
            legacy_coloring,
            settings.cache_timeout
        );

        Ok(Self {
            cache_timeout: settings.cache_timeout,
            template,
            placeholders,
            thresholds,
            threshold_targets,
            statistics_prefix,
            legacy_coloring,
            command: settings.command,
            interface: settings.interface,
            palette: settings.colors,
        })
    }
}

/// Maps the deprecated `statistics_type` to a field prefix
fn statistics_prefix(statistics_type: Option<&str>) -> &'static str {
    match statistics_type {
        Some("m") => "monthly_",
        Some("d") | None => "daily_",
        Some(other) => {
            warn!("Unknown statistics_type '{}', using daily statistics", other);
            "daily_"
        }
    }
}

/// Converts the deprecated `coloring` table into thresholds
///
/// The table only applies when the template shows `{total}` and no explicit
/// thresholds were configured. Its keys are MiB limits.
fn migrate_coloring(
    thresholds: ThresholdSpec,
    coloring: &std::collections::BTreeMap<String, String>,
    placeholders: &[String],
) -> Result<(Thresholds, bool)> {
    let applies = !coloring.is_empty()
        && placeholders.iter().any(|p| p == "total")
        && thresholds.is_empty();

    if !applies {
        if !coloring.is_empty() {
            debug!("Ignoring deprecated 'coloring' option");
        }
        return Ok((Thresholds::from_spec(thresholds), false));
    }

    let mut migrated = Vec::with_capacity(coloring.len());
    for (limit, color) in coloring {
        let mib: f64 = match limit.trim().parse() {
            Ok(mib) => mib,
            Err(_) => bail!("Invalid 'coloring' limit '{}': expected a number of MiB", limit),
        };
        migrated.push((mib * MIB, color.clone()));
    }

    info!("Migrated {} deprecated 'coloring' entries to thresholds", migrated.len());
    Ok((Thresholds::from_spec(ThresholdSpec::Global(migrated)), true))
}
