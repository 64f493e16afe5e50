//! The vnstat status block
//!
//! [`VnstatBlock`] ties the pieces together on every refresh: fetch the
//! report, compute threshold colors from raw byte counts, scale numeric
//! placeholders into units and render the template.

pub mod response;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, trace, warn};

use crate::collectors::vnstat::collector::VnstatCollector;
use crate::collectors::vnstat::errors::VnstatError;
use crate::collectors::vnstat::report::VnstatReport;
use crate::config::normalize::ModuleConfig;
use crate::formatting::template::{RenderContext, Segment};
use crate::formatting::units::{format_units, parse_byte_count};

pub use response::{BlockResponse, FormattedData};

/// Fields aliased by the deprecated `{up}`, `{down}` and `{total}` placeholders
const LEGACY_ALIASES: [(&str, &str); 3] = [("tx", "up"), ("rx", "down"), ("total", "total")];

pub struct VnstatBlock {
    config: ModuleConfig,
    collector: VnstatCollector,
    /// Placeholders still eligible for unit conversion
    active_placeholders: Vec<String>,
    refresh_count: u64,
}

impl VnstatBlock {
    /// Creates a block running the vnstat command named in `config`
    pub fn from_config(config: ModuleConfig) -> Self {
        let collector = VnstatCollector::new(config.command.clone(), config.interface.clone());
        Self::new(config, collector)
    }

    pub fn new(config: ModuleConfig, collector: VnstatCollector) -> Self {
        let active_placeholders = config.placeholders.clone();
        Self {
            config,
            collector,
            active_placeholders,
            refresh_count: 0,
        }
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn active_placeholders(&self) -> &[String] {
        &self.active_placeholders
    }

    /// Runs vnstat and returns the parsed report
    pub async fn fetch_report(&mut self) -> Result<VnstatReport> {
        self.collector
            .fetch()
            .await
            .context("Failed to fetch vnstat data")
    }

    /// Fetches fresh data and renders the block
    pub async fn refresh(&mut self) -> Result<BlockResponse> {
        let report = self.fetch_report().await?;
        let response = self
            .render_report(report, Utc::now())
            .context("Failed to render vnstat data")?;
        Ok(response)
    }

    /// Renders an already fetched report
    pub fn render_report(
        &mut self,
        report: VnstatReport,
        now: DateTime<Utc>,
    ) -> Result<BlockResponse, VnstatError> {
        let data = self.format_report(report)?;
        self.refresh_count += 1;

        let full_text = self.config.template.render(&RenderContext {
            values: &data.values,
            threshold_colors: &data.threshold_colors,
            palette: &self.config.palette,
        });

        let response = BlockResponse {
            full_text,
            color: data.color,
            cached_until: self.cached_until(now),
        };

        info!(
            "Refresh #{} rendered {:?} (cached until {})",
            self.refresh_count,
            response.plain_text(),
            response.cached_until.format("%H:%M:%S")
        );
        Ok(response)
    }

    /// Prepares template values and colors from a report
    ///
    /// Threshold colors are computed on raw byte counts, before scaling.
    /// Placeholders whose value is present but not an integer (timestamps,
    /// interface names, unit labels) are dropped from conversion for good.
    ///
    /// A report without the `rx`/`tx`/`total` fields of the configured
    /// statistics period is rejected. vnstat prints its errors on stdout and
    /// may still exit successfully.
    pub fn format_report(&mut self, report: VnstatReport) -> Result<FormattedData, VnstatError> {
        let prefix = self.config.statistics_prefix;
        let missing: Vec<String> = LEGACY_ALIASES
            .iter()
            .map(|(suffix, _)| format!("{prefix}{suffix}"))
            .filter(|key| report.get(key).is_none())
            .collect();
        if !missing.is_empty() {
            warn!("Rejecting vnstat report without {}", missing.join(", "));
            return Err(VnstatError::IncompleteReport {
                missing: missing.join(", "),
                line: report.line().to_string(),
            });
        }

        let mut values = report.into_map();
        for (suffix, alias) in LEGACY_ALIASES {
            if let Some(value) = values.get(&format!("{prefix}{suffix}")).cloned() {
                values.insert(alias.to_string(), value);
            }
        }

        let color = if self.config.legacy_coloring {
            values
                .get("total")
                .and_then(|raw| self.config.thresholds.color_for_raw("total", raw))
                .and_then(|name| self.config.palette.resolve(name))
        } else {
            None
        };

        let mut threshold_colors = std::collections::HashMap::new();
        for name in &self.config.threshold_targets {
            let Some(raw) = values.get(name) else {
                continue;
            };
            if let Some(hex) = self
                .config
                .thresholds
                .color_for_raw(name, raw)
                .and_then(|color| self.config.palette.resolve(color))
            {
                trace!("Threshold color for '{}' ({}): {}", name, raw, hex);
                threshold_colors.insert(name.clone(), hex);
            }
        }

        let before = self.active_placeholders.len();
        self.active_placeholders.retain(|name| {
            let Some(raw) = values.get(name) else {
                return true;
            };
            match parse_byte_count(raw) {
                Some(bytes) => {
                    let scaled = format_units(bytes);
                    values.insert(format!("{name}_unit"), scaled.unit.clone());
                    values.insert(name.clone(), scaled.value_text());
                    true
                }
                None => false,
            }
        });
        if self.active_placeholders.len() != before {
            debug!(
                "Stopped converting {} non-numeric placeholders",
                before - self.active_placeholders.len()
            );
        }

        Ok(FormattedData {
            values,
            threshold_colors,
            color,
        })
    }

    /// Builds the response shown when a refresh fails
    pub fn error_response(&self, err: &anyhow::Error, now: DateTime<Utc>) -> BlockResponse {
        BlockResponse {
            full_text: vec![Segment::new(
                format!("vnstat: {}", err.root_cause()),
                self.config.palette.resolve("bad"),
            )],
            color: None,
            cached_until: self.cached_until(now),
        }
    }

    fn cached_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        // Clamped to u32 seconds so the addition cannot overflow
        let seconds = self.config.cache_timeout.min(u64::from(u32::MAX));
        now + Duration::seconds(seconds as i64)
    }
}
