use crate::block::VnstatBlock;
use crate::collectors::vnstat::PathLocator;
use crate::config::{ModuleConfig, Settings};
use crate::formatting::units::{format_units, parse_byte_count};
use crate::output::i3bar::{I3barWriter, to_blocks};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Shortest pause between refreshes of the i3bar loop
const MIN_REFRESH_WAIT: Duration = Duration::from_secs(1);

/// Time to sleep before the next refresh
///
/// An explicit interval wins over `cached_until`. Either way the wait never
/// drops below [`MIN_REFRESH_WAIT`], so a zero timeout cannot spin the loop.
fn next_wait(interval: Option<u64>, cached_until: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let wait = match interval {
        Some(seconds) => Duration::from_secs(seconds),
        None => (cached_until - now).to_std().unwrap_or(Duration::ZERO),
    };
    wait.max(MIN_REFRESH_WAIT)
}

pub struct StatusCommandHandler {
    block: VnstatBlock,
}

impl StatusCommandHandler {
    /// Loads and normalizes configuration, failing early if vnstat is missing
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let settings = Settings::load(config_path)?;
        let config = ModuleConfig::normalize(settings, &PathLocator)
            .context("Failed to initialize vnstat block")?;

        Ok(Self {
            block: VnstatBlock::from_config(config),
        })
    }

    /// Runs the i3bar loop until interrupted
    pub async fn handle_run_command(&mut self, interval: Option<u64>, name: &str) -> Result<()> {
        let mut writer = I3barWriter::new(io::stdout());
        writer.write_header()?;

        loop {
            let response = match self.block.refresh().await {
                Ok(response) => response,
                Err(e) => {
                    error!("Refresh failed: {e:#}");
                    self.block.error_response(&e, Utc::now())
                }
            };

            writer.write_status(&to_blocks(name, &response))?;

            let wait = next_wait(interval, response.cached_until, Utc::now());

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping");
                    return Ok(());
                }
            }
        }
    }

    pub async fn handle_once_command(&mut self, json: bool) -> Result<()> {
        let response = self.block.refresh().await?;

        if json {
            let text = serde_json::to_string_pretty(&response)
                .context("Failed to serialize response")?;
            println!("{text}");
        } else {
            println!("{}", response.plain_text());
        }

        Ok(())
    }

    pub async fn handle_placeholders_command(&mut self) -> Result<()> {
        let report = self.block.fetch_report().await?;

        println!("vnstat Report");
        println!("=============");
        for (key, raw) in report.iter() {
            match parse_byte_count(raw) {
                Some(bytes) => println!("  {key:<18} {raw:>16}  {}", format_units(bytes)),
                None => println!("  {key:<18} {raw:>16}"),
            }
        }

        let data = self.block.format_report(report)?;

        println!("\nTemplate Placeholders");
        println!("=====================");
        println!("  Template: {}", self.block.config().template.source());
        for name in &self.block.config().placeholders {
            let value = data.values.get(name).map(String::as_str).unwrap_or("(missing)");
            match data.threshold_colors.get(name) {
                Some(color) => println!("  {name:<22} {value}  [{color}]"),
                None => println!("  {name:<22} {value}"),
            }
        }

        Ok(())
    }
}
