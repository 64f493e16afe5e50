use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for the vnstat-status application
/// Uses clap's derive macros for automatic CLI generation
#[derive(Parser)]
#[command(author = "Kaipo Chen")]
#[command(version)] // Automatically uses version from Cargo.toml
#[command(about = "vnStat status block - Show daily, monthly and all-time traffic totals in your status bar")]
#[command(long_about = "vnstat-status runs `vnstat --oneline b`, scales the byte counters into \
KiB/MiB/GiB, colors them using configurable thresholds and renders them through a bracketed \
template. Output follows the i3bar protocol, so it works with i3bar and swaybar.")]
pub struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/vnstat-status/config.toml)
    #[arg(short, long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands for the vnstat-status application
#[derive(Subcommand)]
pub enum Commands {
    /// Continuous i3bar protocol output
    /// Refreshes whenever the cached response expires
    #[command(about = "Print status lines in the i3bar protocol")]
    #[command(long_about = "Prints the i3bar protocol header followed by one status line per refresh. \
The block refreshes when its cache_timeout expires. Failed refreshes are shown as an error block \
and retried on the next cycle.\n\n\
Examples:\n  \
vnstat-status run                      # Use the default configuration\n  \
vnstat-status run --interval 60        # Refresh every minute\n  \
vnstat-status -c ~/vnstat.toml run     # Use a specific configuration file")]
    Run {
        /// Override the configured cache_timeout (in seconds)
        #[arg(short = 'i', long, help = "Refresh interval in seconds, overrides cache_timeout")]
        interval: Option<u64>,

        /// Block name reported to the bar
        #[arg(long, default_value = "vnstat", help = "Block name in i3bar output")]
        name: String,
    },

    /// Single refresh
    #[command(about = "Refresh once and print the status text")]
    Once {
        /// Print the full response as JSON instead of plain text
        #[arg(short, long, help = "Print the response as JSON")]
        json: bool,
    },

    /// Diagnostic listing of the vnstat report
    #[command(about = "List vnstat fields and template placeholders with their values")]
    Placeholders,
}
