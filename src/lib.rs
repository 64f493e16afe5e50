//! vnStat traffic statistics as a status bar block
//!
//! Runs `vnstat --oneline b`, scales byte counts into binary units, applies
//! color thresholds and renders a configurable template in the i3bar protocol.

pub mod block;
pub mod cli;
pub mod collectors;
pub mod config;
pub mod formatting;
pub mod output;
