//! Formatting utilities for traffic data
//!
//! - `units`: byte counts to KiB/MiB/GiB with one decimal
//! - `thresholds`: raw values to color names
//! - `colors`: color names to hex values
//! - `template`: the bracketed status template engine

pub mod colors;
pub mod template;
pub mod thresholds;
pub mod units;

pub use colors::ColorPalette;
pub use template::{RenderContext, Segment, Template, TemplateError, plain_text};
pub use thresholds::{ThresholdSpec, Thresholds};
pub use units::{ScaledValue, format_units};
