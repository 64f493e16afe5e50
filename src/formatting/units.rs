//! Unit conversion for traffic counters
//!
//! This module turns raw byte counts reported by vnstat into human-readable
//! binary units (B, KiB, MiB, GiB, ...). It is shared by the status block and
//! the diagnostic CLI output so both render numbers identically.

use std::fmt;

/// Binary prefixes applied once a value reaches the cutoff
const PREFIXES: [&str; 8] = ["K", "M", "G", "T", "P", "E", "Z", "Y"];

/// Values below this magnitude are shown as-is in the current unit
const CUTOFF: f64 = 1000.0;

/// Size of one binary prefix step
const BINARY_SIZE: f64 = 1024.0;

/// A byte count scaled into a human-readable unit
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledValue {
    /// Numeric value in `unit`, rounded to one decimal when scaled
    pub value: f64,
    /// Unit label, e.g. "B", "KiB", "MiB"
    pub unit: String,
    /// Whether the value was divided into a larger unit
    pub scaled: bool,
}

impl ScaledValue {
    /// Renders only the numeric part
    ///
    /// Scaled values always carry exactly one decimal (`1.0`, `954.6`), while
    /// plain byte counts are rendered as integers (`512`).
    pub fn value_text(&self) -> String {
        if self.scaled {
            format!("{:.1}", self.value)
        } else {
            format!("{:.0}", self.value)
        }
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value_text(), self.unit)
    }
}

/// Scales a byte count into binary units with one decimal of precision
///
/// Values whose magnitude is below 1000 stay in bytes. Larger values are
/// divided by 1024 until the magnitude drops below 1000, which means a value
/// such as 1000 bytes is shown as `1.0 KiB` rather than `1000 B`.
///
/// # Arguments
///
/// * `bytes` - Raw byte count, as reported by `vnstat --oneline b`
///
/// # Examples
///
/// ```
/// use vnstat_status::formatting::units::format_units;
///
/// assert_eq!(format_units(512).to_string(), "512 B");
/// assert_eq!(format_units(1024).to_string(), "1.0 KiB");
/// assert_eq!(format_units(838_860_800).to_string(), "800.0 MiB");
/// assert_eq!(format_units(1_073_741_824).to_string(), "1.0 GiB");
/// ```
pub fn format_units(bytes: i64) -> ScaledValue {
    if (bytes.unsigned_abs() as f64) < CUTOFF {
        return ScaledValue {
            value: bytes as f64,
            unit: "B".to_string(),
            scaled: false,
        };
    }

    let mut value = bytes as f64 / BINARY_SIZE;
    let mut index = 0;
    while value.abs() >= CUTOFF && index < PREFIXES.len() - 1 {
        value /= BINARY_SIZE;
        index += 1;
    }

    ScaledValue {
        value: (value * 10.0).round() / 10.0,
        unit: format!("{}iB", PREFIXES[index]),
        scaled: true,
    }
}

/// Parses a raw vnstat field as an integer byte count
///
/// Returns `None` for timestamps, interface names and anything else that is
/// not a plain integer.
pub fn parse_byte_count(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
