//! Color name resolution
//!
//! Resolves the color names used in templates and thresholds into the hex
//! values understood by i3bar.

use log::debug;
use serde::Deserialize;

/// Common named colors accepted in templates
const NAMED_COLORS: &[(&str, &str)] = &[
    ("aqua", "#00FFFF"),
    ("black", "#000000"),
    ("blue", "#0000FF"),
    ("crimson", "#DC143C"),
    ("cyan", "#00FFFF"),
    ("darkblue", "#00008B"),
    ("darkgray", "#A9A9A9"),
    ("darkgreen", "#006400"),
    ("darkgrey", "#A9A9A9"),
    ("darkorange", "#FF8C00"),
    ("darkred", "#8B0000"),
    ("deepskyblue", "#00BFFF"),
    ("dimgray", "#696969"),
    ("dimgrey", "#696969"),
    ("dodgerblue", "#1E90FF"),
    ("gold", "#FFD700"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("grey", "#808080"),
    ("hotpink", "#FF69B4"),
    ("lightblue", "#ADD8E6"),
    ("lightgray", "#D3D3D3"),
    ("lightgreen", "#90EE90"),
    ("lightgrey", "#D3D3D3"),
    ("lime", "#00FF00"),
    ("magenta", "#FF00FF"),
    ("orange", "#FFA500"),
    ("orangered", "#FF4500"),
    ("pink", "#FFC0CB"),
    ("purple", "#800080"),
    ("red", "#FF0000"),
    ("silver", "#C0C0C0"),
    ("skyblue", "#87CEEB"),
    ("steelblue", "#4682B4"),
    ("tomato", "#FF6347"),
    ("violet", "#EE82EE"),
    ("white", "#FFFFFF"),
    ("yellow", "#FFFF00"),
];

/// The status colors `good`, `degraded` and `bad`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub good: String,
    pub degraded: String,
    pub bad: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            good: "#00FF00".to_string(),
            degraded: "#FFFF00".to_string(),
            bad: "#FF0000".to_string(),
        }
    }
}

impl ColorPalette {
    /// Resolves a color name or hex value
    ///
    /// Hex values are normalized to uppercase `#RRGGBB`. Unknown names
    /// resolve to `None` so the text is left uncolored.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let name = name.trim();

        if let Some(hex) = name.strip_prefix('#') {
            return normalize_hex(hex);
        }

        let lower = name.to_ascii_lowercase();
        let resolved = match lower.as_str() {
            "good" => normalize_hex(self.good.trim_start_matches('#')),
            "degraded" => normalize_hex(self.degraded.trim_start_matches('#')),
            "bad" => normalize_hex(self.bad.trim_start_matches('#')),
            other => NAMED_COLORS
                .iter()
                .find(|(known, _)| *known == other)
                .map(|(_, hex)| hex.to_string()),
        };

        if resolved.is_none() {
            debug!("Unknown color name '{}'", name);
        }
        resolved
    }
}

fn normalize_hex(hex: &str) -> Option<String> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => Some(format!("#{}", hex.to_ascii_uppercase())),
        3 => {
            let expanded: String = hex
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_ascii_uppercase();
            Some(format!("#{}", expanded))
        }
        _ => None,
    }
}
