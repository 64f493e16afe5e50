//! Threshold based coloring
//!
//! Thresholds map raw numeric values (byte counts, before unit scaling) to
//! color names. They can be configured as a single list applied to every
//! placeholder, or as a table of lists keyed by placeholder name.

use log::trace;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One `(limit, color)` pair
pub type Threshold = (f64, String);

/// Threshold configuration as written by the user
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdSpec {
    /// `thresholds = [[838860800, "degraded"], [943718400, "bad"]]`
    Global(Vec<Threshold>),
    /// `[thresholds]` table with one list per placeholder
    PerPlaceholder(BTreeMap<String, Vec<Threshold>>),
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        ThresholdSpec::Global(Vec::new())
    }
}

impl ThresholdSpec {
    /// Returns true when no threshold is configured at all
    pub fn is_empty(&self) -> bool {
        match self {
            ThresholdSpec::Global(list) => list.is_empty(),
            ThresholdSpec::PerPlaceholder(table) => table.values().all(Vec::is_empty),
        }
    }
}

/// Normalized thresholds with every list sorted by ascending limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    global: Vec<Threshold>,
    by_name: BTreeMap<String, Vec<Threshold>>,
}

impl Thresholds {
    pub fn from_spec(spec: ThresholdSpec) -> Self {
        match spec {
            ThresholdSpec::Global(list) => Self {
                global: sorted(list),
                by_name: BTreeMap::new(),
            },
            ThresholdSpec::PerPlaceholder(table) => Self {
                global: Vec::new(),
                by_name: table
                    .into_iter()
                    .map(|(name, list)| (name, sorted(list)))
                    .collect(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.by_name.values().all(Vec::is_empty)
    }

    /// Returns the color of the highest threshold not above `value`
    ///
    /// A placeholder specific list takes precedence over the global list.
    /// Values below every limit get no color.
    pub fn color_for(&self, name: &str, value: f64) -> Option<&str> {
        let list = self.by_name.get(name).unwrap_or(&self.global);

        let color = list
            .iter()
            .take_while(|(limit, _)| value >= *limit)
            .last()
            .map(|(_, color)| color.as_str());

        trace!("Threshold lookup for '{}' = {}: {:?}", name, value, color);
        color
    }

    /// Same as [`Thresholds::color_for`] for a raw, unparsed field
    pub fn color_for_raw(&self, name: &str, raw: &str) -> Option<&str> {
        let value = raw.trim().parse::<f64>().ok()?;
        self.color_for(name, value)
    }
}

fn sorted(mut list: Vec<Threshold>) -> Vec<Threshold> {
    list.sort_by(|a, b| a.0.total_cmp(&b.0));
    list
}
