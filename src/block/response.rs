//! Block output handed to the status bar

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::formatting::template::{Segment, plain_text};

/// Result of one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockResponse {
    /// Rendered template
    pub full_text: Vec<Segment>,
    /// Color for segments without their own color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// When the block should be refreshed next
    pub cached_until: DateTime<Utc>,
}

impl BlockResponse {
    pub fn plain_text(&self) -> String {
        plain_text(&self.full_text)
    }
}

/// Values prepared for the template from one vnstat report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedData {
    /// Display values: scaled numbers, `*_unit` labels and raw text fields
    pub values: HashMap<String, String>,
    /// Resolved threshold colors keyed by placeholder name
    pub threshold_colors: HashMap<String, String>,
    /// Block color from the deprecated `coloring` option
    pub color: Option<String>,
}
