//! Parsing of `vnstat --oneline b` reports
//!
//! vnstat 1.x prints a single semicolon separated line whose fields are
//! positional:
//!
//! ```text
//! 1;eno1;2019-02-04;1000965325;61027123;1061992448;28060;2019-02;...
//! ```

use log::{debug, trace};
use std::collections::HashMap;

use crate::collectors::vnstat::errors::VnstatError;

/// Field names of the oneline report, in output order
pub const FIELD_KEYS: [&str; 15] = [
    "version",
    "interface",
    "daily_timestamp",
    "daily_rx",
    "daily_tx",
    "daily_total",
    "daily_avg",
    "monthly_timestamp",
    "monthly_rx",
    "monthly_tx",
    "monthly_total",
    "monthly_avg",
    "all_time_rx",
    "all_time_tx",
    "all_time_total",
];

/// One parsed vnstat report
///
/// Fields keep the report order. Fields missing from a short line are simply
/// absent, and fields beyond [`FIELD_KEYS`] are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VnstatReport {
    line: String,
    fields: Vec<(String, String)>,
}

impl VnstatReport {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// The report line as printed by vnstat
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Consumes the report into a mutable lookup table
    pub fn into_map(self) -> HashMap<String, String> {
        self.fields.into_iter().collect()
    }
}

/// Parses the output of `vnstat --oneline b`
///
/// Only the first line is considered. An error line such as
/// `Error: Interface "eth9" not found in database.` still parses, as a
/// single `version` field; the block rejects such reports because they lack
/// the traffic fields it needs.
pub fn parse_oneline(output: &str) -> Result<VnstatReport, VnstatError> {
    let line = output
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or(VnstatError::EmptyOutput)?;

    let fields: Vec<(String, String)> = FIELD_KEYS
        .iter()
        .zip(line.split(';'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    if fields.len() < FIELD_KEYS.len() {
        debug!(
            "Short vnstat report: {} of {} fields ({:?})",
            fields.len(),
            FIELD_KEYS.len(),
            line
        );
    }
    trace!("Parsed vnstat report: {:?}", fields);

    Ok(VnstatReport {
        line: line.to_string(),
        fields,
    })
}
