//! vnstat collection module
//!
//! - `collector`: runs `vnstat --oneline b` through a pluggable command runner
//! - `report`: parses the semicolon separated oneline report
//! - `errors`: error types shared by both

pub mod collector;
pub mod errors;
pub mod report;

pub use collector::{
    CommandLocator, CommandOutput, CommandRunner, PathLocator, TokioCommandRunner,
    VnstatCollector,
};
pub use errors::VnstatError;
pub use report::{FIELD_KEYS, VnstatReport, parse_oneline};
