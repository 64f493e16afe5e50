pub mod vnstat;

pub use vnstat::{VnstatCollector, VnstatError, VnstatReport};
