//! Status bar output

pub mod i3bar;

pub use i3bar::{I3barBlock, I3barWriter, to_blocks};
