//! Command implementations for cert-convert

pub mod convert;
pub mod inspect;
pub mod list;

pub use convert::{run_convert, run_interactive};
pub use inspect::run_inspect;
pub use list::{run_list, run_targets};
