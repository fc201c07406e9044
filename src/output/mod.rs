//! Output formatting
//!
//! Renders check results and run summaries for the terminal.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
