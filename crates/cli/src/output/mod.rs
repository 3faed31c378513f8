//! Output formatting utilities
//!
//! Commands print either human-readable lines or a single JSON document.
//! Flags on the command line win over the defaults in the configuration.

mod formatter;

pub use formatter::{Formatter, format_size, format_timestamp};

use sd_core::{ColorMode, Defaults, OutputMode};

/// Output configuration derived from CLI flags and configured defaults
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Combine the global flags with the configured defaults
    pub fn resolve(json: bool, no_color: bool, quiet: bool, defaults: &Defaults) -> Self {
        let colorless = match defaults.color {
            ColorMode::Always => false,
            ColorMode::Never => true,
            ColorMode::Auto => std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        };
        Self {
            json: json || defaults.output == OutputMode::Json,
            no_color: no_color || colorless,
            quiet,
        }
    }
}
