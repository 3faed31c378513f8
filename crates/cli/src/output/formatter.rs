//! Output formatter for human-readable and JSON output

use jiff::Timestamp;
use serde::Serialize;

use sd_core::{EntityKind, Error};

use super::OutputConfig;
use crate::exit_code::ExitCode;

const RESET: &str = "\x1b[0m";

/// Formatter for CLI output
///
/// In JSON mode every command prints exactly one document on stdout and
/// errors go to stderr as JSON objects, never colored.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

/// Error report in JSON mode
#[derive(Serialize)]
struct Failure<'a> {
    error: &'a str,
    code: i32,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.colors_enabled() {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Report a completed change
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{} {message}", self.paint("\x1b[32m", "✓"));
    }

    /// Report a problem that is not a core error; printed even in quiet mode
    pub fn error(&self, message: &str) {
        self.report(message, ExitCode::GeneralError);
    }

    /// Report a core error together with the exit code it maps to
    pub fn failure(&self, error: &Error, code: ExitCode) {
        self.report(&error.to_string(), code);
    }

    fn report(&self, message: &str, code: ExitCode) {
        if self.config.json {
            let failure = Failure {
                error: message,
                code: code.as_i32(),
            };
            match serde_json::to_string(&failure) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{message}"),
            }
        } else {
            eprintln!("{} {message}", self.paint("\x1b[31m", "✗"));
        }
    }

    /// Print one JSON document
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }

    /// Name of an entity in a listing
    ///
    /// Containers end in '/' and each container kind gets its own color, so
    /// sites, container groups and lists can be told apart at a glance.
    pub fn name(&self, kind: EntityKind, name: &str) -> String {
        let style = match kind {
            EntityKind::Site => "\x1b[1;35m",
            EntityKind::Group => "\x1b[36m",
            EntityKind::List | EntityKind::Folder => "\x1b[1;34m",
            EntityKind::Item | EntityKind::File => return name.to_string(),
        };
        self.paint(style, &format!("{name}/"))
    }
}

/// Render a byte count for humans
pub fn format_size(size: u64) -> String {
    humansize::format_size(size, humansize::BINARY)
}

/// Render a timestamp in the listing layout
pub fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Formatter {
        Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_json_mode_disables_colors() {
        let formatter = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(formatter.is_json());
        assert!(!formatter.colors_enabled());
        assert!(Formatter::default().colors_enabled());
    }

    #[test]
    fn test_names_without_color() {
        let formatter = plain();
        assert_eq!(formatter.name(EntityKind::Folder, "Reports"), "Reports/");
        assert_eq!(formatter.name(EntityKind::Group, "Lists"), "Lists/");
        assert_eq!(formatter.name(EntityKind::File, "q1.txt"), "q1.txt");
    }

    #[test]
    fn test_names_with_color() {
        let formatter = Formatter::default();
        assert_eq!(
            formatter.name(EntityKind::Site, "Team"),
            "\x1b[1;35mTeam/\x1b[0m"
        );
        assert_eq!(formatter.name(EntityKind::Item, "1_"), "1_");
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(2048), "2 KiB");
        let timestamp: Timestamp = "2024-04-10T16:30:00Z".parse().unwrap();
        assert_eq!(format_timestamp(timestamp), "2024-04-10 16:30:00");
    }
}
