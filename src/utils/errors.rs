//! User-Friendly Error Formatting
//!
//! Turns fatal session errors into a boxed message with likely causes and
//! next steps. Typed errors anywhere in the `anyhow` chain pick the
//! category; otherwise the message text decides.

use std::fmt::Write;

use crate::input::LandmarkError;
use crate::platform::PlatformError;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Error category shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Landmark recording could not be read or parsed
    Recording,
    /// Configuration or controls file problem
    Config,
    /// Cursor, click or window-enumeration failure
    Platform,
    /// Anything else
    Other,
}

/// Pick the category for an error chain
pub fn categorize(error: &anyhow::Error) -> ErrorCategory {
    for cause in error.chain() {
        if cause.downcast_ref::<LandmarkError>().is_some() {
            return ErrorCategory::Recording;
        }
        if cause.downcast_ref::<PlatformError>().is_some() {
            return ErrorCategory::Platform;
        }
        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return ErrorCategory::Config;
        }
    }

    let message = format!("{:#}", error).to_lowercase();
    if message.contains("config") || message.contains("controls") {
        ErrorCategory::Config
    } else if message.contains("recording") || message.contains("replay") {
        ErrorCategory::Recording
    } else {
        ErrorCategory::Other
    }
}

/// Format error for user consumption
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(output).ok();
    writeln!(output, "╔════════════════════════════════════════════════════════════╗").ok();
    writeln!(output, "║                     ERROR                                  ║").ok();
    writeln!(output, "╚════════════════════════════════════════════════════════════╝").ok();
    writeln!(output).ok();

    match categorize(error) {
        ErrorCategory::Recording => format_recording_error(&mut output),
        ErrorCategory::Config => format_config_error(&mut output),
        ErrorCategory::Platform => format_platform_error(&mut output),
        ErrorCategory::Other => format_generic_error(&mut output, &error.to_string()),
    }

    writeln!(output).ok();
    writeln!(output, "{}", RULE).ok();
    writeln!(output, "Technical Details:").ok();
    writeln!(output).ok();
    writeln!(output, "{:#}", error).ok();
    writeln!(output).ok();
    writeln!(output, "{}", RULE).ok();
    writeln!(output, "Need Help?").ok();
    writeln!(output, "  - Run with --verbose for detailed logs: lamco-gaze-cursor -vvv").ok();
    writeln!(output, "  - Write logs to a file: lamco-gaze-cursor --log-file session.log").ok();
    writeln!(output, "╚════════════════════════════════════════════════════════════╝").ok();

    output
}

fn format_recording_error(output: &mut String) {
    writeln!(output, "Landmark Recording Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not replay the landmark recording.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Recording file not found").ok();
    writeln!(output, "     → Check the --replay path or [session] replay in config.toml").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Malformed line").ok();
    writeln!(output, "     → Each line must be one JSON object with a t_ms field").ok();
    writeln!(output, "     → The failing line number is shown below").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Timestamps out of order").ok();
    writeln!(output, "     → t_ms must never decrease from one line to the next").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with a configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Configuration file not found").ok();
    writeln!(output, "     → Specify: lamco-gaze-cursor -c /path/to/config.toml").ok();
    writeln!(output, "     → Print defaults: lamco-gaze-cursor --print-config").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, unclosed [sections]").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Invalid value").ok();
    writeln!(output, "     → log level must be trace, debug, info, warn or error").ok();
    writeln!(output, "     → frame_rate must be between 1 and 240").ok();
}

fn format_platform_error(output: &mut String) {
    writeln!(output, "Platform Error").ok();
    writeln!(output).ok();
    writeln!(output, "The cursor or click interface failed.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Screen size unavailable").ok();
    writeln!(output, "     → Set screen_width and screen_height under [session]").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Input injection not permitted").ok();
    writeln!(output, "     → Grant accessibility or input permissions to the host").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Session Error").ok();
    writeln!(output).ok();
    writeln!(output, "An error occurred while running the session.").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_recording_error_by_type() {
        let error = anyhow::Error::new(LandmarkError::InvalidFrame {
            line: 4,
            reason: "bad".into(),
        })
        .context("Failed to open session input");
        assert_eq!(categorize(&error), ErrorCategory::Recording);

        let formatted = format_user_error(&error);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("Landmark Recording Error"));
        assert!(formatted.contains("line 4"));
    }

    #[test]
    fn test_config_error_by_message() {
        let result: anyhow::Result<()> =
            Err(anyhow::anyhow!("Invalid log level: loud")).context("Invalid config file: a.toml");
        let error = result.unwrap_err();
        assert_eq!(categorize(&error), ErrorCategory::Config);
        assert!(format_user_error(&error).contains("Configuration Error"));
    }

    #[test]
    fn test_generic_error() {
        let error = anyhow::anyhow!("something odd");
        assert_eq!(categorize(&error), ErrorCategory::Other);
        assert!(format_user_error(&error).contains("Error: something odd"));
    }
}
