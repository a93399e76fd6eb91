//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only active with `--verbose`
//! - `status_success` / `status_error` for timestamped edit outcomes
//!
//! # Example
//!
//! ```ignore
//! log!("preview"; "listening on http://{}", addr);
//! debug!("ws"; "broadcast to {} observers", count);
//! status_success("updated src/App.tsx (3 observers)");
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "preview" | "studio" => prefix.bright_blue().bold().to_string(),
        "update" | "patch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Edit status (timestamped outcome lines)
// ============================================================================

/// Current UTC time formatted as HH:MM:SS
fn now() -> String {
    let dt = crate::utils::date::DateTimeUtc::from_unix_millis(crate::utils::date::unix_millis());
    format!("{:02}:{:02}:{:02}", dt.hour, dt.minute, dt.second)
}

fn status_line(symbol: String, message: &str) -> String {
    let timestamp = format!("[{}]", now()).dimmed().to_string();
    format!("{timestamp} {symbol} {message}")
}

/// Print a success line (✓ prefix, green).
pub fn status_success(message: &str) {
    let line = status_line(format!("{}", "✓".green()), message);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

/// Print an error line (✗ prefix, red) with optional detail.
pub fn status_error(summary: &str, detail: &str) {
    let message = if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    };
    let line = status_line(format!("{}", "✗".red()), &message);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_format() {
        let now = now();
        assert_eq!(now.len(), 8);
        assert_eq!(now.matches(':').count(), 2);
    }

    #[test]
    fn test_status_line_contains_message() {
        let line = status_line("*".to_string(), "updated src/App.tsx");
        assert!(line.ends_with("* updated src/App.tsx"));
    }

    #[test]
    fn test_prefix_keeps_module_name() {
        let prefix = colorize_prefix("Preview", "preview");
        assert!(prefix.contains("[Preview]"));
    }
}
