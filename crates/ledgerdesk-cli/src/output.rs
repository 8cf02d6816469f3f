//! Terminal output for session commands.
//!
//! Human-readable lines go to stdout; notices about the session itself
//! go to stderr so piped JSON stays clean.

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use ledgerdesk_http::ApiResponse;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a notice to stderr.
pub fn notice(msg: &str) {
    eprintln!("{} {}", "!".yellow().bold(), msg);
}

/// Print a labeled field, or `-` when the value is absent.
pub fn field(label: &str, value: Option<&str>) {
    println!("{}: {}", label.dimmed(), value.unwrap_or("-"));
}

/// Print a JSON document, pretty-printed unless `compact`.
pub fn document(value: &Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

/// Print an API response: its JSON body, its raw text, or a status line
/// when the body is empty.
pub fn response(response: &ApiResponse, path: &str, compact: bool) -> Result<()> {
    match response.json_value() {
        Some(body) => document(&body, compact)?,
        None if response.bytes().is_empty() => {
            success(&format!("{} {}", response.status(), path));
        }
        None => println!("{}", response.text()),
    }
    Ok(())
}
