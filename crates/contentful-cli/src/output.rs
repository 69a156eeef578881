use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

/// Reads a JSON document from `path`, or from stdin when no path is given.
pub fn read_json(path: Option<&Path>) -> Result<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid JSON")
}

/// Writes `state` as pretty JSON to `out`, or to stdout.
pub fn write_state(state: &Value, out: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(state)?;
    match out {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            print_success(&format!("State written to {}", path.display()));
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
