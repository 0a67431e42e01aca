//! Output formatting for CLI commands.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

/// Output mode for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Markdown,
}

impl OutputMode {
    pub fn from_flags(json: bool, md: bool) -> Self {
        if json {
            OutputMode::Json
        } else if md {
            OutputMode::Markdown
        } else {
            OutputMode::Human
        }
    }
}

/// Print any serializable value as pretty JSON.
pub fn output_json<T: Serialize + ?Sized>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize to JSON: {}", e)),
    }
}

/// Render rows as a GitHub-flavored markdown table.
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let escape = |cell: &str| cell.replace('|', "\\|").replace('\n', " ");
    let mut out = format!("| {} |\n", headers.join(" | "));
    out.push_str(&format!("|{}\n", " --- |".repeat(headers.len())));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

/// Print rows as a terminal table, or markdown in markdown mode.
pub fn print_table(mode: OutputMode, headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    if mode == OutputMode::Markdown {
        print!("{}", markdown_table(headers, &rows));
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

pub fn print_success(msg: &str) {
    println!("{} {}", "OK".green().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".yellow().bold(), msg);
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_header(mode: OutputMode, title: &str) {
    match mode {
        OutputMode::Markdown => println!("\n## {}\n", title),
        _ => println!("\n{}\n", title.bold()),
    }
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

pub fn print_hint(msg: &str) {
    println!("{}", msg.dimmed());
}
