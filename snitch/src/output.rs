//! Output formatting: plain text (human-readable) and JSON.

use serde_json::{to_value, Value};
use snitch_lib::{format_timestamp_display, Snitch};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tables and key-value
    #[default]
    Plain,
    /// JSON (pretty-printed)
    Json,
}

/// How results are rendered for the current invocation.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub format: OutputFormat,
    pub use_utc: bool,
}

impl View {
    pub fn print_snitches(&self, snitches: &[Snitch]) -> Result<(), String> {
        match self.format {
            OutputFormat::Plain => print!("{}", format_snitch_table(snitches, self.use_utc)),
            OutputFormat::Json => {
                let value = to_value(snitches).map_err(|e| e.to_string())?;
                println!("{}", format_json(&value)?);
            }
        }
        Ok(())
    }

    pub fn print_snitch(&self, snitch: &Snitch) -> Result<(), String> {
        match self.format {
            OutputFormat::Plain => print!("{}", format_snitch_detail(snitch, self.use_utc)),
            OutputFormat::Json => {
                let value = to_value(snitch).map_err(|e| e.to_string())?;
                println!("{}", format_json(&value)?);
            }
        }
        Ok(())
    }
}

/// Print a raw API response.
pub fn print_value(value: &Value, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Plain => print!("{}", format_plain(value)),
        OutputFormat::Json => println!("{}", format_json(value)?),
    }
    Ok(())
}

const COLUMNS: [(&str, usize); 5] = [
    ("TOKEN", 12),
    ("NAME", 28),
    ("INTERVAL", 10),
    ("STATUS", 9),
    ("LAST CHECK-IN", 26),
];

/// One row per snitch: token, name, interval, status, last check-in.
pub fn format_snitch_table(snitches: &[Snitch], use_utc: bool) -> String {
    let mut out = String::new();
    if snitches.is_empty() {
        let _ = writeln!(out, "<empty>");
        return out;
    }
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = *width))
        .collect();
    let header = header.join(" ");
    let _ = writeln!(out, "{}", header.trim_end());
    let _ = writeln!(out, "{}", "-".repeat(header.len().min(90)));
    for s in snitches {
        let cells = [
            s.token.clone().unwrap_or_else(|| "-".to_string()),
            s.name.clone(),
            s.interval.to_string(),
            s.status.clone().unwrap_or_else(|| "-".to_string()),
            s.checked_in_at
                .as_ref()
                .map(|t| format_timestamp_display(t, use_utc))
                .unwrap_or_else(|| "never".to_string()),
        ];
        let row: Vec<String> = cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(cell, (_, width))| format!("{:<width$}", truncate(cell, *width), width = *width))
            .collect();
        let _ = writeln!(out, "{}", row.join(" ").trim_end());
    }
    out
}

/// Key-value view of one snitch.
pub fn format_snitch_detail(s: &Snitch, use_utc: bool) -> String {
    let mut out = String::new();
    let ts = |t: Option<&_>| {
        t.map(|t| format_timestamp_display(t, use_utc))
            .unwrap_or_else(|| "never".to_string())
    };
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "token: {}", opt(&s.token));
    let _ = writeln!(out, "name: {}", s.name);
    let _ = writeln!(out, "interval: {}", s.interval);
    let _ = writeln!(out, "status: {}", opt(&s.status));
    let _ = writeln!(out, "tags: {}", s.tags.join(", "));
    let _ = writeln!(out, "notes: {}", s.notes);
    let _ = writeln!(out, "check_in_url: {}", opt(&s.check_in_url));
    let _ = writeln!(out, "checked_in_at: {}", ts(s.checked_in_at.as_ref()));
    let _ = writeln!(out, "created_at: {}", ts(s.created_at.as_ref()));
    out
}

/// Format value as plain text (key-value for objects, one line per scalar).
pub fn format_plain(value: &Value) -> String {
    let mut out = String::new();
    format_plain_impl(value, &mut out, 0);
    out
}

fn format_plain_impl(v: &Value, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    match v {
        Value::String(s) if s.is_empty() => {
            let _ = writeln!(out, "{}<empty>", pad);
        }
        Value::Array(arr) if arr.is_empty() => {
            let _ = writeln!(out, "{}<empty>", pad);
        }
        Value::Array(arr) => {
            for item in arr {
                if item.is_object() || item.is_array() {
                    let _ = writeln!(out, "{}-", pad);
                    format_plain_impl(item, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}{}", pad, as_short_str(item));
                }
            }
        }
        Value::Object(map) => {
            for (k, val) in map {
                if val.is_object() || val.is_array() {
                    let _ = writeln!(out, "{}{}:", pad, k);
                    format_plain_impl(val, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}{}: {}", pad, k, as_short_str(val));
                }
            }
        }
        scalar => {
            let _ = writeln!(out, "{}{}", pad, as_short_str(scalar));
        }
    }
}

fn as_short_str(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max {
        s
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// Format value as JSON (pretty).
pub fn format_json(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}
