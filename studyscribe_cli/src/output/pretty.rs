//! Indented key/value rendering for reports that arrive as JSON.

use owo_colors::OwoColorize;
use serde_json::Value;

const INDENT: usize = 2;

pub fn format_pretty(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, None, value, 0);
    out.trim_end().to_string()
}

fn write_value(out: &mut String, key: Option<&str>, value: &Value, depth: usize) {
    let pad = " ".repeat(depth * INDENT);
    let label = key
        .map(|k| format!("{}{}", humanize(k).bold(), ":".dimmed()))
        .unwrap_or_default();

    match value {
        Value::Object(map) => {
            if key.is_some() {
                out.push_str(&format!("{}{}\n", pad, label));
            }
            let child_depth = if key.is_some() { depth + 1 } else { depth };
            for (k, v) in map {
                write_value(out, Some(k), v, child_depth);
            }
        }
        Value::Array(items) if items.is_empty() => {
            out.push_str(&format!("{}{} {}\n", pad, label, "(none)".dimmed()));
        }
        Value::Array(items) => {
            out.push_str(&format!("{}{}\n", pad, label));
            for item in items {
                write_value(out, None, item, depth + 1);
            }
        }
        scalar => {
            let rendered = scalar_text(scalar);
            if key.is_some() {
                out.push_str(&format!("{}{} {}\n", pad, label, rendered));
            } else {
                out.push_str(&format!("{}- {}\n", pad, rendered));
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "-".dimmed().to_string(),
        Value::Bool(true) => "yes".green().to_string(),
        Value::Bool(false) => "no".yellow().to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `monthly_limit` -> `Monthly limit`
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
