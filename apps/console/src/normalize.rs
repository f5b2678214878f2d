//! Shape-tolerant conversion of loosely-typed backend fields into display
//! values. Extraction pipelines have emitted the same field as a string, a
//! list, or a keyed object across versions, so every function here is total:
//! any JSON shape in, a usable value out, never an error.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Classification of a flexible field. Every JSON value falls in exactly one
/// arm, which keeps the normalization rules exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flex<'a> {
    /// Missing key or explicit `null`.
    Absent,
    Text(&'a str),
    Items(&'a [Value]),
    Record(&'a Map<String, Value>),
    /// Number or boolean.
    Scalar(&'a Value),
}

pub fn classify(value: Option<&Value>) -> Flex<'_> {
    match value {
        None | Some(Value::Null) => Flex::Absent,
        Some(Value::String(text)) => Flex::Text(text),
        Some(Value::Array(items)) => Flex::Items(items),
        Some(Value::Object(record)) => Flex::Record(record),
        Some(other) => Flex::Scalar(other),
    }
}

/// One display string for any JSON value. Strings pass through, scalars
/// stringify, containers render as compact JSON, null becomes empty.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

/// JS-style boolean coercion. Backends have sent `inferred` as `true`, `1`
/// and `"1"` interchangeably.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Field that should read as a list of strings: lists map element-wise,
/// a lone value wraps into a one-element list, absence is the empty list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match classify(value) {
        Flex::Absent => Vec::new(),
        Flex::Items(items) => items.iter().map(display_string).collect(),
        Flex::Text(text) => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            }
        }
        Flex::Record(record) => vec![display_string(&Value::Object(record.clone()))],
        Flex::Scalar(other) => vec![display_string(other)],
    }
}

/// Highlights arrive either as plain strings or as requirement-like records.
/// Records flatten to `skill | importance N | inferred`, keeping whichever
/// parts are present; a record with none of the known keys falls back to its
/// compact JSON form.
pub fn highlight_list(value: Option<&Value>) -> Vec<String> {
    match classify(value) {
        Flex::Absent => Vec::new(),
        Flex::Items(items) => items.iter().map(highlight_entry).collect(),
        _ => string_list(value),
    }
}

fn highlight_entry(item: &Value) -> String {
    let Value::Object(record) = item else {
        return display_string(item);
    };
    let mut parts: Vec<String> = Vec::new();
    let skill = record
        .get("skill")
        .or_else(|| record.get("name"))
        .filter(|v| !v.is_null());
    if let Some(skill) = skill {
        let text = display_string(skill);
        if !text.is_empty() {
            parts.push(text);
        }
    }
    if let Some(importance) = record.get("importance").filter(|v| !v.is_null()) {
        parts.push(format!("importance {}", display_string(importance)));
    }
    if let Some(inferred) = record.get("inferred").filter(|v| !v.is_null()) {
        parts.push(if truthy(inferred) { "inferred" } else { "explicit" }.to_string());
    }
    if parts.is_empty() {
        display_string(item)
    } else {
        parts.join(" | ")
    }
}

/// Labeled line in an overview panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewEntry {
    pub label: String,
    pub value: String,
}

/// Overview payloads have shipped as arrays, keyed objects and bare strings.
/// Arrays label entries `Item N`, objects reuse their keys in title case,
/// and a bare value becomes a single `Summary` entry. Blank values drop out.
pub fn overview_entries(value: Option<&Value>) -> Vec<OverviewEntry> {
    match classify(value) {
        Flex::Absent => Vec::new(),
        Flex::Items(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                entry(format!("Item {}", index + 1), display_string(item))
            })
            .collect(),
        Flex::Record(record) => record
            .iter()
            .filter_map(|(key, item)| entry(title_case_label(key), display_string(item)))
            .collect(),
        Flex::Text(text) => entry("Summary".to_string(), text.to_string())
            .into_iter()
            .collect(),
        Flex::Scalar(other) => entry("Summary".to_string(), display_string(other))
            .into_iter()
            .collect(),
    }
}

fn entry(label: String, value: String) -> Option<OverviewEntry> {
    let value = value.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(OverviewEntry { label, value })
    }
}

/// Single-line rendering of an overview, `Label: value | Label: value`.
/// `None` when there is nothing to show.
pub fn join_overview(entries: &[OverviewEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .map(|e| format!("{}: {}", e.label, e.value))
            .collect::<Vec<_>>()
            .join(" | "),
    )
}

/// `years_of_experience` -> `Years Of Experience`.
pub fn title_case_label(label: &str) -> String {
    label
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Section body: a free-text block or a list of lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    Text(String),
    List(Vec<String>),
}

/// Named sections of a parsed document. Only a keyed object qualifies;
/// any other shape means the payload has no section structure.
pub fn section_map(value: Option<&Value>) -> Option<BTreeMap<String, SectionValue>> {
    let Flex::Record(record) = classify(value) else {
        return None;
    };
    Some(
        record
            .iter()
            .map(|(key, item)| {
                let section = match item {
                    Value::Array(items) => {
                        SectionValue::List(items.iter().map(display_string).collect())
                    }
                    other => SectionValue::Text(display_string(other)),
                };
                (key.clone(), section)
            })
            .collect(),
    )
}

/// Trimmed non-empty text, or nothing. Used for optional human messages.
pub fn non_empty_text(value: Option<&Value>) -> Option<String> {
    let text = display_string(value?);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
