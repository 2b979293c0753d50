// src/models/schema.rs

//! Parse schemas: declarative row + field extraction definitions.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// A typed value extracted from a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Date(NaiveDateTime),
}

/// One extracted record. Fields that could not be resolved are `None`.
pub type Record = BTreeMap<String, Option<Value>>;

/// How to pull the raw string out of a matched element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extract {
    /// The element's rendered text.
    #[default]
    Text,

    /// A named attribute of the element, e.g. `{ attr = "href" }`.
    Attr(String),
}

/// Conversion applied to the raw extracted string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Raw string, trimmed.
    #[default]
    Identity,

    /// First run of digits with grouping separators stripped.
    Int,

    /// `<number><unit>` size string to a byte count (binary multipliers).
    SizeBytes,

    /// Date/time via the given chrono format, or a set of common fallbacks.
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
}

impl Transform {
    /// Apply the transform. Unparseable input is `None`, never an error.
    pub fn apply(&self, raw: &str) -> Option<Value> {
        let trimmed = raw.trim();
        match self {
            Transform::Identity => Some(Value::Text(trimmed.to_string())),
            Transform::Int => parse_int(trimmed).map(Value::Int),
            Transform::SizeBytes => parse_size_bytes(trimmed).map(Value::Int),
            Transform::Date { format } => {
                parse_date(trimmed, format.as_deref()).map(Value::Date)
            }
        }
    }
}

/// Extraction rule for one field within a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Selector scoped to the row element. Empty means the row itself.
    #[serde(default)]
    pub selector: String,

    /// Raw extraction mode.
    #[serde(default)]
    pub extract: Extract,

    /// Conversion to a typed value.
    #[serde(default)]
    pub transform: Transform,

    /// Resolve the raw value against the site's base URL before the
    /// transform. Tracker listings link rows with relative URLs.
    #[serde(default)]
    pub resolve_url: bool,
}

/// One named extraction unit: repeating rows plus a field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseSchema {
    /// Selector for the repeating container elements.
    pub row_selector: String,

    /// Field name to extraction rule.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRule>,
}

impl ParseSchema {
    /// Parse every selector in the schema once.
    ///
    /// Malformed CSS surfaces here, at compile time, so extraction never
    /// fails per-row. The store calls this at load to reject bad templates
    /// before they reach production use.
    pub fn compile(&self, name: &str) -> Result<CompiledSchema> {
        let row = parse_selector(name, &self.row_selector)?;
        let mut fields = Vec::with_capacity(self.fields.len());
        for (field_name, rule) in &self.fields {
            let selector = if rule.selector.is_empty() {
                None
            } else {
                Some(parse_selector(name, &rule.selector)?)
            };
            fields.push(CompiledField {
                name: field_name.clone(),
                selector,
                rule: rule.clone(),
            });
        }
        Ok(CompiledSchema { row, fields })
    }
}

/// A schema with all selectors parsed, ready for extraction.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) row: Selector,
    pub(crate) fields: Vec<CompiledField>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledField {
    pub(crate) name: String,
    pub(crate) selector: Option<Selector>,
    pub(crate) rule: FieldRule,
}

fn parse_selector(schema: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ProfileError::schema(schema, selector, format!("{e:?}")))
}

/// Extract the first run of digits, skipping grouping separators.
fn parse_int(raw: &str) -> Option<i64> {
    let mut digits = String::new();
    let mut started = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            started = true;
        } else if started && (c == ',' || c == '.') {
            continue;
        } else if started {
            break;
        }
    }
    digits.parse().ok()
}

static SIZE_RE: OnceLock<Regex> = OnceLock::new();

/// Parse a human-readable size like "1.5 GB" into bytes (1 KB = 1024 B).
fn parse_size_bytes(raw: &str) -> Option<i64> {
    let re = SIZE_RE.get_or_init(|| {
        Regex::new(r"(?i)^([0-9]+(?:[.,][0-9]+)?)\s*([KMGT]I?B|B)$").expect("size pattern")
    });
    let caps = re.captures(raw)?;
    let number: f64 = caps[1].replace(',', ".").parse().ok()?;
    let exponent = match caps[2].chars().next()?.to_ascii_uppercase() {
        'B' => 0,
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        _ => return None,
    };
    Some((number * 1024f64.powi(exponent)).round() as i64)
}

/// Fallback formats seen on common tracker software.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y",
];

fn parse_date(raw: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let formats: Vec<&str> = match format {
        Some(f) => vec![f],
        None => DATE_FORMATS.to_vec(),
    };
    for f in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, f) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, f) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
