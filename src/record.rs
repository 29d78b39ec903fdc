// src/record.rs

//! Positional field access for EasyEDA's delimiter-joined shape records.

use crate::error::{Error, Result};

pub const FIELD_DELIMITER: char = '~';
pub const SEGMENT_DELIMITER: &str = "^^";

/// A record line split into its positional fields.
///
/// Index 0 is the first field *after* the designator. Empty fields and
/// fields past the end of the line read as absent.
#[derive(Debug, Clone)]
pub struct RecordFields<'a> {
    designator: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> RecordFields<'a> {
    /// Splits a full record line (`R~10~20~...`) on the field delimiter.
    pub fn parse(line: &'a str) -> Self {
        let mut parts = line.split(FIELD_DELIMITER);
        let designator = parts.next().unwrap_or("");
        Self {
            designator,
            fields: parts.collect(),
        }
    }

    /// Splits a segment that has no leading designator.
    pub fn segment(segment: &'a str) -> Self {
        Self {
            designator: "",
            fields: segment.split(FIELD_DELIMITER).collect(),
        }
    }

    pub fn designator(&self) -> &'a str {
        self.designator
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw field text, `None` when missing or empty.
    pub fn str(&self, index: usize) -> Option<&'a str> {
        self.fields
            .get(index)
            .copied()
            .filter(|field| !field.is_empty())
    }

    pub fn string(&self, index: usize) -> Option<String> {
        self.str(index).map(str::to_string)
    }

    /// Numeric field; unparseable text reads as absent.
    pub fn f64(&self, index: usize) -> Option<f64> {
        self.str(index).and_then(parse_number)
    }

    /// Numeric field that must be present for the record to make sense.
    pub fn require_f64(&self, index: usize, name: &str) -> Result<f64> {
        self.f64(index).ok_or_else(|| {
            Error::ParseError(format!(
                "{} record is missing numeric field '{}' (position {})",
                self.designator,
                name,
                index + 1
            ))
        })
    }

    pub fn require_str(&self, index: usize, name: &str) -> Result<&'a str> {
        self.str(index).ok_or_else(|| {
            Error::ParseError(format!(
                "{} record is missing field '{}' (position {})",
                self.designator,
                name,
                index + 1
            ))
        })
    }

    /// Layer ids and similar small integers.
    pub fn i32(&self, index: usize) -> Option<i32> {
        self.f64(index).map(|v| v as i32)
    }

    pub fn flag(&self, index: usize) -> Option<bool> {
        self.str(index).and_then(parse_flag)
    }
}

/// Parses a number the way EasyEDA writes them (surrounding blanks allowed).
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Normalises EasyEDA's boolean-ish flags.
///
/// Symbol records say `show`, footprint records say `1`, pad plating says
/// `Y`; all mean true. Case is ignored.
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "show" | "1" | "true" | "yes" | "y" => Some(true),
        "hide" | "none" | "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Inverse of [`parse_flag`] for footprint-style records.
pub fn format_flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "1",
        Some(false) => "0",
        None => "",
    }
}

/// Inverse of [`parse_flag`] for `Y`/`N` fields such as pad plating.
pub fn format_yes_flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Y",
        Some(false) => "N",
        None => "",
    }
}

/// Inverse of [`parse_flag`] for symbol-style records.
pub fn format_show_flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "show",
        Some(false) => "0",
        None => "",
    }
}

/// Joins fields back into a record line, writing absent values as empty.
pub fn join_fields(designator: &str, fields: &[String]) -> String {
    let mut line = String::from(designator);
    for field in fields {
        line.push(FIELD_DELIMITER);
        line.push_str(field);
    }
    line
}

pub fn opt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
