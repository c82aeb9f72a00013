//! Typed cell values decoded from TABLEDATA

use crate::error::{DalError, Result};
use crate::votable::field::Field;
use serde::ser::Serializer;
use serde::Serialize;
use std::fmt;

/// A single decoded table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty cell (or declared null)
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Decode the text content of a TD element according to its FIELD.
    ///
    /// Array-valued numeric cells are kept as raw text; services that use
    /// them (registry string arrays are char data anyway) decode downstream.
    pub(crate) fn decode_cell(text: &str, field: &Field) -> Result<Value> {
        let trimmed = text.trim();

        if field.datatype.is_char() {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(Value::Text(trimmed.to_string()));
        }

        if trimmed.is_empty() {
            return Ok(Value::Null);
        }

        if field.is_array() {
            return Ok(Value::Text(trimmed.to_string()));
        }

        if field.datatype.is_integer() {
            return trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| bad_cell(field, trimmed));
        }

        if field.datatype.is_floating() {
            // f64 parsing accepts NaN/+Inf/-Inf spellings case-insensitively
            return trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| bad_cell(field, trimmed));
        }

        match field.datatype {
            crate::votable::DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "0" => Ok(Value::Bool(false)),
                "?" => Ok(Value::Null),
                _ => Err(bad_cell(field, trimmed)),
            },
            // Complex values stay raw; nothing downstream interprets them
            _ => Ok(Value::Text(trimmed.to_string())),
        }
    }

    /// Whether the cell is empty
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the cell as a string, for char-typed cells
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Read the cell as a float.
    ///
    /// Integer cells widen and char cells that parse as a number are
    /// accepted, since services are not always strict about datatypes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the cell as an integer, with the same leniency as [`as_f64`](Self::as_f64)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the cell as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Some(true),
                "false" | "f" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

fn bad_cell(field: &Field, text: &str) -> crate::error::Error {
    DalError::format(format!(
        "cell '{}' does not parse as {} (column '{}')",
        text,
        field.datatype.as_str(),
        field.name
    ))
    .into()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}
