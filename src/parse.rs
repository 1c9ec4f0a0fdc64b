//! Converters for sequence columns stored as text
//!
//! Metrics files store arrays either as bracketed, comma-separated floats
//! (`[1.0, 2.0, 3.0]`) or as JSON. Empty cells always convert to an empty
//! sequence.

use serde_json::Value;

use crate::keys::ActionType;
use crate::{Error, Result};

/// Parse a bracketed, `", "`-delimited float list.
///
/// # Errors
///
/// Returns [`Error::Parse`] if an element is not a number.
///
/// # Example
///
/// ```rust
/// use run_plotter::parse::string_to_float_list;
///
/// assert_eq!(string_to_float_list("[1.0, 2.0, 3.0]").unwrap(), vec![1.0, 2.0, 3.0]);
/// assert!(string_to_float_list("").unwrap().is_empty());
/// ```
pub fn string_to_float_list(raw: &str) -> Result<Vec<f64>> {
    let stripped = raw.replace(['[', ']'], "");
    if stripped.trim().is_empty() {
        return Ok(Vec::new());
    }

    stripped
        .split(", ")
        .map(|token| {
            token
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::parse("float list", format!("{token:?}: {e}")))
        })
        .collect()
}

/// Parse a JSON array of numbers. Nested arrays are rejected; use
/// [`json_positions`] for those.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the cell is not a JSON array of numbers.
pub fn json_float_list(column: &str, raw: &str) -> Result<Vec<f64>> {
    let Some(items) = json_array(column, raw)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| number(column, item))
        .collect()
}

/// Parse a JSON array of coordinate arrays (`[[x, y, theta], ...]`).
///
/// # Errors
///
/// Returns [`Error::Parse`] on malformed JSON or non-numeric coordinates.
pub fn json_positions(column: &str, raw: &str) -> Result<Vec<Vec<f64>>> {
    let Some(items) = json_array(column, raw)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| match item {
            Value::Array(coords) => coords.iter().map(|c| number(column, c)).collect(),
            other => Err(Error::parse(column, format!("expected coordinate array, got {other}"))),
        })
        .collect()
}

/// Parse per-step velocities. Vector samples (`[vx, vy, ...]`) reduce to
/// their planar speed; plain numbers are kept.
///
/// # Errors
///
/// Returns [`Error::Parse`] on malformed JSON.
pub fn json_speeds(column: &str, raw: &str) -> Result<Vec<f64>> {
    let Some(items) = json_array(column, raw)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| match item {
            Value::Array(components) => {
                let vx = components.first().map_or(Ok(0.0), |c| number(column, c))?;
                let vy = components.get(1).map_or(Ok(0.0), |c| number(column, c))?;
                Ok(vx.hypot(vy))
            }
            other => number(column, other),
        })
        .collect()
}

/// Parse an action-type sequence. Accepts a JSON array of strings or a
/// bare bracketed list (`[MOVE, STOP]`).
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] for an action outside MOVE/STOP/ROTATE.
pub fn action_types(raw: &str) -> Result<Vec<ActionType>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
        return items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.parse(),
                other => Err(Error::parse("action_type", format!("expected string, got {other}"))),
            })
            .collect();
    }

    let stripped = raw.replace(['[', ']', '\'', '"'], "");
    stripped
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

fn json_array(column: &str, raw: &str) -> Result<Option<Vec<Value>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(raw).map_err(|e| Error::parse(column, e))? {
        Value::Array(items) => Ok(Some(items)),
        Value::Null => Ok(None),
        other => Err(Error::parse(column, format!("expected array, got {other}"))),
    }
}

fn number(column: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::parse(column, format!("expected number, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_float_list_empty() {
        assert!(string_to_float_list("").unwrap().is_empty());
        assert!(string_to_float_list("[]").unwrap().is_empty());
        assert!(string_to_float_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_string_to_float_list_values() {
        assert_eq!(
            string_to_float_list("[1.0, 2.0, 3.0]").unwrap(),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(string_to_float_list("[-0.5]").unwrap(), vec![-0.5]);
    }

    #[test]
    fn test_string_to_float_list_rejects_garbage() {
        let err = string_to_float_list("[1.0, abc]").unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_json_positions() {
        let path = json_positions("path", "[[1.0, 2.0, 0.1], [3, 4, 0.2]]").unwrap();
        assert_eq!(path, vec![vec![1.0, 2.0, 0.1], vec![3.0, 4.0, 0.2]]);
        assert!(json_positions("path", "").unwrap().is_empty());
        assert!(json_positions("path", "[1, 2]").is_err());
    }

    #[test]
    fn test_json_speeds_reduces_vectors() {
        let speeds = json_speeds("velocity", "[[3.0, 4.0, 1.0], [0, 0, 0]]").unwrap();
        assert_eq!(speeds, vec![5.0, 0.0]);
        assert_eq!(json_speeds("velocity", "[0.5, 1.5]").unwrap(), vec![0.5, 1.5]);
    }

    #[test]
    fn test_action_types_both_encodings() {
        let json = action_types(r#"["MOVE", "STOP", "ROTATE"]"#).unwrap();
        let bare = action_types("[MOVE, STOP, ROTATE]").unwrap();
        assert_eq!(json, vec![ActionType::Move, ActionType::Stop, ActionType::Rotate]);
        assert_eq!(json, bare);
        assert!(action_types("[JUMP]").is_err());
        assert!(action_types("").unwrap().is_empty());
    }
}
