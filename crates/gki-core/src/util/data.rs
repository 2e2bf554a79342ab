//! YAML and JSON data handling utilities.

use gki_types::{GkiError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Load YAML from string into any deserializable type.
pub fn load_yaml<T: DeserializeOwned>(content: &str) -> Result<T> {
    serde_yaml::from_str(content).map_err(GkiError::Yaml)
}

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    match (&mut base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            base
        }
        (_, overlay_val) => overlay_val,
    }
}

/// Get value at a path in dotted notation.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Set value at a path in dotted notation, creating intermediate objects.
pub fn set_path(data: &mut Value, path: &str, value: Value) -> Result<()> {
    let parts: Vec<&str> = path.split('.').collect();
    let (last, parents) = match parts.split_last() {
        Some((last, parents)) if !last.is_empty() => (*last, parents),
        _ => return Err(GkiError::Config(format!("Invalid config path '{}'", path))),
    };

    let mut current = data;
    for part in parents {
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        current = match current {
            Value::Object(map) => map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Default::default())),
            _ => return Err(GkiError::Bug(format!("'{}' is not an object", part))),
        };
    }

    if !current.is_object() {
        *current = Value::Object(Default::default());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }

    Ok(())
}
