//! Namespaced configuration tree: one namespace per JSON source, deep-merged, dot-path lookups.

use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    root: Map<String, Value>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON file; its file stem names the namespace it is merged into.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let namespace = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::Invalid(format!("no namespace in path {}", shown)))?
            .to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        tracing::debug!(path = %shown, namespace = %namespace, "config loaded");
        self.load_value(&namespace, value);
        Ok(())
    }

    /// Merge an in-memory value into `namespace`, same rules as [`ConfigStore::load`].
    pub fn load_value(&mut self, namespace: &str, value: Value) {
        match self.root.get_mut(namespace) {
            Some(existing) => deep_merge(existing, value),
            None => {
                self.root.insert(namespace.to_string(), value);
            }
        }
    }

    /// Load every `*.json` file in `dir`, sorted by name. A missing directory loads nothing.
    pub fn autoload_configurations(&mut self, dir: impl AsRef<Path>) -> Result<usize, ConfigError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "config directory not found, skipping");
            return Ok(0);
        }
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        for path in &files {
            self.load(path)?;
        }
        Ok(files.len())
    }

    /// Walk a dot path (`database.host`). Missing segments and `null` leaves yield `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// String view of a leaf; numbers and bools are rendered as text.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Assign `value` at a dot path, creating (or replacing non-object) intermediate nodes.
    pub fn set(&mut self, key: &str, value: Value) {
        let segments: Vec<&str> = key.split('.').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };
        let mut target = &mut self.root;
        for segment in parents {
            let slot = target
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            target = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made an object"),
            };
        }
        target.insert(leaf.to_string(), value);
    }
}

/// Objects merge by key, arrays concatenate, anything else is replaced by `incoming`.
fn deep_merge(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(other)) => {
            for (k, v) in other {
                match base.get_mut(&k) {
                    Some(slot) => deep_merge(slot, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(other)) => base.extend(other),
        (slot, other) => *slot = other,
    }
}
