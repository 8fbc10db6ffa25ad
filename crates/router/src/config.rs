//! Application settings.
//!
//! Settings are a tree of JSON values. Plain keys are normalised to camelCase before use,
//! so `"case sensitive routing"`, `"case-sensitive-routing"` and `"caseSensitiveRouting"`
//! name the same setting. Dotted keys (`"db.pool.size"`) address nested objects.

use std::path::Path;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::ConfigError;

pub const ENV: &str = "env";
pub const BASE_URL: &str = "baseUrl";
pub const DEBUG: &str = "debug";
pub const X_POWERED_BY: &str = "xPoweredBy";
pub const VIEWS: &str = "views";
pub const VIEW_ENGINE_OPTIONS: &str = "viewEngineOptions";
pub const CASE_SENSITIVE_ROUTING: &str = "caseSensitiveRouting";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let values = json!({
            "env": "production",
            "baseUrl": null,
            "debug": false,
            "trustProxy": false,
            "proxies": [],
            "trustedHeaderSet": 1,
            "xPoweredBy": false,
            "views": null,
            "viewEngineOptions": {},
            "viewsCache": null,
            "caseSensitiveRouting": false,
            "viewEngine": null
        });

        match values {
            Value::Object(values) => Self { values },
            _ => Self::empty(),
        }
    }
}

impl Settings {
    /// settings without any default entry
    pub fn empty() -> Self {
        Self { values: Map::new() }
    }

    /// Returns the value of a setting, or `None` if it is not defined.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut keys = key.split('.');
        let top = self.lookup(keys.next()?)?;
        keys.try_fold(top, |value, key| value.get(key))
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.values.get(key).or_else(|| self.values.get(&to_camel_case(key)))
    }

    /// Assigns a value; dotted keys create (or extend) nested objects.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let mut keys = key.split('.');
        let top = to_camel_case(keys.next().unwrap_or_default());
        let nested = keys.rev().fold(value.into(), |inner, key| {
            let mut map = Map::new();
            map.insert(key.to_string(), inner);
            Value::Object(map)
        });

        if key.contains('.') {
            merge_value(self.values.entry(top).or_insert(Value::Null), nested);
        } else {
            self.values.insert(top, nested);
        }
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes a top level setting, returning whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).or_else(|| self.values.remove(&to_camel_case(key))).is_some()
    }

    /// Sets a boolean setting to true.
    pub fn enable(&mut self, key: &str) -> Result<&mut Self, ConfigError> {
        self.toggle(key, true)
    }

    /// Sets a boolean setting to false.
    pub fn disable(&mut self, key: &str) -> Result<&mut Self, ConfigError> {
        self.toggle(key, false)
    }

    fn toggle(&mut self, key: &str, flag: bool) -> Result<&mut Self, ConfigError> {
        match self.get(key) {
            Some(Value::Bool(_)) => Ok(self.set(key, flag)),
            _ => Err(ConfigError::not_boolean(key)),
        }
    }

    /// Returns true if the setting is the boolean `true`; anything else counts as not enabled.
    pub fn enabled(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    /// Returns true if the boolean setting is `false`.
    pub fn disabled(&self, key: &str) -> Result<bool, ConfigError> {
        match self.get(key) {
            Some(Value::Bool(flag)) => Ok(!flag),
            _ => Err(ConfigError::not_boolean(key)),
        }
    }

    /// Merges top level entries, replacing the existing ones.
    pub fn merge(&mut self, values: Map<String, Value>) -> &mut Self {
        self.values.extend(values);
        self
    }

    /// Merges a json object file. A missing file is ignored.
    pub fn merge_json_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "json configuration file not found, skipped");
            return Ok(self);
        }

        let content = std::fs::read_to_string(path)?;
        if let Value::Object(values) = serde_json::from_str::<Value>(&content)? {
            self.merge(values);
        }
        Ok(self)
    }

    /// Merges a yaml mapping file. A missing file is ignored.
    pub fn merge_yaml_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "yaml configuration file not found, skipped");
            return Ok(self);
        }

        let content = std::fs::read_to_string(path)?;
        if let Value::Object(values) = serde_yaml::from_str::<Value>(&content)? {
            self.merge(values);
        }
        Ok(self)
    }

    /// Merges the process environment, keeping variable names as they are.
    pub fn merge_env(&mut self) -> &mut Self {
        self.merge_vars(std::env::vars())
    }

    pub fn merge_vars<K, V>(&mut self, vars: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.values.insert(key.into(), Value::String(value.into()));
        }
        self
    }

    pub fn env(&self) -> &str {
        self.get(ENV).and_then(Value::as_str).unwrap_or("production")
    }

    pub fn debug(&self) -> bool {
        self.enabled(DEBUG)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.get(BASE_URL).and_then(Value::as_str)
    }

    pub fn x_powered_by(&self) -> bool {
        self.enabled(X_POWERED_BY)
    }

    pub fn case_sensitive_routing(&self) -> bool {
        self.enabled(CASE_SENSITIVE_ROUTING)
    }

    pub fn views(&self) -> Option<&str> {
        self.get(VIEWS).and_then(Value::as_str)
    }

    /// true when error details may be shown to clients
    pub fn exposes_errors(&self) -> bool {
        matches!(self.env(), "development" | "test") || self.debug()
    }
}

fn merge_value(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_value(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

/// `"x-powered by"` -> `"xPoweredBy"`; keys already in camelCase are unchanged.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;

    for ch in key.chars() {
        if !ch.is_ascii_alphanumeric() {
            upper_next = !out.is_empty();
            continue;
        }

        if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}
