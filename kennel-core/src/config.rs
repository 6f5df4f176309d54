//! # Kennel Configuration
//!
//! A minimal string key/value store, set and read through the app:
//!
//! ```rust
//! use kennel_core::KennelApp;
//! let app = KennelApp::<(), ()>::new();
//!
//! app.set("http.port", "3000");
//! assert_eq!(app.get("http.port"), Some("3000".to_string()));
//! ```
//!
//! Applications decide where values come from. [`KennelConfig::load_vars`]
//! maps prefixed environment-style variables onto dotted keys:
//! `DOGS__DATABASE__URL` with prefix `DOGS__` becomes `database.url`.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct KennelConfig {
    values: HashMap<String, String>,
}

impl KennelConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Copy every `(key, value)` pair whose key starts with `prefix`,
    /// lower-casing the rest and turning `__` into `.`.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if !normalized.is_empty() {
                    self.set(normalized, value);
                }
            }
        }
    }

    pub fn snapshot(&self) -> KennelConfigSnapshot {
        KennelConfigSnapshot::new(self.values.clone())
    }
}

/// Read-only copy of the config handed to hooks.
#[derive(Debug, Clone, Default)]
pub struct KennelConfigSnapshot {
    map: HashMap<String, String>,
}

impl KennelConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.trim().parse::<u16>().ok())
    }
}
