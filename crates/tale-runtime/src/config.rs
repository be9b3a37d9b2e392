#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Defaults are tuned for a browser tab. Hosts can override them from the
//! environment with the `TALE_*` variables, or with the `with_*` builders.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TALE_TALE_CACHE` | `tale_cache_capacity` | 8 |
//! | `TALE_REPLY_CACHE` | `reply_cache_capacity` | 4 |
//! | `TALE_LOG` | `log_filter` | `info` |
//! | `TALE_LOG_JSON` | `log_json` | `false` |
//!
//! Unparseable values are ignored with a warning.

use std::env;

/// Default capacity of the list-page cache.
pub const DEFAULT_TALE_CACHE_CAPACITY: usize = 8;
/// Default capacity of the reply-page cache.
pub const DEFAULT_REPLY_CACHE_CAPACITY: usize = 4;

/// Configuration shared by the driver and the page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of list pages kept for reuse.
    pub tale_cache_capacity: usize,
    /// Number of reply pages kept for reuse.
    pub reply_cache_capacity: usize,
    /// `tracing-subscriber` env-filter directive.
    pub log_filter: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tale_cache_capacity: DEFAULT_TALE_CACHE_CAPACITY,
            reply_cache_capacity: DEFAULT_REPLY_CACHE_CAPACITY,
            log_filter: "info".into(),
            log_json: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("TALE_TALE_CACHE") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.tale_cache_capacity = n,
                _ => tracing::warn!(value = %val, "ignoring invalid TALE_TALE_CACHE"),
            }
        }
        if let Some(val) = lookup("TALE_REPLY_CACHE") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.reply_cache_capacity = n,
                _ => tracing::warn!(value = %val, "ignoring invalid TALE_REPLY_CACHE"),
            }
        }
        if let Some(val) = lookup("TALE_LOG")
            && !val.trim().is_empty()
        {
            config.log_filter = val;
        }
        if let Some(val) = lookup("TALE_LOG_JSON") {
            match parse_flag(&val) {
                Some(flag) => config.log_json = flag,
                None => tracing::warn!(value = %val, "ignoring invalid TALE_LOG_JSON"),
            }
        }

        config
    }

    #[must_use]
    pub fn with_tale_cache_capacity(mut self, capacity: usize) -> Self {
        self.tale_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_reply_cache_capacity(mut self, capacity: usize) -> Self {
        self.reply_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim() {
        "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.tale_cache_capacity, DEFAULT_TALE_CACHE_CAPACITY);
    }

    #[test]
    fn env_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("TALE_TALE_CACHE", "16"),
            ("TALE_REPLY_CACHE", " 2 "),
            ("TALE_LOG", "tale_pages=debug"),
            ("TALE_LOG_JSON", "TRUE"),
        ]));
        assert_eq!(config.tale_cache_capacity, 16);
        assert_eq!(config.reply_cache_capacity, 2);
        assert_eq!(config.log_filter, "tale_pages=debug");
        assert!(config.log_json);
    }

    #[test]
    fn invalid_values_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("TALE_TALE_CACHE", "0"),
            ("TALE_REPLY_CACHE", "lots"),
            ("TALE_LOG", "   "),
            ("TALE_LOG_JSON", "maybe"),
        ]));
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn builders() {
        let config = RuntimeConfig::default()
            .with_tale_cache_capacity(1)
            .with_reply_cache_capacity(9)
            .with_log_filter("warn")
            .with_log_json(true);
        assert_eq!(config.tale_cache_capacity, 1);
        assert_eq!(config.reply_cache_capacity, 9);
        assert_eq!(config.log_filter, "warn");
        assert!(config.log_json);
    }
}
