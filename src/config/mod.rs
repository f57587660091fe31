use dashmap::DashMap;
use std::env;
use std::sync::Arc;

pub const DEFAULT_METHOD_PREFIX: &str = "initialize";

pub const ENABLED_KEY: &str = "TRAIT_BOOTER_ENABLED";
pub const METHOD_PREFIX_KEY: &str = "TRAIT_BOOTER_METHOD_PREFIX";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// A config seeded from the process environment.
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// `true`/`false` flags; accepts `1`/`0`, `yes`/`no`, `on`/`off`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let raw = self.get(key)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                tracing::warn!("Ignoring {}={:?}: not a boolean", key, raw);
                None
            }
        }
    }
}

/// Settings of the trait booter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooterConfig {
    /// When off, resolution events are ignored.
    pub enabled: bool,
    /// Prepended to a unit's short name to form its initializer name.
    pub method_prefix: String,
}

impl Default for BooterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
        }
    }
}

impl BooterConfig {
    /// Read `TRAIT_BOOTER_*` keys, falling back to defaults for anything
    /// missing or malformed.
    pub fn from_config(config: &ConfigService) -> Self {
        let defaults = Self::default();
        Self {
            enabled: config.get_bool(ENABLED_KEY).unwrap_or(defaults.enabled),
            method_prefix: config
                .get(METHOD_PREFIX_KEY)
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or(defaults.method_prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_gives_defaults() {
        let config = BooterConfig::from_config(&ConfigService::default());
        assert_eq!(config, BooterConfig::default());
        assert_eq!(config.method_prefix, "initialize");
    }

    #[test]
    fn test_overrides() {
        let service = ConfigService::default();
        service.set(ENABLED_KEY, "off");
        service.set(METHOD_PREFIX_KEY, "boot");

        let config = BooterConfig::from_config(&service);
        assert!(!config.enabled);
        assert_eq!(config.method_prefix, "boot");
    }

    #[test]
    fn test_malformed_flag_falls_back() {
        let service = ConfigService::default();
        service.set(ENABLED_KEY, "sometimes");
        service.set(METHOD_PREFIX_KEY, "");

        let config = BooterConfig::from_config(&service);
        assert!(config.enabled);
        assert_eq!(config.method_prefix, DEFAULT_METHOD_PREFIX);
    }
}
