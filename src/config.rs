//! Page configuration.
//!
//! Passed from the page as an optional JSON string to `init_page`. Every field
//! has a default, so `{}` or a partial object works; malformed JSON falls back
//! to the defaults with a warning.
use serde::Deserialize;

pub const DEFAULT_STORAGE_PREFIX: &str = "aiWeaponShop_";
pub const DEFAULT_FORM_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbzNH8A-X-Cs3nYB5YS9uBNzIRg40KbWENwVcJm2yLsUMBKUw8aHDEFCK73Deou1XpSu/exec";

/// Knobs `init_page` accepts from the page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub storage_prefix: String,
    /// `None` keeps submissions in the local submission log instead of posting.
    #[serde(default = "default_form_endpoint")]
    pub form_endpoint: Option<String>,
    pub visitor_counter_ms: u32,
    pub stats_counter_ms: u32,
    pub particles: bool,
    pub debug_logging: bool,
}

fn default_form_endpoint() -> Option<String> {
    Some(DEFAULT_FORM_ENDPOINT.to_string())
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            form_endpoint: default_form_endpoint(),
            visitor_counter_ms: 1500,
            stats_counter_ms: 2000,
            particles: false,
            debug_logging: false,
        }
    }
}

impl PageConfig {
    pub fn from_json(json: Option<&str>) -> Self {
        let Some(text) = json.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring page config: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        assert_eq!(PageConfig::from_json(None), PageConfig::default());
        assert_eq!(PageConfig::from_json(Some("  ")), PageConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let cfg = PageConfig::from_json(Some(r#"{"particles": true, "stats_counter_ms": 500}"#));
        assert!(cfg.particles);
        assert_eq!(cfg.stats_counter_ms, 500);
        assert_eq!(cfg.visitor_counter_ms, 1500);
        assert_eq!(cfg.form_endpoint.as_deref(), Some(DEFAULT_FORM_ENDPOINT));
    }

    #[test]
    fn null_endpoint_selects_local_log() {
        let cfg = PageConfig::from_json(Some(r#"{"form_endpoint": null}"#));
        assert_eq!(cfg.form_endpoint, None);
        assert_eq!(cfg.storage_prefix, DEFAULT_STORAGE_PREFIX);
    }

    #[test]
    fn malformed_config_falls_back() {
        assert_eq!(PageConfig::from_json(Some("{not json")), PageConfig::default());
    }
}
