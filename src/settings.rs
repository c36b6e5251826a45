//! User preferences
//!
//! Persisted in LocalStorage on the web so the last scenario survives a reload.

use serde::{Deserialize, Serialize};

use crate::consts::SUMMARY_DELAY_MS;
use crate::sim::Configuration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Last scenario the user dialed in
    #[serde(default)]
    pub config: Configuration,
    /// Start playing as soon as the page loads
    #[serde(default = "default_true")]
    pub autoplay: bool,
    /// Pop up the results panel when a run finishes
    #[serde(default = "default_true")]
    pub show_summary: bool,
    /// Delay before the results panel appears (ms)
    #[serde(default = "default_summary_delay")]
    pub summary_delay_ms: u32,
}

fn default_true() -> bool {
    true
}

fn default_summary_delay() -> u32 {
    SUMMARY_DELAY_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: Configuration::default(),
            autoplay: true,
            show_summary: true,
            summary_delay_ms: SUMMARY_DELAY_MS,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "doppler_trains_settings";

    /// Parse stored JSON, clamping the scenario back into slider range
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.config = settings.config.clamped();
        Ok(settings)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring corrupt settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::debug!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.autoplay);
        assert!(settings.show_summary);
        assert_eq!(settings.summary_delay_ms, 500);
        assert_eq!(settings.config, Configuration::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            config: Configuration::new(50.0, 30.0, 500.0, 1.0),
            autoplay: false,
            show_summary: true,
            summary_delay_ms: 250,
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_stored_config_is_clamped() {
        let json = r#"{"config": {"speed_a": 999.0, "speed_b": 60.0, "initial_distance": 800.0, "pulse_interval": 1.0}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.config.speed_a, 150.0);
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
    }
}
