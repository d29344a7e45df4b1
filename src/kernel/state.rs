//! Process-level values derived at boot.
//!
//! # Responsibilities
//! - Named execution timers
//! - Legacy constants computed from settings

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::config::SettingsReader;

/// Legacy constant name, settings property and default.
const LEGACY_CONSTANTS: [(&str, &str, &str); 6] = [
    ("FS_CODPAIS", "codpais", "ESP"),
    ("FS_CURRENCY_POS", "currency_position", "right"),
    ("FS_ITEM_LIMIT", "item_limit", "50"),
    ("FS_NF0", "decimals", "2"),
    ("FS_NF1", "decimal_separator", ","),
    ("FS_NF2", "thousands_separator", " "),
];

/// Legacy constants read from the `default` settings group.
pub fn legacy_constants(settings: &dyn SettingsReader) -> BTreeMap<&'static str, String> {
    LEGACY_CONSTANTS
        .iter()
        .map(|(name, property, default)| (*name, settings.get_str("default", property, default)))
        .collect()
}

/// Places beyond what an `f64` can represent.
const MAX_DECIMALS: u32 = 15;

/// Round `value` to `decimals` places, capped at 15.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * factor).round() / factor
}

/// Named stopwatches.
#[derive(Debug, Default)]
pub struct Timers {
    started: Mutex<HashMap<String, Instant>>,
}

impl Timers {
    pub fn start(&self, name: &str) {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Instant::now());
    }

    /// Milliseconds since `start(name)`; 0.0 for unknown timers.
    pub fn stop(&self, name: &str) -> f64 {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use serde_json::json;

    #[test]
    fn test_legacy_constants_defaults_and_overrides() {
        let mut config = KernelConfig::default();
        config
            .settings
            .entry("default".into())
            .or_default()
            .insert("item_limit".into(), json!(100));

        let constants = legacy_constants(&config);
        assert_eq!(constants["FS_CODPAIS"], "ESP");
        assert_eq!(constants["FS_ITEM_LIMIT"], "100");
        assert_eq!(constants["FS_NF2"], " ");
        assert_eq!(constants.len(), 6);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234567, 2), 1.23);
        assert_eq!(round_to(1.235, 0), 1.0);
        assert_eq!(round_to(1.5, u32::MAX), 1.5);
        assert_eq!(round_to(2.25, 40), 2.25);
    }

    #[test]
    fn test_timers() {
        let timers = Timers::default();
        assert_eq!(timers.stop("unknown"), 0.0);
        timers.start("load");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timers.stop("load") >= 5.0);
        assert_eq!(timers.stop("load"), 0.0);
    }
}
