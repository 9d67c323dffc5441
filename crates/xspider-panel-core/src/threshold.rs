//! The stop threshold only applies when deep scan is off.

use crate::{Configuration, SettingValue, keys};

pub const DISABLED_HINT: &str = "not needed in deep-scan mode";

pub fn threshold_enabled(deep_scan: bool) -> bool {
    !deep_scan
}

/// Presentation of the stop-threshold field.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdField {
    /// Stored value, shown whether or not the field is enabled.
    pub value: Option<SettingValue>,
    pub enabled: bool,
    pub hint: Option<&'static str>,
}

impl ThresholdField {
    pub fn from_config(cfg: &Configuration) -> Self {
        let enabled = threshold_enabled(cfg.bool(keys::DEEP_SCAN).unwrap_or(false));
        Self {
            value: cfg.get(keys::STOP_THRESH).cloned(),
            enabled,
            hint: (!enabled).then_some(DISABLED_HINT),
        }
    }
}
