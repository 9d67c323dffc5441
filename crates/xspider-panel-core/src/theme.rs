//! Light / dark / system theme preference resolved against the OS appearance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::SettingsStore;
use crate::{Configuration, keys};

/// Concrete appearance actually applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub const ALL: [ThemePreference; 3] = [Self::Light, Self::Dark, Self::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Next preference in `ALL`, wrapping.
    pub fn cycle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

pub fn resolve_effective(pref: ThemePreference, os: Appearance) -> Appearance {
    match pref {
        ThemePreference::Light => Appearance::Light,
        ThemePreference::Dark => Appearance::Dark,
        ThemePreference::System => os,
    }
}

/// Tracks the preference, the last OS signal and the applied appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeResolver {
    preference: ThemePreference,
    os: Appearance,
    effective: Appearance,
}

impl ThemeResolver {
    /// Start from the last preference the presentation layer applied.
    pub fn new(preference: ThemePreference, os: Appearance) -> Self {
        Self {
            preference,
            os,
            effective: resolve_effective(preference, os),
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn os(&self) -> Appearance {
        self.os
    }

    pub fn effective(&self) -> Appearance {
        self.effective
    }

    /// User picked `pref`: apply immediately, then record it in the draft.
    pub fn select(&mut self, pref: ThemePreference, store: &mut SettingsStore) -> Appearance {
        self.preference = pref;
        self.recompute();
        store.set_draft(keys::THEME, pref.as_str());
        self.effective
    }

    /// OS appearance changed. Returns the new effective theme if it moved.
    pub fn on_os_signal(&mut self, os: Appearance) -> Option<Appearance> {
        self.os = os;
        if self.preference != ThemePreference::System {
            return None;
        }
        self.recompute()
    }

    /// Follow the `theme` key of `cfg` (after a load, undo or reset).
    /// Returns the new effective theme if it moved.
    pub fn sync_from(&mut self, cfg: &Configuration) -> Option<Appearance> {
        let pref = cfg.text(keys::THEME)?.parse::<ThemePreference>().ok()?;
        self.preference = pref;
        self.recompute()
    }

    fn recompute(&mut self) -> Option<Appearance> {
        let next = resolve_effective(self.preference, self.os);
        if next == self.effective {
            return None;
        }
        tracing::debug!(preference = %self.preference, ?next, "theme changed");
        self.effective = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_preferences_ignore_os() {
        assert_eq!(
            resolve_effective(ThemePreference::Light, Appearance::Dark),
            Appearance::Light
        );
        assert_eq!(
            resolve_effective(ThemePreference::Dark, Appearance::Light),
            Appearance::Dark
        );
        assert_eq!(
            resolve_effective(ThemePreference::System, Appearance::Light),
            Appearance::Light
        );
    }

    #[test]
    fn os_flip_follows_when_system() {
        let mut r = ThemeResolver::new(ThemePreference::System, Appearance::Light);
        assert_eq!(r.on_os_signal(Appearance::Dark), Some(Appearance::Dark));
        assert_eq!(r.effective(), Appearance::Dark);
    }

    #[test]
    fn os_flip_ignored_when_explicit() {
        let mut r = ThemeResolver::new(ThemePreference::Light, Appearance::Light);
        assert_eq!(r.on_os_signal(Appearance::Dark), None);
        assert_eq!(r.effective(), Appearance::Light);
        // Remembered for a later switch to system.
        let mut store = SettingsStore::default();
        assert_eq!(r.select(ThemePreference::System, &mut store), Appearance::Dark);
    }

    #[test]
    fn select_applies_and_writes_draft() {
        let mut store = SettingsStore::default();
        let mut r = ThemeResolver::new(ThemePreference::Dark, Appearance::Dark);
        assert_eq!(r.select(ThemePreference::Light, &mut store), Appearance::Light);
        assert_eq!(store.draft().text(keys::THEME), Some("light"));
        assert!(store.is_dirty());
        assert_eq!(store.committed().text(keys::THEME), None);
    }

    #[test]
    fn sync_from_loaded_settings() {
        let mut cfg = Configuration::new();
        cfg.set(keys::THEME, "system");
        let mut r = ThemeResolver::new(ThemePreference::Dark, Appearance::Light);
        assert_eq!(r.sync_from(&cfg), Some(Appearance::Light));
        assert_eq!(r.preference(), ThemePreference::System);

        cfg.set(keys::THEME, "purple");
        assert_eq!(r.sync_from(&cfg), None);
        assert_eq!(r.preference(), ThemePreference::System);
    }

    #[test]
    fn parse_preference() {
        assert_eq!("Dark".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
        assert!("neon".parse::<ThemePreference>().is_err());
    }
}
