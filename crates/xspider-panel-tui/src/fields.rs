//! Rows of the settings screen.

use xspider_panel_core::{Configuration, SettingValue, ThemePreference, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Download folder: edited as text or picked through the engine's dialog.
    Path,
    Number { min: i64, step: i64 },
    Toggle,
    Choice(&'static [&'static str]),
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

pub const BROWSERS: &[&str] = &["Edge", "Chrome"];

pub const FIELDS: &[Field] = &[
    Field {
        key: keys::SAVE_PATH,
        label: "Save path",
        kind: FieldKind::Path,
    },
    Field {
        key: keys::CONCURRENCY,
        label: "Concurrent tasks",
        kind: FieldKind::Number { min: 1, step: 1 },
    },
    Field {
        key: keys::DOWNLOAD_THREADS,
        label: "Download threads",
        kind: FieldKind::Number { min: 1, step: 1 },
    },
    Field {
        key: keys::MAX_SCROLLS,
        label: "Max scrolls",
        kind: FieldKind::Number { min: 1, step: 50 },
    },
    Field {
        key: keys::DEEP_SCAN,
        label: "Deep scan",
        kind: FieldKind::Toggle,
    },
    Field {
        key: keys::STOP_THRESH,
        label: "Stop threshold",
        kind: FieldKind::Number { min: 1, step: 10 },
    },
    Field {
        key: keys::MAX_VIDEO_SIZE,
        label: "Max video size (GB)",
        kind: FieldKind::Number { min: 0, step: 1 },
    },
    Field {
        key: keys::TIMEOUT,
        label: "Timeout (s)",
        kind: FieldKind::Number { min: 1, step: 5 },
    },
    Field {
        key: keys::DL_IMAGES,
        label: "Download images",
        kind: FieldKind::Toggle,
    },
    Field {
        key: keys::DL_GIFS,
        label: "Download GIFs",
        kind: FieldKind::Toggle,
    },
    Field {
        key: keys::CREATE_LINK_FILE,
        label: "Create link file",
        kind: FieldKind::Toggle,
    },
    Field {
        key: keys::USE_TMP_FILES,
        label: "Use temp files",
        kind: FieldKind::Toggle,
    },
    Field {
        key: keys::HEADLESS,
        label: "Headless browser",
        kind: FieldKind::Toggle,
    },
    Field {
        key: keys::BROWSER_TYPE,
        label: "Browser",
        kind: FieldKind::Choice(BROWSERS),
    },
    Field {
        key: keys::THEME,
        label: "Theme",
        kind: FieldKind::Theme,
    },
];

impl Field {
    /// Text shown in the value column.
    pub fn display(&self, cfg: &Configuration) -> String {
        match (self.kind, cfg.get(self.key)) {
            (FieldKind::Toggle, v) => {
                let on = v.and_then(SettingValue::as_bool).unwrap_or(false);
                let mark = if on { "[x]" } else { "[ ]" };
                mark.to_string()
            }
            (_, Some(v)) => v.to_string(),
            (_, None) => "-".to_string(),
        }
    }

    /// The value Left/Right moves to, or `None` when the field does not step.
    pub fn stepped(&self, cfg: &Configuration, forward: bool) -> Option<SettingValue> {
        match self.kind {
            FieldKind::Number { min, step } => {
                let current = cfg.int(self.key).unwrap_or(min);
                let next = if forward {
                    current.saturating_add(step)
                } else {
                    current.saturating_sub(step)
                };
                Some(SettingValue::Int(next.max(min)))
            }
            FieldKind::Toggle => Some(SettingValue::Bool(!cfg.bool(self.key).unwrap_or(false))),
            FieldKind::Choice(options) => {
                let current = cfg.text(self.key).unwrap_or(options[0]);
                let pos = options
                    .iter()
                    .position(|o| o.eq_ignore_ascii_case(current))
                    .unwrap_or(0);
                let next = if forward {
                    (pos + 1) % options.len()
                } else {
                    (pos + options.len() - 1) % options.len()
                };
                Some(SettingValue::from(options[next]))
            }
            FieldKind::Theme => {
                let current = cfg
                    .text(self.key)
                    .and_then(|t| t.parse::<ThemePreference>().ok())
                    .unwrap_or_default();
                let next = if forward {
                    current.cycle()
                } else {
                    current.cycle().cycle()
                };
                Some(SettingValue::from(next.as_str()))
            }
            FieldKind::Path => None,
        }
    }

    /// Parse typed text into a value for this field.
    pub fn parse(&self, text: &str) -> Result<SettingValue, String> {
        let text = text.trim();
        match self.kind {
            FieldKind::Number { min, .. } => {
                let n: i64 = text
                    .parse()
                    .map_err(|_| format!("{} must be a whole number", self.label))?;
                if n < min {
                    return Err(format!("{} must be at least {}", self.label, min));
                }
                Ok(SettingValue::Int(n))
            }
            FieldKind::Path if text.is_empty() => Err("Save path cannot be empty".to_string()),
            _ => Ok(SettingValue::from(text)),
        }
    }

    /// Whether Enter opens a text editor for this field.
    pub fn is_editable_text(&self) -> bool {
        matches!(self.kind, FieldKind::Path | FieldKind::Number { .. })
    }
}

pub fn field_at(index: usize) -> Option<&'static Field> {
    FIELDS.get(index)
}

pub fn field_for(key: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|f| f.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Configuration {
        let mut c = Configuration::new();
        c.set(keys::CONCURRENCY, 3);
        c.set(keys::BROWSER_TYPE, "Edge");
        c.set(keys::DEEP_SCAN, false);
        c.set(keys::THEME, "dark");
        c
    }

    #[test]
    fn numbers_step_and_clamp() {
        let f = field_for(keys::CONCURRENCY).unwrap();
        assert_eq!(f.stepped(&cfg(), true), Some(SettingValue::Int(4)));

        let mut c = cfg();
        c.set(keys::CONCURRENCY, 1);
        assert_eq!(f.stepped(&c, false), Some(SettingValue::Int(1)));
    }

    #[test]
    fn choice_wraps_both_ways() {
        let f = field_for(keys::BROWSER_TYPE).unwrap();
        assert_eq!(f.stepped(&cfg(), true), Some(SettingValue::from("Chrome")));
        assert_eq!(f.stepped(&cfg(), false), Some(SettingValue::from("Chrome")));
    }

    #[test]
    fn theme_cycles_backwards() {
        let f = field_for(keys::THEME).unwrap();
        assert_eq!(f.stepped(&cfg(), true), Some(SettingValue::from("system")));
        assert_eq!(f.stepped(&cfg(), false), Some(SettingValue::from("light")));
    }

    #[test]
    fn toggle_display_and_flip() {
        let f = field_for(keys::DEEP_SCAN).unwrap();
        assert_eq!(f.display(&cfg()), "[ ]");
        assert_eq!(f.stepped(&cfg(), true), Some(SettingValue::Bool(true)));
    }

    #[test]
    fn parse_rejects_bad_numbers() {
        let f = field_for(keys::TIMEOUT).unwrap();
        assert_eq!(f.parse(" 90 "), Ok(SettingValue::Int(90)));
        assert!(f.parse("soon").is_err());
        assert!(f.parse("0").is_err());
    }

    #[test]
    fn path_cannot_be_blank() {
        let f = field_for(keys::SAVE_PATH).unwrap();
        assert!(f.parse("   ").is_err());
        assert_eq!(f.parse("D:/x"), Ok(SettingValue::from("D:/x")));
        assert_eq!(f.stepped(&cfg(), true), None);
    }
}
