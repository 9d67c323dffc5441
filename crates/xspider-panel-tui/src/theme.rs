use ratatui::style::{Color, Modifier, Style};

use xspider_panel_core::view::StatusTone;
use xspider_panel_core::{Appearance, LogLevel};

/// Color palette for the panel.
pub struct Theme {
    pub appearance: Appearance,

    pub active: Color,
    pub waiting: Color,
    pub paused: Color,
    pub failed: Color,
    pub success: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub highlight_bg: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            appearance: Appearance::Dark,

            active: Color::Rgb(60, 140, 255),
            waiting: Color::Rgb(120, 120, 140),
            paused: Color::Rgb(255, 200, 0),
            failed: Color::Rgb(255, 80, 80),
            success: Color::Rgb(0, 200, 80),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            accent: Color::Rgb(29, 155, 240),
            highlight_bg: Color::Rgb(30, 40, 80),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    pub fn light() -> Self {
        Self {
            appearance: Appearance::Light,

            active: Color::Rgb(20, 90, 200),
            waiting: Color::Rgb(110, 110, 120),
            paused: Color::Rgb(180, 120, 0),
            failed: Color::Rgb(200, 30, 30),
            success: Color::Rgb(0, 140, 60),

            header_fg: Color::White,
            header_bg: Color::Rgb(29, 155, 240),
            border: Color::Rgb(190, 190, 200),
            text: Color::Black,
            dim: Color::Rgb(110, 110, 120),
            accent: Color::Rgb(20, 90, 200),
            highlight_bg: Color::Rgb(220, 232, 250),
            footer_fg: Color::Rgb(110, 110, 120),
            footer_bg: Color::Reset,
        }
    }

    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self::dark(),
            Appearance::Light => Self::light(),
        }
    }

    pub fn tone_color(&self, tone: StatusTone) -> Color {
        match tone {
            StatusTone::Active => self.active,
            StatusTone::Waiting => self.waiting,
            StatusTone::Paused => self.paused,
            StatusTone::Failed => self.failed,
            StatusTone::Neutral => self.dim,
        }
    }

    pub fn level_color(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Info => self.text,
            LogLevel::Success => self.success,
            LogLevel::Warning => self.paused,
            LogLevel::Error => self.failed,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }

    pub fn key_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}
