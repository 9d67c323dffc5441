//! OS light/dark appearance detection.
//!
//! Environment hints are read once at startup; the desktop setting is then
//! re-queried periodically and changes are forwarded to the UI loop.

use std::time::Duration;

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use xspider_panel_core::Appearance;

pub const WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Appearance from environment hints, dark when nothing says otherwise.
pub fn detect() -> Appearance {
    detect_from(|name| std::env::var(name).ok())
}

pub fn detect_from(lookup: impl Fn(&str) -> Option<String>) -> Appearance {
    if let Some(theme) = lookup("GTK_THEME") {
        let theme = theme.to_ascii_lowercase();
        return if theme.contains("dark") {
            Appearance::Dark
        } else {
            Appearance::Light
        };
    }
    // "fg;bg", background colour indices below 8 are dark.
    if let Some(colors) = lookup("COLORFGBG")
        && let Some(bg) = colors.rsplit(';').next().and_then(|s| s.parse::<u8>().ok())
    {
        return if bg < 8 {
            Appearance::Dark
        } else {
            Appearance::Light
        };
    }
    Appearance::Dark
}

/// Interpret the output of the desktop appearance query.
fn parse_query_output(output: &str) -> Option<Appearance> {
    let s = output.trim().trim_matches('\'').to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }
    if s.contains("dark") {
        Some(Appearance::Dark)
    } else if s.contains("light") || s == "default" {
        Some(Appearance::Light)
    } else {
        None
    }
}

async fn query_desktop() -> Option<Appearance> {
    let output = if cfg!(target_os = "macos") {
        // Prints "Dark" in dark mode and fails otherwise.
        match Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .await
        {
            Ok(out) if out.status.success() => return Some(Appearance::Dark),
            Ok(_) => return Some(Appearance::Light),
            Err(_) => return None,
        }
    } else {
        Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
            .await
            .ok()?
    };
    if !output.status.success() {
        return None;
    }
    parse_query_output(&String::from_utf8_lossy(&output.stdout))
}

/// Poll the desktop appearance and send every change, starting from
/// `initial`. Stops quietly when no query tool is available.
pub fn spawn_watcher(
    initial: Appearance,
    tx: mpsc::UnboundedSender<Appearance>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = initial;
        let mut ticker = tokio::time::interval(WATCH_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let Some(current) = query_desktop().await else {
                tracing::debug!("no desktop appearance query available");
                break;
            };
            if current != last {
                tracing::info!(?current, "os appearance changed");
                last = current;
                if tx.send(current).is_err() {
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn gtk_theme_wins() {
        assert_eq!(
            detect_from(env(&[("GTK_THEME", "Adwaita:dark"), ("COLORFGBG", "0;15")])),
            Appearance::Dark
        );
        assert_eq!(detect_from(env(&[("GTK_THEME", "Adwaita")])), Appearance::Light);
    }

    #[test]
    fn colorfgbg_background_decides() {
        assert_eq!(detect_from(env(&[("COLORFGBG", "15;0")])), Appearance::Dark);
        assert_eq!(detect_from(env(&[("COLORFGBG", "0;default;15")])), Appearance::Light);
    }

    #[test]
    fn defaults_to_dark() {
        assert_eq!(detect_from(env(&[])), Appearance::Dark);
        assert_eq!(detect_from(env(&[("COLORFGBG", "garbage")])), Appearance::Dark);
    }

    #[test]
    fn query_output_parsing() {
        assert_eq!(parse_query_output("'prefer-dark'\n"), Some(Appearance::Dark));
        assert_eq!(parse_query_output("'prefer-light'"), Some(Appearance::Light));
        assert_eq!(parse_query_output("'default'"), Some(Appearance::Light));
        assert_eq!(parse_query_output(""), None);
    }
}
