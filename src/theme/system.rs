//! "Prefers dark" probe used to resolve the `Auto` theme.

use tracing::debug;

pub trait ColorSchemeSignal {
    fn prefers_dark(&self) -> bool;
}

/// Reads the environment and, on macOS, the global appearance setting.
/// Sampled every time it is asked.
pub struct SystemColorScheme;

impl ColorSchemeSignal for SystemColorScheme {
    fn prefers_dark(&self) -> bool {
        let appearance = std::env::var("MERMAID_TERMINAL_APPEARANCE").ok();
        let colorfgbg = std::env::var("COLORFGBG").ok();
        if let Some(dark) = probe_env(appearance.as_deref(), colorfgbg.as_deref()) {
            return dark;
        }
        platform_prefers_dark()
    }
}

/// Decide from env values, `None` when neither is conclusive.
fn probe_env(appearance: Option<&str>, colorfgbg: Option<&str>) -> Option<bool> {
    if let Some(value) = appearance {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => return Some(true),
            "light" => return Some(false),
            other => debug!(value = other, "ignoring unknown appearance override"),
        }
    }
    colorfgbg.and_then(colorfgbg_is_dark)
}

/// `COLORFGBG` is "fg;bg" (sometimes "fg;default;bg"). Backgrounds 0-6 and 8
/// are the dark ANSI colors.
fn colorfgbg_is_dark(value: &str) -> Option<bool> {
    let bg = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}

#[cfg(target_os = "macos")]
fn platform_prefers_dark() -> bool {
    // Non-zero exit means the key doesn't exist = light mode
    match std::process::Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
    {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim() == "Dark"
        }
        Ok(_) => false,
        Err(e) => {
            debug!(error = %e, "could not read macOS appearance");
            false
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn platform_prefers_dark() -> bool {
    false
}
