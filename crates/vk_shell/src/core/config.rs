//! # Application Configuration
//!
//! Configuration for the bootstrap sequencer: window geometry and title,
//! diagnostic console behavior, and whether the graphics bootstrap should
//! enable validation instrumentation.
//!
//! The console sits at the top-left of the screen with the application
//! window immediately to its right, so the defaults here match that
//! arrangement (640x360 client area next to a 640-wide console).

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title (stored titles are capped at the platform limit).
    pub title: String,
    /// Initial client-area width in pixels.
    pub width: u32,
    /// Initial client-area height in pixels.
    pub height: u32,
}

impl WindowConfig {
    /// Create a window configuration with the default geometry.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 640,
            height: 360,
        }
    }

    /// Set the initial client-area size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Hello World")
    }
}

/// What to do when the diagnostic console cannot be attached.
///
/// A development session can usually keep going without a console, so
/// `Continue` is the default; `Fatal` is useful where a missing console
/// indicates a broken environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleFailurePolicy {
    /// Log a warning and proceed without a console.
    Continue,
    /// Treat the failure like any other bootstrap failure.
    Fatal,
}

/// Diagnostic console configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Whether to attach a console at all.
    pub enabled: bool,
    /// Console window title.
    pub title: String,
    /// Failure policy for the attach phase.
    pub on_failure: ConsoleFailurePolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Console window".to_string(),
            on_failure: ConsoleFailurePolicy::Continue,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application window settings.
    pub window: WindowConfig,
    /// Diagnostic console settings.
    pub console: ConsoleConfig,
    /// Request validation instrumentation from the graphics bootstrap.
    ///
    /// Useful during development; disable for release builds so the
    /// validation layers stop burning cycles on correct code.
    pub validate: bool,
    /// Default log level, overridable through `RUST_LOG`.
    pub log_level: String,
}

impl AppConfig {
    /// Create a configuration with the given window title and defaults
    /// for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowConfig::new(title),
            ..Self::default()
        }
    }

    /// Set the initial window client-area size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window = self.window.with_size(width, height);
        self
    }

    /// Enable or disable the diagnostic console.
    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console.enabled = enabled;
        self
    }

    /// Enable or disable graphics validation instrumentation.
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Set the default log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.window.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err("Window size must be non-zero".to_string());
        }

        if self.console.enabled && self.console.title.is_empty() {
            return Err("Console title cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            console: ConsoleConfig::default(),
            validate: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config for AppConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_side_by_side_layout() {
        let config = AppConfig::default();
        assert_eq!(config.window.title, "Hello World");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 360);
        assert!(config.console.enabled);
        assert_eq!(config.console.title, "Console window");
        assert_eq!(config.console.on_failure, ConsoleFailurePolicy::Continue);
        assert!(config.validate);
    }

    #[test]
    fn builder_overrides() {
        let config = AppConfig::new("Demo")
            .with_size(800, 600)
            .with_console(false)
            .with_validation(false)
            .with_log_level("debug");
        assert_eq!(config.window.title, "Demo");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert!(!config.console.enabled);
        assert!(!config.validate);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_zero_size() {
        let config = AppConfig::default().with_size(0, 360);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_title() {
        let config = AppConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_toml() {
        let path = std::env::temp_dir().join("vk_shell_app_config.toml");
        let contents = r#"
validate = false
log_level = "debug"

[window]
title = "Loaded"
width = 1280
height = 720

[console]
enabled = false
title = "Console window"
on_failure = "Fatal"
"#;
        std::fs::write(&path, contents).expect("write temp config");

        let config = AppConfig::load_from_file(&path).expect("load config");
        assert_eq!(config.window.title, "Loaded");
        assert_eq!(config.window.width, 1280);
        assert!(!config.validate);
        assert_eq!(config.console.on_failure, ConsoleFailurePolicy::Fatal);

        let _ = std::fs::remove_file(&path);
    }
}
