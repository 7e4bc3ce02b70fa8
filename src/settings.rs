use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::controller::ChromeOptions;
use crate::geometry::Margins;
use crate::logging::LogLevel;
use crate::snapshot::GeometrySnapshot;
use crate::timer::ShadowShowPolicy;
use crate::title_bar::Theme;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChromeSettings {
    // Title bar
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub theme: Theme,

    // Shadow
    #[serde(default = "default_shadow_width")]
    pub shadow_width: i32,
    #[serde(default)]
    pub shadow_policy: ShadowShowPolicy,

    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String, // "Off", "Error", "Warn", "Info", "Debug", "Trace"
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,

    // Session restore
    #[serde(default = "default_remember_geometry")]
    pub remember_geometry: bool,
    /// Versioned geometry snapshot envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_geometry: Option<Value>,
}

fn default_shadow_width() -> i32 {
    config::shadow::DEFAULT_WIDTH
}

fn default_log_level() -> String {
    "Error".to_string()
}

fn default_log_to_file() -> bool {
    true
}

fn default_log_retention_days() -> u32 {
    config::timing::LOG_RETENTION_DAYS
}

fn default_remember_geometry() -> bool {
    true
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            theme: Theme::default(),
            shadow_width: default_shadow_width(),
            shadow_policy: ShadowShowPolicy::default(),
            log_level: default_log_level(),
            log_to_file: default_log_to_file(),
            log_retention_days: default_log_retention_days(),
            remember_geometry: default_remember_geometry(),
            last_geometry: None,
        }
    }
}

impl ChromeSettings {
    /// Window options derived from these settings
    pub fn chrome_options(&self, title: &str) -> ChromeOptions {
        ChromeOptions {
            title: title.to_string(),
            margins: self.margins,
            shadow_width: self.shadow_width,
            shadow_policy: self.shadow_policy,
            theme: self.theme,
        }
    }

    /// Parsed log level; unknown strings fall back to Error
    pub fn log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            LogLevel::Error
        })
    }

    /// Saved geometry, if remembered and readable
    pub fn last_geometry(&self) -> Option<GeometrySnapshot> {
        if !self.remember_geometry {
            return None;
        }
        let saved = self.last_geometry.as_ref()?;
        match GeometrySnapshot::from_json(saved) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable saved geometry");
                None
            }
        }
    }

    pub fn remember(&mut self, snapshot: &GeometrySnapshot) -> anyhow::Result<()> {
        if self.remember_geometry {
            self.last_geometry = Some(snapshot.to_json()?);
        }
        Ok(())
    }
}
