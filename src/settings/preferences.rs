//! Typed user preferences.
//!
//! Stored as strings under the keys the browser extension has always used,
//! so an exported settings blob reads back unchanged. The three display
//! flags are opt-out: anything stored other than `"false"` means enabled.
//! Overlay visibility is opt-in and only `"true"` means visible.

use crate::error::{Result, SettingsError};
use crate::ingest::ExtractOptions;
use crate::render::RenderOptions;
use crate::settings::traits::Persistence;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A known preference key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    /// Show author avatars.
    AvatarsEnabled,
    /// Hash-color regular viewers' names.
    ColorizeEnabled,
    /// Show capture-time labels.
    TimestampsEnabled,
    /// Overlay shown when fullscreen.
    OverlayVisible,
}

impl PreferenceKey {
    /// Every key, in display order.
    pub const ALL: [Self; 4] = [
        Self::AvatarsEnabled,
        Self::ColorizeEnabled,
        Self::TimestampsEnabled,
        Self::OverlayVisible,
    ];

    /// Storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AvatarsEnabled => "chatAvatarsEnabled",
            Self::ColorizeEnabled => "chatColorizeEnabled",
            Self::TimestampsEnabled => "chatTimestampsEnabled",
            Self::OverlayVisible => "youtubeOverlayVisible",
        }
    }

    /// Value used when nothing is stored.
    #[must_use]
    pub const fn default_value(self) -> bool {
        !matches!(self, Self::OverlayVisible)
    }

    /// Interprets a stored string.
    #[must_use]
    pub fn decode(self, stored: &str) -> bool {
        if self.default_value() {
            stored != "false"
        } else {
            stored == "true"
        }
    }

    /// Parses a user-supplied value strictly.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] unless `value` is one of
    /// `true`, `false`, `on`, `off`, `1`, `0`.
    pub fn parse_value(self, value: &str) -> std::result::Result<bool, SettingsError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" => Ok(false),
            _ => Err(SettingsError::InvalidValue {
                key: self.as_str().to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey { key: s.to_string() })
    }
}

/// The full preference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preferences {
    /// Show author avatars.
    pub avatars_enabled: bool,
    /// Hash-color regular viewers' names.
    pub colorize_enabled: bool,
    /// Show capture-time labels.
    pub timestamps_enabled: bool,
    /// Overlay shown when fullscreen.
    pub overlay_visible: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            avatars_enabled: PreferenceKey::AvatarsEnabled.default_value(),
            colorize_enabled: PreferenceKey::ColorizeEnabled.default_value(),
            timestamps_enabled: PreferenceKey::TimestampsEnabled.default_value(),
            overlay_visible: PreferenceKey::OverlayVisible.default_value(),
        }
    }
}

impl Preferences {
    /// Reads every preference, defaulting the ones never stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(store: &dyn Persistence) -> Result<Self> {
        let mut prefs = Self::default();
        for key in PreferenceKey::ALL {
            if let Some(stored) = store.get(key.as_str())? {
                prefs.set(key, key.decode(&stored));
            }
        }
        Ok(prefs)
    }

    /// Writes every preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, store: &mut dyn Persistence) -> Result<()> {
        for key in PreferenceKey::ALL {
            self.save_key(key, store)?;
        }
        Ok(())
    }

    /// Writes one preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_key(&self, key: PreferenceKey, store: &mut dyn Persistence) -> Result<()> {
        store.set(key.as_str(), if self.get(key) { "true" } else { "false" })
    }

    /// Value for `key`.
    #[must_use]
    pub const fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::AvatarsEnabled => self.avatars_enabled,
            PreferenceKey::ColorizeEnabled => self.colorize_enabled,
            PreferenceKey::TimestampsEnabled => self.timestamps_enabled,
            PreferenceKey::OverlayVisible => self.overlay_visible,
        }
    }

    /// Sets `key`.
    pub const fn set(&mut self, key: PreferenceKey, value: bool) {
        match key {
            PreferenceKey::AvatarsEnabled => self.avatars_enabled = value,
            PreferenceKey::ColorizeEnabled => self.colorize_enabled = value,
            PreferenceKey::TimestampsEnabled => self.timestamps_enabled = value,
            PreferenceKey::OverlayVisible => self.overlay_visible = value,
        }
    }

    /// Display toggles for materialization.
    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_avatars: self.avatars_enabled,
            show_timestamps: self.timestamps_enabled,
        }
    }

    /// Options for extraction.
    #[must_use]
    pub const fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            colorize: self.colorize_enabled,
        }
    }
}
