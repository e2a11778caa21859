//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` that lives in the
//! site source directory. The file is sparse: stock defaults are the base layer
//! and the user file only overrides what it names.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml              # Site config (overrides stock defaults)
//! ├── about.md                 # About page (optional)
//! ├── contact.md               # Contact page (optional)
//! └── data/
//!     ├── sermons.json         # Fallback sermons
//!     ├── announcements.json   # Fallback announcements
//!     └── gallery.json         # Fallback gallery photos (optional)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! data_dir = "data"          # Fallback documents, relative to the source dir
//!
//! [site]
//! name = "Evening Light Tabernacle"
//! tagline = "A place of worship, fellowship, and spiritual growth"
//! service_times = ["Thursday at 5:00 PM", "Sunday at 8:00 AM"]
//!
//! [backend]
//! url = ""                   # Hosted project URL; empty = remote disabled
//! anon_key = ""              # Public (anon) API key
//! bucket = "gallery"         # Object-store bucket for photo binaries
//! object_prefix = "photos"   # Folder inside the bucket
//!
//! [announcement]
//! show = true                # Show the local default when nothing else exists
//! title = "Welcome"
//! text = "Join us this Sunday."
//!
//! [gallery]
//! preview_count = 4          # Photos shown on the home page
//! max_upload_bytes = 5242880 # Per-file upload limit (5 MiB)
//! swipe_threshold = 50       # Horizontal px before a swipe navigates
//!
//! [colors.light]
//! background = "#fffdf8"
//! ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the static fallback documents, relative to the source dir.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Church identity shown in headers and on the home page.
    pub site: SiteInfo,
    /// Hosted backend connection settings.
    pub backend: BackendConfig,
    /// Locally configured default announcement.
    pub announcement: DefaultAnnouncement,
    /// Gallery preview and upload settings.
    pub gallery: GalleryConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            site: SiteInfo::default(),
            backend: BackendConfig::default(),
            announcement: DefaultAnnouncement::default(),
            gallery: GalleryConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if !self.backend.url.is_empty()
            && !(self.backend.url.starts_with("https://") || self.backend.url.starts_with("http://"))
        {
            return Err(ConfigError::Validation(
                "backend.url must start with http:// or https://".into(),
            ));
        }
        if !self.backend.url.is_empty() && self.backend.anon_key.is_empty() {
            return Err(ConfigError::Validation(
                "backend.anon_key is required when backend.url is set".into(),
            ));
        }
        if self.backend.bucket.is_empty() {
            return Err(ConfigError::Validation(
                "backend.bucket must not be empty".into(),
            ));
        }
        if self.gallery.preview_count == 0 {
            return Err(ConfigError::Validation(
                "gallery.preview_count must be at least 1".into(),
            ));
        }
        if self.gallery.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "gallery.max_upload_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Church identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub tagline: String,
    /// Free-form service time lines, shown in order on the home page.
    pub service_times: Vec<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Evening Light Tabernacle".to_string(),
            tagline: "A place of worship, fellowship, and spiritual growth".to_string(),
            service_times: vec![
                "Thursday at 5:00 PM".to_string(),
                "Sunday at 8:00 AM".to_string(),
            ],
        }
    }
}

/// Hosted backend settings.
///
/// An empty `url` disables the remote gateway: every call fails with
/// `NotConfigured` and the site resolves from the fallback store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
    pub object_prefix: String,
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            bucket: "gallery".to_string(),
            object_prefix: "photos".to_string(),
        }
    }
}

/// Last-resort announcement, used when neither an active nor any recent
/// announcement can be resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultAnnouncement {
    pub show: bool,
    pub title: String,
    pub text: String,
}

impl Default for DefaultAnnouncement {
    fn default() -> Self {
        Self {
            show: true,
            title: "Welcome".to_string(),
            text: "Join us this Sunday. Everyone is welcome!".to_string(),
        }
    }
}

/// Gallery preview and upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Number of most recent photos shown on the home page.
    pub preview_count: usize,
    /// Per-file upload limit in bytes.
    pub max_upload_bytes: u64,
    /// Horizontal swipe distance in CSS pixels before the viewer navigates.
    pub swipe_threshold: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            preview_count: 4,
            max_upload_bytes: 5 * 1024 * 1024,
            swipe_threshold: 50,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Background color.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (dates, captions, footer).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Link color.
    pub link: String,
    /// Accent used for high-priority announcements and the banner.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fffdf8".to_string(),
            text: "#1d1d1f".to_string(),
            text_muted: "#6b6b70".to_string(),
            border: "#e6e1d6".to_string(),
            link: "#2c4a7a".to_string(),
            accent: "#b8860b".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111114".to_string(),
            text: "#ededed".to_string(),
            text_muted: "#9a9aa0".to_string(),
            border: "#2e2e33".to_string(),
            link: "#9db8e8".to_string(),
            accent: "#e0b84c".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    // SiteConfig holds only strings, integers, booleans and tables.
    toml::Value::try_from(SiteConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from the source directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given source directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Church Site Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory with the static fallback documents (sermons.json,
# announcements.json, gallery.json), relative to the source directory.
data_dir = "data"

# ---------------------------------------------------------------------------
# Church identity
# ---------------------------------------------------------------------------
[site]
name = "Evening Light Tabernacle"
tagline = "A place of worship, fellowship, and spiritual growth"
service_times = ["Thursday at 5:00 PM", "Sunday at 8:00 AM"]

# ---------------------------------------------------------------------------
# Hosted backend
# ---------------------------------------------------------------------------
[backend]
# Project URL, e.g. "https://xxxxx.supabase.co". Leave empty to build
# entirely from the fallback documents.
url = ""
# Public (anon) API key. Required when url is set.
anon_key = ""
# Object-store bucket and folder used for gallery photos.
bucket = "gallery"
object_prefix = "photos"

# ---------------------------------------------------------------------------
# Default announcement
# ---------------------------------------------------------------------------
# Featured when the backend has no active or recent announcement.
[announcement]
show = true
title = "Welcome"
text = "Join us this Sunday. Everyone is welcome!"

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
# Most recent photos shown on the home page.
preview_count = 4
# Per-file upload limit in bytes (5 MiB).
max_upload_bytes = 5242880
# Horizontal swipe distance (CSS px) before the photo viewer navigates.
swipe_threshold = 50

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fffdf8"
text = "#1d1d1f"
text_muted = "#6b6b70"    # Dates, captions, footer
border = "#e6e1d6"
link = "#2c4a7a"
accent = "#b8860b"        # High-priority announcements, banner

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111114"
text = "#ededed"
text_muted = "#9a9aa0"
border = "#2e2e33"
link = "#9db8e8"
accent = "#e0b84c"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_accent = colors.dark.accent,
    )
}
