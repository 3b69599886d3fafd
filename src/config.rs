//! Behavior configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Every value has a
//! stock default matching the markup and copy the site ships with; a config
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [messages]
//! name_required = "Please enter full name."
//! email_invalid = "Please enter a valid email."
//! phone_required = "Please enter phone number."
//! course_required = "Please select a course."
//! sent = "Application sent — thank you! We will email you within 48–72 hours."
//!
//! [colors]
//! error = "#7f1d1d"
//! success = "#064e3b"
//!
//! [lazy_load]
//! root_margin = "120px 0px"      # Pre-load margin around the viewport
//! failed_opacity = 0.5           # Opacity of images that failed to load
//! dim_unpromoted_failures = false
//!
//! [anchors]
//! fallback_to_default = false
//!
//! [markup]
//! hamburger_id = "hamburger"
//! nav_list_class = "nav-list"
//! # ... one key per id/class/attribute of the markup contract
//! ```
//!
//! ## Markup Mapping
//!
//! The `[markup]` table is the migration mapping for pages whose markup uses
//! different names. Defaults are drop-in compatible with the stock page.
//!
//! Unknown keys are rejected to catch typos early.

use crate::observer::RootMargin;
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

/// Behavior configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorConfig {
    /// Admission form status copy.
    pub messages: MessagesConfig,
    /// Status text colors.
    pub colors: StatusColors,
    /// Lazy image loading.
    pub lazy_load: LazyLoadConfig,
    /// In-page anchor scrolling.
    pub anchors: AnchorsConfig,
    /// Names of the ids, classes and attributes the controller binds to.
    pub markup: MarkupConfig,
}

impl BehaviorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.lazy_load.failed_opacity) {
            return Err(ConfigError::Validation(
                "lazy_load.failed_opacity must be between 0 and 1".into(),
            ));
        }
        if self.lazy_load.root_margin.parse::<RootMargin>().is_err() {
            return Err(ConfigError::Validation(format!(
                "lazy_load.root_margin `{}` is not a pixel margin like \"120px 0px\"",
                self.lazy_load.root_margin
            )));
        }
        for (key, value) in self.markup.entries() {
            let valid = !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "markup.{key} must be a non-empty name of letters, digits, '-' or '_'"
                )));
            }
        }
        if self.messages.sent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "messages.sent must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Admission form status copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
    pub name_required: String,
    pub email_invalid: String,
    pub phone_required: String,
    pub course_required: String,
    /// Shown after a successful (simulated) submission.
    pub sent: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            name_required: "Please enter full name.".to_string(),
            email_invalid: "Please enter a valid email.".to_string(),
            phone_required: "Please enter phone number.".to_string(),
            course_required: "Please select a course.".to_string(),
            sent: "Application sent — thank you! We will email you within 48–72 hours."
                .to_string(),
        }
    }
}

/// Colors applied to the form status element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusColors {
    pub error: String,
    pub success: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            error: "#7f1d1d".to_string(),
            success: "#064e3b".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyLoadConfig {
    /// Margin around the viewport inside which images start loading.
    pub root_margin: String,
    /// Inline opacity applied to an image whose load failed.
    pub failed_opacity: f64,
    /// Also dim images that failed without ever having been promoted.
    pub dim_unpromoted_failures: bool,
}

impl LazyLoadConfig {
    /// Parsed root margin. Falls back to the stock margin for unvalidated input.
    pub fn margin(&self) -> RootMargin {
        self.root_margin.parse().unwrap_or_default()
    }
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            root_margin: "120px 0px".to_string(),
            failed_opacity: 0.5,
            dim_unpromoted_failures: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnchorsConfig {
    /// When the anchor target does not exist, let the browser perform its
    /// default jump instead of swallowing the click.
    pub fallback_to_default: bool,
}

/// The markup contract: every id, class and attribute the controller uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    pub hamburger_id: String,
    pub nav_list_class: String,
    pub submenu_group_class: String,
    pub submenu_button_class: String,
    pub submenu_list_class: String,
    pub gallery_grid_id: String,
    pub gallery_item_class: String,
    pub pending_src_attr: String,
    pub lightbox_id: String,
    pub lightbox_image_id: String,
    pub lightbox_caption_id: String,
    pub lightbox_close_id: String,
    pub accordion_button_class: String,
    pub accordion_panel_class: String,
    pub form_id: String,
    pub form_status_id: String,
    pub form_clear_id: String,
    pub year_id: String,
    /// Class marking an open nav list or submenu.
    pub open_class: String,
    /// Class marking the hidden lightbox.
    pub hidden_class: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            hamburger_id: "hamburger".to_string(),
            nav_list_class: "nav-list".to_string(),
            submenu_group_class: "has-sub".to_string(),
            submenu_button_class: "sub-btn".to_string(),
            submenu_list_class: "sub-list".to_string(),
            gallery_grid_id: "galleryGrid".to_string(),
            gallery_item_class: "gallery-item".to_string(),
            pending_src_attr: "data-src".to_string(),
            lightbox_id: "lightbox".to_string(),
            lightbox_image_id: "lightboxImg".to_string(),
            lightbox_caption_id: "lightboxCaption".to_string(),
            lightbox_close_id: "lightboxClose".to_string(),
            accordion_button_class: "accordion-btn".to_string(),
            accordion_panel_class: "accordion-panel".to_string(),
            form_id: "admissionForm".to_string(),
            form_status_id: "formStatus".to_string(),
            form_clear_id: "clearForm".to_string(),
            year_id: "year".to_string(),
            open_class: "show".to_string(),
            hidden_class: "hidden".to_string(),
        }
    }
}

impl MarkupConfig {
    /// `(key, value)` for every name, in declaration order.
    pub fn entries(&self) -> [(&'static str, &str); 20] {
        [
            ("hamburger_id", self.hamburger_id.as_str()),
            ("nav_list_class", self.nav_list_class.as_str()),
            ("submenu_group_class", self.submenu_group_class.as_str()),
            ("submenu_button_class", self.submenu_button_class.as_str()),
            ("submenu_list_class", self.submenu_list_class.as_str()),
            ("gallery_grid_id", self.gallery_grid_id.as_str()),
            ("gallery_item_class", self.gallery_item_class.as_str()),
            ("pending_src_attr", self.pending_src_attr.as_str()),
            ("lightbox_id", self.lightbox_id.as_str()),
            ("lightbox_image_id", self.lightbox_image_id.as_str()),
            ("lightbox_caption_id", self.lightbox_caption_id.as_str()),
            ("lightbox_close_id", self.lightbox_close_id.as_str()),
            ("accordion_button_class", self.accordion_button_class.as_str()),
            ("accordion_panel_class", self.accordion_panel_class.as_str()),
            ("form_id", self.form_id.as_str()),
            ("form_status_id", self.form_status_id.as_str()),
            ("form_clear_id", self.form_clear_id.as_str()),
            ("year_id", self.year_id.as_str()),
            ("open_class", self.open_class.as_str()),
            ("hidden_class", self.hidden_class.as_str()),
        ]
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BehaviorConfig::default()).expect("default config must serialize")
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

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
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
) -> Result<BehaviorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BehaviorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<BehaviorConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    if overlay.is_some() {
        log::debug!("loaded {}", dir.join("config.toml").display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# site-behavior configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Admission form status messages
# ---------------------------------------------------------------------------
[messages]
name_required = "Please enter full name."
email_invalid = "Please enter a valid email."
phone_required = "Please enter phone number."
course_required = "Please select a course."
# Shown after a successful submission. Submission is simulated locally.
sent = "Application sent — thank you! We will email you within 48–72 hours."

# ---------------------------------------------------------------------------
# Status text colors
# ---------------------------------------------------------------------------
[colors]
error = "#7f1d1d"
success = "#064e3b"

# ---------------------------------------------------------------------------
# Lazy image loading
# ---------------------------------------------------------------------------
[lazy_load]
# Images start loading once they come within this margin of the viewport.
# CSS margin shorthand, pixels only.
root_margin = "120px 0px"

# Opacity applied to an image whose load failed.
failed_opacity = 0.5

# Images are only dimmed on failure after their pending source was promoted.
# Set to true to also dim images that already had their final source.
dim_unpromoted_failures = false

# ---------------------------------------------------------------------------
# In-page anchors
# ---------------------------------------------------------------------------
[anchors]
# Clicking "#section" when no such element exists is swallowed by default.
# Set to true to let the browser perform its normal fragment jump instead.
fallback_to_default = false

# ---------------------------------------------------------------------------
# Markup contract
# ---------------------------------------------------------------------------
# Names of the ids, classes and attributes the controller binds to. Change
# these to adopt markup that uses different names.
[markup]
hamburger_id = "hamburger"
nav_list_class = "nav-list"
submenu_group_class = "has-sub"
submenu_button_class = "sub-btn"
submenu_list_class = "sub-list"
gallery_grid_id = "galleryGrid"
gallery_item_class = "gallery-item"
pending_src_attr = "data-src"
lightbox_id = "lightbox"
lightbox_image_id = "lightboxImg"
lightbox_caption_id = "lightboxCaption"
lightbox_close_id = "lightboxClose"
accordion_button_class = "accordion-btn"
accordion_panel_class = "accordion-panel"
form_id = "admissionForm"
form_status_id = "formStatus"
form_clear_id = "clearForm"
year_id = "year"
open_class = "show"
hidden_class = "hidden"
"##
}
