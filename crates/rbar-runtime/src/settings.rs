#![forbid(unsafe_code)]

//! Typed overlay settings and their TOML configuration.
//!
//! Every runtime knob is a [`Setting<T>`]: a named [`Observable`] that the
//! overlay subscribes to once at construction. Initial values come from an
//! [`OverlayConfig`], which can be loaded from TOML and exported back for
//! the host to persist.
//!
//! # Loading
//!
//! ```toml
//! enabled = true
//! group_sort = true
//! threshold = 80
//! class_filter = "CLR SHM DRU"
//!
//! [position]
//! left = 20
//! top = 40
//! ```
//!
//! # Defaults
//!
//! Bars start disabled at `(5, 5)` stretching to the screen edges, sorted by
//! category, with automatic bar size and the default font.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use rbar_core::category::{CategoryPriorityOrder, CategorySet, VisibilityFlags};

use crate::error::ConfigError;
use crate::reactive::{Observable, Subscription};

/// Font setting value meaning "use the host's default font".
pub const USE_DEFAULT_FONT: &str = "Default";
/// Host font loaded for [`USE_DEFAULT_FONT`].
pub const DEFAULT_FONT: &str = "arial_08";

pub const BAR_WIDTH_LIMIT: i32 = 150;
pub const BAR_HEIGHT_LIMIT: i32 = 50;

// ---------------------------------------------------------------------------
// Setting
// ---------------------------------------------------------------------------

/// A named, observable setting.
///
/// Cloning shares the value and subscribers.
#[derive(Clone)]
pub struct Setting<T> {
    name: &'static str,
    value: Observable<T>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Setting<T> {
    #[must_use]
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            value: Observable::new(value),
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// Store `value`; subscribers run before this returns when it changed.
    pub fn set(&self, value: T) -> bool {
        let changed = self.value.set(value);
        if changed {
            self.value
                .with(|value| debug!(setting = self.name, ?value, "setting changed"));
        }
        changed
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.value.subscribe(callback)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.value.version()
    }
}

impl Setting<bool> {
    /// Flip the flag, returning the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// OverlaySettings
// ---------------------------------------------------------------------------

/// All runtime settings of the overlay.
#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub enabled: Setting<bool>,
    pub clickable: Setting<bool>,
    pub left: Setting<i32>,
    pub top: Setting<i32>,
    /// `0` means the screen's right edge.
    pub right: Setting<i32>,
    /// `0` means the screen's bottom edge.
    pub bottom: Setting<i32>,
    /// `0` means size from the font.
    pub bar_width: Setting<i32>,
    /// `0` means size from the font.
    pub bar_height: Setting<i32>,
    pub show_all: Setting<bool>,
    pub group_sort: Setting<bool>,
    pub threshold: Setting<u8>,
    /// Background opacity percent; `0` draws no background.
    pub background_alpha: Setting<u8>,
    pub class_priority: Setting<String>,
    pub class_always: Setting<String>,
    pub class_never: Setting<String>,
    pub class_filter: Setting<String>,
    pub font: Setting<String>,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

impl OverlaySettings {
    #[must_use]
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            enabled: Setting::new("enabled", config.enabled),
            clickable: Setting::new("clickable", config.clickable),
            left: Setting::new("left", config.position.left),
            top: Setting::new("top", config.position.top),
            right: Setting::new("right", config.position.right),
            bottom: Setting::new("bottom", config.position.bottom),
            bar_width: Setting::new("bar_width", config.bar_width),
            bar_height: Setting::new("bar_height", config.bar_height),
            show_all: Setting::new("show_all", config.show_all),
            group_sort: Setting::new("group_sort", config.group_sort),
            threshold: Setting::new("threshold", config.threshold),
            background_alpha: Setting::new("background_alpha", config.background_alpha),
            class_priority: Setting::new("class_priority", config.class_priority.clone()),
            class_always: Setting::new("class_always", config.class_always.clone()),
            class_never: Setting::new("class_never", config.class_never.clone()),
            class_filter: Setting::new("class_filter", config.class_filter.clone()),
            font: Setting::new("font", config.font.clone()),
        }
    }

    /// Current values, for the host to persist.
    #[must_use]
    pub fn export(&self) -> OverlayConfig {
        OverlayConfig {
            enabled: self.enabled.get(),
            clickable: self.clickable.get(),
            position: PositionConfig {
                left: self.left.get(),
                top: self.top.get(),
                right: self.right.get(),
                bottom: self.bottom.get(),
            },
            bar_width: self.bar_width.get(),
            bar_height: self.bar_height.get(),
            show_all: self.show_all.get(),
            group_sort: self.group_sort.get(),
            threshold: self.threshold.get(),
            background_alpha: self.background_alpha.get(),
            class_priority: self.class_priority.get(),
            class_always: self.class_always.get(),
            class_never: self.class_never.get(),
            class_filter: self.class_filter.get(),
            font: self.font.get(),
        }
    }

    #[must_use]
    pub fn priority(&self) -> CategoryPriorityOrder {
        self.class_priority
            .with(|text| CategoryPriorityOrder::from_override(text))
    }

    #[must_use]
    pub fn visibility(&self) -> VisibilityFlags {
        VisibilityFlags {
            always: self.class_always.with(|text| CategorySet::from_list(text)),
            never: self.class_never.with(|text| CategorySet::from_list(text)),
            filter: self.class_filter.with(|text| CategorySet::from_list(text)),
        }
    }

    /// The host font to load for the current font setting, and whether it
    /// is the default font.
    #[must_use]
    pub fn resolved_font(&self) -> (String, bool) {
        self.font.with(|name| {
            if name.is_empty() || name == USE_DEFAULT_FONT {
                (DEFAULT_FONT.to_owned(), true)
            } else {
                (name.clone(), false)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// OverlayConfig
// ---------------------------------------------------------------------------

/// Viewport edges in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            left: 5,
            top: 5,
            right: 0,
            bottom: 0,
        }
    }
}

impl PositionConfig {
    /// Problems with these edges; empty when valid.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.left < 0 || self.top < 0 {
            problems.push("left and top must not be negative".to_owned());
        }
        if self.right != 0 && self.right < self.left {
            problems.push("right must be 0 or not less than left".to_owned());
        }
        if self.bottom != 0 && self.bottom < self.top {
            problems.push("bottom must be 0 or not less than top".to_owned());
        }
        problems
    }
}

/// Serializable initial values for [`OverlaySettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub clickable: bool,
    pub bar_width: i32,
    pub bar_height: i32,
    pub show_all: bool,
    pub group_sort: bool,
    pub threshold: u8,
    pub background_alpha: u8,
    pub class_priority: String,
    pub class_always: String,
    pub class_never: String,
    pub class_filter: String,
    pub font: String,
    pub position: PositionConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            clickable: false,
            position: PositionConfig::default(),
            bar_width: 0,
            bar_height: 0,
            show_all: false,
            group_sort: false,
            threshold: 100,
            background_alpha: 0,
            class_priority: String::new(),
            class_always: String::new(),
            class_never: String::new(),
            class_filter: String::new(),
            font: USE_DEFAULT_FONT.to_owned(),
        }
    }
}

impl OverlayConfig {
    /// Load from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk and validate.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize for persistence.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Range problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.position.problems();
        if !(0..=BAR_WIDTH_LIMIT).contains(&self.bar_width) {
            errors.push(format!("bar_width must be 0 to {BAR_WIDTH_LIMIT}"));
        }
        if !(0..=BAR_HEIGHT_LIMIT).contains(&self.bar_height) {
            errors.push(format!("bar_height must be 0 to {BAR_HEIGHT_LIMIT}"));
        }
        if self.threshold > 100 {
            errors.push("threshold must be 0 to 100".to_owned());
        }
        if self.background_alpha > 100 {
            errors.push("background_alpha must be 0 to 100".to_owned());
        }
        errors
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
