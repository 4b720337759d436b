#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! [`TourConfig::default`] matches the stock overlay. [`TourConfig::from_env`]
//! layers `FTOUR_*` environment overrides on top; unparsable values are
//! ignored and the default is kept.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FTOUR_POLL_INTERVAL_MS` | `poll_interval` |
//! | `FTOUR_DEFAULT_PADDING` | `default_padding` |
//! | `FTOUR_DEFAULT_OFFSET` | `default_offset` |
//! | `FTOUR_DISABLE_KEYBOARD` | `disable_keyboard_navigation` |
//! | `FTOUR_DISABLE_OUTSIDE_CLICK` | `disable_close_on_click_outside` |
//! | `FTOUR_ACCENT_COLOR` | `accent_color` |
//! | `FTOUR_ROUNDED` | `rounded` |

use core::time::Duration;
use std::env;

/// Spotlight padding around the target, in px.
pub const DEFAULT_PADDING: f64 = 12.0;
/// Gap between the spotlight and the tooltip, in px.
pub const DEFAULT_OFFSET: f64 = 16.0;
/// Rect re-measurement period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Overlay and tracking configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TourConfig {
    /// How often the tracker re-measures the target.
    pub poll_interval: Duration,
    /// Padding for steps that do not set their own.
    pub default_padding: f64,
    /// Tooltip offset for steps that do not set their own.
    pub default_offset: f64,
    /// Ignore Escape / arrow keys while open.
    pub disable_keyboard_navigation: bool,
    /// Clicking the backdrop does not close the tour.
    pub disable_close_on_click_outside: bool,
    /// Highlight border colour (any CSS colour).
    pub accent_color: String,
    /// Highlight corner radius in px.
    pub rounded: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_padding: DEFAULT_PADDING,
            default_offset: DEFAULT_OFFSET,
            disable_keyboard_navigation: false,
            disable_close_on_click_outside: false,
            accent_color: "#4f46e5".into(),
            rounded: 12.0,
        }
    }
}

impl TourConfig {
    /// Defaults with `FTOUR_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults with overrides read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = lookup("FTOUR_POLL_INTERVAL_MS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_millis(ms).max(MIN_POLL_INTERVAL);
        }
        if let Some(px) = lookup("FTOUR_DEFAULT_PADDING").and_then(|v| parse_px(&v)) {
            config.default_padding = px;
        }
        if let Some(px) = lookup("FTOUR_DEFAULT_OFFSET").and_then(|v| parse_px(&v)) {
            config.default_offset = px;
        }
        if let Some(flag) = lookup("FTOUR_DISABLE_KEYBOARD").and_then(|v| parse_bool(&v)) {
            config.disable_keyboard_navigation = flag;
        }
        if let Some(flag) = lookup("FTOUR_DISABLE_OUTSIDE_CLICK").and_then(|v| parse_bool(&v)) {
            config.disable_close_on_click_outside = flag;
        }
        if let Some(color) = lookup("FTOUR_ACCENT_COLOR") {
            let color = color.trim();
            if !color.is_empty() {
                config.accent_color = color.to_owned();
            }
        }
        if let Some(px) = lookup("FTOUR_ROUNDED").and_then(|v| parse_px(&v)) {
            config.rounded = px;
        }

        config
    }

    /// Set the poll interval (floored at one frame).
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Set the default padding.
    #[must_use]
    pub fn with_default_padding(mut self, padding: f64) -> Self {
        self.default_padding = padding;
        self
    }

    /// Set the default tooltip offset.
    #[must_use]
    pub fn with_default_offset(mut self, offset: f64) -> Self {
        self.default_offset = offset;
        self
    }

    /// Disable keyboard navigation.
    #[must_use]
    pub fn without_keyboard_navigation(mut self) -> Self {
        self.disable_keyboard_navigation = true;
        self
    }

    /// Keep the tour open when the backdrop is clicked.
    #[must_use]
    pub fn without_close_on_click_outside(mut self) -> Self {
        self.disable_close_on_click_outside = true;
        self
    }

    /// Set the highlight accent colour.
    #[must_use]
    pub fn with_accent_color(mut self, color: impl Into<String>) -> Self {
        self.accent_color = color.into();
        self
    }
}

fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value
        .parse::<f64>()
        .ok()
        .filter(|px| px.is_finite() && *px >= 0.0)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
