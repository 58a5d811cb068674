//! Widget configuration and registration errors.
//!
//! Everything the modal used to pull out of thin air (output size, settle
//! delay, auto-crop fraction, fill color) lives here as named fields with
//! documented defaults, so hosts can override any of them per widget.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Identifier of a form element inside a [`FormStore`](crate::form::FormStore).
///
/// Bindings are resolved against the form at registration time, so a bad id
/// fails registration instead of silently doing nothing later.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(String);

impl FieldId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a registered file trigger (one trigger per file input).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(String);

impl TriggerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TriggerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for TriggerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a confirmed crop gets written.
///
/// All three targets are optional; an unbound target is simply not touched.
#[derive(Clone, Debug, Default)]
pub struct OutputBindings {
    /// Value field receiving the PNG data-URI.
    pub value_field: Option<FieldId>,
    /// Thumbnail slot; gets the same data-URI as its source and is unhidden.
    pub thumbnail: Option<FieldId>,
    /// "No photo" placeholder; hidden once a crop is confirmed.
    pub placeholder: Option<FieldId>,
}

impl OutputBindings {
    pub fn value_field(mut self, id: impl Into<FieldId>) -> Self {
        self.value_field = Some(id.into());
        self
    }

    pub fn thumbnail(mut self, id: impl Into<FieldId>) -> Self {
        self.thumbnail = Some(id.into());
        self
    }

    pub fn placeholder(mut self, id: impl Into<FieldId>) -> Self {
        self.placeholder = Some(id.into());
        self
    }
}

/// Per-widget crop configuration.
#[derive(Clone, Debug)]
pub struct CropConfig {
    /// Width-to-height ratio enforced on the crop box. `1.0` is square.
    pub aspect_ratio: f32,
    /// Pixel size of the extracted output, `[width, height]`.
    pub output_size: [u32; 2],
    /// Fraction of the preview the initial crop box covers, centered.
    pub auto_crop_area: f32,
    /// Delay between showing the preview and constructing the engine, so the
    /// image has been laid out and measured before the crop box is placed.
    pub settle_delay: Duration,
    /// RGB backing color for transparent or uncovered output area.
    pub fill_color: [u8; 3],
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            output_size: [400, 400],
            auto_crop_area: 0.8,
            settle_delay: Duration::from_millis(50),
            fill_color: [0xff, 0xff, 0xff],
        }
    }
}

impl CropConfig {
    pub fn aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn output_size(mut self, width: u32, height: u32) -> Self {
        self.output_size = [width, height];
        self
    }
}

/// Errors raised when registering a crop widget.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// A bound field id does not exist in the form.
    #[error("form has no field {0:?}")]
    UnknownField(FieldId),

    /// The trigger already has a widget registered.
    #[error("trigger {0:?} is already registered")]
    DuplicateTrigger(TriggerId),

    /// The aspect ratio must be a positive finite number.
    #[error("invalid aspect ratio {0} for trigger {1:?}")]
    InvalidAspectRatio(f32, TriggerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CropConfig::default();
        assert_eq!(config.aspect_ratio, 1.0);
        assert_eq!(config.output_size, [400, 400]);
        assert_eq!(config.auto_crop_area, 0.8);
        assert_eq!(config.settle_delay, Duration::from_millis(50));
        assert_eq!(config.fill_color, [0xff, 0xff, 0xff]);
    }

    #[test]
    fn bindings_builder() {
        let b = OutputBindings::default()
            .value_field("data")
            .thumbnail("thumb");
        assert_eq!(b.value_field, Some("data".into()));
        assert_eq!(b.thumbnail, Some("thumb".into()));
        assert!(b.placeholder.is_none());
    }
}
