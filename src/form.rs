//! Host-side form model.
//!
//! The widget writes its output into named slots instead of touching UI
//! elements directly: a string value field for the data-URI, a thumbnail slot
//! that becomes visible once it has a source, and a placeholder slot that is
//! hidden once a photo exists. Pure data so it can be asserted on in tests
//! without spinning up egui.

use std::collections::BTreeMap;

use crate::config::FieldId;

/// A thumbnail preview slot.
#[derive(Clone, Debug, Default)]
pub struct Thumbnail {
    /// Data-URI shown by the thumbnail, if any.
    pub src: Option<String>,
    /// Hidden until a crop has been confirmed.
    pub hidden: bool,
}

#[derive(Debug, Default)]
pub struct FormStore {
    values: BTreeMap<FieldId, String>,
    thumbnails: BTreeMap<FieldId, Thumbnail>,
    placeholders: BTreeMap<FieldId, bool>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a string value field, initially empty.
    pub fn add_value_field(&mut self, id: impl Into<FieldId>) {
        self.values.insert(id.into(), String::new());
    }

    /// Declares a thumbnail slot, initially hidden with no source.
    pub fn add_thumbnail(&mut self, id: impl Into<FieldId>) {
        self.thumbnails.insert(
            id.into(),
            Thumbnail {
                src: None,
                hidden: true,
            },
        );
    }

    /// Declares a placeholder slot, initially visible.
    pub fn add_placeholder(&mut self, id: impl Into<FieldId>) {
        self.placeholders.insert(id.into(), false);
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.values.contains_key(id)
            || self.thumbnails.contains_key(id)
            || self.placeholders.contains_key(id)
    }

    pub fn value(&self, id: &FieldId) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn set_value(&mut self, id: &FieldId, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(id) {
            *slot = value.into();
        }
    }

    pub fn thumbnail(&self, id: &FieldId) -> Option<&Thumbnail> {
        self.thumbnails.get(id)
    }

    /// Sets the thumbnail source and reveals it.
    pub fn show_thumbnail(&mut self, id: &FieldId, src: impl Into<String>) {
        if let Some(thumb) = self.thumbnails.get_mut(id) {
            thumb.src = Some(src.into());
            thumb.hidden = false;
        }
    }

    /// Whether a placeholder slot is currently hidden.
    pub fn placeholder_hidden(&self, id: &FieldId) -> bool {
        self.placeholders.get(id).copied().unwrap_or(false)
    }

    pub fn hide_placeholder(&mut self, id: &FieldId) {
        if let Some(hidden) = self.placeholders.get_mut(id) {
            *hidden = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_start_empty_and_visible() {
        let mut form = FormStore::new();
        form.add_value_field("data");
        form.add_thumbnail("thumb");
        form.add_placeholder("ph");

        assert_eq!(form.value(&"data".into()), Some(""));
        let thumb = form.thumbnail(&"thumb".into()).unwrap();
        assert!(thumb.hidden);
        assert!(thumb.src.is_none());
        assert!(!form.placeholder_hidden(&"ph".into()));
    }

    #[test]
    fn show_thumbnail_sets_source_and_unhides() {
        let mut form = FormStore::new();
        form.add_thumbnail("thumb");
        form.show_thumbnail(&"thumb".into(), "data:image/png;base64,xyz");
        let thumb = form.thumbnail(&"thumb".into()).unwrap();
        assert!(!thumb.hidden);
        assert_eq!(thumb.src.as_deref(), Some("data:image/png;base64,xyz"));
    }

    #[test]
    fn writes_to_undeclared_fields_are_ignored() {
        let mut form = FormStore::new();
        form.set_value(&"missing".into(), "x");
        assert!(form.value(&"missing".into()).is_none());
        assert!(!form.contains(&"missing".into()));
    }
}
