//! Widget registration and output routing.
//!
//! A [`WidgetRegistry`] ties each file trigger to its output bindings and
//! crop configuration, tracks which file is currently selected per trigger,
//! and applies finished sessions to the form. Registration is validated
//! against the form up front; a bad binding is an error, not a no-op.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::warn;

use crate::config::{CropConfig, OutputBindings, RegisterError, TriggerId};
use crate::form::FormStore;
use crate::modal::{CropOutcome, SessionResult};

/// One registered crop widget.
#[derive(Debug)]
pub struct Widget {
    pub bindings: OutputBindings,
    pub config: CropConfig,
    /// Path of the file currently selected on this trigger. Cleared at
    /// session teardown so re-selecting the same file starts a new session.
    pub selection: Option<PathBuf>,
}

/// A batch registration entry.
pub struct RegistryEntry {
    pub trigger: TriggerId,
    pub bindings: OutputBindings,
    pub config: CropConfig,
}

#[derive(Default)]
pub struct WidgetRegistry {
    widgets: BTreeMap<TriggerId, Widget>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a crop widget on `trigger`, validating every binding
    /// against `form`.
    pub fn register(
        &mut self,
        trigger: impl Into<TriggerId>,
        bindings: OutputBindings,
        config: CropConfig,
        form: &FormStore,
    ) -> Result<(), RegisterError> {
        let trigger = trigger.into();
        if self.widgets.contains_key(&trigger) {
            return Err(RegisterError::DuplicateTrigger(trigger));
        }
        if !(config.aspect_ratio.is_finite() && config.aspect_ratio > 0.0) {
            return Err(RegisterError::InvalidAspectRatio(
                config.aspect_ratio,
                trigger,
            ));
        }
        for id in [&bindings.value_field, &bindings.thumbnail, &bindings.placeholder]
            .into_iter()
            .flatten()
        {
            if !form.contains(id) {
                return Err(RegisterError::UnknownField(id.clone()));
            }
        }
        self.widgets.insert(
            trigger,
            Widget {
                bindings,
                config,
                selection: None,
            },
        );
        Ok(())
    }

    /// Batch registration. Entries that fail validation are skipped with a
    /// warning; returns how many were registered.
    pub fn register_all(
        &mut self,
        entries: impl IntoIterator<Item = RegistryEntry>,
        form: &FormStore,
    ) -> usize {
        let mut registered = 0;
        for entry in entries {
            match self.register(entry.trigger.clone(), entry.bindings, entry.config, form) {
                Ok(()) => registered += 1,
                Err(err) => warn!("skipping crop widget {:?}: {err}", entry.trigger),
            }
        }
        registered
    }

    pub fn widget(&self, trigger: &TriggerId) -> Option<&Widget> {
        self.widgets.get(trigger)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &TriggerId> {
        self.widgets.keys()
    }

    /// Records the file picked on `trigger`. Returns the widget's config so
    /// the caller can hand it to the modal alongside the decoded image.
    pub fn file_selected(&mut self, trigger: &TriggerId, path: PathBuf) -> Option<CropConfig> {
        let widget = self.widgets.get_mut(trigger)?;
        widget.selection = Some(path);
        Some(widget.config.clone())
    }

    /// Routes a finished session into the form.
    ///
    /// Confirmed: the data-URI goes into the bound value field, the thumbnail
    /// gets the same source and is revealed, the placeholder is hidden.
    /// Cancelled: no binding is touched. Either way the trigger's file
    /// selection is cleared.
    pub fn apply(&mut self, result: SessionResult, form: &mut FormStore) {
        let Some(widget) = self.widgets.get_mut(&result.trigger) else {
            warn!("crop session finished for unknown trigger {:?}", result.trigger);
            return;
        };
        widget.selection = None;

        let CropOutcome::Confirmed { data_uri } = result.outcome else {
            return;
        };
        if let Some(id) = &widget.bindings.value_field {
            form.set_value(id, data_uri.clone());
        }
        if let Some(id) = &widget.bindings.thumbnail {
            form.show_thumbnail(id, data_uri.clone());
        }
        if let Some(id) = &widget.bindings.placeholder {
            form.hide_placeholder(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::{CropModal, CropOutcome};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::time::Duration;

    fn profile_form() -> FormStore {
        let mut form = FormStore::new();
        form.add_value_field("data");
        form.add_thumbnail("thumb");
        form.add_placeholder("ph");
        form
    }

    fn photo_bindings() -> OutputBindings {
        OutputBindings::default()
            .value_field("data")
            .thumbnail("thumb")
            .placeholder("ph")
    }

    fn instant_config() -> CropConfig {
        CropConfig {
            settle_delay: Duration::ZERO,
            ..CropConfig::default()
        }
    }

    fn photo(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255])))
    }

    #[test]
    fn register_rejects_unknown_fields() {
        let form = profile_form();
        let mut registry = WidgetRegistry::new();
        let err = registry
            .register(
                "photo",
                OutputBindings::default().value_field("nope"),
                CropConfig::default(),
                &form,
            )
            .unwrap_err();
        assert!(matches!(err, RegisterError::UnknownField(_)));
    }

    #[test]
    fn register_rejects_duplicates_and_bad_ratios() {
        let form = profile_form();
        let mut registry = WidgetRegistry::new();
        registry
            .register("photo", photo_bindings(), CropConfig::default(), &form)
            .unwrap();
        assert!(matches!(
            registry.register("photo", photo_bindings(), CropConfig::default(), &form),
            Err(RegisterError::DuplicateTrigger(_))
        ));
        assert!(matches!(
            registry.register(
                "other",
                OutputBindings::default(),
                CropConfig::default().aspect_ratio(0.0),
                &form,
            ),
            Err(RegisterError::InvalidAspectRatio(..))
        ));
    }

    #[test]
    fn register_all_skips_invalid_entries() {
        let form = profile_form();
        let mut registry = WidgetRegistry::new();
        let registered = registry.register_all(
            [
                RegistryEntry {
                    trigger: "photo".into(),
                    bindings: photo_bindings(),
                    config: CropConfig::default(),
                },
                RegistryEntry {
                    trigger: "broken".into(),
                    bindings: OutputBindings::default().thumbnail("missing"),
                    config: CropConfig::default(),
                },
            ],
            &form,
        );
        assert_eq!(registered, 1);
        assert!(registry.widget(&"photo".into()).is_some());
        assert!(registry.widget(&"broken".into()).is_none());
    }

    /// End-to-end: select a 2000x1000 photo, confirm, and check every output.
    #[test]
    fn confirmed_session_populates_all_bindings() {
        let mut form = profile_form();
        let mut registry = WidgetRegistry::new();
        registry
            .register("photo", photo_bindings(), instant_config(), &form)
            .unwrap();

        let trigger: TriggerId = "photo".into();
        let config = registry
            .file_selected(&trigger, PathBuf::from("avatar.jpg"))
            .unwrap();
        assert!(registry.widget(&trigger).unwrap().selection.is_some());

        let mut modal = CropModal::new();
        modal.open(trigger.clone(), photo(2000, 1000), config);
        modal.ensure_engine();
        let result = modal.confirm().unwrap();
        assert!(matches!(result.outcome, CropOutcome::Confirmed { .. }));

        registry.apply(result, &mut form);

        let value = form.value(&"data".into()).unwrap();
        assert!(value.starts_with("data:image/png;base64,"));
        let thumb = form.thumbnail(&"thumb".into()).unwrap();
        assert!(!thumb.hidden);
        assert_eq!(thumb.src.as_deref(), Some(value));
        assert!(form.placeholder_hidden(&"ph".into()));
        assert!(registry.widget(&trigger).unwrap().selection.is_none());
    }

    #[test]
    fn cancelled_session_touches_nothing_but_clears_selection() {
        let mut form = profile_form();
        let mut registry = WidgetRegistry::new();
        registry
            .register("photo", photo_bindings(), instant_config(), &form)
            .unwrap();

        let trigger: TriggerId = "photo".into();
        let config = registry
            .file_selected(&trigger, PathBuf::from("avatar.jpg"))
            .unwrap();

        let mut modal = CropModal::new();
        modal.open(trigger.clone(), photo(640, 480), config);
        modal.ensure_engine();
        let result = modal.cancel().unwrap();
        registry.apply(result, &mut form);

        assert_eq!(form.value(&"data".into()), Some(""));
        assert!(form.thumbnail(&"thumb".into()).unwrap().hidden);
        assert!(!form.placeholder_hidden(&"ph".into()));
        assert!(registry.widget(&trigger).unwrap().selection.is_none());
    }
}
