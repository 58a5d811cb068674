//! Modal photo-crop widget for egui forms.
//!
//! The host application owns one [`CropModal`] and a [`WidgetRegistry`].
//! Each registered trigger ties a file picker to form outputs: a value field
//! that receives the cropped photo as a `data:image/png;base64,...` string,
//! a thumbnail that shows it, and a placeholder that disappears once a photo
//! exists.
//!
//! Typical frame loop:
//! 1. on pick, [`loader::spawn_read`] reads and decodes the file off-thread;
//! 2. poll the channel; on a loaded photo, [`CropModal::open`] starts a
//!    session with the widget's [`CropConfig`];
//! 3. call [`CropModal::show`] every frame; when it returns a
//!    [`SessionResult`], hand it to [`WidgetRegistry::apply`].
//!
//! Cropping itself sits behind the [`CropperEngine`] trait; the bundled
//! [`BoxCropper`] provides an aspect-locked, movable, resizable crop box.

pub mod config;
pub mod encode;
pub mod engine;
pub mod form;
pub mod loader;
pub mod modal;
pub mod registry;

pub use config::{CropConfig, FieldId, OutputBindings, RegisterError, TriggerId};
pub use engine::{BoxCropper, CropperEngine, ExtractOptions, Handle};
pub use form::{FormStore, Thumbnail};
pub use loader::LoadedPhoto;
pub use modal::{CropModal, CropOutcome, SessionResult};
pub use registry::{RegistryEntry, Widget, WidgetRegistry};
