#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

//! Demo: a small profile form with a photo-crop widget.

use std::sync::mpsc::{Receiver, Sender};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use eframe::egui;
use photo_crop::{
    CropConfig, CropModal, FormStore, LoadedPhoto, OutputBindings, RegistryEntry, TriggerId,
    WidgetRegistry, encode, loader,
};

const PHOTO_TRIGGER: &str = "profile-photo";

struct DemoApp {
    form: FormStore,
    registry: WidgetRegistry,
    modal: CropModal,
    load_tx: Sender<LoadedPhoto>,
    load_rx: Receiver<LoadedPhoto>,
    /// Thumbnail texture cache, keyed by the data-URI it was built from.
    thumb_texture: Option<(String, egui::TextureHandle)>,
}

impl DemoApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut form = FormStore::new();
        form.add_value_field("photo-data");
        form.add_thumbnail("photo-thumb");
        form.add_placeholder("photo-placeholder");

        let mut registry = WidgetRegistry::new();
        let registered = registry.register_all(
            [RegistryEntry {
                trigger: PHOTO_TRIGGER.into(),
                bindings: OutputBindings::default()
                    .value_field("photo-data")
                    .thumbnail("photo-thumb")
                    .placeholder("photo-placeholder"),
                config: CropConfig::default(),
            }],
            &form,
        );
        debug_assert_eq!(registered, 1);

        let (load_tx, load_rx) = loader::load_channel();
        Self {
            form,
            registry,
            modal: CropModal::new(),
            load_tx,
            load_rx,
            thumb_texture: None,
        }
    }

    fn select_file(&mut self, ctx: &egui::Context, path: std::path::PathBuf) {
        let trigger: TriggerId = PHOTO_TRIGGER.into();
        if self.registry.file_selected(&trigger, path.clone()).is_some() {
            let repaint_ctx = ctx.clone();
            loader::spawn_read(trigger, path, self.load_tx.clone(), move || {
                repaint_ctx.request_repaint()
            });
        }
    }

    fn thumbnail_texture(&mut self, ctx: &egui::Context, src: &str) -> Option<egui::TextureHandle> {
        if let Some((key, texture)) = &self.thumb_texture {
            if key == src {
                return Some(texture.clone());
            }
        }
        let png = BASE64
            .decode(src.strip_prefix("data:image/png;base64,")?)
            .ok()?;
        let image = encode::decode_image(&png)?;
        let size = [image.width() as _, image.height() as _];
        let buffer = image.to_rgba8();
        let pixels = buffer.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        let texture =
            ctx.load_texture("profile_thumbnail", color_image, egui::TextureOptions::LINEAR);
        self.thumb_texture = Some((src.to_owned(), texture.clone()));
        Some(texture)
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Finished background reads open the modal.
        while let Ok(loaded) = self.load_rx.try_recv() {
            if let Some(widget) = self.registry.widget(&loaded.trigger) {
                self.modal
                    .open(loaded.trigger.clone(), loaded.image, widget.config.clone());
            }
        }

        // A file dropped on the window acts like a pick on the photo trigger.
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            let dropped = ctx.input(|i| i.raw.dropped_files.clone());
            if let Some(path) = dropped.first().and_then(|f| f.path.clone()) {
                self.select_file(ctx, path);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Profile");
            ui.add_space(8.0);

            if !self.form.placeholder_hidden(&"photo-placeholder".into()) {
                ui.label("No photo yet.");
            }

            let thumb_src = self
                .form
                .thumbnail(&"photo-thumb".into())
                .filter(|t| !t.hidden)
                .and_then(|t| t.src.clone());
            if let Some(src) = thumb_src {
                if let Some(texture) = self.thumbnail_texture(ctx, &src) {
                    ui.image((texture.id(), egui::vec2(120.0, 120.0)));
                }
            }

            ui.add_space(8.0);
            if ui.button("Choose photo…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", &["png", "jpg", "jpeg", "bmp"])
                    .pick_file()
                {
                    self.select_file(ctx, path);
                }
            }

            let value_len = self
                .form
                .value(&"photo-data".into())
                .map(str::len)
                .unwrap_or(0);
            if value_len > 0 {
                ui.add_space(8.0);
                ui.label(format!("Stored value: {value_len} bytes of data-URI"));
            }
        });

        if let Some(result) = self.modal.show(ctx) {
            self.registry.apply(result, &mut self.form);
        }
    }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Photo Crop",
        options,
        Box::new(|cc| Ok(Box::new(DemoApp::new(cc)))),
    )
}
