//! The crop modal controller.
//!
//! One `CropModal` is owned by the hosting application and painted every
//! frame. It holds at most one session: opening a new one tears down and
//! silently discards whatever was pending, which serializes crop sessions
//! across any number of registered triggers.
//!
//! Lifecycle: Idle -> Previewing -> Confirmed | Cancelled -> Idle. The
//! preview texture is shown immediately; the engine is only constructed once
//! the settle delay has elapsed, so the first measured layout is stable.

use std::sync::Arc;
use std::time::Instant;

use eframe::egui::{self, Color32, Rect, Sense, Stroke};
use image::DynamicImage;
use log::{debug, warn};

use crate::config::{CropConfig, TriggerId};
use crate::encode::png_data_uri;
use crate::engine::{BoxCropper, CropperEngine, ExtractOptions};

/// How a crop session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CropOutcome {
    Confirmed { data_uri: String },
    Cancelled,
}

/// A finished session, tagged with the trigger that started it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionResult {
    pub trigger: TriggerId,
    pub outcome: CropOutcome,
}

type EngineFactory = Box<dyn Fn(Arc<DynamicImage>, &CropConfig) -> Box<dyn CropperEngine>>;

struct Session {
    trigger: TriggerId,
    config: CropConfig,
    image: Arc<DynamicImage>,
    opened_at: Instant,
    texture: Option<egui::TextureHandle>,
    engine: Option<Box<dyn CropperEngine>>,
}

pub struct CropModal {
    session: Option<Session>,
    engine_factory: EngineFactory,
}

impl Default for CropModal {
    fn default() -> Self {
        Self::new()
    }
}

impl CropModal {
    pub fn new() -> Self {
        Self {
            session: None,
            engine_factory: Box::new(|image, config| {
                Box::new(BoxCropper::new(image, config.aspect_ratio, config.auto_crop_area))
            }),
        }
    }

    /// Replaces the engine factory. Lets hosts and tests substitute the
    /// bundled [`BoxCropper`].
    pub fn with_engine_factory(
        mut self,
        factory: impl Fn(Arc<DynamicImage>, &CropConfig) -> Box<dyn CropperEngine> + 'static,
    ) -> Self {
        self.engine_factory = Box::new(factory);
        self
    }

    /// Starts a session for `trigger`. Any session already open is discarded
    /// without yielding a result.
    pub fn open(&mut self, trigger: TriggerId, image: DynamicImage, config: CropConfig) {
        if let Some(prev) = self.session.take() {
            debug!("discarding open crop session for {:?}", prev.trigger);
        }
        self.session = Some(Session {
            trigger,
            config,
            image: Arc::new(image),
            opened_at: Instant::now(),
            texture: None,
            engine: None,
        });
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Trigger of the session currently being edited, if any.
    pub fn active_trigger(&self) -> Option<&TriggerId> {
        self.session.as_ref().map(|s| &s.trigger)
    }

    pub fn engine_built(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.engine.is_some())
    }

    /// Constructs the engine once the settle delay has elapsed. Called from
    /// [`show`](Self::show) each frame; exposed for headless hosts.
    pub fn ensure_engine(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.engine.is_some() || session.opened_at.elapsed() < session.config.settle_delay {
            return;
        }
        session.engine = Some((self.engine_factory)(session.image.clone(), &session.config));
    }

    /// Confirms the session: extracts, encodes, and tears down. A missing
    /// engine or empty extraction closes the session with `Cancelled` and
    /// writes nothing.
    pub fn confirm(&mut self) -> Option<SessionResult> {
        let session = self.session.take()?;
        let opts = ExtractOptions {
            width: session.config.output_size[0],
            height: session.config.output_size[1],
            smooth: true,
            fill: session.config.fill_color,
        };
        let outcome = match session.engine.as_ref().and_then(|e| e.extract(&opts)) {
            Some(raster) => match png_data_uri(&raster) {
                Ok(data_uri) => CropOutcome::Confirmed { data_uri },
                Err(err) => {
                    warn!("failed to encode cropped photo: {err}");
                    CropOutcome::Cancelled
                }
            },
            None => {
                warn!("crop extraction produced no raster, closing without output");
                CropOutcome::Cancelled
            }
        };
        Some(SessionResult {
            trigger: session.trigger,
            outcome,
        })
    }

    /// Cancels and tears down the session without touching any output.
    pub fn cancel(&mut self) -> Option<SessionResult> {
        let session = self.session.take()?;
        Some(SessionResult {
            trigger: session.trigger,
            outcome: CropOutcome::Cancelled,
        })
    }

    /// Paints the modal and handles its input. Returns the session result on
    /// the frame the user confirms or cancels.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<SessionResult> {
        self.session.as_ref()?;
        self.ensure_engine();

        let session = self.session.as_mut().expect("checked above");
        if session.texture.is_none() {
            session.texture = Some(load_texture(ctx, &session.image));
        }
        if session.engine.is_none() {
            ctx.request_repaint_after(session.config.settle_delay);
        }

        let screen = ctx.screen_rect();
        let mut backdrop_clicked = false;
        let mut confirm_clicked = false;
        let mut cancel_clicked = false;

        egui::Area::new(egui::Id::new("photo_crop_backdrop"))
            .order(egui::Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let response = ui.allocate_rect(screen, Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, Color32::from_black_alpha(170));
                if response.clicked() {
                    backdrop_clicked = true;
                }
            });

        egui::Area::new(egui::Id::new("photo_crop_modal"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Frame::window(&ctx.style()).show(ui, |ui| {
                    ui.heading("Adjust the photo area and zoom");
                    ui.add_space(6.0);

                    let max_size = screen.size() * 0.8;
                    let image_size = egui::vec2(
                        session.image.width() as f32,
                        session.image.height() as f32,
                    );
                    let scale = (max_size.x / image_size.x).min(max_size.y / image_size.y);
                    let display_size = image_size * scale;

                    let (image_rect, response) =
                        ui.allocate_exact_size(display_size, Sense::drag());
                    let painter = ui.painter_at(image_rect);

                    if let Some(texture) = &session.texture {
                        painter.image(
                            texture.id(),
                            image_rect,
                            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            Color32::WHITE,
                        );
                    }

                    if let Some(engine) = session.engine.as_mut() {
                        let mut screen_crop = to_screen(engine.crop_rect(), image_rect);

                        if response.drag_started() {
                            let hit = response
                                .interact_pointer_pos()
                                .and_then(|pos| engine.hit_test(pos, screen_crop));
                            engine.begin_drag(hit);
                        }
                        if response.dragged() && engine.dragging() {
                            let delta = response.drag_delta() / display_size;
                            engine.drag_by(delta, display_size);
                            screen_crop = to_screen(engine.crop_rect(), image_rect);
                        }
                        if response.drag_stopped() {
                            engine.end_drag();
                        }

                        paint_crop_box(&painter, image_rect, screen_crop);
                    }

                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui.button("Use photo").clicked() {
                            confirm_clicked = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel_clicked = true;
                        }
                    });
                });
            });

        if confirm_clicked {
            self.confirm()
        } else if cancel_clicked || backdrop_clicked {
            self.cancel()
        } else {
            None
        }
    }
}

fn load_texture(ctx: &egui::Context, image: &DynamicImage) -> egui::TextureHandle {
    let size = [image.width() as _, image.height() as _];
    let buffer = image.to_rgba8();
    let pixels = buffer.as_flat_samples();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
    ctx.load_texture("photo_crop_preview", color_image, egui::TextureOptions::LINEAR)
}

fn to_screen(crop: Rect, image_rect: Rect) -> Rect {
    Rect::from_min_max(
        image_rect.lerp_inside(crop.min.to_vec2()),
        image_rect.lerp_inside(crop.max.to_vec2()),
    )
}

/// Dims everything outside the crop box, then draws thirds guides, the box
/// border, and the eight drag handles.
fn paint_crop_box(painter: &egui::Painter, image_rect: Rect, crop: Rect) {
    let overlay = Color32::from_black_alpha(150);

    painter.rect_filled(
        Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, crop.min.y)),
        0.0,
        overlay,
    );
    painter.rect_filled(
        Rect::from_min_max(egui::pos2(image_rect.min.x, crop.max.y), image_rect.max),
        0.0,
        overlay,
    );
    painter.rect_filled(
        Rect::from_min_max(
            egui::pos2(image_rect.min.x, crop.min.y),
            egui::pos2(crop.min.x, crop.max.y),
        ),
        0.0,
        overlay,
    );
    painter.rect_filled(
        Rect::from_min_max(
            egui::pos2(crop.max.x, crop.min.y),
            egui::pos2(image_rect.max.x, crop.max.y),
        ),
        0.0,
        overlay,
    );

    let guide = Stroke::new(1.0, Color32::from_white_alpha(90));
    for i in 1..3 {
        let t = i as f32 / 3.0;
        let x = crop.min.x + crop.width() * t;
        let y = crop.min.y + crop.height() * t;
        painter.line_segment(
            [egui::pos2(x, crop.min.y), egui::pos2(x, crop.max.y)],
            guide,
        );
        painter.line_segment(
            [egui::pos2(crop.min.x, y), egui::pos2(crop.max.x, y)],
            guide,
        );
    }

    painter.rect_stroke(crop, 0.0, Stroke::new(1.0, Color32::WHITE));

    let handle_stroke = Stroke::new(1.0, Color32::BLACK);
    let handles = [
        crop.min,
        crop.max,
        egui::pos2(crop.min.x, crop.max.y),
        egui::pos2(crop.max.x, crop.min.y),
        crop.center_top(),
        crop.center_bottom(),
        crop.left_center(),
        crop.right_center(),
    ];
    for pos in handles {
        painter.circle(pos, 6.0, Color32::WHITE, handle_stroke);
    }
}
