//! Background file reading.
//!
//! Reading and decoding the picked file is the widget's only asynchronous
//! boundary: it happens on a spawned thread and the result comes back over an
//! mpsc channel the app polls each frame. Unreadable or non-image files are
//! dropped without any user-visible effect.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use image::DynamicImage;
use log::debug;

use crate::config::TriggerId;
use crate::encode::decode_image;

/// A successfully read and decoded photo, tagged with its trigger.
pub struct LoadedPhoto {
    pub trigger: TriggerId,
    pub image: DynamicImage,
}

pub fn load_channel() -> (Sender<LoadedPhoto>, Receiver<LoadedPhoto>) {
    channel()
}

/// Reads `path` off-thread and sends the decoded photo back on `tx`.
///
/// The `repaint` hook is called after a successful send so the UI wakes up
/// even when idle; pass a no-op in headless contexts.
pub fn spawn_read(
    trigger: TriggerId,
    path: PathBuf,
    tx: Sender<LoadedPhoto>,
    repaint: impl Fn() + Send + 'static,
) {
    thread::spawn(move || {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("ignoring unreadable file {}: {err}", path.display());
                return;
            }
        };
        let Some(image) = decode_image(&bytes) else {
            debug!("ignoring non-image file {}", path.display());
            return;
        };
        if tx.send(LoadedPhoto { trigger, image }).is_ok() {
            repaint();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::tests::png_bytes;
    use std::time::Duration;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("photo-crop-test-{name}-{}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn image_file_is_delivered() {
        let (tx, rx) = load_channel();
        let path = temp_file("ok.png", &png_bytes(12, 8));
        spawn_read("photo".into(), path.clone(), tx, || {});
        let loaded = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(loaded.trigger, "photo".into());
        assert_eq!((loaded.image.width(), loaded.image.height()), (12, 8));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn non_image_file_is_silently_dropped() {
        let (tx, rx) = load_channel();
        let path = temp_file("nope.txt", b"definitely not pixels");
        spawn_read("photo".into(), path.clone(), tx, || {});
        // The sender is moved into the thread, so the channel disconnects
        // once the read finishes without sending.
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_silently_dropped() {
        let (tx, rx) = load_channel();
        spawn_read(
            "photo".into(),
            PathBuf::from("/nonexistent/photo-crop-missing.png"),
            tx,
            || {},
        );
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
