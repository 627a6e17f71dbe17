//! # Reference Board
//!
//! A canvas for laying out reference images as draggable cards. Each card
//! shows one image and carries its own pan/zoom/rotate transform applied in
//! texture space, so the image moves inside a fixed card quad:
//! - **Cards**: draggable quads sized from their source image
//! - **Gestures**: modal Move/Rotate sessions with numeric rotation entry,
//!   plus instant zoom steps
//! - **Bulk import**: load a folder's worth of images into rows of cards
//!
//! ## Features
//! - Canvas panning and zooming
//! - Per-card image transform editing (pointer gestures or typed values)
//! - Board save/load as JSON
//! - Background image decoding with per-file error recovery

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod assets;
pub mod constants;
pub mod coords;
pub mod sampler;
pub mod types;
mod ui;

pub use ui::BoardApp;

/// Runs the board application with default settings.
///
/// Initializes the egui application window, restores persisted state when
/// available, and starts the main event loop.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an
/// `eframe::Error` if initialization fails.
///
/// # Example
///
/// ```no_run
/// use refboard::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Reference Board",
        options,
        Box::new(|cc| {
            let app = cc
                .storage
                .and_then(|storage| storage.get_string("app_state"))
                .and_then(|json| match BoardApp::from_json(&json) {
                    Ok(app) => Some(app),
                    Err(err) => {
                        log::warn!("failed to restore app state: {err}");
                        None
                    }
                })
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}
