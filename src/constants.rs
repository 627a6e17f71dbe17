//! Shared application-wide constants.
//! Centralizes tweakable values used across rendering, gestures, and layout.

use eframe::egui;

// Card dimensions
/// Default card width in graph units when no image is assigned.
pub const DEFAULT_CARD_WIDTH: f32 = 140.0;
/// Default card height in graph units when no image is assigned.
pub const DEFAULT_CARD_HEIGHT: f32 = 100.0;
/// Divisor applied to an image's pixel width to derive the card's graph width.
pub const IMAGE_WIDTH_DIVISOR: f32 = 8.0;

// DPI / projection
/// Baseline DPI the dpi factor is computed against.
pub const BASELINE_DPI: f32 = 72.0;
/// Vertical nudge (in view units, pre-projection) applied to collapsed cards
/// so the label stays anchored to the collapsed header.
pub const HIDDEN_Y_NUDGE: f32 = 5.0;
/// Label anchor offset (in view units, pre-projection) for expanded cards.
pub const LABEL_OFFSET: (f32, f32) = (23.0, -15.0);
/// Label anchor offset (in view units, pre-projection) for collapsed cards.
pub const LABEL_OFFSET_HIDDEN: (f32, f32) = (22.0, -15.0);

// Gestures
/// Pointer-to-translation divisor for the Move gesture (screen px per unit).
pub const MOVE_DIVISOR: f32 = 750.0;
/// Scale step applied by the instantaneous ZoomIn/ZoomOut actions.
pub const ZOOM_STEP: f32 = 0.1;

// Rendering
/// Fallback gray drawn where the sample coordinate leaves the source image,
/// and the default card background (0.188 in linear float color).
pub const FALLBACK_GRAY: egui::Color32 = egui::Color32::from_gray(48);
/// Base label font size before zoom scaling.
pub const LABEL_FONT_SIZE: f32 = 12.0;
/// Outline stroke width in screen pixels.
pub const OUTLINE_WIDTH: f32 = 2.0;
/// Sample string whose measured width, divided by its length, estimates a
/// character width for label truncation.
pub const LABEL_SAMPLE: &str = "Abcde";

// Bulk import layout
/// Number of cards per layout row.
pub const CARDS_PER_ROW: usize = 10;
/// Horizontal gutter between cards in graph units.
pub const LAYOUT_GUTTER_X: f32 = 10.0;
/// Vertical gutter between rows in graph units.
pub const LAYOUT_GUTTER_Y: f32 = 20.0;

// Canvas
/// Minimum canvas zoom factor.
pub const MIN_ZOOM: f32 = 0.25;
/// Maximum canvas zoom factor.
pub const MAX_ZOOM: f32 = 5.0;
/// Zoom step per scroll event.
pub const CANVAS_ZOOM_STEP: f32 = 0.025;
