//! Coordinate conversions between graph space, view space, and screen space.
//!
//! Graph space is the y-up logical coordinate system cards are laid out in.
//! View space is graph space scaled by the dpi factor (what card dimensions
//! are measured in). Screen space is egui's y-down pixel space inside the
//! canvas region. All functions here are pure.

use crate::constants::{
    BASELINE_DPI, HIDDEN_Y_NUDGE, LABEL_OFFSET, LABEL_OFFSET_HIDDEN,
};
use eframe::egui;

/// Scale factor of the host display relative to the 72-DPI baseline.
///
/// # Arguments
///
/// * `dpi` - The host-reported logical DPI
/// * `pixel_scale` - Device pixel scale (e.g. 2.0 on retina displays)
pub fn dpi_factor(dpi: f32, pixel_scale: f32) -> f32 {
    dpi * pixel_scale / BASELINE_DPI
}

/// The canvas view transform: pan offset plus zoom.
///
/// Projects y-up view-space positions into y-down screen pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen-space position of the view origin.
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal).
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    /// Projects a view-space position onto the screen, flipping the y axis.
    pub fn view_to_region(&self, view_pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            view_pos.x * self.zoom + self.offset.x,
            -view_pos.y * self.zoom + self.offset.y,
        )
    }

    /// Inverse of [`Self::view_to_region`].
    pub fn region_to_view(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            (screen_pos.x - self.offset.x) / self.zoom,
            -(screen_pos.y - self.offset.y) / self.zoom,
        )
    }
}

/// Screen-space corners of a card's quad.
///
/// Order: top-left, top-right, bottom-left, bottom-right ("top" in graph
/// space, i.e. the smaller screen y after projection).
pub fn card_corners(
    location: (f32, f32),
    graph_dims: (f32, f32),
    dpi_factor: f32,
    hidden: bool,
    view: &ViewTransform,
) -> [egui::Pos2; 4] {
    let x = location.0 * dpi_factor;
    let mut y = location.1 * dpi_factor;
    if hidden {
        y += HIDDEN_Y_NUDGE * dpi_factor;
    }
    let (w, h) = (graph_dims.0 * dpi_factor, graph_dims.1 * dpi_factor);

    let top_left = view.view_to_region(egui::pos2(x, y));
    let top_right = view.view_to_region(egui::pos2(x + w, y));
    y -= h;
    let bottom_left = view.view_to_region(egui::pos2(x, y));
    let bottom_right = view.view_to_region(egui::pos2(x + w, y));

    [top_left, top_right, bottom_left, bottom_right]
}

/// Screen-space baseline position for the card's label.
///
/// The offset is applied in view space before projection, so the label keeps
/// a fixed distance from the card's header at every zoom level.
pub fn label_anchor(
    location: (f32, f32),
    dpi_factor: f32,
    hidden: bool,
    view: &ViewTransform,
) -> egui::Pos2 {
    let offset = if hidden { LABEL_OFFSET_HIDDEN } else { LABEL_OFFSET };
    let x = location.0 * dpi_factor + offset.0 * dpi_factor;
    let y = location.1 * dpi_factor + offset.1 * dpi_factor;
    view.view_to_region(egui::pos2(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_factor_matches_baseline() {
        assert_eq!(dpi_factor(72.0, 1.0), 1.0);
        assert_eq!(dpi_factor(144.0, 1.0), 2.0);
        assert_eq!(dpi_factor(72.0, 2.0), 2.0);
    }

    #[test]
    fn projection_round_trips() {
        let view = ViewTransform {
            offset: egui::vec2(123.0, -45.5),
            zoom: 1.7,
        };
        for &(x, y) in &[(0.0, 0.0), (100.0, -250.0), (-3.25, 7.75)] {
            let p = egui::pos2(x, y);
            let back = view.region_to_view(view.view_to_region(p));
            assert!((back.x - p.x).abs() < 1e-3, "x: {} vs {}", back.x, p.x);
            assert!((back.y - p.y).abs() < 1e-3, "y: {} vs {}", back.y, p.y);
        }
    }

    #[test]
    fn corners_span_the_scaled_dimensions() {
        let view = ViewTransform {
            offset: egui::vec2(10.0, 10.0),
            zoom: 2.0,
        };
        let dpi = 1.0;
        let [tl, tr, bl, br] = card_corners((100.0, 50.0), (80.0, 60.0), dpi, false, &view);
        assert_eq!(tr.x - tl.x, 80.0 * 2.0);
        // Screen y grows downward; the graph-space bottom is below the top.
        assert_eq!(bl.y - tl.y, 60.0 * 2.0);
        assert_eq!(br, egui::pos2(tr.x, bl.y));
    }

    #[test]
    fn hidden_cards_are_nudged_up() {
        let view = ViewTransform::default();
        let dpi = 2.0;
        let [tl, ..] = card_corners((0.0, 0.0), (10.0, 10.0), dpi, false, &view);
        let [tl_hidden, ..] = card_corners((0.0, 0.0), (10.0, 10.0), dpi, true, &view);
        // +5 view units, times dpi, upward in graph space = smaller screen y.
        assert_eq!(tl.y - tl_hidden.y, 5.0 * dpi);
    }

    #[test]
    fn label_anchor_uses_collapsed_offset() {
        let view = ViewTransform::default();
        let expanded = label_anchor((0.0, 0.0), 1.0, false, &view);
        let hidden = label_anchor((0.0, 0.0), 1.0, true, &view);
        assert_eq!(expanded.x - hidden.x, 1.0);
        assert_eq!(expanded.y, hidden.y);
    }
}
