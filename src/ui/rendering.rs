//! Card rendering: background, textured image quad, outline, and label.
//!
//! The image pass draws one static quad per card and realises the
//! shader-space pan/zoom/rotate by placing the quad's vertices at the
//! screen-space preimage of the unit sample square (see [`crate::sampler`]).
//! The transform is affine in texture coordinates, so linear interpolation
//! across the preimage reproduces it exactly per fragment; the card rect is
//! first filled with the fallback gray so everything the image no longer
//! covers shows the out-of-range color.

use crate::constants::{FALLBACK_GRAY, LABEL_FONT_SIZE, LABEL_SAMPLE, OUTLINE_WIDTH};
use crate::coords::{card_corners, label_anchor, ViewTransform};
use crate::sampler::inverse_sample_coord;
use crate::types::Card;
use eframe::egui;

/// Label text color.
const LABEL_COLOR: egui::Color32 = egui::Color32::from_gray(230);
/// Outline for the selected and active card.
const OUTLINE_ACTIVE: egui::Color32 = egui::Color32::WHITE;
/// Outline for a card that is selected but no longer active.
const OUTLINE_SELECTED: egui::Color32 = egui::Color32::from_rgb(204, 0, 0);
/// Outline for every other card.
const OUTLINE_IDLE: egui::Color32 = egui::Color32::from_gray(128);

/// Per-frame card renderer bound to the canvas painter.
pub struct CardRenderer<'a> {
    painter: &'a egui::Painter,
    view: ViewTransform,
    dpi_factor: f32,
}

impl<'a> CardRenderer<'a> {
    /// Creates a renderer for one frame's canvas pass.
    pub fn new(painter: &'a egui::Painter, view: ViewTransform, dpi_factor: f32) -> Self {
        Self {
            painter,
            view,
            dpi_factor,
        }
    }

    /// Draws one card: background, image quad, outline, label.
    ///
    /// `texture` is the bound GPU texture for the card's image, or `None`
    /// when the card has no image or its bind failed (the failure is logged
    /// by the asset cache; this draw just skips the image pass).
    pub fn draw_card(
        &self,
        card: &Card,
        selected: bool,
        active: bool,
        texture: Option<egui::TextureId>,
    ) {
        let dims = (card.graph_width(), card.graph_height());
        let [tl, tr, bl, br] =
            card_corners(card.location, dims, self.dpi_factor, card.hidden, &self.view);
        let rect = egui::Rect::from_min_max(tl, br);

        self.painter.rect_filled(
            rect,
            0.0,
            underlay_color(card.image().is_some(), card.hidden, card.color),
        );

        if !card.hidden {
            if let (Some(image), Some(texture)) = (card.image(), texture) {
                let resolution = (image.width as f32, image.height as f32);
                self.draw_image_quad(card, texture, resolution, tl, bl, rect);
            }
        }

        let stroke = egui::Stroke::new(OUTLINE_WIDTH, outline_color(selected, active));
        self.painter
            .add(egui::Shape::closed_line(vec![tl, tr, br, bl], stroke));

        self.draw_label(card, tl, tr);
    }

    /// Draws the textured parallelogram showing the transformed image.
    fn draw_image_quad(
        &self,
        card: &Card,
        texture: egui::TextureId,
        resolution: (f32, f32),
        tl: egui::Pos2,
        bl: egui::Pos2,
        rect: egui::Rect,
    ) {
        let rotation = card.rotation_degrees.to_radians();
        let translation = egui::vec2(card.translation.0, card.translation.1);
        let width = rect.width();
        let height = rect.height();

        // Sample-square corners paired with their egui UVs. Sample space is
        // y-up while egui texture space is y-down, hence the v flip.
        let corners = [
            (egui::vec2(0.0, 0.0), egui::pos2(0.0, 1.0)),
            (egui::vec2(1.0, 0.0), egui::pos2(1.0, 1.0)),
            (egui::vec2(1.0, 1.0), egui::pos2(1.0, 0.0)),
            (egui::vec2(0.0, 1.0), egui::pos2(0.0, 0.0)),
        ];

        let mut mesh = egui::Mesh::with_texture(texture);
        for (sample, uv) in corners {
            let quad_uv =
                inverse_sample_coord(sample, rotation, card.scale, translation, resolution);
            let pos = egui::pos2(tl.x + quad_uv.x * width, bl.y - quad_uv.y * height);
            mesh.vertices.push(egui::epaint::Vertex {
                pos,
                uv,
                color: egui::Color32::WHITE,
            });
        }
        mesh.indices.extend_from_slice(&[0, 1, 2, 2, 3, 0]);

        self.painter
            .with_clip_rect(rect)
            .add(egui::Shape::mesh(mesh));
    }

    /// Draws the card label (or the placeholder) at its anchor, scaled with
    /// the zoom level and truncated to the card's width.
    fn draw_label(&self, card: &Card, tl: egui::Pos2, tr: egui::Pos2) {
        let width = tr.x - tl.x;
        let font_px = label_font_size(card.graph_width(), self.dpi_factor, width);
        if font_px < 1.0 {
            return;
        }
        let font_id = egui::FontId::proportional(font_px);
        let anchor = label_anchor(card.location, self.dpi_factor, card.hidden, &self.view);

        let sample = self.painter.layout_no_wrap(
            LABEL_SAMPLE.to_owned(),
            font_id.clone(),
            LABEL_COLOR,
        );
        let char_width = sample.size().x / LABEL_SAMPLE.len() as f32;

        let text = if card.label.is_empty() {
            "Select Source"
        } else {
            &card.label
        };
        let text = truncate_label(text, max_label_chars(width, tl.x, anchor.x, char_width));
        if text.is_empty() {
            return;
        }

        self.painter.text(
            anchor,
            egui::Align2::LEFT_BOTTOM,
            text,
            font_id,
            LABEL_COLOR,
        );
    }
}

/// Outline color for the card's selection state.
pub fn outline_color(selected: bool, active: bool) -> egui::Color32 {
    if selected && active {
        OUTLINE_ACTIVE
    } else if selected {
        OUTLINE_SELECTED
    } else {
        OUTLINE_IDLE
    }
}

/// Underlay fill for the card rect.
///
/// A visible image pass paints the fixed fallback gray wherever the sample
/// coordinate leaves the image, so the whole rect gets that gray before the
/// quad is drawn on top. The custom background shows only on cards with no
/// image and on collapsed cards, where there is no image pass to hide it.
pub fn underlay_color(has_image: bool, hidden: bool, custom: Option<[f32; 3]>) -> egui::Color32 {
    if has_image && !hidden {
        FALLBACK_GRAY
    } else {
        background_color(custom)
    }
}

/// Background fill: the custom color dimmed to 90%, or the default gray.
pub fn background_color(custom: Option<[f32; 3]>) -> egui::Color32 {
    match custom {
        Some([r, g, b]) => egui::Color32::from_rgb(
            (r * 0.9 * 255.0).clamp(0.0, 255.0) as u8,
            (g * 0.9 * 255.0).clamp(0.0, 255.0) as u8,
            (b * 0.9 * 255.0).clamp(0.0, 255.0) as u8,
        ),
        None => FALLBACK_GRAY,
    }
}

/// Label font size in screen pixels.
///
/// The base size is defined against the card's unzoomed on-screen width, so
/// the result grows and shrinks with the canvas zoom.
pub fn label_font_size(graph_width: f32, dpi_factor: f32, screen_width: f32) -> f32 {
    let node_width_px = graph_width * dpi_factor;
    if node_width_px <= 0.0 {
        return 0.0;
    }
    LABEL_FONT_SIZE / node_width_px * screen_width
}

/// How many characters fit between the label anchor and the card's right
/// edge, given an estimated per-character width.
pub fn max_label_chars(card_width: f32, tl_x: f32, anchor_x: f32, char_width: f32) -> usize {
    if char_width <= 0.0 {
        return 0;
    }
    let available = card_width + (tl_x - anchor_x);
    if available <= 0.0 {
        0
    } else {
        (available / char_width) as usize
    }
}

/// Truncates a label to at most `max_chars` characters.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    label.chars().take(max_chars).collect()
}
