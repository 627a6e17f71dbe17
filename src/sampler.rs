//! Shader-space image transform.
//!
//! A card's image is panned, zoomed, and rotated by transforming *texture*
//! coordinates rather than the quad's vertices: one static quad can then show
//! any view of its source image. This module holds the pure math; the
//! renderer applies it by mapping the unit sample square back through
//! [`inverse_sample_coord`] (the transform is affine, so interpolating the
//! preimage corners is exact per fragment).
//!
//! The rotation is aspect-corrected so it looks visually uniform: texture
//! space is stretched to the image's pixel aspect ratio, rotated, and
//! un-stretched. `resolution` is the *image's* pixel size throughout, which
//! means the correction tracks the source image rather than the viewport.

use eframe::egui;

/// Rotates `tc` around (0.5, 0.5) with aspect correction.
///
/// Equivalent to `S⁻¹ · R(angle) · S` applied to `tc - 0.5`, where
/// `S = diag(aspect, 1)`.
pub fn rotate_aspect(angle_rad: f32, tc: egui::Vec2, aspect: f32) -> egui::Vec2 {
    let (sin, cos) = angle_rad.sin_cos();
    let centered = tc - egui::vec2(0.5, 0.5);
    // Stretch to square pixels, rotate, un-stretch.
    let stretched = egui::vec2(centered.x * aspect, centered.y);
    let rotated = egui::vec2(
        cos * stretched.x - sin * stretched.y,
        sin * stretched.x + cos * stretched.y,
    );
    egui::vec2(rotated.x / aspect, rotated.y) + egui::vec2(0.5, 0.5)
}

/// Computes the texture sample coordinate for one fragment.
///
/// Scale is inverted (zooming in samples a smaller source region),
/// translation pans in texture space, and rotation is applied last with
/// aspect correction.
///
/// # Arguments
///
/// * `tex_coord` - Interpolated unit-quad UV of the fragment
/// * `rotation_rad` - Card rotation in radians
/// * `scale` - Card scale (>= 0)
/// * `translation` - Card pan in normalized texture units
/// * `resolution` - Source image pixel size
pub fn sample_coord(
    tex_coord: egui::Vec2,
    rotation_rad: f32,
    scale: f32,
    translation: egui::Vec2,
    resolution: (f32, f32),
) -> egui::Vec2 {
    let aspect = aspect(resolution);
    let inv_scale = if scale == 0.0 { f32::INFINITY } else { 1.0 / scale };
    let tc = (tex_coord - egui::vec2(0.5, 0.5)) * inv_scale + translation + egui::vec2(0.5, 0.5);
    rotate_aspect(rotation_rad, tc, aspect)
}

/// Like [`sample_coord`], but `None` when the coordinate leaves `[0,1]²` —
/// the renderer paints the fallback gray for those fragments.
pub fn sample(
    tex_coord: egui::Vec2,
    rotation_rad: f32,
    scale: f32,
    translation: egui::Vec2,
    resolution: (f32, f32),
) -> Option<egui::Vec2> {
    let coord = sample_coord(tex_coord, rotation_rad, scale, translation, resolution);
    if coord.x < 0.0 || coord.x > 1.0 || coord.y < 0.0 || coord.y > 1.0 || !coord.x.is_finite() || !coord.y.is_finite() {
        None
    } else {
        Some(coord)
    }
}

/// Exact inverse of [`sample_coord`]: the quad UV at which a given sample
/// coordinate appears. Used to place the textured quad's vertices.
pub fn inverse_sample_coord(
    sample: egui::Vec2,
    rotation_rad: f32,
    scale: f32,
    translation: egui::Vec2,
    resolution: (f32, f32),
) -> egui::Vec2 {
    let aspect = aspect(resolution);
    let tc = rotate_aspect(-rotation_rad, sample, aspect);
    (tc - translation - egui::vec2(0.5, 0.5)) * scale + egui::vec2(0.5, 0.5)
}

fn aspect(resolution: (f32, f32)) -> f32 {
    if resolution.1 == 0.0 {
        1.0
    } else {
        resolution.0 / resolution.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: (f32, f32) = (512.0, 512.0);
    const WIDE: (f32, f32) = (1024.0, 512.0);

    fn close(a: egui::Vec2, b: egui::Vec2) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn identity_transform_is_passthrough() {
        for &(u, v) in &[(0.0, 0.0), (1.0, 1.0), (0.3, 0.8)] {
            let tc = egui::vec2(u, v);
            let out = sample_coord(tc, 0.0, 1.0, egui::Vec2::ZERO, SQUARE);
            assert!(close(out, tc), "{out:?} vs {tc:?}");
        }
    }

    #[test]
    fn zoomed_out_corners_hit_the_fallback() {
        // Scale is inverted in the transform: scale < 1 zooms out and pushes
        // the quad corners past the source image into the fallback region.
        let corner = egui::vec2(0.0, 0.0);
        assert!(sample(corner, 0.0, 0.5, egui::Vec2::ZERO, SQUARE).is_none());
        assert!(sample(corner, 0.0, 1.0, egui::Vec2::ZERO, SQUARE).is_some());
    }

    #[test]
    fn large_translation_hits_the_fallback() {
        let center = egui::vec2(0.5, 0.5);
        assert!(sample(center, 0.0, 1.0, egui::vec2(2.0, 0.0), SQUARE).is_none());
        assert!(sample(center, 0.0, 1.0, egui::vec2(0.2, 0.2), SQUARE).is_some());
    }

    #[test]
    fn zero_scale_is_fallback_everywhere_but_never_panics() {
        let out = sample(egui::vec2(0.25, 0.75), 0.0, 0.0, egui::Vec2::ZERO, SQUARE);
        assert!(out.is_none());
    }

    #[test]
    fn rotation_preserves_the_center() {
        let center = egui::vec2(0.5, 0.5);
        for &angle in &[0.3_f32, 1.0, -2.4] {
            let out = sample_coord(center, angle, 1.0, egui::Vec2::ZERO, WIDE);
            assert!(close(out, center));
        }
    }

    #[test]
    fn quarter_turn_on_square_image_maps_axes() {
        use std::f32::consts::FRAC_PI_2;
        // (1, 0.5) is 0.5 right of center; a +90° rotation in texture space
        // takes it to 0.5 above center.
        let out = sample_coord(egui::vec2(1.0, 0.5), FRAC_PI_2, 1.0, egui::Vec2::ZERO, SQUARE);
        assert!(close(out, egui::vec2(0.5, 1.0)), "{out:?}");
    }

    #[test]
    fn aspect_correction_uses_image_resolution() {
        use std::f32::consts::FRAC_PI_2;
        // On a 2:1 image the quarter turn stretches through corrected space:
        // x offset 0.5 becomes aspect*0.5 = 1.0 vertically.
        let out = sample_coord(egui::vec2(1.0, 0.5), FRAC_PI_2, 1.0, egui::Vec2::ZERO, WIDE);
        assert!(close(out, egui::vec2(0.5, 1.5)), "{out:?}");
    }

    #[test]
    fn inverse_round_trips() {
        let cases = [
            (0.7_f32, 1.3_f32, egui::vec2(0.1, -0.2)),
            (-1.1, 0.6, egui::vec2(-0.4, 0.25)),
            (2.9, 2.0, egui::Vec2::ZERO),
        ];
        for (rot, scale, trans) in cases {
            for &(u, v) in &[(0.0, 0.0), (1.0, 1.0), (0.3, 0.8)] {
                let tc = egui::vec2(u, v);
                let s = sample_coord(tc, rot, scale, trans, WIDE);
                let back = inverse_sample_coord(s, rot, scale, trans, WIDE);
                assert!(close(back, tc), "rot={rot} scale={scale}: {back:?} vs {tc:?}");
            }
        }
    }
}
