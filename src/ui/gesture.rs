//! Modal gesture sessions for moving and rotating a card's image.
//!
//! Each session is an explicit state machine: the canvas feeds it one
//! [`GestureEvent`] at a time and it mutates the card live, returning a
//! [`Transition`] that tells the caller whether the session is still open.
//! Zoom in/out are instantaneous actions and never open a session.
//!
//! Rotate supports a numeric-entry override: any digit, decimal point,
//! backspace, or minus key switches the session to text mode, after which
//! pointer motion is ignored. Each keystroke undoes the previously applied
//! numeric delta and applies the new one, so re-entering the same digits is
//! idempotent. Cancel restores the rotation captured at session start
//! exactly; Move intentionally does not roll back on cancel (long-standing
//! behavior, locked by tests).

use crate::constants::{MOVE_DIVISOR, ZOOM_STEP};
use crate::types::Card;
use eframe::egui;

/// Which modal gesture a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Pan the image inside the card quad.
    Move,
    /// Rotate the image, with numeric-entry override.
    Rotate,
}

/// One input event forwarded into an active session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// The pointer moved to a new screen position.
    PointerMoved(egui::Pos2),
    /// A numeric key: `'0'..='9'` or `'.'` (Rotate only).
    Digit(char),
    /// Backspace in the numeric buffer (Rotate only).
    Backspace,
    /// Toggle the sign of the numeric entry (Rotate only).
    MinusToggle,
    /// Primary button release or confirm key: keep the edited value.
    Commit,
    /// Secondary button or cancel key: end the session.
    Cancel,
}

/// Session status after handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session stays open.
    Active,
    /// The session ended, keeping the edited value.
    Committed,
    /// The session ended via cancel.
    Cancelled,
}

/// Transient state of one modal gesture, from pointer-down to commit/cancel.
#[derive(Debug, Clone)]
pub struct GestureSession {
    /// Which gesture this session runs.
    pub kind: GestureKind,
    /// Last-seen pointer position in screen coordinates.
    prev_pointer: egui::Pos2,
    /// Screen-space center of the card, used as the rotation pivot.
    /// Refreshed by the canvas before each pointer event so view changes
    /// mid-session stay consistent.
    pub pivot: egui::Pos2,
    /// Rotation at session start, restored bit-exact on cancel.
    initial_rotation: f32,
    /// Translation at session start (recorded; Move does not roll back).
    initial_translation: (f32, f32),
    /// Net rotation applied so far, in degrees (Rotate only).
    accumulated: f32,
    /// Net translation applied so far (Move only).
    accumulated_translation: (f32, f32),
    /// Numeric entry buffer; always parseable, starts at "0".
    text: String,
    /// Whether numeric entry has taken over from pointer tracking.
    text_mode: bool,
    /// Sign applied to the numeric entry, toggled by the minus key.
    sign: f32,
    /// Status line shown while the session is active.
    pub status: Option<String>,
}

impl GestureSession {
    /// Opens a Move session at the given pointer position.
    pub fn start_move(card: &Card, pointer: egui::Pos2) -> Self {
        Self::start(GestureKind::Move, card, pointer, pointer)
    }

    /// Opens a Rotate session; `pivot` is the card's screen-space center.
    pub fn start_rotate(card: &Card, pointer: egui::Pos2, pivot: egui::Pos2) -> Self {
        Self::start(GestureKind::Rotate, card, pointer, pivot)
    }

    fn start(kind: GestureKind, card: &Card, pointer: egui::Pos2, pivot: egui::Pos2) -> Self {
        Self {
            kind,
            prev_pointer: pointer,
            pivot,
            initial_rotation: card.rotation_degrees,
            initial_translation: card.translation,
            accumulated: 0.0,
            accumulated_translation: (0.0, 0.0),
            text: "0".to_string(),
            text_mode: false,
            sign: 1.0,
            status: None,
        }
    }

    /// Handles one event, mutating the card live.
    ///
    /// # Returns
    ///
    /// Whether the session remains active or has terminated.
    pub fn on_event(&mut self, card: &mut Card, event: GestureEvent) -> Transition {
        match (self.kind, event) {
            (_, GestureEvent::Commit) => {
                self.status = None;
                Transition::Committed
            }
            (GestureKind::Move, GestureEvent::Cancel) => {
                // Translation is deliberately left as-is; only Rotate rolls
                // back on cancel.
                self.status = None;
                Transition::Cancelled
            }
            (GestureKind::Rotate, GestureEvent::Cancel) => {
                card.rotation_degrees = self.initial_rotation;
                self.status = None;
                Transition::Cancelled
            }
            (GestureKind::Move, GestureEvent::PointerMoved(pointer)) => {
                let delta_x = (self.prev_pointer.x - pointer.x) / MOVE_DIVISOR;
                let delta_y = (self.prev_pointer.y - pointer.y) / MOVE_DIVISOR;
                card.translation.0 += delta_x;
                card.translation.1 += delta_y;
                self.accumulated_translation.0 += delta_x;
                self.accumulated_translation.1 += delta_y;
                self.prev_pointer = pointer;
                Transition::Active
            }
            (GestureKind::Rotate, GestureEvent::PointerMoved(pointer)) => {
                if self.text_mode {
                    // Numeric entry owns the session; pointer motion is inert
                    // but the session stays open.
                    return Transition::Active;
                }
                self.status = Some(format!("Rotation : {:.4}", self.accumulated));
                let delta = signed_angle(self.prev_pointer, self.pivot, pointer);
                if !delta.is_nan() {
                    card.rotation_degrees -= delta;
                    self.accumulated += delta;
                }
                self.prev_pointer = pointer;
                Transition::Active
            }
            (GestureKind::Rotate, GestureEvent::Digit(ch)) => {
                self.text_mode = true;
                if ch == '.' {
                    // A second decimal point would make the buffer
                    // unparseable; ignore it.
                    if !self.text.contains('.') {
                        self.text.push('.');
                    }
                } else if ch.is_ascii_digit() {
                    self.text.push(ch);
                }
                self.apply_text_entry(card);
                Transition::Active
            }
            (GestureKind::Rotate, GestureEvent::Backspace) => {
                self.text_mode = true;
                if self.text != "0" {
                    self.text.pop();
                    if self.text.is_empty() {
                        self.text.push('0');
                    }
                }
                self.apply_text_entry(card);
                Transition::Active
            }
            (GestureKind::Rotate, GestureEvent::MinusToggle) => {
                self.text_mode = true;
                self.sign = -self.sign;
                self.apply_text_entry(card);
                Transition::Active
            }
            // Numeric events are meaningless for Move; the session stays open.
            (GestureKind::Move, _) => Transition::Active,
        }
    }

    /// Reapplies the numeric entry: undoes the previously applied delta and
    /// applies the freshly parsed one, keeping the net effect idempotent.
    fn apply_text_entry(&mut self, card: &mut Card) {
        let entered = self.sign * self.text.parse::<f32>().unwrap_or(0.0);
        card.rotation_degrees += self.accumulated;
        card.rotation_degrees -= entered;
        self.accumulated = entered;
        self.status = Some(format!("Rotation : {entered:.4}"));
    }
}

/// Instantly zooms the image in by one step.
pub fn zoom_in(card: &mut Card) {
    card.scale += ZOOM_STEP;
}

/// Instantly zooms the image out by one step, clamped at zero.
pub fn zoom_out(card: &mut Card) {
    card.scale -= ZOOM_STEP;
    card.clamp_scale();
}

/// Signed angle at `pivot` between the rays toward `prev` and `current`, in
/// degrees. Counterclockwise sign comes from the cross-product term of the
/// (prev, pivot, current) triangle. NaN when the points are degenerate
/// (zero-length ray or collinear float noise); callers skip those updates.
pub fn signed_angle(prev: egui::Pos2, pivot: egui::Pos2, current: egui::Pos2) -> f32 {
    let ba = prev - pivot;
    let bc = current - pivot;
    let cosine = ba.dot(bc) / (ba.length() * bc.length());
    let angle = cosine.acos().to_degrees();
    let cross = (pivot.x - prev.x) * (current.y - prev.y) - (pivot.y - prev.y) * (current.x - prev.x);
    if cross < 0.0 {
        -angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card::new("test".into(), (0.0, 0.0))
    }

    #[test]
    fn zoom_steps_are_inverses_away_from_the_clamp() {
        let mut card = card();
        card.scale = 1.0;
        zoom_in(&mut card);
        assert!((card.scale - 1.1).abs() < 1e-6);
        zoom_out(&mut card);
        assert!((card.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_out_never_goes_below_zero() {
        let mut card = card();
        card.scale = 0.05;
        zoom_out(&mut card);
        assert_eq!(card.scale, 0.0);
        zoom_out(&mut card);
        assert_eq!(card.scale, 0.0);
    }

    #[test]
    fn move_divides_pointer_delta_by_750() {
        let mut card = card();
        let mut session = GestureSession::start_move(&card, egui::pos2(100.0, 50.0));
        // Pointer moves 75px left: previous - current = +75 -> +0.1.
        let t = session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(25.0, 50.0)));
        assert_eq!(t, Transition::Active);
        assert!((card.translation.0 - 0.1).abs() < 1e-6);
        assert_eq!(card.translation.1, 0.0);
    }

    #[test]
    fn move_accumulates_across_events() {
        let mut card = card();
        let mut session = GestureSession::start_move(&card, egui::pos2(0.0, 0.0));
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(-75.0, 0.0)));
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(-150.0, -75.0)));
        assert!((card.translation.0 - 0.2).abs() < 1e-6);
        assert!((card.translation.1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn move_cancel_keeps_translation() {
        // Deliberate asymmetry with Rotate: cancel does not roll back.
        let mut card = card();
        let mut session = GestureSession::start_move(&card, egui::pos2(0.0, 0.0));
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(-75.0, 0.0)));
        let t = session.on_event(&mut card, GestureEvent::Cancel);
        assert_eq!(t, Transition::Cancelled);
        assert!((card.translation.0 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn rotate_pointer_tracking_moves_the_angle() {
        let mut card = card();
        let pivot = egui::pos2(0.0, 0.0);
        let mut session = GestureSession::start_rotate(&card, egui::pos2(100.0, 0.0), pivot);
        // 90 degrees around the pivot.
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(0.0, 100.0)));
        assert!((card.rotation_degrees.abs() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn rotate_cancel_restores_initial_rotation_bit_exact() {
        let mut card = card();
        card.rotation_degrees = 33.125;
        let initial = card.rotation_degrees;
        let pivot = egui::pos2(0.0, 0.0);
        let mut session = GestureSession::start_rotate(&card, egui::pos2(50.0, 0.0), pivot);

        // A messy mixed sequence: pointer moves, then numeric entry.
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(40.0, 30.0)));
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(-10.0, 45.0)));
        session.on_event(&mut card, GestureEvent::Digit('4'));
        session.on_event(&mut card, GestureEvent::Digit('5'));
        session.on_event(&mut card, GestureEvent::MinusToggle);
        assert_ne!(card.rotation_degrees, initial);

        let t = session.on_event(&mut card, GestureEvent::Cancel);
        assert_eq!(t, Transition::Cancelled);
        assert_eq!(card.rotation_degrees.to_bits(), initial.to_bits());
        assert!(session.status.is_none());
    }

    #[test]
    fn rotate_text_entry_is_idempotent() {
        let mut card_a = card();
        let pivot = egui::pos2(0.0, 0.0);
        let mut session = GestureSession::start_rotate(&card_a, egui::pos2(50.0, 0.0), pivot);
        session.on_event(&mut card_a, GestureEvent::Digit('4'));
        session.on_event(&mut card_a, GestureEvent::Digit('5'));
        let once = card_a.rotation_degrees;

        // Backspace it all out and retype the same digits.
        session.on_event(&mut card_a, GestureEvent::Backspace);
        session.on_event(&mut card_a, GestureEvent::Backspace);
        session.on_event(&mut card_a, GestureEvent::Digit('4'));
        session.on_event(&mut card_a, GestureEvent::Digit('5'));
        assert_eq!(card_a.rotation_degrees, once);
    }

    #[test]
    fn rotate_text_entry_overrides_pointer_and_commits() {
        let mut card = card();
        let pivot = egui::pos2(0.0, 0.0);
        let mut session = GestureSession::start_rotate(&card, egui::pos2(50.0, 0.0), pivot);
        session.on_event(&mut card, GestureEvent::Digit('9'));
        assert!((card.rotation_degrees + 9.0).abs() < 1e-6);

        // Pointer motion is ignored once text mode is active.
        session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(0.0, 50.0)));
        assert!((card.rotation_degrees + 9.0).abs() < 1e-6);

        let t = session.on_event(&mut card, GestureEvent::Commit);
        assert_eq!(t, Transition::Committed);
        assert!((card.rotation_degrees + 9.0).abs() < 1e-6);
        assert!(session.status.is_none());
    }

    #[test]
    fn rotate_minus_toggles_sign() {
        let mut card = card();
        let pivot = egui::pos2(0.0, 0.0);
        let mut session = GestureSession::start_rotate(&card, egui::pos2(50.0, 0.0), pivot);
        session.on_event(&mut card, GestureEvent::Digit('3'));
        session.on_event(&mut card, GestureEvent::Digit('0'));
        assert!((card.rotation_degrees + 30.0).abs() < 1e-6);
        session.on_event(&mut card, GestureEvent::MinusToggle);
        assert!((card.rotation_degrees - 30.0).abs() < 1e-6);
        session.on_event(&mut card, GestureEvent::MinusToggle);
        assert!((card.rotation_degrees + 30.0).abs() < 1e-6);
    }

    #[test]
    fn text_buffer_stays_parseable() {
        let mut card = card();
        let pivot = egui::pos2(0.0, 0.0);
        let mut session = GestureSession::start_rotate(&card, egui::pos2(50.0, 0.0), pivot);
        // Backspacing the initial "0" is a no-op.
        session.on_event(&mut card, GestureEvent::Backspace);
        assert_eq!(card.rotation_degrees, 0.0);
        // A second decimal point is swallowed.
        session.on_event(&mut card, GestureEvent::Digit('1'));
        session.on_event(&mut card, GestureEvent::Digit('.'));
        session.on_event(&mut card, GestureEvent::Digit('.'));
        session.on_event(&mut card, GestureEvent::Digit('5'));
        assert!((card.rotation_degrees + 1.5).abs() < 1e-4);
        // Backspacing a non-"0" buffer to empty resets it to "0".
        for _ in 0..6 {
            session.on_event(&mut card, GestureEvent::Backspace);
        }
        assert_eq!(card.rotation_degrees, 0.0);
    }

    #[test]
    fn degenerate_angle_updates_are_skipped() {
        let mut card = card();
        let pivot = egui::pos2(0.0, 0.0);
        // Pointer starts exactly on the pivot: zero-length ray, NaN angle.
        let mut session = GestureSession::start_rotate(&card, pivot, pivot);
        let t = session.on_event(&mut card, GestureEvent::PointerMoved(egui::pos2(10.0, 10.0)));
        assert_eq!(t, Transition::Active);
        assert_eq!(card.rotation_degrees, 0.0);
    }

    #[test]
    fn signed_angle_signs_match_the_cross_product() {
        let pivot = egui::pos2(0.0, 0.0);
        let a = egui::pos2(100.0, 0.0);
        let up = egui::pos2(0.0, 100.0);
        let down = egui::pos2(0.0, -100.0);
        let toward_up = signed_angle(a, pivot, up);
        let toward_down = signed_angle(a, pivot, down);
        assert!((toward_up.abs() - 90.0).abs() < 1e-3);
        assert!((toward_down.abs() - 90.0).abs() < 1e-3);
        assert!(toward_up * toward_down < 0.0, "opposite turns have opposite signs");
    }
}
