//! Canvas interaction and navigation.
//!
//! Handles canvas panning and zooming, card dragging and selection, the
//! modal gesture dispatch, and coordinate transformations between screen
//! and graph space.

use super::gesture::{self, GestureEvent, GestureSession, Transition};
use super::keymap::BoardAction;
use super::rendering::CardRenderer;
use crate::constants::{CANVAS_ZOOM_STEP, MAX_ZOOM, MIN_ZOOM};
use crate::coords::dpi_factor;
use super::state::BoardApp;
use crate::types::{Card, CardId};
use eframe::egui;

/// Canvas background fill.
const CANVAS_BACKGROUND: egui::Color32 = egui::Color32::from_gray(25);

impl BoardApp {
    /// The display scale factor for the current frame.
    ///
    /// egui points are already device-scale independent, so the pixel scale
    /// term stays at 1 and only the configured DPI matters.
    pub fn dpi_factor(&self) -> f32 {
        dpi_factor(self.canvas.dpi, 1.0)
    }

    /// Converts screen coordinates to graph coordinates (y-up).
    ///
    /// # Arguments
    ///
    /// * `screen_pos` - Position in screen space (pixels)
    ///
    /// # Returns
    ///
    /// The corresponding position in graph space
    pub fn screen_to_graph(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        let dpi = self.dpi_factor();
        let view_pos = self.canvas.view().region_to_view(screen_pos);
        egui::pos2(view_pos.x / dpi, view_pos.y / dpi)
    }

    /// Converts graph coordinates to screen coordinates.
    pub fn graph_to_screen(&self, graph_pos: egui::Pos2) -> egui::Pos2 {
        let dpi = self.dpi_factor();
        self.canvas
            .view()
            .view_to_region(egui::pos2(graph_pos.x * dpi, graph_pos.y * dpi))
    }

    /// Screen-space center of a card, used as the rotation pivot.
    pub fn card_center_screen(&self, card: &Card) -> egui::Pos2 {
        self.graph_to_screen(egui::pos2(
            card.location.0 + card.graph_width() / 2.0,
            card.location.1 - card.graph_height() / 2.0,
        ))
    }

    /// Draws the canvas and routes all canvas input for this frame.
    ///
    /// While a gesture session is open it consumes the frame's input;
    /// otherwise input goes to panning, zooming, dragging, and the gesture
    /// shortcuts.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        painter.rect_filled(response.rect, 0.0, CANVAS_BACKGROUND);

        if !self.handle_gesture_input(ui) {
            self.handle_canvas_panning(ui, &response);
            self.handle_canvas_zoom(ui, &response);
            self.handle_card_dragging(ui, &response);
            self.handle_gesture_shortcuts(ui);
        }

        self.draw_cards(ui.ctx(), &painter);
    }

    /// Handles middle-click canvas panning.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let should_pan = ui.input(|i| i.pointer.middle_down());

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    let delta = current_pos - last_pos;
                    self.canvas.offset += delta;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming.
    ///
    /// Zooms in/out while keeping the graph position under the cursor fixed.
    /// Only zooms if the cursor is over the canvas.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let mouse_pos = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos());

        if let Some(mouse_pos) = mouse_pos {
            if !response.rect.contains(mouse_pos) {
                return;
            }

            let graph_before = self.screen_to_graph(mouse_pos);

            let zoom_delta = if scroll_delta > 0.0 {
                CANVAS_ZOOM_STEP
            } else {
                -CANVAS_ZOOM_STEP
            };
            let old_zoom = self.canvas.zoom_factor;
            self.canvas.zoom_factor =
                (self.canvas.zoom_factor + zoom_delta).clamp(MIN_ZOOM, MAX_ZOOM);

            // Only adjust the offset if the zoom actually changed.
            if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
                let screen_after = self.graph_to_screen(graph_before);
                self.canvas.offset += mouse_pos - screen_after;
            }
        }
    }

    /// Handles card dragging and click selection with the primary button.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_card_dragging(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if ui.input(|i| i.pointer.primary_down()) && !self.interaction.is_panning {
            if let Some(current_pos) = response.interact_pointer_pos() {
                let graph_pos = self.screen_to_graph(current_pos);

                if let Some(dragging_id) = self.interaction.dragging_card {
                    let offset = self.interaction.drag_offset;
                    if let Some(card) = self.board.card_mut(&dragging_id) {
                        card.location = (graph_pos.x + offset.x, graph_pos.y + offset.y);
                        self.file.has_unsaved_changes = true;
                    }
                } else if ui.input(|i| i.pointer.primary_pressed()) {
                    if let Some(card_id) = self.find_card_at_position(graph_pos) {
                        self.start_card_drag(card_id, graph_pos);
                    } else {
                        // Click on empty canvas clears the selection.
                        self.interaction.selected_card = None;
                        self.interaction.active_card = None;
                    }
                }
            }
        } else {
            self.interaction.dragging_card = None;
        }
    }

    /// Starts dragging the specified card and makes it the selection.
    ///
    /// Selecting a card also makes it active; a card ends up selected but
    /// not active only when activation later moves elsewhere, which the
    /// outline color reflects.
    fn start_card_drag(&mut self, card_id: CardId, graph_pos: egui::Pos2) {
        self.interaction.selected_card = Some(card_id);
        self.interaction.active_card = Some(card_id);
        self.interaction.dragging_card = Some(card_id);
        if let Some(card) = self.board.card(&card_id) {
            self.interaction.drag_offset = egui::vec2(
                card.location.0 - graph_pos.x,
                card.location.1 - graph_pos.y,
            );
        }
    }

    /// Finds the topmost card at the given graph position, if any.
    ///
    /// # Arguments
    ///
    /// * `pos` - Position in graph space to check
    ///
    /// # Returns
    ///
    /// The id of the card at that position, or `None`
    pub fn find_card_at_position(&self, pos: egui::Pos2) -> Option<CardId> {
        // Later cards draw on top, so hit-test in reverse order.
        for id in self.board.order.iter().rev() {
            let Some(card) = self.board.card(id) else {
                continue;
            };
            let (x, y) = card.location;
            let (w, h) = (card.graph_width(), card.graph_height());
            // Graph space is y-up: the card spans [y - h, y].
            if pos.x >= x && pos.x <= x + w && pos.y <= y && pos.y >= y - h {
                return Some(*id);
            }
        }
        None
    }

    /// Routes this frame's input into the open gesture session, if any.
    ///
    /// # Returns
    ///
    /// `true` when a session consumed the input.
    fn handle_gesture_input(&mut self, ui: &mut egui::Ui) -> bool {
        let Some((card_id, mut session)) = self.interaction.gesture.take() else {
            return false;
        };

        // The pivot tracks the card's projected center so panning or zooming
        // mid-session keeps the rotation consistent.
        if let Some(card) = self.board.card(&card_id) {
            session.pivot = self.card_center_screen(card);
        }

        let events: Vec<GestureEvent> = ui.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        ..
                    } => key_gesture_event(*key),
                    egui::Event::PointerButton {
                        button,
                        pressed: true,
                        ..
                    } => match button {
                        egui::PointerButton::Primary => Some(GestureEvent::Commit),
                        egui::PointerButton::Secondary => Some(GestureEvent::Cancel),
                        _ => None,
                    },
                    egui::Event::PointerMoved(pos) => Some(GestureEvent::PointerMoved(*pos)),
                    _ => None,
                })
                .collect()
        });

        let mut terminal = None;
        match self.board.card_mut(&card_id) {
            Some(card) => {
                for event in events {
                    match session.on_event(card, event) {
                        Transition::Active => {}
                        transition => {
                            terminal = Some(transition);
                            break;
                        }
                    }
                }
            }
            // The card was deleted mid-session; nothing left to edit.
            None => terminal = Some(Transition::Cancelled),
        }

        match terminal {
            Some(_) => {
                self.interaction.status_line = None;
                self.file.has_unsaved_changes = true;
            }
            None => {
                self.interaction.status_line = session.status.clone();
                self.interaction.gesture = Some((card_id, session));
            }
        }
        true
    }

    /// Resolves key presses through the binding table and starts gestures.
    fn handle_gesture_shortcuts(&mut self, ui: &mut egui::Ui) {
        let pressed: Vec<(egui::Key, egui::Modifiers)> = ui.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });

        for (key, modifiers) in pressed {
            let Some(action) = self.keymap.action_for(key, modifiers) else {
                continue;
            };
            self.perform_action(action, ui.input(|i| i.pointer.hover_pos()));
        }
    }

    /// Performs one board action on the active card.
    ///
    /// Every action requires an active card; without one the action aborts
    /// with a warning and a status message, mutating nothing.
    pub fn perform_action(&mut self, action: BoardAction, pointer: Option<egui::Pos2>) {
        let Some(card_id) = self.interaction.active_card else {
            log::warn!("{action:?} aborted: no active card");
            self.interaction.status_line =
                Some("No active card, could not finish action".to_string());
            return;
        };

        match action {
            BoardAction::ZoomIn => {
                if let Some(card) = self.board.card_mut(&card_id) {
                    gesture::zoom_in(card);
                    self.file.has_unsaved_changes = true;
                }
            }
            BoardAction::ZoomOut => {
                if let Some(card) = self.board.card_mut(&card_id) {
                    gesture::zoom_out(card);
                    self.file.has_unsaved_changes = true;
                }
            }
            BoardAction::Move | BoardAction::Rotate => {
                let Some(card) = self.board.card(&card_id) else {
                    return;
                };
                let pivot = self.card_center_screen(card);
                let pointer = pointer.unwrap_or(pivot);
                let session = match action {
                    BoardAction::Move => GestureSession::start_move(card, pointer),
                    _ => GestureSession::start_rotate(card, pointer, pivot),
                };
                self.interaction.gesture = Some((card_id, session));
            }
        }
    }

    /// Draws every card in insertion order.
    fn draw_cards(&mut self, ctx: &egui::Context, painter: &egui::Painter) {
        let view = self.canvas.view();
        let dpi = self.dpi_factor();
        let renderer = CardRenderer::new(painter, view, dpi);

        for id in self.board.order.clone() {
            let Some(card) = self.board.card(&id) else {
                continue;
            };
            let texture = card
                .image()
                .map(|img| img.path.clone())
                .and_then(|path| self.assets.texture(ctx, &path));
            let Some(card) = self.board.card(&id) else {
                continue;
            };
            let selected = self.interaction.selected_card == Some(id);
            let active = self.interaction.active_card == Some(id);
            renderer.draw_card(card, selected, active, texture);
        }
    }
}

/// Maps a raw key press to a gesture event, if it means anything to a
/// session.
fn key_gesture_event(key: egui::Key) -> Option<GestureEvent> {
    let event = match key {
        egui::Key::Num0 => GestureEvent::Digit('0'),
        egui::Key::Num1 => GestureEvent::Digit('1'),
        egui::Key::Num2 => GestureEvent::Digit('2'),
        egui::Key::Num3 => GestureEvent::Digit('3'),
        egui::Key::Num4 => GestureEvent::Digit('4'),
        egui::Key::Num5 => GestureEvent::Digit('5'),
        egui::Key::Num6 => GestureEvent::Digit('6'),
        egui::Key::Num7 => GestureEvent::Digit('7'),
        egui::Key::Num8 => GestureEvent::Digit('8'),
        egui::Key::Num9 => GestureEvent::Digit('9'),
        egui::Key::Period => GestureEvent::Digit('.'),
        egui::Key::Backspace => GestureEvent::Backspace,
        egui::Key::Minus => GestureEvent::MinusToggle,
        egui::Key::Enter => GestureEvent::Commit,
        egui::Key::Escape => GestureEvent::Cancel,
        _ => return None,
    };
    Some(event)
}
