//! User interface components and rendering logic for the reference board.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main BoardApp
//! - `canvas` - Canvas navigation, card dragging, and gesture dispatch
//! - `rendering` - Drawing cards: background, image quad, outline, label
//! - `gesture` - Modal move/rotate sessions and instant zoom actions
//! - `keymap` - Session-scoped gesture key bindings
//! - `import` - Bulk image import and row layout
//! - `file_ops` - Board save/load through native dialogs

mod canvas;
mod file_ops;
mod gesture;
mod import;
mod keymap;
mod rendering;
mod state;


pub use state::BoardApp;

use self::state::PendingConfirmAction;
use crate::types::Card;
use eframe::egui;

impl eframe::App for BoardApp {
    /// Persist entire app state between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => storage.set_string("app_state", json),
            Err(err) => log::error!("failed to serialize app state: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// Lays out the toolbar, the properties panel, the central canvas, and
    /// the status bar, and drains the file and import channels.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_pending_operations(ctx);
        self.poll_import(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                self.draw_properties_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        if self.file.show_unsaved_dialog {
            self.draw_unsaved_dialog(ctx);
        }
    }
}

impl BoardApp {
    /// Renders the toolbar with file operations and board actions.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::New);
                } else {
                    self.new_board();
                }
            }
            if ui.button("Open").clicked() {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::Open);
                } else {
                    self.load_board();
                }
            }
            if ui.button("Save").clicked() {
                self.save_board();
            }
            if ui.button("Save As").clicked() {
                self.save_board_as();
            }

            ui.separator();

            if ui.button("Add Card").clicked() {
                self.add_card_at_view_center(ui.ctx());
            }
            ui.add_enabled_ui(!self.import.in_progress(), |ui| {
                if ui.button("Import Images…").clicked() {
                    self.import_images();
                }
            });

            // Current file and unsaved indicator on the right.
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let dirty = if self.file.has_unsaved_changes { "*" } else { "" };
                match &self.file.current_path {
                    Some(path) => ui.label(format!("{path}{dirty}")),
                    None => ui.label(format!("Untitled{dirty}")),
                };
                ui.label(format!("Zoom: {:.0}%", self.canvas.zoom_factor * 100.0));
            });
        });
    }

    /// Renders the bottom status line (gesture readout, import progress,
    /// warnings).
    fn draw_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match &self.interaction.status_line {
                Some(line) => ui.label(line),
                None => ui.label(format!("{} card(s)", self.board.cards().count())),
            };
        });
    }

    /// Renders the properties panel for the selected card.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.heading("Properties");
                ui.separator();

                let Some(card_id) = self.interaction.selected_card else {
                    ui.label("No card selected");
                    ui.label("Click a card to select it.");
                    return;
                };
                let Some(card) = self.board.card_mut(&card_id) else {
                    ui.label("Card not found");
                    return;
                };

                ui.label("Label:");
                if ui.text_edit_singleline(&mut card.label).changed() {
                    self.file.has_unsaved_changes = true;
                }

                ui.separator();
                match card.image() {
                    Some(image) => {
                        ui.label(format!("Source: {}", image.path.display()));
                        ui.label(format!("{} x {} px", image.width, image.height));
                    }
                    None => {
                        ui.label("Source: none");
                    }
                }

                ui.separator();
                ui.label("Image transform:");
                ui.horizontal(|ui| {
                    ui.label("Scale");
                    if ui
                        .add(
                            egui::DragValue::new(&mut card.scale)
                                .speed(0.01)
                                .range(0.0..=f32::MAX),
                        )
                        .changed()
                    {
                        self.file.has_unsaved_changes = true;
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Rotation");
                    if ui
                        .add(egui::DragValue::new(&mut card.rotation_degrees).speed(0.5))
                        .changed()
                    {
                        self.file.has_unsaved_changes = true;
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Translation");
                    let x = ui.add(egui::DragValue::new(&mut card.translation.0).speed(0.005));
                    let y = ui.add(egui::DragValue::new(&mut card.translation.1).speed(0.005));
                    if x.changed() || y.changed() {
                        self.file.has_unsaved_changes = true;
                    }
                });

                ui.separator();
                if ui.checkbox(&mut card.hidden, "Collapsed").changed() {
                    self.file.has_unsaved_changes = true;
                }

                let mut has_color = card.color.is_some();
                if ui.checkbox(&mut has_color, "Custom color").changed() {
                    card.color = if has_color { Some([0.5, 0.5, 0.5]) } else { None };
                    self.file.has_unsaved_changes = true;
                }
                if let Some(rgb) = card.color.as_mut() {
                    if ui.color_edit_button_rgb(rgb).changed() {
                        self.file.has_unsaved_changes = true;
                    }
                }

                ui.separator();
                if ui.button("Delete Card").clicked() {
                    self.board.remove(&card_id);
                    self.interaction.selected_card = None;
                    self.interaction.active_card = None;
                    self.file.has_unsaved_changes = true;
                }
            });
    }

    /// Renders the unsaved-changes confirmation dialog.
    fn draw_unsaved_dialog(&mut self, ctx: &egui::Context) {
        let title = match self.file.pending_confirm_action {
            Some(PendingConfirmAction::New) => "Unsaved changes - Create New?",
            Some(PendingConfirmAction::Open) => "Unsaved changes - Open File?",
            None => "Unsaved changes",
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("You have unsaved changes. Are you sure you want to continue?");
                ui.horizontal(|ui| {
                    if ui.button("Discard").clicked() {
                        match self.file.pending_confirm_action {
                            Some(PendingConfirmAction::New) => self.new_board(),
                            Some(PendingConfirmAction::Open) => self.load_board(),
                            None => {}
                        }
                        self.file.show_unsaved_dialog = false;
                        self.file.pending_confirm_action = None;
                    }
                    if ui.button("Cancel").clicked() {
                        self.file.show_unsaved_dialog = false;
                        self.file.pending_confirm_action = None;
                    }
                });
            });
    }

    /// Creates a new empty card at the center of the visible canvas and
    /// selects it.
    fn add_card_at_view_center(&mut self, ctx: &egui::Context) {
        self.card_counter += 1;
        let center = self.screen_to_graph(ctx.screen_rect().center());
        let card = Card::new(format!("Card {}", self.card_counter), (center.x, center.y));
        let id = self.board.add_card(card);
        self.interaction.selected_card = Some(id);
        self.interaction.active_card = Some(id);
        self.file.has_unsaved_changes = true;
    }
}
