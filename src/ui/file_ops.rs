//! File operations for saving and loading boards.
//!
//! Dialogs run on worker threads with `rfd`'s async API driven by
//! `futures::executor::block_on`; results come back over the file-state
//! channel and are applied on the UI thread once per frame.

use super::state::{BoardApp, FileOperationResult};
use crate::types::Board;
use eframe::egui;

impl BoardApp {
    /// Processes completed file operations from the channel.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.file.receiver else {
            return;
        };
        let mut results = Vec::new();
        while let Ok(result) = receiver.try_recv() {
            results.push(result);
        }
        for result in results {
            match result {
                FileOperationResult::SaveCompleted(path) => {
                    log::info!("board saved to {path}");
                    self.interaction.status_line = Some(format!("Saved {path}"));
                    self.file.current_path = Some(path);
                    self.file.has_unsaved_changes = false;
                }
                FileOperationResult::LoadCompleted(path, content) => {
                    match Board::from_json(&content) {
                        Ok(board) => {
                            self.board = board;
                            self.file.current_path = Some(path);
                            self.file.has_unsaved_changes = false;
                            self.interaction.selected_card = None;
                            self.interaction.active_card = None;
                            self.interaction.gesture = None;
                            self.card_counter = self.board.nodes.len() as u32;
                            // Image pixels are not part of the board file;
                            // the asset cache re-resolves each path at first
                            // draw and missing files degrade to image-less
                            // cards with a logged error.
                            log::info!("board loaded, {} card(s)", self.board.nodes.len());
                        }
                        Err(err) => {
                            log::error!("failed to parse board: {err}");
                            self.interaction.status_line =
                                Some(format!("Failed to parse board: {err}"));
                        }
                    }
                }
                FileOperationResult::OperationFailed(error) => {
                    log::error!("file operation failed: {error}");
                    self.interaction.status_line = Some(error);
                }
            }
            ctx.request_repaint();
        }
    }

    /// Opens a save dialog and writes the board to the chosen path.
    pub fn save_board_as(&mut self) {
        let Ok(json) = self.board.to_json() else {
            return;
        };
        let Some(sender) = self.file.sender.clone() else {
            return;
        };
        std::thread::spawn(move || {
            let picked = futures::executor::block_on(async {
                rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name("board.json")
                    .save_file()
                    .await
            });
            if let Some(handle) = picked {
                let path = handle.path().to_path_buf();
                let result = match std::fs::write(&path, json) {
                    Ok(()) => FileOperationResult::SaveCompleted(path.display().to_string()),
                    Err(err) => {
                        FileOperationResult::OperationFailed(format!("Failed to save file: {err}"))
                    }
                };
                let _ = sender.send(result);
            }
        });
    }

    /// Saves to the current path, or falls back to "Save As".
    pub fn save_board(&mut self) {
        let Some(path) = self.file.current_path.clone() else {
            self.save_board_as();
            return;
        };
        let Ok(json) = self.board.to_json() else {
            return;
        };
        let Some(sender) = self.file.sender.clone() else {
            return;
        };
        std::thread::spawn(move || {
            let result = match std::fs::write(&path, json) {
                Ok(()) => FileOperationResult::SaveCompleted(path),
                Err(err) => {
                    FileOperationResult::OperationFailed(format!("Failed to save file: {err}"))
                }
            };
            let _ = sender.send(result);
        });
    }

    /// Opens a file dialog and loads a board from disk.
    pub fn load_board(&mut self) {
        let Some(sender) = self.file.sender.clone() else {
            return;
        };
        std::thread::spawn(move || {
            let picked = futures::executor::block_on(async {
                rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                    .await
            });
            if let Some(handle) = picked {
                let path = handle.path().to_path_buf();
                let result = match std::fs::read_to_string(&path) {
                    Ok(json) => {
                        FileOperationResult::LoadCompleted(path.display().to_string(), json)
                    }
                    Err(err) => {
                        FileOperationResult::OperationFailed(format!("Failed to read file: {err}"))
                    }
                };
                let _ = sender.send(result);
            }
        });
    }

    /// Creates a new empty board, resetting all state.
    pub fn new_board(&mut self) {
        self.board = Board::new();
        self.file.current_path = None;
        self.file.has_unsaved_changes = false;
        self.interaction.selected_card = None;
        self.interaction.active_card = None;
        self.interaction.gesture = None;
        self.interaction.status_line = None;
        self.card_counter = 0;
        self.canvas.offset = egui::Vec2::ZERO;
        self.canvas.zoom_factor = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Card;

    #[test]
    fn new_board_resets_everything() {
        let mut app = BoardApp::default();
        let id = app.board.add_card(Card::new("a".into(), (0.0, 0.0)));
        app.interaction.selected_card = Some(id);
        app.interaction.active_card = Some(id);
        app.file.current_path = Some("/tmp/board.json".into());
        app.file.has_unsaved_changes = true;
        app.canvas.zoom_factor = 3.0;

        app.new_board();
        assert!(app.board.nodes.is_empty());
        assert!(app.interaction.selected_card.is_none());
        assert!(app.file.current_path.is_none());
        assert!(!app.file.has_unsaved_changes);
        assert_eq!(app.canvas.zoom_factor, 1.0);
    }

    #[test]
    fn load_result_replaces_the_board() {
        let mut app = BoardApp::default();
        let mut source = Board::new();
        source.add_card(Card::new("loaded".into(), (5.0, -5.0)));
        let json = source.to_json().unwrap();

        let sender = app.file.sender.clone().unwrap();
        sender
            .send(FileOperationResult::LoadCompleted("/tmp/b.json".into(), json))
            .unwrap();

        let ctx = egui::Context::default();
        app.handle_pending_operations(&ctx);
        assert_eq!(app.board.nodes.len(), 1);
        assert_eq!(app.file.current_path.as_deref(), Some("/tmp/b.json"));
        assert!(!app.file.has_unsaved_changes);
    }

    #[test]
    fn malformed_load_keeps_the_current_board() {
        let mut app = BoardApp::default();
        app.board.add_card(Card::new("keep".into(), (0.0, 0.0)));

        let sender = app.file.sender.clone().unwrap();
        sender
            .send(FileOperationResult::LoadCompleted(
                "/tmp/bad.json".into(),
                "{not json".into(),
            ))
            .unwrap();

        let ctx = egui::Context::default();
        app.handle_pending_operations(&ctx);
        assert_eq!(app.board.nodes.len(), 1);
        assert!(app.file.current_path.is_none());
        assert!(app
            .interaction
            .status_line
            .as_deref()
            .unwrap()
            .contains("Failed to parse"));
    }
}
