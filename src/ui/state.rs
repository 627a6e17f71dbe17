//! Application state structures.
//!
//! Groups the board app's state into focused sub-structs: canvas navigation,
//! user interaction (selection, dragging, the active gesture session), file
//! operations, and bulk-import progress.

use super::gesture::GestureSession;
use super::import::ImportEvent;
use super::keymap::EditorSession;
use crate::assets::ImageAssets;
use crate::constants::BASELINE_DPI;
use crate::coords::ViewTransform;
use crate::types::{Board, CardId};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Canvas navigation and display state.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current pan offset in screen space.
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal).
    pub zoom_factor: f32,
    /// Host-reported logical DPI; the dpi factor scales this against the
    /// 72-DPI baseline and the device pixel scale.
    pub dpi: f32,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            dpi: BASELINE_DPI,
        }
    }
}

impl CanvasState {
    /// The current view transform for projecting cards onto the canvas.
    pub fn view(&self) -> ViewTransform {
        ViewTransform {
            offset: self.offset,
            zoom: self.zoom_factor,
        }
    }
}

/// Selection, dragging, and modal gesture state.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionState {
    /// Currently selected card, if any.
    #[serde(skip)]
    pub selected_card: Option<CardId>,
    /// Card currently active for gestures; set by the board on selection.
    /// A card may remain selected while another is active, which renders
    /// the selected-but-inactive (red) outline.
    #[serde(skip)]
    pub active_card: Option<CardId>,
    /// Card currently being dragged across the board.
    #[serde(skip)]
    pub dragging_card: Option<CardId>,
    /// Offset from the pointer to the dragged card's origin, in graph units.
    #[serde(skip)]
    pub drag_offset: egui::Vec2,
    /// Whether the user is currently panning the canvas.
    #[serde(skip)]
    pub is_panning: bool,
    /// Last pointer position seen while panning.
    #[serde(skip)]
    pub last_pan_pos: Option<egui::Pos2>,
    /// The active modal gesture session, paired with its card.
    #[serde(skip)]
    pub gesture: Option<(CardId, GestureSession)>,
    /// Transient status line (gesture readout, import progress, warnings).
    #[serde(skip)]
    pub status_line: Option<String>,
}

/// File operations state: current path, dirty flag, async dialog plumbing.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct FileState {
    /// Current board file path for save/load operations.
    #[serde(skip)]
    pub current_path: Option<String>,
    /// Whether the board has unsaved changes.
    #[serde(skip)]
    pub has_unsaved_changes: bool,
    /// Channel for receiving file operation results from dialog futures.
    #[serde(skip)]
    pub sender: Option<Sender<FileOperationResult>>,
    #[serde(skip)]
    pub receiver: Option<Receiver<FileOperationResult>>,
    /// Whether the unsaved-changes confirmation dialog is open.
    #[serde(skip)]
    pub show_unsaved_dialog: bool,
    /// Action to run once the user confirms discarding changes.
    #[serde(skip)]
    pub pending_confirm_action: Option<PendingConfirmAction>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            has_unsaved_changes: false,
            sender: Some(sender),
            receiver: Some(receiver),
            show_unsaved_dialog: false,
            pending_confirm_action: None,
        }
    }
}

/// Destructive action awaiting confirmation while changes are unsaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// Replace the board with a new empty one.
    New,
    /// Open a board file from disk.
    Open,
}

/// Messages sent from file dialog futures back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save completed; carries the path written.
    SaveCompleted(String),
    /// Load completed; carries the path and file content.
    LoadCompleted(String, String),
    /// The operation failed with an error message.
    OperationFailed(String),
}

/// Progress state for an in-flight bulk image import.
#[derive(Default)]
pub struct ImportState {
    /// Channel delivering decoded images from the worker thread.
    pub receiver: Option<Receiver<ImportEvent>>,
    /// Total number of files in the batch.
    pub total: usize,
    /// Files loaded so far.
    pub loaded: usize,
    /// Files that failed to load (import continues past them).
    pub failed: usize,
    /// Cards created by this batch, laid out when the batch completes.
    pub batch: Vec<CardId>,
}

impl ImportState {
    /// Whether an import batch is currently running.
    pub fn in_progress(&self) -> bool {
        self.receiver.is_some()
    }
}

/// The main application: board data plus all UI state.
///
/// Implements `eframe::App`; rendering and gesture handling run on the
/// single UI thread, driven by egui's per-frame update.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct BoardApp {
    /// The board being edited.
    pub board: Board,
    /// Canvas navigation state.
    pub canvas: CanvasState,
    /// Interaction state.
    #[serde(skip)]
    pub interaction: InteractionState,
    /// File operations state.
    #[serde(skip)]
    pub file: FileState,
    /// Bulk import progress.
    #[serde(skip)]
    pub import: ImportState,
    /// Decoded image cache; populated lazily and by the import worker.
    #[serde(skip)]
    pub assets: ImageAssets,
    /// Session-scoped gesture key bindings.
    #[serde(skip)]
    pub keymap: EditorSession,
    /// Counter for generating unique default card labels.
    pub card_counter: u32,
}

impl Default for BoardApp {
    fn default() -> Self {
        Self {
            board: Board::new(),
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            import: ImportState::default(),
            assets: ImageAssets::new(),
            keymap: EditorSession::new(),
            card_counter: 0,
        }
    }
}

impl BoardApp {
    /// Serializes the persistable application state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restores application state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
