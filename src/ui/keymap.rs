//! Gesture key bindings owned by an editor session.
//!
//! Bindings live in a plain table owned by the session value rather than a
//! process-wide registry: constructing an [`EditorSession`] registers the
//! defaults, dropping it releases them with the rest of the app state.

use eframe::egui;

/// Actions a key binding can trigger on the active card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    /// Start a modal Move gesture.
    Move,
    /// Start a modal Rotate gesture.
    Rotate,
    /// Instantly increase the image scale by one step.
    ZoomIn,
    /// Instantly decrease the image scale by one step (clamped at 0).
    ZoomOut,
}

/// One key-plus-modifiers binding.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    /// The bound key.
    pub key: egui::Key,
    /// Exact modifier set required.
    pub modifiers: egui::Modifiers,
    /// Action the binding triggers.
    pub action: BoardAction,
}

/// Session-scoped binding table resolving raw key input to board actions.
pub struct EditorSession {
    bindings: Vec<KeyBinding>,
}

impl Default for EditorSession {
    /// Registers the default bindings: Rotate on Shift+R, ZoomIn on Alt+Z,
    /// ZoomOut on Alt+Shift+Z, Move on Shift+M.
    fn default() -> Self {
        Self {
            bindings: vec![
                KeyBinding {
                    key: egui::Key::R,
                    modifiers: egui::Modifiers::SHIFT,
                    action: BoardAction::Rotate,
                },
                KeyBinding {
                    key: egui::Key::Z,
                    modifiers: egui::Modifiers::ALT,
                    action: BoardAction::ZoomIn,
                },
                KeyBinding {
                    key: egui::Key::Z,
                    modifiers: egui::Modifiers::ALT | egui::Modifiers::SHIFT,
                    action: BoardAction::ZoomOut,
                },
                KeyBinding {
                    key: egui::Key::M,
                    modifiers: egui::Modifiers::SHIFT,
                    action: BoardAction::Move,
                },
            ],
        }
    }
}

impl EditorSession {
    /// Creates a session with the default bindings registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a key press to an action, if a binding matches exactly.
    ///
    /// Bindings are checked in reverse registration order so the most
    /// specific modifier set (registered last among duplicates) wins; exact
    /// matching already prevents Alt+Z from shadowing Alt+Shift+Z.
    pub fn action_for(&self, key: egui::Key, modifiers: egui::Modifiers) -> Option<BoardAction> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.key == key && binding.modifiers.matches_exact(modifiers))
            .map(|binding| binding.action)
    }
}
