//! Core data types for the reference board.
//!
//! This module defines the card model, the closed set of node variants the
//! canvas dispatches over, and the board container that owns them.

use crate::constants::{DEFAULT_CARD_HEIGHT, DEFAULT_CARD_WIDTH, IMAGE_WIDTH_DIVISOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for board cards.
pub type CardId = Uuid;

/// Non-owning reference to a decoded raster image.
///
/// The pixels and GPU texture live in the asset cache; the card only keeps
/// the source path and the cached pixel dimensions it needs for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Path the image was loaded from (also the cache key).
    pub path: PathBuf,
    /// Cached pixel width of the decoded image.
    pub width: u32,
    /// Cached pixel height of the decoded image.
    pub height: u32,
}

impl ImageRef {
    /// Pixel aspect ratio (width / height) guarded against a zero height.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// One reference-image card on the board.
///
/// The image transform fields (`scale`, `rotation_degrees`, `translation`)
/// apply to the image *inside* the card quad in shader space; `location`
/// places the quad itself on the graph canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier for this card.
    pub id: CardId,
    /// User-displayable label; rendered as "Select Source" while empty.
    pub label: String,
    /// Position of the card's top-left corner in graph units (y-up).
    pub location: (f32, f32),
    /// The image shown by this card, if one has been assigned.
    image: Option<ImageRef>,
    /// Image zoom inside the quad. Invariant: `scale >= 0`.
    pub scale: f32,
    /// Image rotation in degrees; unbounded, wraps visually every 360.
    pub rotation_degrees: f32,
    /// Image pan inside the quad, in normalized shader-space units.
    pub translation: (f32, f32),
    /// Card width in graph units; recomputed whenever the image changes.
    graph_width: f32,
    /// Collapsed display state: only the header row is shown.
    pub hidden: bool,
    /// Optional custom background color (linear RGB).
    pub color: Option<[f32; 3]>,
}

impl Card {
    /// Creates a new card at the given graph location with no image.
    pub fn new(label: String, location: (f32, f32)) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            location,
            image: None,
            scale: 1.0,
            rotation_degrees: 0.0,
            translation: (0.0, 0.0),
            graph_width: DEFAULT_CARD_WIDTH,
            hidden: false,
            color: None,
        }
    }

    /// The card's current image reference, if any.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Assigns or clears the card's image, recomputing the graph width.
    ///
    /// Width tracks the source image (`pixel width / 8`) so imported images
    /// land at a sensible on-canvas size; clearing the image restores the
    /// default width.
    pub fn set_image(&mut self, image: Option<ImageRef>) {
        self.graph_width = match &image {
            Some(img) => img.width as f32 / IMAGE_WIDTH_DIVISOR,
            None => DEFAULT_CARD_WIDTH,
        };
        self.image = image;
    }

    /// Card width in graph units.
    pub fn graph_width(&self) -> f32 {
        self.graph_width
    }

    /// Card height in graph units, preserving the image's aspect ratio.
    pub fn graph_height(&self) -> f32 {
        match &self.image {
            Some(img) => self.graph_width / img.aspect(),
            None => DEFAULT_CARD_HEIGHT,
        }
    }

    /// Clamps the scale to the `scale >= 0` invariant.
    pub fn clamp_scale(&mut self) {
        if self.scale < 0.0 {
            self.scale = 0.0;
        }
    }
}

/// Lifecycle hooks the canvas invokes on every node variant.
///
/// All hooks default to no-ops; cards carry no data-flow semantics, so there
/// is nothing to set up or tear down beyond the record itself.
pub trait BoardNode {
    /// Called when the node is first created on a board.
    fn on_create(&mut self) {}
    /// Called when the node is duplicated from an existing node.
    fn on_duplicate(&mut self, _source: &Self) {}
    /// Called just before the node is removed from its board.
    fn on_destroy(&mut self) {}
}

impl BoardNode for Card {}

/// The closed set of node variants the canvas dispatches over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    /// A reference-image card.
    Card(Card),
}

impl NodeKind {
    /// The node's id.
    pub fn id(&self) -> CardId {
        match self {
            NodeKind::Card(card) => card.id,
        }
    }

    /// Borrow the card variant.
    pub fn as_card(&self) -> &Card {
        match self {
            NodeKind::Card(card) => card,
        }
    }

    /// Mutably borrow the card variant.
    pub fn as_card_mut(&mut self) -> &mut Card {
        match self {
            NodeKind::Card(card) => card,
        }
    }
}

/// The board: an ordered collection of nodes with no connections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    /// All nodes on the board keyed by id.
    pub nodes: HashMap<CardId, NodeKind>,
    /// Insertion order, used for deterministic iteration and draw order.
    pub order: Vec<CardId>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card to the board, firing its creation hook.
    ///
    /// # Returns
    ///
    /// The id of the newly added card.
    pub fn add_card(&mut self, mut card: Card) -> CardId {
        card.on_create();
        let id = card.id;
        self.nodes.insert(id, NodeKind::Card(card));
        self.order.push(id);
        id
    }

    /// Removes a node, firing its destroy hook. Returns the removed node.
    pub fn remove(&mut self, id: &CardId) -> Option<NodeKind> {
        self.order.retain(|other| other != id);
        let mut node = self.nodes.remove(id)?;
        match &mut node {
            NodeKind::Card(card) => card.on_destroy(),
        }
        Some(node)
    }

    /// Borrow a card by id.
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.nodes.get(id).map(NodeKind::as_card)
    }

    /// Mutably borrow a card by id.
    pub fn card_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.nodes.get_mut(id).map(NodeKind::as_card_mut)
    }

    /// Iterate cards in insertion order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.order.iter().filter_map(|id| self.card(id))
    }

    /// Serializes the board to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a board from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_ref(width: u32, height: u32) -> ImageRef {
        ImageRef {
            path: PathBuf::from("/tmp/test.png"),
            width,
            height,
        }
    }

    #[test]
    fn new_card_uses_default_width() {
        let card = Card::new("a".into(), (0.0, 0.0));
        assert_eq!(card.graph_width(), DEFAULT_CARD_WIDTH);
        assert_eq!(card.graph_height(), DEFAULT_CARD_HEIGHT);
        assert!(card.image().is_none());
    }

    #[test]
    fn set_image_recomputes_graph_width() {
        let mut card = Card::new("a".into(), (0.0, 0.0));
        card.set_image(Some(image_ref(800, 400)));
        assert_eq!(card.graph_width(), 100.0);
        // Height preserves the 2:1 aspect ratio.
        assert_eq!(card.graph_height(), 50.0);

        card.set_image(None);
        assert_eq!(card.graph_width(), DEFAULT_CARD_WIDTH);
    }

    #[test]
    fn board_round_trips_through_json() {
        let mut board = Board::new();
        let mut card = Card::new("ref".into(), (10.0, -5.0));
        card.set_image(Some(image_ref(640, 480)));
        card.scale = 1.5;
        card.rotation_degrees = 370.0;
        card.translation = (0.25, -0.1);
        let id = board.add_card(card);

        let json = board.to_json().expect("serialize");
        let restored = Board::from_json(&json).expect("deserialize");
        let card = restored.card(&id).expect("card present");
        assert_eq!(card.scale, 1.5);
        assert_eq!(card.rotation_degrees, 370.0);
        assert_eq!(card.translation, (0.25, -0.1));
        assert_eq!(card.image().map(|img| img.path.clone()), Some(PathBuf::from("/tmp/test.png")));
        assert_eq!(restored.order, vec![id]);
    }

    #[test]
    fn remove_keeps_order_consistent() {
        let mut board = Board::new();
        let a = board.add_card(Card::new("a".into(), (0.0, 0.0)));
        let b = board.add_card(Card::new("b".into(), (10.0, 0.0)));
        assert!(board.remove(&a).is_some());
        assert_eq!(board.order, vec![b]);
        assert!(board.card(&a).is_none());
    }

    #[test]
    fn cards_iterates_in_insertion_order() {
        let mut board = Board::new();
        board.add_card(Card::new("first".into(), (0.0, 0.0)));
        board.add_card(Card::new("second".into(), (10.0, 0.0)));
        let labels: Vec<&str> = board.cards().map(|card| card.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
        assert_eq!(board.cards().count(), 2);
    }
}
