//! Bulk image import: multi-file picker, background decoding, row layout.
//!
//! Decoding runs on a worker thread so large batches don't stall the UI; the
//! results are marshalled back over a channel and all model mutations (card
//! creation, layout) happen on the UI thread. Per-file failures are logged
//! and counted but never abort the rest of the batch.

use super::state::BoardApp;
use crate::assets::ImageAssets;
use crate::constants::{CARDS_PER_ROW, LAYOUT_GUTTER_X, LAYOUT_GUTTER_Y};
use crate::types::{Card, ImageRef};
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::channel;

/// Image file extensions offered by the picker.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// One result from the import worker.
pub enum ImportEvent {
    /// A file decoded successfully.
    Loaded {
        /// Source path (cache key).
        path: PathBuf,
        /// Decoded pixels, handed to the asset cache on the UI thread.
        pixels: egui::ColorImage,
    },
    /// A file failed to decode; the batch continues.
    Failed {
        /// Source path of the failed file.
        path: PathBuf,
        /// Human-readable reason.
        error: String,
    },
}

impl BoardApp {
    /// Opens a multi-file picker and starts a background import of the
    /// selected images.
    pub fn import_images(&mut self) {
        let picked = futures::executor::block_on(async {
            rfd::AsyncFileDialog::new()
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_files()
                .await
        });
        let Some(handles) = picked else {
            return;
        };
        let paths: Vec<PathBuf> = handles.iter().map(|h| h.path().to_path_buf()).collect();
        self.start_import(paths);
    }

    /// Spawns the decode worker for an ordered list of image paths.
    pub fn start_import(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        let (sender, receiver) = channel();
        self.import.receiver = Some(receiver);
        self.import.total = paths.len();
        self.import.loaded = 0;
        self.import.failed = 0;
        self.import.batch.clear();

        std::thread::spawn(move || {
            for path in paths {
                let event = match ImageAssets::decode(&path) {
                    Ok(pixels) => ImportEvent::Loaded { path, pixels },
                    Err(error) => ImportEvent::Failed { path, error },
                };
                // The receiver is dropped if the app shut down; stop quietly.
                if sender.send(event).is_err() {
                    return;
                }
            }
        });
    }

    /// Drains finished import results and applies them to the board.
    ///
    /// Called once per frame from the update loop; every model mutation
    /// happens here, on the UI thread.
    pub fn poll_import(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.import.receiver else {
            return;
        };
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        let mut done = false;
        for event in events {
            match event {
                ImportEvent::Loaded { path, pixels } => {
                    let (width, height) = self.assets.insert_decoded(path.clone(), pixels);
                    self.card_counter += 1;
                    let mut card = Card::new(
                        path.file_stem()
                            .map(|stem| stem.to_string_lossy().into_owned())
                            .unwrap_or_else(|| format!("card{}", self.card_counter)),
                        (0.0, 0.0),
                    );
                    card.set_image(Some(ImageRef { path, width, height }));
                    let id = self.board.add_card(card);
                    self.import.batch.push(id);
                    self.import.loaded += 1;
                }
                ImportEvent::Failed { path, error } => {
                    log::warn!("skipping {}: {error}", path.display());
                    self.import.failed += 1;
                }
            }
            self.file.has_unsaved_changes = true;
        }

        let finished = self.import.loaded + self.import.failed;
        if finished >= self.import.total {
            done = true;
        }
        self.interaction.status_line = Some(if done {
            format!(
                "Imported {} image(s){}",
                self.import.loaded,
                if self.import.failed > 0 {
                    format!(", {} failed", self.import.failed)
                } else {
                    String::new()
                }
            )
        } else {
            format!(
                "Importing images: {}/{}{}",
                finished,
                self.import.total,
                if self.import.failed > 0 {
                    format!(" ({} failed)", self.import.failed)
                } else {
                    String::new()
                }
            )
        });

        if done {
            log::info!(
                "import finished: {} loaded, {} failed",
                self.import.loaded,
                self.import.failed
            );
            // Land the batch where the user is looking: the first card's
            // corner maps to the middle of the canvas.
            let center = self.screen_to_graph(ctx.screen_rect().center());
            self.layout_import_batch((center.x, center.y));
            self.import.receiver = None;
        }
        ctx.request_repaint();
    }

    /// Lays out the just-imported cards in rows starting at `origin`.
    fn layout_import_batch(&mut self, origin: (f32, f32)) {
        let batch = std::mem::take(&mut self.import.batch);
        let mut cards: Vec<Card> = batch
            .iter()
            .filter_map(|id| self.board.card(id).cloned())
            .collect();
        layout_rows(&mut cards, origin);
        for card in cards {
            if let Some(target) = self.board.card_mut(&card.id) {
                target.location = card.location;
            }
        }
    }
}

/// Lays cards out left-to-right in rows of ten.
///
/// Each card sits one gutter to the right of its predecessor; after every
/// tenth card the cursor wraps to the row start and drops by the tallest
/// card of the completed row plus the vertical gutter (graph space is y-up,
/// so rows grow downward as y decreases).
pub fn layout_rows(cards: &mut [Card], origin: (f32, f32)) {
    let mut x = origin.0;
    let mut y = origin.1;
    let mut row_max_height: f32 = 0.0;
    for (i, card) in cards.iter_mut().enumerate() {
        if i > 0 && i % CARDS_PER_ROW == 0 {
            y -= row_max_height + LAYOUT_GUTTER_Y;
            x = origin.0;
            row_max_height = 0.0;
        }
        card.location = (x, y);
        x += card.graph_width() + LAYOUT_GUTTER_X;
        row_max_height = row_max_height.max(card.graph_height());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_with_image(width: u32, height: u32, n: usize) -> Card {
        let mut card = Card::new(format!("img{n}"), (0.0, 0.0));
        card.set_image(Some(ImageRef {
            path: PathBuf::from(format!("/tmp/img{n}.png")),
            width,
            height,
        }));
        card
    }

    #[test]
    fn twenty_five_cards_fill_three_rows() {
        // 800x400 -> graph 100x50 for every card.
        let mut cards: Vec<Card> = (0..25).map(|n| card_with_image(800, 400, n)).collect();
        layout_rows(&mut cards, (0.0, 0.0));

        // Row 1: increasing x with a 10-unit gutter, same y.
        for i in 0..10 {
            assert_eq!(cards[i].location, (i as f32 * 110.0, 0.0), "card {i}");
        }
        // Row 2: y dropped by row 1's max height (50) + 20.
        for i in 10..20 {
            assert_eq!(
                cards[i].location,
                ((i - 10) as f32 * 110.0, -70.0),
                "card {i}"
            );
        }
        // Row 3: another 70 down.
        for i in 20..25 {
            assert_eq!(
                cards[i].location,
                ((i - 20) as f32 * 110.0, -140.0),
                "card {i}"
            );
        }
    }

    #[test]
    fn row_height_tracks_the_tallest_card() {
        // Card 3 is twice as tall as the rest of its row.
        let mut cards: Vec<Card> = (0..11).map(|n| card_with_image(800, 400, n)).collect();
        cards[3] = card_with_image(800, 800, 3);
        layout_rows(&mut cards, (0.0, 0.0));
        // Row 1 max height is 100 (the 1:1 card), so row 2 sits at -120.
        assert_eq!(cards[10].location, (0.0, -120.0));
    }

    #[test]
    fn import_batch_lays_out_from_the_given_origin() {
        let mut app = BoardApp::default();
        let ids: Vec<_> = (0..3)
            .map(|n| app.board.add_card(card_with_image(800, 400, n)))
            .collect();
        app.import.batch = ids.clone();

        app.layout_import_batch((500.0, 250.0));

        assert_eq!(app.board.card(&ids[0]).unwrap().location, (500.0, 250.0));
        assert_eq!(app.board.card(&ids[1]).unwrap().location, (610.0, 250.0));
        assert!(app.import.batch.is_empty());
    }

    #[test]
    fn layout_respects_a_nonzero_origin() {
        let mut cards: Vec<Card> = (0..12).map(|n| card_with_image(80, 80, n)).collect();
        layout_rows(&mut cards, (500.0, 250.0));
        assert_eq!(cards[0].location, (500.0, 250.0));
        assert_eq!(cards[1].location, (520.0, 250.0));
        // 10x10 cards: row 2 drops by 10 + 20.
        assert_eq!(cards[10].location, (500.0, 220.0));
    }
}
