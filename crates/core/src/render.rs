//! Rendering boundary between slide records and deck files.

use crate::error::Result;
use crate::types::SlideRecord;
use std::path::Path;

/// Turns a validated slide sequence into a deck file.
///
/// Rendering is all-or-nothing: on error no file should be left at `path`.
pub trait DeckRenderer: Send + Sync {
    fn render_to_path(&self, slides: &[SlideRecord], path: &Path) -> Result<()>;
}
