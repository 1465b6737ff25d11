//! PPTX (Office Open XML) backend for branded decks.
//!
//! Writes `.pptx` packages from slide records and reads their text back.

pub mod canvas;
pub mod package;
pub mod reader;
pub mod renderer;
pub mod units;
pub mod xml;

pub use package::{DeckPackage, Theme};
pub use reader::{DeckReader, DeckSlide};
pub use renderer::PptxRenderer;
