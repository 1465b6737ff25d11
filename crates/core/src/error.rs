//! Error types for outline parsing, planning and deck rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning an outline into a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The outline produced no slides.
    #[error("Could not parse outline")]
    EmptyOutline,

    /// The brand configuration is missing or malformed.
    #[error("Brand config error: {0}")]
    BrandConfigError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML reading or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// A logo or gradient image could not be read.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Failed to parse an existing PPTX file.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Rendering a deck failed.
    #[error("Render error: {0}")]
    RenderError(String),

    /// The injected language model failed or replied with something unusable.
    #[error("Model error: {0}")]
    ModelError(String),

    /// A chat tool name that is not in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool parameters did not match the tool's schema.
    #[error("Invalid parameters for {tool}: {reason}")]
    ToolParameterError { tool: String, reason: String },
}
