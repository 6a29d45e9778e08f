//! Error types for the rendering back-ends

use thiserror::Error;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// A layout produced no pages or no pixels
    #[error("Nothing to render")]
    EmptyDocument,

    /// The canvas could not be allocated at the laid-out size
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// A text holds a character the target cannot draw
    #[error("{target} cannot draw {character:?} in {text:?}")]
    UnsupportedText {
        target: &'static str,
        character: char,
        text: String,
    },

    /// PDF serialization error
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// PNG encoder error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
