//! Error types for presentation analysis and prediction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading presentations or training predictors.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX file structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The trainer was given a non-empty record set in which no record
    /// carries a value for the target attribute.
    #[error("No record carries a value for target attribute '{0}'")]
    UnlabelledTarget(&'static str),

    /// A selection pointed outside the presentation.
    #[error("Selection out of range: slide {slide}, element {element}")]
    SelectionOutOfRange { slide: usize, element: usize },

    /// An operation needed a slide master the presentation does not have.
    #[error("Presentation has no slide master")]
    MissingMaster,
}
