use std::fmt;

use thiserror::Error;

/// Result type alias for operations that may fail with [`ConvertError`].
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// The step of a conversion an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading and decoding the PNG byte stream.
    Decoding,
    /// Checking the bitmap and request before any work starts.
    Validation,
    /// Estimating the background reference color.
    Sampling,
    /// Background removal and line-art binarization.
    Classifying,
    /// The vectorization engine call.
    Vectorizing,
    /// Contour-only rewriting of the engine markup.
    PostProcessing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decoding => "decoding",
            Stage::Validation => "validation",
            Stage::Sampling => "background sampling",
            Stage::Classifying => "pixel classification",
            Stage::Vectorizing => "vectorization",
            Stage::PostProcessing => "contour post-processing",
        };
        f.write_str(name)
    }
}

/// Error types that can occur while converting a bitmap into SVG markup.
///
/// Every variant is terminal for the conversion it came from; nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The bitmap or one of the request values cannot be used.
    #[error("Invalid input during {stage}: {reason}")]
    InvalidInput { stage: Stage, reason: String },
    /// The vectorization engine failed to produce markup.
    #[error("Vectorization engine failed: {0}")]
    EngineFailure(String),
    /// The engine markup could not be parsed or has no `<svg>` root.
    #[error("Malformed vector markup: {0}")]
    MalformedMarkup(String),
    /// Image loading, decoding, or encoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn invalid(stage: Stage, reason: impl Into<String>) -> Self {
        ConvertError::InvalidInput {
            stage,
            reason: reason.into(),
        }
    }

    /// The conversion step that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ConvertError::InvalidInput { stage, .. } => *stage,
            ConvertError::EngineFailure(_) => Stage::Vectorizing,
            ConvertError::MalformedMarkup(_) => Stage::PostProcessing,
            ConvertError::Image(_) | ConvertError::Io(_) => Stage::Decoding,
        }
    }
}
