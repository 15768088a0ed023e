pub mod background;
pub mod bitmap;
pub mod classify;
pub mod color;
pub mod config;
pub mod contour;
pub mod error;
pub mod pipeline;
pub mod svg;
pub mod vectorizer;

pub use background::sample_background;
pub use bitmap::Bitmap;
pub use classify::classify;
pub use color::Color;
pub use config::{
    BackgroundRemovalConfig, ContourStyle, LineArtConfig, ThresholdConfig, VectorizationOptions,
    VectorizationSettings,
};
pub use contour::apply_contour_only;
pub use error::{ConvertError, ConvertResult, Stage};
pub use pipeline::{ConversionReport, ConversionRequest, ConversionState, Converter, preprocess};
pub use vectorizer::VectorizationEngine;
#[cfg(feature = "vectorizer-vtracer")]
pub use vectorizer::vtracer::VtracerEngine;

/// Environment variable read for the default threshold by the CLI.
pub const ENV_THRESHOLD: &str = "PNGSVG_THRESHOLD";
/// Environment variable read for the default color count by the CLI.
pub const ENV_COLORS: &str = "PNGSVG_COLORS";
/// Environment variable read for the default path omit threshold by the CLI.
pub const ENV_PATH_OMIT: &str = "PNGSVG_PATH_OMIT";
