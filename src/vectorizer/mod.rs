use crate::bitmap::Bitmap;
use crate::config::VectorizationOptions;
use crate::error::ConvertResult;

/// A tracing backend that turns a bitmap into SVG markup.
///
/// Implementations must not keep state between calls, so one engine can serve
/// concurrent conversions.
pub trait VectorizationEngine {
    fn vectorize(&self, bitmap: &Bitmap, options: &VectorizationOptions) -> ConvertResult<String>;
}

impl<E> VectorizationEngine for &E
where
    E: VectorizationEngine + ?Sized,
{
    fn vectorize(&self, bitmap: &Bitmap, options: &VectorizationOptions) -> ConvertResult<String> {
        (**self).vectorize(bitmap, options)
    }
}

#[cfg(feature = "vectorizer-vtracer")]
pub mod vtracer;
