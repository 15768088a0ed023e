use visioncortex::PathSimplifyMode;
use vtracer::{ColorImage, ColorMode, Config, Hierarchical, convert};

use crate::bitmap::Bitmap;
use crate::config::VectorizationOptions;
use crate::error::{ConvertError, ConvertResult};
use crate::svg::SvgDocument;

use super::VectorizationEngine;

/// Corner angle in degrees; not exposed as a user control.
const CORNER_THRESHOLD: i32 = 60;
const MAX_ITERATIONS: usize = 10;
/// One decimal place keeps coordinates rounded.
const PATH_PRECISION: u32 = 1;
const LENGTH_THRESHOLD_SCALE: f64 = 4.0;
const LENGTH_THRESHOLD_RANGE: (f64, f64) = (3.5, 10.0);
const SPLICE_DEGREES_PER_TOLERANCE: f64 = 45.0;

/// VTracer-based vectorization engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtracerEngine;

impl VectorizationEngine for VtracerEngine {
    fn vectorize(&self, bitmap: &Bitmap, options: &VectorizationOptions) -> ConvertResult<String> {
        let (width, height) = bitmap.dimensions();
        let config = tracer_config(options);
        let pixels = match config.color_mode {
            ColorMode::Binary => binary_pixels(bitmap),
            ColorMode::Color => bitmap.as_raw().to_vec(),
        };
        let image = ColorImage {
            pixels,
            width: width as usize,
            height: height as usize,
        };

        let svg_file = convert(image, config).map_err(ConvertError::EngineFailure)?;
        tracing::debug!(width, height, "vtracer finished");
        with_view_box(&svg_file.to_string(), width, height)
    }
}

/// Map the clamped options onto a VTracer configuration.
pub fn tracer_config(options: &VectorizationOptions) -> Config {
    let colors = options.color_count().max(2);
    let color_mode = if colors == 2 {
        ColorMode::Binary
    } else {
        ColorMode::Color
    };
    // bits needed to tell `colors` levels apart
    let color_precision = (u32::BITS - (colors - 1).leading_zeros()).clamp(1, 8) as i32;

    let (min_length, max_length) = LENGTH_THRESHOLD_RANGE;
    let length_threshold =
        (options.curve_fit_tolerance() * LENGTH_THRESHOLD_SCALE).clamp(min_length, max_length);
    let splice_threshold =
        (options.corner_fit_tolerance() * SPLICE_DEGREES_PER_TOLERANCE).clamp(0.0, 180.0) as i32;

    Config {
        color_mode,
        hierarchical: Hierarchical::Stacked,
        mode: PathSimplifyMode::Spline,
        filter_speckle: options.path_omit_threshold() as usize,
        color_precision,
        layer_difference: (256 / colors) as i32,
        corner_threshold: CORNER_THRESHOLD,
        length_threshold,
        max_iterations: MAX_ITERATIONS,
        splice_threshold,
        path_precision: Some(PATH_PRECISION),
    }
}

/// RGBA bytes for binary tracing, which reads only the red channel.
/// Transparent pixels become opaque white so they never count as foreground.
fn binary_pixels(bitmap: &Bitmap) -> Vec<u8> {
    let mut rgba = bitmap.as_raw().to_vec();
    for px in rgba.chunks_exact_mut(4) {
        if px[3] == 0 {
            px.copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    rgba
}

/// Give the root element a `viewBox` covering the bitmap when the tracer left it out.
fn with_view_box(markup: &str, width: u32, height: u32) -> ConvertResult<String> {
    let mut document = SvgDocument::parse(markup)
        .map_err(|err| ConvertError::EngineFailure(format!("tracer produced bad markup: {err}")))?;
    let root = document.root_mut();
    if root.attribute("viewBox").is_none() {
        root.set_attribute("viewBox", format!("0 0 {width} {height}"));
    }
    Ok(document.to_string())
}
