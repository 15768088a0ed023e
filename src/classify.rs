use image::Rgba;

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::config::{BackgroundRemovalConfig, LineArtConfig, ThresholdConfig};

/// Largest distance used for the background cutoff; `sqrt(255² * 3)` truncated.
pub const MAX_COLOR_DISTANCE: f64 = 441.0;

/// Rescale the 0-255 threshold into the RGB distance range.
pub fn distance_cutoff(threshold: u8) -> f64 {
    (threshold as f64 / 255.0 * MAX_COLOR_DISTANCE).clamp(0.0, MAX_COLOR_DISTANCE)
}

/// Rounded Rec. 601 luma.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round() as u8
}

/// Everything needed to classify one pixel, resolved once per bitmap.
#[derive(Debug, Clone, Copy)]
struct PixelRule {
    background: Color,
    remove_background: bool,
    line_art: bool,
    cutoff: f64,
    threshold: u8,
    invert: bool,
}

impl PixelRule {
    fn apply(&self, px: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = px.0;

        // Transparency wins over binarization.
        if self.remove_background
            && a > 0
            && Color::new(r, g, b).distance(&self.background) <= self.cutoff
        {
            return Rgba([r, g, b, 0]);
        }

        if self.line_art {
            let gray = luma(r, g, b);
            let on = if self.invert {
                gray < self.threshold
            } else {
                gray >= self.threshold
            };
            let v = if on { 255 } else { 0 };
            return Rgba([v, v, v, a]);
        }

        px
    }
}

/// Apply background removal and line-art binarization to every pixel.
///
/// Pixels are classified independently. With both features disabled the
/// result equals the input.
pub fn classify(
    bitmap: &Bitmap,
    background: Color,
    removal: &BackgroundRemovalConfig,
    line_art: &LineArtConfig,
    threshold: &ThresholdConfig,
) -> Bitmap {
    if !removal.enabled && !line_art.enabled {
        return bitmap.clone();
    }

    let rule = PixelRule {
        background,
        remove_background: removal.enabled,
        line_art: line_art.enabled,
        cutoff: distance_cutoff(threshold.threshold),
        threshold: threshold.threshold,
        invert: threshold.invert,
    };
    tracing::debug!(?rule, "classifying pixels");

    let classified = bitmap.map_pixels(|px| rule.apply(px));
    let cleared = classified
        .image()
        .pixels()
        .zip(bitmap.image().pixels())
        .filter(|(out, src)| out[3] == 0 && src[3] != 0)
        .count();
    tracing::debug!(cleared, total = bitmap.len(), "pixel classification done");

    classified
}
