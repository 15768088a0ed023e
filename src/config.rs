use crate::color::Color;

/// The shared sensitivity knob for background removal and line-art binarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub threshold: u8,
    /// Flip the line-art direction so dark pixels become white.
    pub invert: bool,
}

impl ThresholdConfig {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            invert: false,
        }
    }

    /// Build from an unchecked integer, clamping into `0..=255`.
    pub fn clamped(threshold: i64) -> Self {
        Self::new(threshold.clamp(0, 255) as u8)
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(160)
    }
}

/// Options for making background-colored pixels transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundRemovalConfig {
    pub enabled: bool,
    /// Average the four corners instead of taking the top-left pixel.
    pub sample_average: bool,
}

impl Default for BackgroundRemovalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sample_average: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineArtConfig {
    pub enabled: bool,
}

pub const MIN_STROKE_WIDTH: f64 = 0.1;
pub const MAX_STROKE_WIDTH: f64 = 10.0;
pub const DEFAULT_STROKE_WIDTH: f64 = 1.5;

/// Stroke styling applied to the root element in contour-only output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourStyle {
    pub stroke_width: f64,
    /// `None` strokes in black.
    pub stroke_color: Option<Color>,
}

impl ContourStyle {
    pub fn new(stroke_width: f64, stroke_color: Option<Color>) -> Self {
        Self {
            stroke_width,
            stroke_color,
        }
    }

    /// The width actually written: clamped to `[0.1, 10]`, or the default when not finite.
    pub fn effective_width(&self) -> f64 {
        if self.stroke_width.is_finite() {
            self.stroke_width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
        } else {
            DEFAULT_STROKE_WIDTH
        }
    }

    pub fn effective_color(&self) -> Color {
        self.stroke_color.unwrap_or(Color::BLACK)
    }
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_WIDTH, None)
    }
}

/// Unclamped vectorization values as a user entered them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorizationSettings {
    pub color_count: f64,
    pub curve_fit_tolerance: f64,
    pub corner_fit_tolerance: f64,
    pub path_omit_threshold: f64,
}

impl Default for VectorizationSettings {
    fn default() -> Self {
        Self {
            color_count: 16.0,
            curve_fit_tolerance: 1.0,
            corner_fit_tolerance: 1.0,
            path_omit_threshold: 8.0,
        }
    }
}

/// Engine configuration after clamping. Only [`VectorizationOptions::build`] creates one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorizationOptions {
    color_count: u32,
    curve_fit_tolerance: f64,
    corner_fit_tolerance: f64,
    path_omit_threshold: u32,
}

impl VectorizationOptions {
    pub const COLOR_COUNT_RANGE: (u32, u32) = (2, 64);
    pub const TOLERANCE_RANGE: (f64, f64) = (0.5, 10.0);
    pub const PATH_OMIT_RANGE: (u32, u32) = (0, 50);

    /// Clamp raw settings into engine ranges. Line art always traces two colors.
    pub fn build(settings: &VectorizationSettings, line_art: bool) -> Self {
        let (min_colors, max_colors) = Self::COLOR_COUNT_RANGE;
        let color_count = if line_art {
            2
        } else {
            clamp_rounded(settings.color_count, min_colors, max_colors)
        };
        let (min_omit, max_omit) = Self::PATH_OMIT_RANGE;

        let options = Self {
            color_count,
            curve_fit_tolerance: clamp_tolerance(settings.curve_fit_tolerance),
            corner_fit_tolerance: clamp_tolerance(settings.corner_fit_tolerance),
            path_omit_threshold: clamp_rounded(settings.path_omit_threshold, min_omit, max_omit),
        };
        tracing::debug!(?settings, ?options, line_art, "built vectorization options");
        options
    }

    pub fn color_count(&self) -> u32 {
        self.color_count
    }

    pub fn curve_fit_tolerance(&self) -> f64 {
        self.curve_fit_tolerance
    }

    pub fn corner_fit_tolerance(&self) -> f64 {
        self.corner_fit_tolerance
    }

    /// Traced shapes smaller than this are dropped.
    pub fn path_omit_threshold(&self) -> u32 {
        self.path_omit_threshold
    }
}

impl Default for VectorizationOptions {
    fn default() -> Self {
        Self::build(&VectorizationSettings::default(), false)
    }
}

// NaN falls to the lower bound.
fn clamp_rounded(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() {
        return min;
    }
    value.round().clamp(min as f64, max as f64) as u32
}

fn clamp_tolerance(value: f64) -> f64 {
    let (min, max) = VectorizationOptions::TOLERANCE_RANGE;
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_colors(color_count: f64) -> VectorizationSettings {
        VectorizationSettings {
            color_count,
            ..VectorizationSettings::default()
        }
    }

    mod unit {
        use super::*;

        #[test]
        fn defaults_match_reference_controls() {
            let options = VectorizationOptions::default();
            assert_eq!(options.color_count(), 16);
            assert_eq!(options.path_omit_threshold(), 8);
            assert_eq!(options.curve_fit_tolerance(), 1.0);
            assert_eq!(options.corner_fit_tolerance(), 1.0);
            assert_eq!(ThresholdConfig::default().threshold, 160);
            assert!(BackgroundRemovalConfig::default().sample_average);
        }

        #[test]
        fn color_count_is_clamped() {
            let high = VectorizationOptions::build(&settings_with_colors(1000.0), false);
            assert_eq!(high.color_count(), 64);
            let low = VectorizationOptions::build(&settings_with_colors(0.0), false);
            assert_eq!(low.color_count(), 2);
            let rounded = VectorizationOptions::build(&settings_with_colors(7.5), false);
            assert_eq!(rounded.color_count(), 8);
        }

        #[test]
        fn line_art_forces_two_colors() {
            for requested in [0.0, 2.0, 16.0, 1000.0] {
                let options = VectorizationOptions::build(&settings_with_colors(requested), true);
                assert_eq!(options.color_count(), 2);
            }
        }

        #[test]
        fn tolerances_and_omit_are_clamped() {
            let settings = VectorizationSettings {
                color_count: 16.0,
                curve_fit_tolerance: 0.0,
                corner_fit_tolerance: 99.0,
                path_omit_threshold: 500.0,
            };
            let options = VectorizationOptions::build(&settings, false);
            assert_eq!(options.curve_fit_tolerance(), 0.5);
            assert_eq!(options.corner_fit_tolerance(), 10.0);
            assert_eq!(options.path_omit_threshold(), 50);

            let negative = VectorizationSettings {
                path_omit_threshold: -4.0,
                ..settings
            };
            assert_eq!(
                VectorizationOptions::build(&negative, false).path_omit_threshold(),
                0
            );
        }

        #[test]
        fn nan_inputs_fall_to_lower_bounds() {
            let settings = VectorizationSettings {
                color_count: f64::NAN,
                curve_fit_tolerance: f64::NAN,
                corner_fit_tolerance: f64::NAN,
                path_omit_threshold: f64::NAN,
            };
            let options = VectorizationOptions::build(&settings, false);
            assert_eq!(options.color_count(), 2);
            assert_eq!(options.curve_fit_tolerance(), 0.5);
            assert_eq!(options.path_omit_threshold(), 0);
        }

        #[test]
        fn stroke_width_clamps_and_defaults() {
            assert_eq!(ContourStyle::new(0.0, None).effective_width(), 0.1);
            assert_eq!(ContourStyle::new(42.0, None).effective_width(), 10.0);
            assert_eq!(ContourStyle::new(2.5, None).effective_width(), 2.5);
            assert_eq!(ContourStyle::new(f64::NAN, None).effective_width(), 1.5);
            assert_eq!(
                ContourStyle::new(f64::INFINITY, None).effective_width(),
                1.5
            );
        }

        #[test]
        fn stroke_color_defaults_to_black() {
            assert_eq!(ContourStyle::default().effective_color(), Color::BLACK);
            let red = Color::new(255, 0, 0);
            assert_eq!(ContourStyle::new(1.0, Some(red)).effective_color(), red);
        }

        #[test]
        fn threshold_clamped_constructor() {
            assert_eq!(ThresholdConfig::clamped(-10).threshold, 0);
            assert_eq!(ThresholdConfig::clamped(300).threshold, 255);
            assert_eq!(ThresholdConfig::clamped(99).threshold, 99);
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Every built option lies inside its documented range
            #[test]
            fn options_always_in_range(
                color_count in -1e6f64..1e6,
                curve in -1e3f64..1e3,
                corner in -1e3f64..1e3,
                omit in -1e3f64..1e3,
                line_art in any::<bool>()
            ) {
                let settings = VectorizationSettings {
                    color_count,
                    curve_fit_tolerance: curve,
                    corner_fit_tolerance: corner,
                    path_omit_threshold: omit,
                };
                let options = VectorizationOptions::build(&settings, line_art);
                prop_assert!((2..=64).contains(&options.color_count()));
                prop_assert!((0.5..=10.0).contains(&options.curve_fit_tolerance()));
                prop_assert!((0.5..=10.0).contains(&options.corner_fit_tolerance()));
                prop_assert!(options.path_omit_threshold() <= 50);
                if line_art {
                    prop_assert_eq!(options.color_count(), 2);
                }
            }
        }
    }
}
