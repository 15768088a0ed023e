use std::fmt;

use crate::background::sample_background;
use crate::bitmap::Bitmap;
use crate::classify::classify;
use crate::config::{
    BackgroundRemovalConfig, ContourStyle, LineArtConfig, ThresholdConfig, VectorizationOptions,
    VectorizationSettings,
};
use crate::contour::apply_contour_only;
use crate::error::{ConvertError, ConvertResult, Stage};
use crate::vectorizer::VectorizationEngine;

/// Everything one conversion needs. Built once, consumed by [`Converter::convert`].
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    bitmap: Bitmap,
    background_removal: BackgroundRemovalConfig,
    line_art: LineArtConfig,
    threshold: ThresholdConfig,
    vectorization: VectorizationSettings,
    contour: Option<ContourStyle>,
}

impl ConversionRequest {
    /// A request with every option at its default: no preprocessing, filled output.
    pub fn new(bitmap: Bitmap) -> Self {
        Self {
            bitmap,
            background_removal: BackgroundRemovalConfig::default(),
            line_art: LineArtConfig::default(),
            threshold: ThresholdConfig::default(),
            vectorization: VectorizationSettings::default(),
            contour: None,
        }
    }

    pub fn with_background_removal(mut self, config: BackgroundRemovalConfig) -> Self {
        self.background_removal = config;
        self
    }

    pub fn with_line_art(mut self, config: LineArtConfig) -> Self {
        self.line_art = config;
        self
    }

    pub fn with_threshold(mut self, config: ThresholdConfig) -> Self {
        self.threshold = config;
        self
    }

    pub fn with_vectorization(mut self, settings: VectorizationSettings) -> Self {
        self.vectorization = settings;
        self
    }

    /// Request contour-only output with the given stroke, or filled output with `None`.
    pub fn with_contour(mut self, style: Option<ContourStyle>) -> Self {
        self.contour = style;
        self
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn background_removal(&self) -> &BackgroundRemovalConfig {
        &self.background_removal
    }

    pub fn line_art(&self) -> &LineArtConfig {
        &self.line_art
    }

    pub fn threshold(&self) -> &ThresholdConfig {
        &self.threshold
    }

    pub fn vectorization(&self) -> &VectorizationSettings {
        &self.vectorization
    }

    pub fn contour(&self) -> Option<&ContourStyle> {
        self.contour.as_ref()
    }

    /// Whether the bitmap goes through sampling and classification.
    pub fn needs_preprocessing(&self) -> bool {
        self.background_removal.enabled || self.line_art.enabled
    }

    /// The clamped engine options this request resolves to.
    pub fn vectorization_options(&self) -> VectorizationOptions {
        VectorizationOptions::build(&self.vectorization, self.line_art.enabled)
    }
}

/// Lifecycle of a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    Sampling,
    Classifying,
    Vectorizing,
    PostProcessing,
    Done,
    Failed(Stage),
}

impl ConversionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversionState::Done | ConversionState::Failed(_))
    }

    fn rank(&self) -> u8 {
        match self {
            ConversionState::Idle => 0,
            ConversionState::Sampling => 1,
            ConversionState::Classifying => 2,
            ConversionState::Vectorizing => 3,
            ConversionState::PostProcessing => 4,
            ConversionState::Done | ConversionState::Failed(_) => 5,
        }
    }

    /// Whether `next` may follow `self`. States only move forward; any live state may fail.
    pub fn can_advance_to(&self, next: ConversionState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    fn stage(&self) -> Option<Stage> {
        match self {
            ConversionState::Sampling => Some(Stage::Sampling),
            ConversionState::Classifying => Some(Stage::Classifying),
            ConversionState::Vectorizing => Some(Stage::Vectorizing),
            ConversionState::PostProcessing => Some(Stage::PostProcessing),
            _ => None,
        }
    }
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionState::Idle => f.write_str("idle"),
            ConversionState::Sampling => f.write_str("sampling"),
            ConversionState::Classifying => f.write_str("classifying"),
            ConversionState::Vectorizing => f.write_str("vectorizing"),
            ConversionState::PostProcessing => f.write_str("post-processing"),
            ConversionState::Done => f.write_str("done"),
            ConversionState::Failed(stage) => write!(f, "failed during {stage}"),
        }
    }
}

/// Outcome of [`Converter::run`]: the result plus every state the conversion passed through.
#[derive(Debug)]
pub struct ConversionReport {
    pub result: ConvertResult<String>,
    pub states: Vec<ConversionState>,
}

impl ConversionReport {
    pub fn final_state(&self) -> ConversionState {
        self.states
            .last()
            .copied()
            .unwrap_or(ConversionState::Idle)
    }
}

/// Records forward-only transitions for one conversion.
struct Lifecycle {
    states: Vec<ConversionState>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            states: vec![ConversionState::Idle],
        }
    }

    fn current(&self) -> ConversionState {
        self.states
            .last()
            .copied()
            .unwrap_or(ConversionState::Idle)
    }

    fn enter(&mut self, next: ConversionState) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "illegal transition {current} -> {next}"
        );
        tracing::debug!(from = %current, to = %next, "conversion state");
        self.states.push(next);
    }

    fn fail(&mut self, err: &ConvertError) {
        let stage = self.current().stage().unwrap_or_else(|| err.stage());
        tracing::debug!(%stage, error = %err, "conversion failed");
        self.enter(ConversionState::Failed(stage));
    }
}

/// Runs the sample, classify, vectorize, post-process sequence against one engine.
///
/// A converter holds no per-conversion state; it can be shared across threads
/// whenever its engine can.
#[derive(Debug, Clone, Default)]
pub struct Converter<E> {
    engine: E,
}

impl<E> Converter<E>
where
    E: VectorizationEngine,
{
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Convert a request into final SVG markup.
    pub fn convert(&self, request: ConversionRequest) -> ConvertResult<String> {
        self.run(request).result
    }

    /// Convert a request and report the states it went through.
    pub fn run(&self, request: ConversionRequest) -> ConversionReport {
        let span = tracing::info_span!(
            "convert",
            width = request.bitmap.width(),
            height = request.bitmap.height()
        );
        let _guard = span.enter();

        let mut lifecycle = Lifecycle::new();
        let result = self.execute(request, &mut lifecycle);
        match &result {
            Ok(markup) => {
                lifecycle.enter(ConversionState::Done);
                tracing::info!(bytes = markup.len(), "conversion finished");
            }
            Err(err) => lifecycle.fail(err),
        }

        ConversionReport {
            result,
            states: lifecycle.states,
        }
    }

    fn execute(
        &self,
        request: ConversionRequest,
        lifecycle: &mut Lifecycle,
    ) -> ConvertResult<String> {
        let options = request.vectorization_options();
        let contour = request.contour;
        let bitmap = preprocess_with(request, lifecycle);

        lifecycle.enter(ConversionState::Vectorizing);
        let markup = self.engine.vectorize(&bitmap, &options)?;
        drop(bitmap);

        match contour {
            Some(style) => {
                lifecycle.enter(ConversionState::PostProcessing);
                apply_contour_only(&markup, &style)
            }
            None => Ok(markup),
        }
    }
}

#[cfg(feature = "vectorizer-vtracer")]
impl Converter<crate::vectorizer::vtracer::VtracerEngine> {
    /// A converter backed by VTracer.
    pub fn vtracer() -> Self {
        Self::new(crate::vectorizer::vtracer::VtracerEngine)
    }
}

/// Run only background removal and line-art binarization, returning the bitmap
/// the engine would receive.
pub fn preprocess(request: ConversionRequest) -> Bitmap {
    preprocess_with(request, &mut Lifecycle::new())
}

fn preprocess_with(request: ConversionRequest, lifecycle: &mut Lifecycle) -> Bitmap {
    if !request.needs_preprocessing() {
        return request.bitmap;
    }

    lifecycle.enter(ConversionState::Sampling);
    let background = sample_background(&request.bitmap, request.background_removal.sample_average);
    tracing::debug!(%background, "sampled background");

    lifecycle.enter(ConversionState::Classifying);
    classify(
        &request.bitmap,
        background,
        &request.background_removal,
        &request.line_art,
        &request.threshold,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use image::{Rgba, RgbaImage};

    const MARKUP: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"><path d="M0 0 L1 0 L1 1 Z" fill="#ff0000"/></svg>"##;

    /// Returns fixed markup and remembers what it was asked to trace.
    #[derive(Default)]
    struct RecordingEngine {
        calls: RefCell<Vec<(Bitmap, VectorizationOptions)>>,
    }

    impl VectorizationEngine for RecordingEngine {
        fn vectorize(
            &self,
            bitmap: &Bitmap,
            options: &VectorizationOptions,
        ) -> ConvertResult<String> {
            self.calls.borrow_mut().push((bitmap.clone(), *options));
            Ok(MARKUP.to_string())
        }
    }

    struct FailingEngine;

    impl VectorizationEngine for FailingEngine {
        fn vectorize(&self, _: &Bitmap, _: &VectorizationOptions) -> ConvertResult<String> {
            Err(ConvertError::EngineFailure("tracer crashed".into()))
        }
    }

    struct GarbageEngine;

    impl VectorizationEngine for GarbageEngine {
        fn vectorize(&self, _: &Bitmap, _: &VectorizationOptions) -> ConvertResult<String> {
            Ok("<html></html>".into())
        }
    }

    fn red_pixel() -> Bitmap {
        Bitmap::from_image(RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]))).unwrap()
    }

    mod unit {
        use super::*;
        use crate::pipeline::ConversionState::*;

        #[test]
        fn plain_request_skips_preprocessing_and_post_processing() {
            let engine = RecordingEngine::default();
            let report = Converter::new(&engine).run(ConversionRequest::new(red_pixel()));

            assert_eq!(report.result.unwrap(), MARKUP);
            assert_eq!(report.states, [Idle, Vectorizing, Done]);
            let calls = engine.calls.borrow();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].0, red_pixel());
            assert_eq!(calls[0].1.color_count(), 16);
        }

        #[test]
        fn full_request_visits_every_state() {
            let engine = RecordingEngine::default();
            let request = ConversionRequest::new(red_pixel())
                .with_line_art(LineArtConfig { enabled: true })
                .with_contour(Some(ContourStyle::default()));
            let report = Converter::new(&engine).run(request);

            assert!(report.result.is_ok());
            assert_eq!(
                report.states,
                [Idle, Sampling, Classifying, Vectorizing, PostProcessing, Done]
            );
            assert_eq!(engine.calls.borrow()[0].1.color_count(), 2);
        }

        #[test]
        fn engine_failure_aborts() {
            let request = ConversionRequest::new(red_pixel()).with_contour(Some(ContourStyle::default()));
            let report = Converter::new(FailingEngine).run(request);

            assert!(matches!(report.result, Err(ConvertError::EngineFailure(_))));
            assert_eq!(report.final_state(), Failed(Stage::Vectorizing));
            assert!(!report.states.contains(&PostProcessing));
        }

        #[test]
        fn malformed_engine_output_fails_post_processing() {
            let request = ConversionRequest::new(red_pixel()).with_contour(Some(ContourStyle::default()));
            let report = Converter::new(GarbageEngine).run(request);

            assert!(matches!(report.result, Err(ConvertError::MalformedMarkup(_))));
            assert_eq!(report.final_state(), Failed(Stage::PostProcessing));
        }

        #[test]
        fn garbage_passes_through_without_contour() {
            let result = Converter::new(GarbageEngine).convert(ConversionRequest::new(red_pixel()));
            assert_eq!(result.unwrap(), "<html></html>");
        }

        #[test]
        fn states_only_move_forward() {
            assert!(Idle.can_advance_to(Sampling));
            assert!(Idle.can_advance_to(Vectorizing));
            assert!(Classifying.can_advance_to(Failed(Stage::Classifying)));
            assert!(!Vectorizing.can_advance_to(Sampling));
            assert!(!Done.can_advance_to(Failed(Stage::Vectorizing)));
            assert!(!Failed(Stage::Sampling).can_advance_to(Done));
            assert!(Done.is_terminal() && Failed(Stage::Vectorizing).is_terminal());
        }

        #[test]
        fn preprocess_returns_classified_bitmap() {
            let request = ConversionRequest::new(red_pixel()).with_background_removal(
                BackgroundRemovalConfig {
                    enabled: true,
                    sample_average: false,
                },
            );
            let bitmap = preprocess(request);
            assert_eq!(bitmap.pixel(0, 0).0, [255, 0, 0, 0]);
        }
    }
}
