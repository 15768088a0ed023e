use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pngsvg::{
    BackgroundRemovalConfig, Color, ContourStyle, ConvertResult, LineArtConfig, ThresholdConfig,
    VectorizationSettings,
};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Log every pipeline step (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a PNG into an SVG
    Convert(ConvertCommand),
    /// Export the preprocessed bitmap the tracer would see, as a PNG
    Preprocess(PreprocessCommand),
}

#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// Input PNG path
    pub input: PathBuf,
    /// Output SVG path (defaults to the input name with `.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub preprocessing: PreprocessingArgs,
    #[command(flatten)]
    pub vectorization: VectorizationArgs,
    #[command(flatten)]
    pub contour: ContourArgs,
}

#[derive(Args, Debug)]
pub struct PreprocessCommand {
    /// Input PNG path
    pub input: PathBuf,
    /// Output PNG path (defaults to `<name>-preprocessed.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub preprocessing: PreprocessingArgs,
}

#[derive(Args, Debug)]
pub struct PreprocessingArgs {
    /// Make pixels close to the background color transparent
    #[arg(long = "remove-background")]
    pub remove_background: bool,
    /// Use the top-left pixel as background instead of the corner average
    #[arg(long = "single-pixel-background")]
    pub single_pixel_background: bool,
    /// Binarize the image into black and white line art
    #[arg(long = "line-art")]
    pub line_art: bool,
    /// Sensitivity for background removal and line art (0-255 or 0.0-1.0)
    #[arg(
        short,
        long,
        env = pngsvg::ENV_THRESHOLD,
        default_value_t = 160,
        value_parser = parse_threshold
    )]
    pub threshold: u8,
    /// Turn dark pixels white in line-art mode
    #[arg(long)]
    pub invert: bool,
}

impl PreprocessingArgs {
    pub fn background_removal(&self) -> BackgroundRemovalConfig {
        BackgroundRemovalConfig {
            enabled: self.remove_background,
            sample_average: !self.single_pixel_background,
        }
    }

    pub fn line_art(&self) -> LineArtConfig {
        LineArtConfig {
            enabled: self.line_art,
        }
    }

    pub fn threshold(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.threshold).with_invert(self.invert)
    }
}

#[derive(Args, Debug)]
pub struct VectorizationArgs {
    /// Number of colors to trace (2-64, forced to 2 in line-art mode)
    #[arg(short, long, env = pngsvg::ENV_COLORS, default_value_t = 16.0, allow_negative_numbers = true)]
    pub colors: f64,
    /// Curve fitting tolerance (0.5-10)
    #[arg(long = "curve-tolerance", default_value_t = 1.0)]
    pub curve_tolerance: f64,
    /// Corner fitting tolerance (0.5-10)
    #[arg(long = "corner-tolerance", default_value_t = 1.0)]
    pub corner_tolerance: f64,
    /// Drop traced shapes smaller than this (0-50)
    #[arg(long = "path-omit", env = pngsvg::ENV_PATH_OMIT, default_value_t = 8.0)]
    pub path_omit: f64,
}

impl From<&VectorizationArgs> for VectorizationSettings {
    fn from(args: &VectorizationArgs) -> Self {
        Self {
            color_count: args.colors,
            curve_fit_tolerance: args.curve_tolerance,
            corner_fit_tolerance: args.corner_tolerance,
            path_omit_threshold: args.path_omit,
        }
    }
}

#[derive(Args, Debug)]
pub struct ContourArgs {
    /// Draw outlines only, without fills
    #[arg(long = "contours-only")]
    pub contours_only: bool,
    /// Outline width (0.1-10)
    #[arg(long = "stroke-width", default_value_t = 1.5)]
    pub stroke_width: f64,
    /// Outline color as `#rrggbb` or `#rgb` (blank means black)
    #[arg(long = "stroke-color")]
    pub stroke_color: Option<String>,
}

impl ContourArgs {
    /// The contour style to request, or `None` for filled output.
    pub fn style(&self) -> ConvertResult<Option<ContourStyle>> {
        if !self.contours_only {
            return Ok(None);
        }
        let color = Color::parse_or_black(self.stroke_color.as_deref())?;
        Ok(Some(ContourStyle::new(self.stroke_width, Some(color))))
    }
}

fn parse_threshold(value: &str) -> Result<u8, String> {
    if let Ok(int_value) = value.parse::<i64>() {
        return Ok(ThresholdConfig::clamped(int_value).threshold);
    }

    let float_value = value
        .parse::<f32>()
        .map_err(|_| format!("threshold must be numeric (0-255 or 0.0-1.0), got `{value}`"))?;

    if (0.0..=1.0).contains(&float_value) {
        let scaled = (float_value * 255.0).round() as i32;
        return Ok(scaled.clamp(0, 255) as u8);
    }

    if float_value.is_finite() {
        return Ok(float_value.round().clamp(0.0, 255.0) as u8);
    }

    Err(format!(
        "threshold {value} is out of range; expected 0-255 or 0.0-1.0"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_accepts_bytes_and_fractions() {
        assert_eq!(parse_threshold("160"), Ok(160));
        assert_eq!(parse_threshold("0.5"), Ok(128));
        assert_eq!(parse_threshold("1.0"), Ok(255));
        assert_eq!(parse_threshold("300"), Ok(255));
        assert_eq!(parse_threshold("-4"), Ok(0));
        assert_eq!(parse_threshold("99.6"), Ok(100));
        assert!(parse_threshold("high").is_err());
        assert!(parse_threshold("NaN").is_err());
    }

    #[test]
    fn parses_convert_command() {
        let cli = Cli::try_parse_from([
            "pngsvg",
            "convert",
            "logo.png",
            "--remove-background",
            "--line-art",
            "--threshold",
            "100",
            "--contours-only",
            "--stroke-color",
            "#f00",
            "--colors",
            "1000",
        ])
        .unwrap();

        let Commands::Convert(cmd) = cli.command else {
            panic!("expected convert");
        };
        assert!(cmd.preprocessing.background_removal().enabled);
        assert!(cmd.preprocessing.background_removal().sample_average);
        assert_eq!(cmd.preprocessing.threshold().threshold, 100);
        let style = cmd.contour.style().unwrap().unwrap();
        assert_eq!(style.effective_color(), Color::new(255, 0, 0));
        assert_eq!(VectorizationSettings::from(&cmd.vectorization).color_count, 1000.0);
    }

    #[test]
    fn filled_output_has_no_contour_style() {
        let cli = Cli::try_parse_from(["pngsvg", "convert", "a.png"]).unwrap();
        let Commands::Convert(cmd) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(cmd.contour.style().unwrap(), None);
    }

    #[test]
    fn bad_stroke_color_is_invalid_input() {
        let args = ContourArgs {
            contours_only: true,
            stroke_width: 1.0,
            stroke_color: Some("#zz".into()),
        };
        assert!(args.style().is_err());
    }
}
