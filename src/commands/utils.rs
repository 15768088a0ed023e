use std::path::{Path, PathBuf};

use pngsvg::{Bitmap, ConversionRequest};

use crate::cli::PreprocessingArgs;

const FALLBACK_STEM: &str = "image";

/// Start a conversion request from the shared preprocessing flags.
pub fn build_request(bitmap: Bitmap, args: &PreprocessingArgs) -> ConversionRequest {
    ConversionRequest::new(bitmap)
        .with_background_removal(args.background_removal())
        .with_line_art(args.line_art())
        .with_threshold(args.threshold())
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}

/// Derive the SVG path: a trailing `.png` (any case) is replaced, other names get `.svg` appended.
pub fn derive_svg_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    let stem = match lower.strip_suffix(".png") {
        Some(_) => &name[..name.len() - 4],
        None => name.as_str(),
    };
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    let mut path = input.to_path_buf();
    path.set_file_name(format!("{stem}.svg"));
    path
}
