use pngsvg::{ConvertError, Stage};

pub fn report_error(err: &ConvertError) {
    match err {
        ConvertError::InvalidInput {
            stage: Stage::Decoding,
            reason,
        } => {
            eprintln!("Could not read the input image: {reason}");
            eprintln!();
            eprintln!("Only PNG files are supported.");
        }
        ConvertError::EngineFailure(message) => {
            eprintln!("Vectorization failed: {message}");
            eprintln!();
            eprintln!("Try fewer colors (--colors) or a larger --path-omit value.");
        }
        ConvertError::MalformedMarkup(message) => {
            eprintln!("Could not apply contour styling: {message}");
            eprintln!();
            eprintln!("Run again without --contours-only to keep the filled SVG.");
        }
        _ => {
            eprintln!("Conversion failed during {}: {err}", err.stage());
        }
    }
}
