use pngsvg::{Bitmap, ConvertResult, preprocess};

use crate::cli::PreprocessCommand;

use super::utils::{build_request, derive_variant_path};

/// The main function to run the preprocess command.
pub fn run(cmd: PreprocessCommand) -> ConvertResult<()> {
    let bitmap = Bitmap::open_png(&cmd.input)?;
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, "preprocessed", "png"));

    let request = build_request(bitmap, &cmd.preprocessing);
    if !request.needs_preprocessing() {
        eprintln!(
            "Warning: neither --remove-background nor --line-art is set; the output equals the input."
        );
    }

    preprocess(request).save_png(&output_path)?;
    println!("Preprocessed PNG saved to {}", output_path.display());

    Ok(())
}
