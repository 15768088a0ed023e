use std::fs;

use pngsvg::{Bitmap, ConvertResult, Converter};

use crate::cli::ConvertCommand;

use super::utils::{build_request, derive_svg_path};

/// The main function to run the convert command.
pub fn run(cmd: ConvertCommand) -> ConvertResult<()> {
    let bitmap = Bitmap::open_png(&cmd.input)?;
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_svg_path(&cmd.input));

    let request = build_request(bitmap, &cmd.preprocessing)
        .with_vectorization((&cmd.vectorization).into())
        .with_contour(cmd.contour.style()?);

    let svg = Converter::vtracer().convert(request)?;
    fs::write(&output_path, &svg)?;
    println!("SVG saved to {}", output_path.display());

    Ok(())
}
