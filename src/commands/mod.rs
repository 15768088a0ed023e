mod convert;
mod preprocess;
mod utils;

use crate::cli::{Cli, Commands};
use pngsvg::ConvertResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> ConvertResult<()> {
    dispatch(cli.command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(command: Commands) -> ConvertResult<()> {
    match command {
        Commands::Convert(cmd) => convert::run(cmd),
        Commands::Preprocess(cmd) => preprocess::run(cmd),
    }
}
