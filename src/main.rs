//! Binary entrypoint for the `model-finder` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    // Recording is handled in commands::dispatch via MODEL_FINDER_RECORD=<dir>.
    match model_finder::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
