//! tn - terminal notes synchronized through git

use std::process::ExitCode;

fn main() -> ExitCode {
    match terminotes::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            terminotes::ui::output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
