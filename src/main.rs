//! ci-actions binary entry point.

use std::process::ExitCode;

use ci_actions::ui::output;

fn main() -> ExitCode {
    match ci_actions::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
