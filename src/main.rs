use std::process::ExitCode;

use cdirectory::output as out;

mod app;
mod logging;

/// Exit status for failures (1 is reserved for "not found").
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let args = cdirectory::cli::parse();
    match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
