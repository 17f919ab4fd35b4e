use std::process::ExitCode;

use basic_archive::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = basic_archive::cli::parse();
    match app::run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
