use std::process::ExitCode;

use aus_cli::cli::build_cli;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    aus_cli::logging::init(matches.get_flag("debug"));

    match aus_cli::run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
