//! Binary entrypoint for the `trackbridge` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; settings may come from flags alone.
    dotenvy::dotenv().ok();
    trackbridge::telemetry::init();

    // Recording and replay are handled in commands::dispatch.
    match trackbridge::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
