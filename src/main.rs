use std::process::ExitCode;

// `cli::run` has already logged the failure with its full chain.
fn main() -> ExitCode {
    match taskshim::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
