use std::process::ExitCode;

use memt_config::StartupError;
use memtd::{BootstrapError, LaunchError};

fn main() -> ExitCode {
    match memtd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(LaunchError::Bootstrap {
            source:
                BootstrapError::Configuration {
                    source: StartupError::Usage(usage),
                },
        }) => usage.exit(),
        Err(error) => {
            eprintln!("memtd: {error}");
            ExitCode::FAILURE
        }
    }
}
