//! # dupe-pairs CLI
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! dupe-pairs ~/Pictures --action-equal none
//! dupe-pairs ~/Pictures --comparison-method histogram -f 0.01 --parallel
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
