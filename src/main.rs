use std::process::ExitCode;

use clap::Parser;

use driveback::cli::{handle_backup, BackupArgs};

fn main() -> ExitCode {
    let args = match BackupArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version land here too and are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match handle_backup(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
