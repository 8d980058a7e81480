use crate::cli::Format;
use pref_dns_application::use_cases::engine::reports::CODE_EXECUTION;
use pref_dns_application::use_cases::ActionError;
use serde::Serialize;
use tracing::error;

/// JSON result on stdout with the human line on stderr, or just the line.
/// Returns `code` as the exit code.
pub fn emit<T: Serialize>(format: Format, code: i32, report: &T, line: &str) -> i32 {
    match format {
        Format::Text => {
            println!("{}", line);
            code
        }
        Format::Json => match serde_json::to_string(report) {
            Ok(json) => {
                println!("{}", json);
                eprintln!("{}", line);
                code
            }
            Err(e) => {
                error!(error = %e, "Failed to encode result");
                CODE_EXECUTION
            }
        },
    }
}

pub fn emit_error(format: Format, err: &ActionError) -> i32 {
    let line = err.status_line();
    match format {
        Format::Text => println!("{}", line),
        Format::Json => {
            match serde_json::to_string(err) {
                Ok(json) => println!("{}", json),
                Err(e) => error!(error = %e, "Failed to encode error result"),
            }
            eprintln!("{}", line);
        }
    }
    err.code
}
