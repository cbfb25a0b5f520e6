//! JSON output for the CLI
//!
//! - One JSON object per command on stdout
//! - `{"status": "ok", "data": ...}` or `{"status": "error", "code", "message"}`
//! - Logs go to stderr, never here

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&mut io::stdout(), &ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_value(&mut io::stdout(), &error_envelope(code, message))
}

fn ok_envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn error_envelope(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_value<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
