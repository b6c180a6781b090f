//! JSON output for the CLI
//!
//! - One JSON object per invocation on stdout
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&success_body(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_body(code, message))
}

fn success_body(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn error_body(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line(body: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, body)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_body() {
        assert_eq!(success_body(json!([1])), json!({"status": "ok", "data": [1]}));
    }

    #[test]
    fn test_error_body() {
        let body = error_body("CLI_CAST_ERROR", "bad");
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "CLI_CAST_ERROR");
        assert_eq!(body["message"], "bad");
    }
}
