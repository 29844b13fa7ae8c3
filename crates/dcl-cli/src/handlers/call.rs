//! Call command handler.

use serde_json::{Map, Value};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Call `tool` on `server` with optional JSON object arguments.
///
/// # Errors
///
/// Returns [`CliError::Arguments`] when `args` is not a JSON object.
pub async fn execute(
    ctx: &CliContext,
    server: &str,
    tool: &str,
    args: Option<&str>,
) -> Result<(), CliError> {
    let arguments = parse_arguments(args)?;
    println!(
        "{}",
        ctx.gateway.invoke_operation(server, tool, arguments).await
    );
    Ok(())
}

/// Parse `--args`; absent or blank means no arguments.
fn parse_arguments(raw: Option<&str>) -> Result<Option<Map<String, Value>>, CliError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(other) => Err(CliError::Arguments(format!(
            "--args must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CliError::Arguments(format!("--args is not valid JSON: {e}"))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_arguments() {
        let args = parse_arguments(Some(r#"{"query": "rust", "limit": 3}"#))
            .unwrap()
            .unwrap();
        assert_eq!(args["query"], "rust");
        assert_eq!(args["limit"], 3);
    }

    #[test]
    fn test_absent_or_blank_arguments() {
        assert!(parse_arguments(None).unwrap().is_none());
        assert!(parse_arguments(Some("   ")).unwrap().is_none());
    }

    #[test]
    fn test_non_object_arguments_are_usage_errors() {
        let err = parse_arguments(Some("[1, 2]")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("an array"));

        let err = parse_arguments(Some("{not json")).unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));
    }
}
