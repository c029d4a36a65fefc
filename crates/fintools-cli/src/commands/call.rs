use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use serde_json::{Map, Value};

use fintools_agent::{ToolContext, ToolRegistry};
use fintools_core::{is_error_result, HttpClient, ReqwestHttpClient, Settings};

use crate::cli::CallArgs;
use crate::error::{CliError, TOOL_FAILURE_EXIT_CODE};

pub async fn run(args: &CallArgs, settings: &Settings) -> Result<ExitCode, CliError> {
    let arguments = build_arguments(args)?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let registry = ToolRegistry::new(Arc::new(ToolContext::from_settings(settings, http)?));
    tracing::debug!(
        app = %registry.context().app_name,
        tool = %args.tool,
        keys = arguments.len(),
        "calling tool from the command line"
    );
    let output = registry.call(&args.tool, Value::Object(arguments)).await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{output}")?;

    if is_error_result(&output) {
        tracing::warn!(tool = %args.tool, "tool reported an error");
        return Ok(ExitCode::from(TOOL_FAILURE_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Merges `--args-json` with the repeated `--arg key=value` pairs.
fn build_arguments(args: &CallArgs) -> Result<Map<String, Value>, CliError> {
    let mut arguments = match args.args_json.as_deref() {
        None => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(CliError::Argument(String::from(
                    "--args-json must be a JSON object",
                )))
            }
            Err(error) => {
                return Err(CliError::Argument(format!("--args-json is not valid JSON: {error}")))
            }
        },
    };

    for pair in &args.args {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CliError::Argument(format!("expected KEY=VALUE, got '{pair}'")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Argument(format!("missing key in '{pair}'")));
        }
        arguments.insert(key.to_owned(), Value::String(value.to_owned()));
    }

    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call_args(args: &[&str], args_json: Option<&str>) -> CallArgs {
        CallArgs {
            tool: String::from("get_forex_history"),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            args_json: args_json.map(str::to_owned),
        }
    }

    #[test]
    fn repeated_args_override_json_keys() {
        let args = call_args(&["ticker=GBPUSD"], Some(r#"{"ticker": "EURUSD", "multiplier": 5}"#));
        let map = build_arguments(&args).expect("valid arguments");
        assert_eq!(map.get("ticker"), Some(&json!("GBPUSD")));
        assert_eq!(map.get("multiplier"), Some(&json!(5)));
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let map = build_arguments(&call_args(&["time_start=a=b"], None)).expect("valid arguments");
        assert_eq!(map.get("time_start"), Some(&json!("a=b")));
    }

    #[test]
    fn malformed_pairs_are_argument_errors() {
        let error = build_arguments(&call_args(&["ticker"], None)).expect_err("no equals sign");
        assert_eq!(error.exit_code(), 2);

        let error = build_arguments(&call_args(&[], Some("[1, 2]"))).expect_err("not an object");
        assert!(error.to_string().contains("JSON object"));
    }
}
