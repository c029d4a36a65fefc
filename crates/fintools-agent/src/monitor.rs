//! Per-invocation logging and crash containment.
//!
//! Each call runs on its own tokio task so a panicking handler cannot take
//! the caller down; the panic is logged and turned into the generic
//! `Error: ...` message.

use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use fintools_core::{is_error_result, ErrorTranslator, ToolFailure};

use crate::args::ToolArgs;
use crate::context::ToolContext;
use crate::registry::{dispatch, Tool};

/// Correlates the start and finish events of one tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for InvocationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Failure,
    Crash,
}

impl InvocationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Crash => "crash",
        }
    }

    pub fn of(output: &str) -> Self {
        if is_error_result(output) {
            Self::Failure
        } else {
            Self::Success
        }
    }
}

/// Runs `tool` on a fresh task and logs its start and completion.
pub async fn run(ctx: Arc<ToolContext>, tool: Tool, args: ToolArgs) -> String {
    let translator = ctx.translator(tool.domain()).clone();
    let inputs = Value::Object(args.values().clone()).to_string();
    let task_ctx = Arc::clone(&ctx);
    supervise(&translator, tool.name(), &inputs, async move {
        dispatch(&task_ctx, tool, &args).await
    })
    .await
}

/// Spawns `task`, logging start, finish and any panic. A panic becomes the
/// translator's generic message.
pub async fn supervise<F>(translator: &ErrorTranslator, tool: &str, inputs: &str, task: F) -> String
where
    F: Future<Output = String> + Send + 'static,
{
    let invocation_id = InvocationId::new_v4();
    tracing::info!(
        tool,
        %invocation_id,
        inputs = %translator.sanitize(inputs),
        "tool invocation started"
    );
    let started = Instant::now();

    let (output, status) = match tokio::spawn(task).await {
        Ok(output) => {
            let status = InvocationStatus::of(&output);
            (output, status)
        }
        Err(join_error) => {
            tracing::error!(
                tool,
                %invocation_id,
                error = %translator.sanitize(&join_error.to_string()),
                "tool invocation crashed"
            );
            let output = translator.translate(&ToolFailure::Internal(join_error.to_string()));
            (output, InvocationStatus::Crash)
        }
    };

    tracing::info!(
        tool,
        %invocation_id,
        duration_ms = started.elapsed().as_millis() as u64,
        status = status.as_str(),
        "tool invocation finished"
    );
    output
}
