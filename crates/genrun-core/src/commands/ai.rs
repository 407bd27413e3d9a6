use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::ast::CommandNode;
use crate::backend::{AiRequest, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::context::value_to_string;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, CommandHandler};

/// `AI <prompt>`: interpolates the prompt and hands it to the configured
/// backend. Model, system prompt, and temperature come from the global
/// store keys `AI_MODEL`, `AI_SYSTEM_PROMPT`, and `AI_TEMPERATURE`.
pub struct AiCommand;

#[async_trait]
impl CommandHandler for AiCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let prompt = exec.context.interpolate(node.payload.trim());
        if prompt.is_empty() {
            return Err(exec_err(node, "empty prompt"));
        }

        let request = build_request(prompt, exec);
        debug!(line = node.line, model = %request.model, request.temperature, "generating");
        let response = exec
            .backend
            .generate(&request)
            .await
            .map_err(|e| exec_err(node, e.to_string()))?;
        Ok(Outcome::Success(Some(response)))
    }
}

/// Assembles a generation request from the global-store settings. Shared
/// with the `@ai` value expression in SET/GLOBAL.
pub(super) fn build_request(prompt: String, exec: &Executor) -> AiRequest {
    let model = exec
        .globals
        .get("AI_MODEL")
        .map(|v| value_to_string(&v))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let system = exec.globals.get("AI_SYSTEM_PROMPT").map(|v| value_to_string(&v));
    let temperature = exec
        .globals
        .get("AI_TEMPERATURE")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .unwrap_or(DEFAULT_TEMPERATURE);
    AiRequest {
        prompt,
        model,
        system,
        temperature,
    }
}
