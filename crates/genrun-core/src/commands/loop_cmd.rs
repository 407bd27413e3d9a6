use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, CommandHandler};

/// `LOOP <item> in <collection>`: binds the item variable to each element
/// in order and executes the body once per element. The collection must be
/// an array variable or a comma-separated string. The binding is a plain
/// context write, so it is still visible after the loop ends.
pub struct LoopCommand;

#[async_trait]
impl CommandHandler for LoopCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let (var, collection) = node
            .payload
            .split_once(" in ")
            .ok_or_else(|| exec_err(node, "expected <item> in <collection>"))?;
        let var = var.trim();
        let collection = collection.trim();
        if var.is_empty() || collection.is_empty() {
            return Err(exec_err(node, "expected <item> in <collection>"));
        }

        let value = match exec.context.get(collection) {
            Some(value) => value.clone(),
            None => {
                // Not a variable: accept an inline comma-separated list,
                // reject anything else.
                let literal = exec.context.interpolate(collection);
                if !literal.contains(',') {
                    return Err(exec_err(
                        node,
                        format!("\"{}\" is not defined", collection),
                    ));
                }
                Value::String(literal)
            }
        };
        let items: Vec<Value> = match value {
            Value::Array(items) => items,
            Value::String(text) => text
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
            other => {
                return Err(exec_err(
                    node,
                    format!(
                        "\"{}\" is not a collection (got {})",
                        collection,
                        json_type_name(&other)
                    ),
                ));
            }
        };

        debug!(line = node.line, var, count = items.len(), "looping");
        for item in items {
            exec.context.set(var, item);
            exec.execute(&node.children).await?;
        }
        Ok(Outcome::Silent)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
