use async_trait::async_trait;
use tracing::debug;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::set::{eval_value_expression, split_assignment};
use super::{exec_err, CommandHandler};

/// `GLOBAL <name> = <value expression>`: same value grammar as SET, but the
/// binding is written through to the persistent store as well as the live
/// context. Silent.
pub struct GlobalCommand;

#[async_trait]
impl CommandHandler for GlobalCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let (name, expr) = split_assignment(node)?;
        let value = eval_value_expression(&expr, node, exec).await?;
        exec.globals
            .set(&name, value.clone())
            .map_err(|e| exec_err(node, format!("cannot persist global: {}", e)))?;
        exec.context.set(name.clone(), value);
        debug!(line = node.line, name = %name, "global persisted");
        Ok(Outcome::Silent)
    }
}
