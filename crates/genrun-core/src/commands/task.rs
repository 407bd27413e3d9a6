use async_trait::async_trait;
use tracing::info;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::CommandHandler;

/// `TASK <name>`: executes the task body. Selection between tasks happens
/// in the executor's gate before dispatch reaches this handler.
pub struct TaskCommand;

#[async_trait]
impl CommandHandler for TaskCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        info!(line = node.line, task = %node.payload, "running task");
        exec.execute(&node.children).await?;
        Ok(Outcome::Silent)
    }
}
