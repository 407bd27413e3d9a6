use async_trait::async_trait;
use tracing::info;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::CommandHandler;

/// `LOG <message>`: interpolates and emits the message. Silent, so the only
/// output is the message itself.
pub struct LogCommand;

#[async_trait]
impl CommandHandler for LogCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let message = exec.context.interpolate(&node.payload);
        info!(line = node.line, "{}", message);
        Ok(Outcome::Silent)
    }
}
