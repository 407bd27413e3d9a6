use async_trait::async_trait;
use tracing::debug;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, CommandHandler};

/// `> <command>`: interpolates and runs the command in the session shell.
/// A non-zero exit status fails the run; `cd` updates the session cwd for
/// every later command and path resolution.
pub struct ShellCommand;

#[async_trait]
impl CommandHandler for ShellCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let command = exec.context.interpolate(&node.payload);
        if command.is_empty() {
            return Err(exec_err(node, "empty shell command"));
        }
        let result = exec
            .shell
            .run(&command)
            .await
            .map_err(|e| exec_err(node, format!("cannot spawn shell: {}", e)))?;
        if !result.stdout.is_empty() {
            debug!(line = node.line, "{}", result.stdout);
        }
        if !result.success() {
            let mut message = format!("exit status {}", result.code);
            if !result.stderr.is_empty() {
                message.push_str(": ");
                message.push_str(&result.stderr);
            }
            return Err(exec_err(node, message));
        }
        Ok(Outcome::Success(Some(command)))
    }
}
