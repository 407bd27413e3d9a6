use async_trait::async_trait;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, CommandHandler};

/// `FILL <path>` with a quote-delimited body: joins the captured lines,
/// interpolates the whole body, and writes it to the resolved path.
pub struct FillCommand;

#[async_trait]
impl CommandHandler for FillCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let target = exec.context.interpolate(node.payload.trim());
        if target.is_empty() {
            return Err(exec_err(node, "missing target path"));
        }
        let path = exec.resolve_path(&target);
        if path.is_dir() {
            return Err(exec_err(
                node,
                format!("{} is a directory", path.display()),
            ));
        }

        let body = exec.context.interpolate(&node.content_lines.join("\n"));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| exec_err(node, format!("cannot create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| exec_err(node, format!("cannot write {}: {}", path.display(), e)))?;
        Ok(Outcome::Success(Some(format!("filled {}", path.display()))))
    }
}
