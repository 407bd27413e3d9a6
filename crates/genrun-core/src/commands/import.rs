use async_trait::async_trait;
use tracing::{info, warn};

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};
use crate::parser;

use super::{exec_err, CommandHandler};

/// `IMPORT <path>`: reads and parses the sub-script, then executes its
/// nodes linearly in the current context. The canonical path is tracked
/// for the duration of the import so that cycles fail instead of
/// recursing forever.
pub struct ImportCommand;

#[async_trait]
impl CommandHandler for ImportCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let raw = exec.context.interpolate(node.payload.trim());
        if raw.is_empty() {
            return Err(exec_err(node, "missing script path"));
        }
        let path = exec.resolve_path(&raw);
        let canonical = path
            .canonicalize()
            .map_err(|e| exec_err(node, format!("cannot resolve \"{}\": {}", raw, e)))?;
        if exec.import_stack.contains(&canonical) {
            return Err(exec_err(
                node,
                format!("circular import of {}", canonical.display()),
            ));
        }

        let source = std::fs::read_to_string(&canonical)
            .map_err(|e| exec_err(node, format!("cannot read {}: {}", canonical.display(), e)))?;
        let parsed = parser::parse(&source)
            .map_err(|e| exec_err(node, format!("in \"{}\": {}", raw, e)))?;
        for warning in &parsed.warnings {
            warn!(script = %raw, line = warning.line, "{}", warning.message);
        }
        if let Some(description) = parsed.metadata.description() {
            info!(line = node.line, script = %description, "importing");
        }

        exec.import_stack.insert(canonical.clone());
        let result = exec.execute(&parsed.nodes).await;
        exec.import_stack.remove(&canonical);
        result?;

        Ok(Outcome::Success(Some(format!("imported {}", raw))))
    }
}
