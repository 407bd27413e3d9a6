use async_trait::async_trait;

use crate::ast::CommandNode;
use crate::context::value_to_string;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, CommandHandler};

/// `WRITE "<literal>" to <path>` or `WRITE <variable> to <path>`: writes
/// the interpolated literal, or the named variable's string form, to the
/// resolved path. Parent directories are created. `SAVE` parses to the
/// same node kind.
pub struct WriteCommand;

#[async_trait]
impl CommandHandler for WriteCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let (source, target) = node
            .payload
            .rsplit_once(" to ")
            .ok_or_else(|| exec_err(node, "expected <content> to <path>"))?;
        let source = source.trim();
        let target = exec.context.interpolate(target.trim());
        if target.is_empty() {
            return Err(exec_err(node, "missing target path"));
        }

        let content = if let Some(inner) = quoted_literal(source) {
            exec.context.interpolate(inner)
        } else {
            match exec.context.get(source) {
                Some(value) => value_to_string(value),
                None => {
                    return Err(exec_err(
                        node,
                        format!("variable \"{}\" is not defined", source),
                    ));
                }
            }
        };

        let path = exec.resolve_path(&target);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| exec_err(node, format!("cannot create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| exec_err(node, format!("cannot write {}: {}", path.display(), e)))?;
        Ok(Outcome::Success(Some(format!("wrote {}", path.display()))))
    }
}

/// Returns the inner text of a double-quoted literal, or `None` when the
/// source is a bare variable reference.
fn quoted_literal(source: &str) -> Option<&str> {
    if source.len() >= 2 && source.starts_with('"') && source.ends_with('"') {
        Some(&source[1..source.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_literal() {
        assert_eq!(quoted_literal("\"hello\""), Some("hello"));
        assert_eq!(quoted_literal("\"a to b\""), Some("a to b"));
        assert_eq!(quoted_literal("variable"), None);
        assert_eq!(quoted_literal("\""), None);
        assert_eq!(quoted_literal("\"\""), Some(""));
    }
}
