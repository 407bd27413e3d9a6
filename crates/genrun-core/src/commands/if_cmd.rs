use async_trait::async_trait;

use crate::ast::CommandNode;
use crate::context::value_to_string;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, strip_keyword, CommandHandler};

/// `IF <condition>` with optional ELSEIF branches and an ELSE block.
/// Branch conditions are evaluated in declaration order; the first true one
/// runs and the rest are skipped. No true branch and no ELSE runs nothing.
///
/// Condition grammar:
///   `exists <path>` / `not_exists <path>`
///   `<left> is <right>` / `<left> isnot <right>`
/// Comparison sides are interpolated; bare variable names resolve without
/// braces, and quotes around a literal are optional.
pub struct IfCommand;

#[async_trait]
impl CommandHandler for IfCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        if eval_condition(&node.payload, node, exec)? {
            exec.execute(&node.children).await?;
            return Ok(Outcome::Silent);
        }
        for branch in &node.else_if_branches {
            if eval_condition(&branch.condition, node, exec)? {
                exec.execute(&branch.children).await?;
                return Ok(Outcome::Silent);
            }
        }
        if let Some(else_children) = &node.else_children {
            exec.execute(else_children).await?;
        }
        Ok(Outcome::Silent)
    }
}

fn eval_condition(
    condition: &str,
    node: &CommandNode,
    exec: &Executor,
) -> Result<bool, ScriptError> {
    let condition = condition.trim();
    if condition.is_empty() {
        return Err(exec_err(node, "empty condition"));
    }

    if let Some(rest) = strip_keyword(condition, "exists") {
        let path = exec.resolve_path(&exec.context.interpolate(rest));
        return Ok(path.exists());
    }
    if let Some(rest) = strip_keyword(condition, "not_exists") {
        let path = exec.resolve_path(&exec.context.interpolate(rest));
        return Ok(!path.exists());
    }

    // `isnot` first, since " is " would also match inside it.
    if let Some((left, right)) = condition.split_once(" isnot ") {
        return Ok(resolve_side(left, exec) != resolve_side(right, exec));
    }
    if let Some((left, right)) = condition.split_once(" is ") {
        return Ok(resolve_side(left, exec) == resolve_side(right, exec));
    }

    Err(exec_err(
        node,
        format!("unsupported condition \"{}\"", condition),
    ))
}

/// Resolves one side of a comparison to its string form. A quoted side is
/// always a literal (interpolated, never treated as a variable name); an
/// unquoted side is interpolated, and a bare name that matches a variable
/// resolves to that variable's value.
fn resolve_side(side: &str, exec: &Executor) -> String {
    let side = side.trim();
    if let Some(inner) = side.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return exec.context.interpolate(inner);
    }
    let interpolated = exec.context.interpolate(side);
    if interpolated == side {
        if let Some(value) = exec.context.get(side) {
            return value_to_string(value);
        }
    }
    interpolated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CommandKind;
    use serde_json::json;

    fn node(condition: &str) -> CommandNode {
        CommandNode::new(CommandKind::If, condition, 1)
    }

    fn exec() -> Executor {
        Executor::new(std::env::temp_dir())
    }

    #[test]
    fn test_exists() {
        let exec = exec();
        let dir = std::env::temp_dir();
        let cond = format!("exists {}", dir.display());
        assert!(eval_condition(&cond, &node(&cond), &exec).unwrap());
        assert!(!eval_condition("exists /no/such/path", &node(""), &exec).unwrap());
        assert!(eval_condition("not_exists /no/such/path", &node(""), &exec).unwrap());
    }

    #[test]
    fn test_is_with_braces_and_quotes() {
        let mut exec = exec();
        exec.context.set("mode", json!("dev"));
        assert!(eval_condition("{mode} is \"dev\"", &node(""), &exec).unwrap());
        assert!(!eval_condition("{mode} is \"prod\"", &node(""), &exec).unwrap());
        assert!(eval_condition("{mode} isnot \"prod\"", &node(""), &exec).unwrap());
    }

    #[test]
    fn test_quoted_literal_never_resolves_as_variable() {
        let mut exec = exec();
        exec.context.set("mode", json!("dev"));
        // A variable named after the literal must not shadow it.
        exec.context.set("dev", json!("production"));
        assert!(eval_condition("{mode} is \"dev\"", &node(""), &exec).unwrap());
        assert!(!eval_condition("{mode} isnot \"dev\"", &node(""), &exec).unwrap());
    }

    #[test]
    fn test_is_with_bare_variable_name() {
        let mut exec = exec();
        exec.context.set("mode", json!("dev"));
        assert!(eval_condition("mode is dev", &node(""), &exec).unwrap());
        assert!(eval_condition("mode isnot prod", &node(""), &exec).unwrap());
    }

    #[test]
    fn test_unknown_condition_is_error() {
        let exec = exec();
        let err = eval_condition("frobnicates well", &node(""), &exec).unwrap_err();
        assert!(matches!(err, ScriptError::Exec { .. }));
    }
}
