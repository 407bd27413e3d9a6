use async_trait::async_trait;
use serde_json::Value;

use crate::ast::CommandNode;
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

use super::{exec_err, strip_keyword, CommandHandler};

/// `SET <name> = <value expression>`: evaluates the right-hand side and
/// binds it in the context. Silent.
pub struct SetCommand;

#[async_trait]
impl CommandHandler for SetCommand {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError> {
        let (name, expr) = split_assignment(node)?;
        let value = eval_value_expression(&expr, node, exec).await?;
        exec.context.set(name, value);
        Ok(Outcome::Silent)
    }
}

/// Splits `<name> = <expr>` on the first `=`. Shared with GLOBAL.
pub(super) fn split_assignment(node: &CommandNode) -> Result<(String, String), ScriptError> {
    let (name, expr) = node
        .payload
        .split_once('=')
        .ok_or_else(|| exec_err(node, "expected <name> = <value>"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(exec_err(node, "variable name is empty"));
    }
    Ok((name.to_string(), expr.trim().to_string()))
}

/// Evaluates a right-hand-side value expression. Shared with GLOBAL.
///
/// Recognized forms, tried in order:
///   `input:<prompt>`              ask the operator for free text
///   `select:<prompt>:[a, b, c]`   ask the operator to pick one option
///   `ai <prompt>`                 backend-generated text
///   `load <path>`                 file contents (`.json` files parse)
///   `files in <dir>`              file names in a directory, sorted
///   `folders in <dir>`            directory names in a directory, sorted
/// Anything else is plain text, interpolated.
pub(super) async fn eval_value_expression(
    expr: &str,
    node: &CommandNode,
    exec: &mut Executor,
) -> Result<Value, ScriptError> {
    if let Some(rest) = expr.strip_prefix("input:") {
        let prompt = exec.context.interpolate(rest.trim());
        let answer = exec
            .prompter
            .input(&prompt)
            .await
            .map_err(|e| exec_err(node, format!("input prompt failed: {}", e)))?;
        return Ok(Value::String(answer));
    }

    if let Some(rest) = expr.strip_prefix("select:") {
        let (prompt, options) = rest
            .split_once(':')
            .ok_or_else(|| exec_err(node, "expected select:<prompt>:[options]"))?;
        let options = options
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| exec_err(node, "select options must be a [bracketed, list]"))?;
        let items: Vec<String> = options
            .split(',')
            .map(|s| exec.context.interpolate(s.trim()))
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            return Err(exec_err(node, "select requires at least one option"));
        }
        let prompt = exec.context.interpolate(prompt.trim());
        let index = exec
            .prompter
            .select(&prompt, &items)
            .await
            .map_err(|e| exec_err(node, format!("select prompt failed: {}", e)))?;
        return Ok(Value::String(items[index].clone()));
    }

    // Keywords take their `@`-sigil forms identically.
    let sigil_free = expr.strip_prefix('@').unwrap_or(expr);

    if let Some(rest) = strip_keyword(sigil_free, "ai") {
        let prompt = exec.context.interpolate(rest);
        if prompt.is_empty() {
            return Err(exec_err(node, "empty prompt"));
        }
        let request = super::ai::build_request(prompt, exec);
        let response = exec
            .backend
            .generate(&request)
            .await
            .map_err(|e| exec_err(node, e.to_string()))?;
        return Ok(Value::String(response));
    }

    if let Some(rest) = strip_keyword(sigil_free, "load") {
        let path = exec.resolve_path(&exec.context.interpolate(rest));
        let text = std::fs::read_to_string(&path)
            .map_err(|e| exec_err(node, format!("cannot read {}: {}", path.display(), e)))?;
        if path.extension().is_some_and(|e| e == "json") {
            if let Ok(parsed) = serde_json::from_str::<Value>(&text) {
                return Ok(parsed);
            }
        }
        return Ok(Value::String(text));
    }

    if let Some(rest) = strip_keyword(expr, "files") {
        if let Some(dir) = strip_keyword(rest, "in") {
            return list_dir(dir, node, exec, false);
        }
    }
    if let Some(rest) = strip_keyword(expr, "folders") {
        if let Some(dir) = strip_keyword(rest, "in") {
            return list_dir(dir, node, exec, true);
        }
    }

    Ok(Value::String(exec.context.interpolate(expr)))
}

fn list_dir(
    dir: &str,
    node: &CommandNode,
    exec: &Executor,
    folders: bool,
) -> Result<Value, ScriptError> {
    let path = exec.resolve_path(&exec.context.interpolate(dir));
    let entries = std::fs::read_dir(&path)
        .map_err(|e| exec_err(node, format!("cannot list {}: {}", path.display(), e)))?;
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| exec_err(node, e.to_string()))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| exec_err(node, e.to_string()))?
            .is_dir();
        if is_dir == folders {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(Value::Array(names.into_iter().map(Value::String).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CommandKind;
    use crate::backend::{AiBackend, AiBackendError, AiRequest};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    fn node(payload: &str) -> CommandNode {
        CommandNode::new(CommandKind::Set, payload, 1)
    }

    fn exec() -> Executor {
        Executor::new(std::env::temp_dir())
    }

    struct CannedBackend;

    #[async_trait]
    impl AiBackend for CannedBackend {
        async fn generate(&self, request: &AiRequest) -> Result<String, AiBackendError> {
            Ok(format!("generated for: {}", request.prompt))
        }
    }

    #[tokio::test]
    async fn test_plain_value_interpolates() {
        let mut exec = exec();
        exec.context.set("who", json!("world"));
        let value = eval_value_expression("hello {who}", &node("x = hello {who}"), &mut exec)
            .await
            .unwrap();
        assert_eq!(value, json!("hello world"));
    }

    #[tokio::test]
    async fn test_ai_expression_stores_response() {
        let mut exec = exec().with_backend(Arc::new(CannedBackend));
        exec.context.set("thing", json!("a parser"));
        let value = eval_value_expression("@ai describe {thing}", &node(""), &mut exec)
            .await
            .unwrap();
        assert_eq!(value, json!("generated for: describe a parser"));
        // Bare form works too.
        let value = eval_value_expression("ai summarize", &node(""), &mut exec)
            .await
            .unwrap();
        assert_eq!(value, json!("generated for: summarize"));
    }

    #[tokio::test]
    async fn test_ai_expression_without_backend_fails() {
        let mut exec = exec();
        let err = eval_value_expression("@ai anything", &node(""), &mut exec)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Exec { .. }));
    }

    #[tokio::test]
    async fn test_load_json_parses() {
        let path = std::env::temp_dir().join(format!("genrun-set-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"a": 1}"#).unwrap();
        let mut exec = exec();
        let expr = format!("load {}", path.display());
        let value = eval_value_expression(&expr, &node(""), &mut exec).await.unwrap();
        assert_eq!(value, json!({"a": 1}));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_load_plain_text() {
        let path = std::env::temp_dir().join(format!("genrun-set-{}.txt", std::process::id()));
        std::fs::write(&path, "raw contents").unwrap();
        let mut exec = exec();
        let expr = format!("@load {}", path.display());
        let value = eval_value_expression(&expr, &node(""), &mut exec).await.unwrap();
        assert_eq!(value, json!("raw contents"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let mut exec = exec();
        let err = eval_value_expression("load /no/such/file", &node(""), &mut exec)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Exec { .. }));
    }

    #[tokio::test]
    async fn test_files_and_folders_in() {
        let dir = std::env::temp_dir().join(format!("genrun-list-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("subdir")).unwrap();
        std::fs::write(dir.join("b.txt"), "").unwrap();
        std::fs::write(dir.join("a.txt"), "").unwrap();
        let mut exec = exec();

        let files =
            eval_value_expression(&format!("files in {}", dir.display()), &node(""), &mut exec)
                .await
                .unwrap();
        assert_eq!(files, json!(["a.txt", "b.txt"]));

        let folders =
            eval_value_expression(&format!("folders in {}", dir.display()), &node(""), &mut exec)
                .await
                .unwrap();
        assert_eq!(folders, json!(["subdir"]));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_split_assignment() {
        let (name, expr) = split_assignment(&node("name = a = b")).unwrap();
        assert_eq!(name, "name");
        assert_eq!(expr, "a = b");
        assert!(split_assignment(&node("no equals here")).is_err());
        assert!(split_assignment(&node("= value")).is_err());
    }
}
