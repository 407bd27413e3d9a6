//! Command handlers, one per [`CommandKind`].
//!
//! Handlers are stateless; everything they need (context, shell, globals,
//! prompting, the AI backend, recursive execution) comes through the
//! `&mut Executor` they receive. The registry is a fixed table built once
//! at executor construction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ast::{CommandKind, CommandNode};
use crate::error::ScriptError;
use crate::executor::{Executor, Outcome};

mod ai;
mod fill;
mod global;
mod if_cmd;
mod import;
mod log;
mod loop_cmd;
mod set;
mod shell;
mod task;
mod write;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, node: &CommandNode, exec: &mut Executor) -> Result<Outcome, ScriptError>;
}

/// Builds the full kind-to-handler table.
pub fn registry() -> HashMap<CommandKind, Arc<dyn CommandHandler>> {
    let mut map: HashMap<CommandKind, Arc<dyn CommandHandler>> = HashMap::new();
    map.insert(CommandKind::Log, Arc::new(log::LogCommand));
    map.insert(CommandKind::Set, Arc::new(set::SetCommand));
    map.insert(CommandKind::Global, Arc::new(global::GlobalCommand));
    map.insert(CommandKind::Ai, Arc::new(ai::AiCommand));
    map.insert(CommandKind::Shell, Arc::new(shell::ShellCommand));
    map.insert(CommandKind::Write, Arc::new(write::WriteCommand));
    map.insert(CommandKind::Fill, Arc::new(fill::FillCommand));
    map.insert(CommandKind::If, Arc::new(if_cmd::IfCommand));
    map.insert(CommandKind::Loop, Arc::new(loop_cmd::LoopCommand));
    map.insert(CommandKind::Task, Arc::new(task::TaskCommand));
    map.insert(CommandKind::Import, Arc::new(import::ImportCommand));
    map
}

/// Normalizes a handler failure into the uniform execution error shape.
pub(crate) fn exec_err(node: &CommandNode, message: impl Into<String>) -> ScriptError {
    ScriptError::Exec {
        kind: node.kind,
        line: node.line,
        message: message.into(),
    }
}

/// Strips a leading keyword followed by whitespace (or end of input),
/// case-sensitively. `strip_keyword("exists /tmp", "exists")` gives
/// `Some("/tmp")`; `strip_keyword("existsx", "exists")` gives `None`.
pub(crate) fn strip_keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_kind() {
        let registry = registry();
        for kind in [
            CommandKind::Log,
            CommandKind::Set,
            CommandKind::Global,
            CommandKind::Ai,
            CommandKind::Shell,
            CommandKind::Write,
            CommandKind::Fill,
            CommandKind::If,
            CommandKind::Loop,
            CommandKind::Task,
            CommandKind::Import,
        ] {
            assert!(registry.contains_key(&kind), "missing handler for {}", kind);
        }
    }

    #[test]
    fn test_strip_keyword() {
        assert_eq!(strip_keyword("exists /tmp", "exists"), Some("/tmp"));
        assert_eq!(strip_keyword("exists", "exists"), Some(""));
        assert_eq!(strip_keyword("existsx", "exists"), None);
        assert_eq!(strip_keyword("other", "exists"), None);
    }
}
