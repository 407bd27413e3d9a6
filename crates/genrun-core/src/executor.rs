//! Tree walker and handler dispatcher.
//!
//! The executor owns the variable [`Context`], the global store, the shell
//! session, and the seams for prompting and AI generation. It walks the
//! node tree depth-first in document order and dispatches every node to the
//! handler registered for its kind. Block semantics live entirely in the
//! handlers; they recurse through [`Executor::execute`], which returns a
//! boxed future to break the async recursion cycle.
//!
//! Execution is fail-fast: the first `Err` from any handler aborts the run
//! with no rollback of already-applied effects.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ast::{CommandKind, CommandNode, ParseResult};
use crate::backend::{AiBackend, NoBackend};
use crate::commands::{self, CommandHandler};
use crate::context::Context;
use crate::error::ScriptError;
use crate::global::GlobalStore;
use crate::prompt::{Prompter, StdinPrompter};
use crate::shell::ShellSession;

/// What a handler reports back on success. `Silent` suppresses the per-node
/// completion log line; errors travel through the `Err` channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Option<String>),
    Silent,
}

pub struct Executor {
    pub(crate) context: Context,
    pub(crate) shell: ShellSession,
    pub(crate) globals: GlobalStore,
    pub(crate) prompter: Arc<dyn Prompter>,
    pub(crate) backend: Arc<dyn AiBackend>,
    pub(crate) import_stack: HashSet<PathBuf>,
    registry: HashMap<CommandKind, Arc<dyn CommandHandler>>,
}

impl Executor {
    /// Creates an executor rooted at `output_dir`, which becomes the shell
    /// session's starting working directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            context: Context::new(),
            shell: ShellSession::new(output_dir),
            globals: GlobalStore::new(),
            prompter: Arc::new(StdinPrompter),
            backend: Arc::new(NoBackend),
            import_stack: HashSet::new(),
            registry: commands::registry(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_globals(mut self, globals: GlobalStore) -> Self {
        self.globals = globals;
        self
    }

    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn AiBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Resolves a script-supplied path: absolute paths pass through,
    /// relative ones resolve against the shell session's current directory,
    /// so a prior `cd` affects later file commands.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.shell.cwd().join(p)
        }
    }

    /// Runs a parsed script. Persisted globals are merged into the context
    /// first (so they are visible but overridable by SET), then either the
    /// task gate or plain linear execution takes over.
    pub async fn run(&mut self, parsed: &ParseResult) -> Result<(), ScriptError> {
        self.globals.merge_into(&mut self.context);

        for warning in &parsed.warnings {
            warn!(line = warning.line, "{}", warning.message);
        }
        if let Some(description) = parsed.metadata.description() {
            info!(script = %description, "running");
        }

        let tasks: Vec<&CommandNode> = parsed
            .nodes
            .iter()
            .filter(|n| n.kind == CommandKind::Task)
            .collect();

        if tasks.is_empty() {
            return self.execute(&parsed.nodes).await;
        }

        // Task gate: the operator picks exactly one named task; everything
        // else in the script is ignored for this run.
        let names: Vec<String> = tasks.iter().map(|t| t.payload.clone()).collect();
        let choice = self
            .prompter
            .select("Select a task to run", &names)
            .await
            .map_err(ScriptError::Io)?;
        let task = tasks[choice];
        info!(task = %task.payload, "task selected");
        self.execute_node(task).await
    }

    /// Executes a node sequence in order, stopping at the first error.
    /// Boxed so that block handlers can recurse back into it.
    pub fn execute<'a>(
        &'a mut self,
        nodes: &'a [CommandNode],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ScriptError>> + Send + 'a>>
    {
        Box::pin(async move {
            for node in nodes {
                self.execute_node(node).await?;
            }
            Ok(())
        })
    }

    async fn execute_node(&mut self, node: &CommandNode) -> Result<(), ScriptError> {
        let handler = self.registry.get(&node.kind).cloned().ok_or_else(|| {
            ScriptError::Exec {
                kind: node.kind,
                line: node.line,
                message: "no handler registered for this command".to_string(),
            }
        })?;

        if node.kind.is_silent() {
            debug!(line = node.line, kind = %node.kind, "executing");
        } else {
            info!(line = node.line, kind = %node.kind, "executing");
        }

        match handler.run(node, self).await? {
            Outcome::Success(Some(message)) => {
                info!(line = node.line, kind = %node.kind, "{}", message);
            }
            Outcome::Success(None) => {
                info!(line = node.line, kind = %node.kind, "done");
            }
            Outcome::Silent => {}
        }
        Ok(())
    }
}
