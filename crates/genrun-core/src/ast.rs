//! Node model for parsed generation scripts.
//!
//! A script parses into a [`ParseResult`]: an optional metadata header plus a
//! tree of [`CommandNode`]s. Nodes are tagged by [`CommandKind`] and carry the
//! raw payload text; handlers do any further payload parsing at execution
//! time. Block kinds (IF/LOOP/TASK) own their child nodes, so the tree is
//! strictly hierarchical with no sharing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The closed set of command kinds a script line can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Log,
    Set,
    Global,
    Ai,
    Shell,
    Write,
    Fill,
    If,
    Loop,
    Task,
    Import,
}

impl CommandKind {
    /// Maps an upper-cased command word (sigil already stripped) to a kind.
    ///
    /// `SAVE` is an alias for `WRITE` and `FOREACH` for `LOOP`, kept for
    /// backward compatibility with older scripts.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "LOG" => Some(Self::Log),
            "SET" => Some(Self::Set),
            "GLOBAL" => Some(Self::Global),
            "AI" => Some(Self::Ai),
            "WRITE" | "SAVE" => Some(Self::Write),
            "FILL" => Some(Self::Fill),
            "IF" => Some(Self::If),
            "LOOP" | "FOREACH" => Some(Self::Loop),
            "TASK" => Some(Self::Task),
            "IMPORT" => Some(Self::Import),
            _ => None,
        }
    }

    /// Kinds that suppress per-node progress and completion messages.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::Log | Self::Set | Self::Global | Self::If | Self::Loop | Self::Task
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Self::Log => "LOG",
            Self::Set => "SET",
            Self::Global => "GLOBAL",
            Self::Ai => "AI",
            Self::Shell => "SHELL",
            Self::Write => "WRITE",
            Self::Fill => "FILL",
            Self::If => "IF",
            Self::Loop => "LOOP",
            Self::Task => "TASK",
            Self::Import => "IMPORT",
        };
        write!(f, "{}", word)
    }
}

/// One parsed instruction.
#[derive(Debug, Clone)]
pub struct CommandNode {
    pub kind: CommandKind,
    /// Raw remainder of the command line, unparsed.
    pub payload: String,
    /// 1-based source line, for diagnostics.
    pub line: usize,
    /// Body of a block node (IF primary branch, LOOP body, TASK body).
    pub children: Vec<CommandNode>,
    /// ELSEIF branches of an IF node, in declaration order.
    pub else_if_branches: Vec<ElseIfBranch>,
    /// ELSE branch of an IF node, if declared.
    pub else_children: Option<Vec<CommandNode>>,
    /// Verbatim body of a FILL node, captured between quote delimiters.
    pub content_lines: Vec<String>,
}

impl CommandNode {
    pub fn new(kind: CommandKind, payload: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            payload: payload.into(),
            line,
            children: Vec::new(),
            else_if_branches: Vec::new(),
            else_children: None,
            content_lines: Vec::new(),
        }
    }
}

/// One `ELSEIF` branch of an IF node.
#[derive(Debug, Clone)]
pub struct ElseIfBranch {
    pub condition: String,
    pub line: usize,
    pub children: Vec<CommandNode>,
}

/// A metadata header value: either a single string or a bracketed list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

/// Descriptive key/value header parsed from a leading `---` block.
///
/// Purely informational; never affects control flow. Serializes as a plain
/// JSON object, which is how `genrun check` reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Convenience accessor for the `description` entry.
    pub fn description(&self) -> Option<&str> {
        match self.entries.get("description") {
            Some(MetaValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A non-fatal diagnostic emitted during parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Top-level output of the parser. Immutable once produced.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub metadata: Metadata,
    pub nodes: Vec<CommandNode>,
    pub warnings: Vec<ParseWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_serializes_as_flat_object() {
        let mut metadata = Metadata::default();
        metadata.insert("description", MetaValue::Text("a script".to_string()));
        metadata.insert(
            "tags",
            MetaValue::List(vec!["web".to_string(), "api".to_string()]),
        );
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            value,
            json!({"description": "a script", "tags": ["web", "api"]})
        );
    }
}
