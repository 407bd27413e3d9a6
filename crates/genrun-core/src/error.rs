//! Error types for script parsing and execution.
//!
//! Parse errors carry the source line of the offending construct and are
//! raised before any node executes. Execution errors carry the command kind
//! and line of the failing node; explicit handler errors and unexpected
//! faults are normalized into the same variant by the executor.

use thiserror::Error;

use crate::ast::CommandKind;

#[derive(Error, Debug)]
pub enum ScriptError {
    /// Malformed script structure (unbalanced blocks, missing FILL
    /// delimiters, unterminated metadata header).
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A command handler reported or surfaced a failure.
    #[error("{kind} failed at line {line}: {message}")]
    Exec {
        kind: CommandKind,
        line: usize,
        message: String,
    },

    /// An I/O error outside any single node's execution.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    /// Source line associated with the error, when one exists.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. } | Self::Exec { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}
