//! # genrun-core
//!
//! Core library for interpreting generation scripts (`.gen` files): small
//! line-oriented programs that scaffold projects by logging, setting
//! variables, running shell commands, writing files, branching, looping,
//! and importing sub-scripts.
//!
//! ## Modules
//!
//! - [`parser`] - Line-oriented parser producing metadata plus a command tree
//! - [`ast`] - Command kinds, nodes, metadata, and parse diagnostics
//! - [`context`] - Variable environment with dotted lookup and `{name}` interpolation
//! - [`executor`] - Tree walker dispatching nodes to registered handlers
//! - [`commands`] - One handler per command kind
//! - [`shell`] - Shell session with a tracked working directory
//! - [`global`] - Persistent variable store at `~/.genrun/global.json`
//! - [`prompt`] - Interactive prompting seam (stdin and queued test double)
//! - [`backend`] - AI generation seam
//!
//! ## Example
//!
//! ```no_run
//! use genrun_core::executor::Executor;
//! use genrun_core::parser;
//!
//! # async fn run() -> Result<(), genrun_core::error::ScriptError> {
//! let parsed = parser::parse("SET name = world\nLOG hello {name}\n")?;
//! let mut executor = Executor::new("./out");
//! executor.run(&parsed).await?;
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod backend;
pub mod commands;
pub mod context;
pub mod error;
pub mod executor;
pub mod global;
pub mod parser;
pub mod prompt;
pub mod shell;
