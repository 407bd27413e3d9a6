//! Interactive prompting seam.
//!
//! The executor needs operator input in two places: the top-level task
//! selection gate and `SET name = input:`/`select:` value expressions.
//! Both go through the [`Prompter`] trait so the core stays testable and
//! embeddable without a terminal; [`StdinPrompter`] is the interactive
//! implementation and [`QueuedPrompter`] a scripted one.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask for a free-form line of input.
    async fn input(&self, message: &str) -> io::Result<String>;

    /// Ask the operator to pick one option; returns its index.
    async fn select(&self, message: &str, options: &[String]) -> io::Result<usize>;
}

/// Reads answers from stdin, writing prompts to stderr so script output
/// on stdout stays clean.
pub struct StdinPrompter;

#[async_trait]
impl Prompter for StdinPrompter {
    async fn input(&self, message: &str) -> io::Result<String> {
        eprint!("{}: ", message);
        let mut line = String::new();
        let n = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn select(&self, message: &str, options: &[String]) -> io::Result<usize> {
        eprintln!("{}:", message);
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, option);
        }
        let mut reader = BufReader::new(tokio::io::stdin());
        loop {
            eprint!("Enter choice [1-{}]: ", options.len());
            let mut line = String::new();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
            }
            if let Ok(choice) = line.trim().parse::<usize>() {
                if (1..=options.len()).contains(&choice) {
                    return Ok(choice - 1);
                }
            }
            eprintln!("Invalid choice");
        }
    }
}

/// Non-interactive prompter that replays queued answers in order.
///
/// Running out of queued answers is an `UnexpectedEof` error, which the
/// executor surfaces as a normal execution failure.
#[derive(Default)]
pub struct QueuedPrompter {
    inputs: Mutex<VecDeque<String>>,
    selections: Mutex<VecDeque<usize>>,
}

impl QueuedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_input(&self, answer: impl Into<String>) {
        self.inputs.lock().expect("prompter lock").push_back(answer.into());
    }

    pub fn push_selection(&self, index: usize) {
        self.selections.lock().expect("prompter lock").push_back(index);
    }
}

#[async_trait]
impl Prompter for QueuedPrompter {
    async fn input(&self, _message: &str) -> io::Result<String> {
        self.inputs
            .lock()
            .expect("prompter lock")
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no queued input"))
    }

    async fn select(&self, _message: &str, options: &[String]) -> io::Result<usize> {
        let index = self
            .selections
            .lock()
            .expect("prompter lock")
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no queued selection"))?;
        if index >= options.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("queued selection {} out of range", index),
            ));
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_prompter_replays_in_order() {
        let prompter = QueuedPrompter::new();
        prompter.push_input("first");
        prompter.push_input("second");
        assert_eq!(prompter.input("x").await.unwrap(), "first");
        assert_eq!(prompter.input("x").await.unwrap(), "second");
        assert!(prompter.input("x").await.is_err());
    }

    #[tokio::test]
    async fn test_queued_prompter_select_bounds() {
        let prompter = QueuedPrompter::new();
        prompter.push_selection(1);
        prompter.push_selection(9);
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(prompter.select("x", &options).await.unwrap(), 1);
        assert!(prompter.select("x", &options).await.is_err());
    }
}
