//! Stateful shell session with a tracked working directory.
//!
//! Each command runs as a fresh `sh -c` child in the session's current
//! directory. Plain `cd <path>` commands update the tracked directory so
//! that later shell commands and path resolution observe the change; the
//! fixed output directory the session started from is never mutated.

use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Captured result of one shell command.
#[derive(Debug, Clone)]
pub struct ShellResult {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

impl ShellResult {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, Clone)]
pub struct ShellSession {
    cwd: PathBuf,
}

impl ShellSession {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: start_dir.into(),
        }
    }

    /// The session's current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Runs a command in the current directory and captures its output.
    ///
    /// The command executes in the directory that was current *before* any
    /// `cd` in the command itself is tracked, matching a real shell where
    /// `cd x` runs with the old directory still current.
    pub async fn run(&mut self, command: &str) -> std::io::Result<ShellResult> {
        let run_dir = self.cwd.clone();
        self.track_cd(command);

        let output = shell_command(command).current_dir(&run_dir).output().await?;

        Ok(ShellResult {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            code: output.status.code().unwrap_or(-1),
        })
    }

    /// Updates the tracked directory when the command is a bare `cd`.
    fn track_cd(&mut self, command: &str) {
        let trimmed = command.trim();
        let Some(rest) = trimmed
            .strip_prefix("cd ")
            .or_else(|| trimmed.strip_prefix("cd\t"))
        else {
            return;
        };
        let target = rest
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        if target.is_empty() {
            return;
        }
        let path = Path::new(&target);
        if path.is_absolute() {
            self.cwd = path.to_path_buf();
        } else {
            self.cwd = self.cwd.join(path);
        }
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd.exe");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
