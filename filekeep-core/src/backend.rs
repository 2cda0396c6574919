//! Process-level access to the version-control backend.
//!
//! Every other component reaches git through [`Backend::run`]. Implementations
//! return raw stdout and never interpret it; parsing lives with the callers.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code:?}: {message}")]
    Failed {
        command: String,
        code: Option<i32>,
        message: String,
    },
}

impl BackendError {
    pub fn command(&self) -> &str {
        match self {
            BackendError::Spawn { command, .. } | BackendError::Failed { command, .. } => command,
        }
    }
}

/// Synchronous façade over a version-control process bound to one directory.
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Run `subcommand` with `args` and return its stdout.
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<String, BackendError>;
}

impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<String, BackendError> {
        (**self).run(subcommand, args)
    }
}

/// Invokes the `git` executable in the bound working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    workdir: PathBuf,
}

impl GitCli {
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        Self {
            program: PathBuf::from("git"),
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl Backend for GitCli {
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<String, BackendError> {
        let command = command_line(subcommand, args);
        debug!("git {}", command);

        let output = Command::new(&self.program)
            .current_dir(&self.workdir)
            .args(["-c", "core.quotepath=false", "-c", "color.ui=false", "--no-pager"])
            .arg(subcommand)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_LITERAL_PATHSPECS", "1")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BackendError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // git reports "nothing to commit" on stdout
            let message = if stderr.is_empty() {
                stdout.trim().to_string()
            } else {
                stderr
            };
            return Err(BackendError::Failed {
                command,
                code: output.status.code(),
                message,
            });
        }

        trace!("git {} -> {} bytes", command, stdout.len());
        Ok(stdout)
    }
}

/// Backend returning canned output, for exercising parsing and call sequencing
/// without spawning processes.
///
/// Responses are queued per command line (`"<subcommand> <args...>"`). The last
/// queued response for a command line is sticky; unscripted commands succeed
/// with empty output. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, command: &str, output: &str) -> Self {
        self.push(command, Ok(output.to_string()));
        self
    }

    pub fn fail(self, command: &str, message: &str) -> Self {
        self.push(command, Err(message.to_string()));
        self
    }

    fn push(&self, command: &str, response: Result<String, String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(response);
    }

    /// Command lines received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    fn run(&self, subcommand: &str, args: &[&str]) -> Result<String, BackendError> {
        let command = command_line(subcommand, args);
        self.calls.lock().unwrap().push(command.clone());

        let mut responses = self.responses.lock().unwrap();
        let response = match responses.get_mut(&command) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(BackendError::Failed {
                command,
                code: Some(1),
                message,
            }),
            None => Ok(String::new()),
        }
    }
}

fn command_line(subcommand: &str, args: &[&str]) -> String {
    std::iter::once(subcommand)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
