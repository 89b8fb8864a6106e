//! Error taxonomy for the interpreter.
//!
//! ParseError / ValidationError are recovered by the read loop (line dropped,
//! re-prompt). ResourceError / ExecDelegationError are recovered inside the
//! child process (report + exit 1). SpawnError is fatal to the interpreter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cmd::command::ShellCommand;

/// Coarse classification used by callers deciding how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Validation,
    Resource,
    Spawn,
    ExecDelegation,
}

#[derive(Debug, Error)]
pub enum ShellError {
    /* ---- ParseError ---- */
    #[error("Unmatched double quotes in input")]
    UnmatchedQuote,

    #[error("Too many arguments, max is {max}")]
    TooManyArguments { max: usize },

    #[error("Input line is not valid UTF-8; line ignored")]
    InvalidUtf8,

    /* ---- ValidationError ---- */
    #[error("Invalid command or incorrect number of arguments: unknown command '{name}'")]
    UnknownCommand { name: String },

    #[error(
        "Invalid command or incorrect number of arguments: usage is '{}', got {got} token(s)",
        .command.usage()
    )]
    WrongArity { command: ShellCommand, got: usize },

    /* ---- ResourceError ---- */
    #[error("{command}: File '{path}' already exists.")]
    AlreadyExists { command: ShellCommand, path: String },

    #[error("{command}: File '{path}' does not exist.")]
    NotFound { command: ShellCommand, path: String },

    #[error("{command}: cannot read '{path}': {source}")]
    Unreadable {
        command: ShellCommand,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{command}: cannot create '{path}': {source}")]
    Create {
        command: ShellCommand,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{command}: cannot open '{path}' for appending: {source}")]
    Append {
        command: ShellCommand,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{command}: write to '{path}' failed: {source}")]
    Write {
        command: ShellCommand,
        path: String,
        #[source]
        source: io::Error,
    },

    /* ---- SpawnError ---- */
    #[error("failed to spawn child process for {command}: {source}")]
    Spawn {
        command: ShellCommand,
        #[source]
        source: io::Error,
    },

    /* ---- ExecDelegationError ---- */
    #[error("{command}: failed to launch '{}': {source}", .program.display())]
    ExecDelegation {
        command: ShellCommand,
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::UnmatchedQuote
            | ShellError::TooManyArguments { .. }
            | ShellError::InvalidUtf8 => ErrorKind::Parse,
            ShellError::UnknownCommand { .. } | ShellError::WrongArity { .. } => {
                ErrorKind::Validation
            }
            ShellError::AlreadyExists { .. }
            | ShellError::NotFound { .. }
            | ShellError::Unreadable { .. }
            | ShellError::Create { .. }
            | ShellError::Append { .. }
            | ShellError::Write { .. } => ErrorKind::Resource,
            ShellError::Spawn { .. } => ErrorKind::Spawn,
            ShellError::ExecDelegation { .. } => ErrorKind::ExecDelegation,
        }
    }

    /// Only a failed spawn takes the interpreter down.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Spawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_fatality() {
        assert_eq!(ShellError::UnmatchedQuote.kind(), ErrorKind::Parse);
        assert_eq!(ShellError::InvalidUtf8.kind(), ErrorKind::Parse);
        assert_eq!(
            ShellError::UnknownCommand { name: "rm".into() }.kind(),
            ErrorKind::Validation
        );
        let spawn = ShellError::Spawn {
            command: ShellCommand::Dir,
            source: io::Error::other("boom"),
        };
        assert!(spawn.is_fatal());
        assert!(!ShellError::TooManyArguments { max: 15 }.is_fatal());
    }

    #[test]
    fn messages_name_command_and_argument() {
        let e = ShellError::AlreadyExists {
            command: ShellCommand::Create,
            path: "notes.txt".into(),
        };
        assert_eq!(e.to_string(), "create: File 'notes.txt' already exists.");

        let e = ShellError::WrongArity {
            command: ShellCommand::Update,
            got: 2,
        };
        assert!(e.to_string().contains("update <name> <count> <text>"));
        assert!(e.to_string().contains("got 2"));
    }
}
