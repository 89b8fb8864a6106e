/*!
Command table for the interpreter.

Variants:
  create <name>                 (arity 2)
  update <name> <count> <text>  (arity 4)
  list <name>                   (arity 2)
  dir                           (arity 1)

Arity counts the command name itself. The table is immutable and exact:
there are no optional or variadic arguments.

Helpers:
  - variants()
  - from_name()
  - arity() / usage()
  - Invocation::validate()
*/

use std::fmt;

use crate::error::ShellError;

/// The four built-in file commands.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ShellCommand {
    /// Create a new empty file (refuses to overwrite)
    Create,
    /// Append a line of text to a file N times, slowly
    Update,
    /// Print a file's contents
    List,
    /// List the current directory
    Dir,
}

impl ShellCommand {
    /// Return a static slice of all variants (order matters for help display).
    pub const fn variants() -> &'static [ShellCommand] {
        &[
            ShellCommand::Create,
            ShellCommand::Update,
            ShellCommand::List,
            ShellCommand::Dir,
        ]
    }

    /// Exact, case-sensitive lookup by command name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|c| c.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            ShellCommand::Create => "create",
            ShellCommand::Update => "update",
            ShellCommand::List => "list",
            ShellCommand::Dir => "dir",
        }
    }

    /// Required token count, including the command name.
    pub const fn arity(&self) -> usize {
        match self {
            ShellCommand::Create => 2,
            ShellCommand::Update => 4,
            ShellCommand::List => 2,
            ShellCommand::Dir => 1,
        }
    }

    pub const fn usage(&self) -> &'static str {
        match self {
            ShellCommand::Create => "create <name>",
            ShellCommand::Update => "update <name> <count> <text>",
            ShellCommand::List => "list <name>",
            ShellCommand::Dir => "dir",
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token list that passed validation: a known command with exactly its arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: ShellCommand,
    /// Data arguments (everything after the command name).
    pub args: Vec<String>,
}

impl Invocation {
    /// Look up `tokens[0]` and check the token count against the table.
    pub fn validate(tokens: &[String]) -> Result<Self, ShellError> {
        let Some(name) = tokens.first() else {
            return Err(ShellError::UnknownCommand {
                name: String::new(),
            });
        };
        let command = ShellCommand::from_name(name)
            .ok_or_else(|| ShellError::UnknownCommand { name: name.clone() })?;
        if tokens.len() != command.arity() {
            return Err(ShellError::WrongArity {
                command,
                got: tokens.len(),
            });
        }
        Ok(Invocation {
            command,
            args: tokens[1..].to_vec(),
        })
    }

    /// Rebuild an invocation from a command plus its data arguments.
    pub fn from_parts(command: ShellCommand, args: &[String]) -> Result<Self, ShellError> {
        let mut tokens = Vec::with_capacity(args.len() + 1);
        tokens.push(command.name().to_string());
        tokens.extend(args.iter().cloned());
        Self::validate(&tokens)
    }
}

/* --------------------------------- Tests ---------------------------------- */
