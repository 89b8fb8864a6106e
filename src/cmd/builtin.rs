/*!
`builtin.rs`

Child side of a dispatched command. The interpreter re-executes its own
binary as `myshell builtin <command> -- <args...>`; this module is what runs
inside that child process.

Behaviors:
  - create : exclusive create of an empty file (never touches an existing one)
  - update : append `<text>\n` `<count>` times, pausing len(text)/5 s after each
  - list   : check the file is readable, then exec `cat -- <name>`
  - dir    : exec `ls`

Every failure is returned as a `ShellError`; `main` prints it and exits 1.
`list` / `dir` only return when exec itself failed.

All file handles are scoped to the function that opened them, so they are
closed on every return path (and before exec).
*/

use clap::Args;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::command::{Invocation, ShellCommand};
use crate::error::ShellError;
use crate::{log_debug, log_trace};

/* -------------------------------------------------------------------------- */
/* Argument Struct                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug)]
pub struct BuiltinArgs {
    /// Utility used by `list`
    #[arg(long, value_name = "PATH", default_value = "/bin/cat")]
    pub cat_program: PathBuf,

    /// Utility used by `dir`
    #[arg(long, value_name = "PATH", default_value = "/bin/ls")]
    pub ls_program: PathBuf,

    /// Command to run
    pub command: ShellCommand,

    /// Data arguments, passed after `--`
    #[arg(last = true, allow_hyphen_values = true, value_name = "ARG")]
    pub args: Vec<String>,
}

/* -------------------------------------------------------------------------- */
/* Public Entry Point                                                         */
/* -------------------------------------------------------------------------- */

pub fn execute_builtin(args: BuiltinArgs) -> Result<(), ShellError> {
    let inv = Invocation::from_parts(args.command, &args.args)?;
    log_debug!(
        "builtin {} running in pid {} with {:?}",
        inv.command,
        std::process::id(),
        inv.args
    );

    match inv.command {
        ShellCommand::Create => create(&inv.args[0]),
        ShellCommand::Update => {
            let count = parse_repeat_count(&inv.args[1]);
            if !count.exact {
                super::format::warning(format!(
                    "update: repeat count '{}' is not a number; using {}",
                    inv.args[1], count.value
                ));
            }
            let text = &inv.args[2];
            update(&inv.args[0], count.value, text, slow_device_pause(text))
        }
        ShellCommand::List => Err(list(&inv.args[0], &args.cat_program)),
        ShellCommand::Dir => Err(dir(&args.ls_program)),
    }
}

/* -------------------------------------------------------------------------- */
/* Behaviors                                                                  */
/* -------------------------------------------------------------------------- */

/// Create an empty file. The existence check and the creation are one
/// `create_new` open, so an existing file is never opened for writing.
pub fn create(path: &str) -> Result<(), ShellError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_file) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ShellError::AlreadyExists {
            command: ShellCommand::Create,
            path: path.to_string(),
        }),
        Err(source) => Err(ShellError::Create {
            command: ShellCommand::Create,
            path: path.to_string(),
            source,
        }),
    }
}

/// Append `text` plus newline `count` times, flushing and pausing after each line.
pub fn update(path: &str, count: u64, text: &str, pause: Duration) -> Result<(), ShellError> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| ShellError::Append {
            command: ShellCommand::Update,
            path: path.to_string(),
            source,
        })?;

    let line = format!("{text}\n");
    for i in 0..count {
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| ShellError::Write {
                command: ShellCommand::Update,
                path: path.to_string(),
                source,
            })?;
        log_trace!("update: wrote line {}/{} to {}", i + 1, count, path);
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }

    println!("Update has completed with pid {}", std::process::id());
    Ok(())
}

/// Verify `path` is a readable file, then replace this process with `cat`.
/// Returns only on failure.
pub fn list(path: &str, cat_program: &Path) -> ShellError {
    if let Err(e) = check_readable(path) {
        return e;
    }
    exec_utility(ShellCommand::List, cat_program, &["--", path])
}

/// Replace this process with `ls`. Returns only on failure.
pub fn dir(ls_program: &Path) -> ShellError {
    exec_utility(ShellCommand::Dir, ls_program, &[])
}

fn check_readable(path: &str) -> Result<(), ShellError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ShellError::NotFound {
                command: ShellCommand::List,
                path: path.to_string(),
            }
        } else {
            ShellError::Unreadable {
                command: ShellCommand::List,
                path: path.to_string(),
                source,
            }
        }
    })?;
    let is_dir = file.metadata().map(|m| m.is_dir()).unwrap_or(false);
    drop(file);
    if is_dir {
        return Err(ShellError::Unreadable {
            command: ShellCommand::List,
            path: path.to_string(),
            source: io::Error::from(io::ErrorKind::IsADirectory),
        });
    }
    Ok(())
}

fn exec_utility(command: ShellCommand, program: &Path, args: &[&str]) -> ShellError {
    let argv0 = program
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| program.as_os_str().to_os_string());
    log_debug!("{command}: exec {} {:?}", program.display(), args);
    let _ = io::stdout().flush();

    let source = Command::new(program).arg0(argv0).args(args).exec();
    ShellError::ExecDelegation {
        command,
        program: program.to_path_buf(),
        source,
    }
}

/* -------------------------------------------------------------------------- */
/* Helpers                                                                    */
/* -------------------------------------------------------------------------- */

/// Parsed `update` repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatCount {
    pub value: u64,
    /// The raw text was a clean non-negative integer.
    pub exact: bool,
}

/// `atoi`-compatible parse: leading whitespace, optional sign, leading digits.
/// Anything unparsable counts as 0, negatives as 0 iterations, overflow saturates.
pub fn parse_repeat_count(raw: &str) -> RepeatCount {
    if let Ok(value) = raw.parse::<u64>() {
        return RepeatCount { value, exact: true };
    }

    let s = raw.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, d| {
            acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
        });

    RepeatCount {
        value: if negative { 0 } else { value },
        exact: false,
    }
}

/// Simulated slow device: `len(text) / 5` whole seconds (byte length).
pub fn slow_device_pause(text: &str) -> Duration {
    Duration::from_secs((text.len() / 5) as u64)
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
