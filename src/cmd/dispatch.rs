/*!
`dispatch.rs`

Parent side of command execution.

Per call:
  Idle -> Validating -> Rejected                      (bad name / arity, reported)
                     -> Spawning -> ChildRunning -> WaitedOn   (foreground)
                                                 -> Detached   (background)

The child is this same binary started as `myshell builtin <command> -- <args>`,
so it shares nothing with the interpreter except the filesystem and the
inherited stdio. A failed spawn is returned as `ShellError::Spawn` and is
fatal to the caller.

Background children are never waited on here. The tokio child handle is
dropped, and the runtime reaps the process once it exits.
*/

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::process::{Child, Command};

use super::command::{Invocation, ShellCommand};
use super::format::diagnostic;
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::utils::logging::{current_log_level, level_flag};
use crate::utils::monotonic_ms;
use crate::{log_debug, log_error, log_trace};

/// Terminal state of one `dispatch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Validation failed; no process was created.
    Rejected,
    /// Foreground child ran to completion.
    WaitedOn { pid: u32 },
    /// Background child left running.
    Detached { pid: u32 },
}

/// Handle to a freshly spawned child. Either `wait` on it or `detach` it.
#[derive(Debug)]
pub struct SpawnedChild {
    command: ShellCommand,
    pid: u32,
    child: Child,
}

impl SpawnedChild {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn command(&self) -> ShellCommand {
        self.command
    }

    /// Block until this specific child terminates.
    pub async fn wait(mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Give up the handle without waiting.
    pub fn detach(self) {
        log_trace!("detaching {} child pid {}", self.command, self.pid);
    }
}

/// Validates token lists and starts one child per accepted command.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    program: PathBuf,
    cat_program: PathBuf,
    ls_program: PathBuf,
}

impl Dispatcher {
    /// `program` is the binary that implements the `builtin` subcommand
    /// (normally the running interpreter itself).
    pub fn new(program: PathBuf, config: &ShellConfig) -> Self {
        Self {
            program,
            cat_program: config.cat_program.clone(),
            ls_program: config.ls_program.clone(),
        }
    }

    fn child_args(&self, inv: &Invocation) -> Vec<OsString> {
        let mut argv: Vec<OsString> = Vec::new();
        if let Some(flag) = level_flag(current_log_level()) {
            argv.push(flag.into());
        }
        argv.push("builtin".into());
        argv.push("--cat-program".into());
        argv.push(self.cat_program.clone().into_os_string());
        argv.push("--ls-program".into());
        argv.push(self.ls_program.clone().into_os_string());
        argv.push(inv.command.name().into());
        argv.push("--".into());
        argv.extend(inv.args.iter().map(OsString::from));
        argv
    }

    /// Start the child for an already validated invocation.
    pub fn spawn(&self, inv: &Invocation) -> Result<SpawnedChild, ShellError> {
        let argv = self.child_args(inv);
        log_debug!(
            "spawning: {} {}",
            self.program.display(),
            shell_words::join(argv.iter().map(|a| a.to_string_lossy()))
        );

        let child = Command::new(&self.program)
            .args(&argv)
            .spawn()
            .map_err(|source| ShellError::Spawn {
                command: inv.command,
                source,
            })?;
        let pid = child.id().unwrap_or_default();

        Ok(SpawnedChild {
            command: inv.command,
            pid,
            child,
        })
    }

    /// Validate `tokens`, spawn the child and apply the wait policy.
    ///
    /// Validation failures are reported on stderr and yield `Ok(Dispatch::Rejected)`.
    /// The only error returned is a failed spawn.
    pub async fn dispatch(&self, tokens: &[String], background: bool) -> Result<Dispatch, ShellError> {
        let inv = match Invocation::validate(tokens) {
            Ok(inv) => inv,
            Err(e) => {
                diagnostic(e.to_string());
                return Ok(Dispatch::Rejected);
            }
        };

        let child = self.spawn(&inv)?;
        let pid = child.pid();
        println!("child process for {} spawned with pid {}", child.command(), pid);

        if background {
            child.detach();
            return Ok(Dispatch::Detached { pid });
        }

        let started = monotonic_ms();
        match child.wait().await {
            Ok(status) => log_debug!(
                "child pid {pid} finished after {} ms ({status}, ignored)",
                monotonic_ms() - started
            ),
            Err(e) => log_error!("waiting for child pid {pid} failed: {e}"),
        }
        Ok(Dispatch::WaitedOn { pid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    fn dispatcher(program: &str) -> Dispatcher {
        Dispatcher::new(PathBuf::from(program), &ShellConfig::default())
    }

    #[test]
    fn child_args_layout() {
        let d = dispatcher("/usr/local/bin/myshell");
        let inv = Invocation::validate(&toks(&["update", "f.txt", "2", "-x y"])).unwrap();
        let argv: Vec<String> = d
            .child_args(&inv)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let start = argv.iter().position(|a| a == "builtin").unwrap();
        assert_eq!(
            &argv[start..],
            &toks(&[
                "builtin",
                "--cat-program",
                "/bin/cat",
                "--ls-program",
                "/bin/ls",
                "update",
                "--",
                "f.txt",
                "2",
                "-x y",
            ])[..]
        );
    }

    #[tokio::test]
    async fn invalid_command_is_rejected_without_spawn() {
        // A program that cannot exist: any spawn attempt would surface as an error.
        let d = dispatcher("/nonexistent/myshell");
        let out = d.dispatch(&toks(&["frobnicate", "x"]), false).await.unwrap();
        assert_eq!(out, Dispatch::Rejected);
        let out = d.dispatch(&toks(&["list"]), true).await.unwrap();
        assert_eq!(out, Dispatch::Rejected);
    }

    #[tokio::test]
    async fn foreground_waits_on_child() {
        let d = dispatcher("/bin/true");
        let out = d.dispatch(&toks(&["dir"]), false).await.unwrap();
        assert!(matches!(out, Dispatch::WaitedOn { pid } if pid > 0));
    }

    #[tokio::test]
    async fn background_detaches() {
        let d = dispatcher("/bin/true");
        let out = d.dispatch(&toks(&["create", "x.txt"]), true).await.unwrap();
        assert!(matches!(out, Dispatch::Detached { pid } if pid > 0));
    }

    #[tokio::test]
    async fn spawn_failure_is_fatal() {
        let d = dispatcher("/nonexistent/myshell");
        let err = d.dispatch(&toks(&["dir"]), false).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            ShellError::Spawn {
                command: ShellCommand::Dir,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn exit_status_is_not_inspected() {
        let d = dispatcher("/bin/false");
        let out = d.dispatch(&toks(&["dir"]), false).await.unwrap();
        assert!(matches!(out, Dispatch::WaitedOn { .. }));
    }
}
