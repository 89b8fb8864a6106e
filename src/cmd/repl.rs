/*!
`repl.rs`

Interactive read loop: banner, prompt, read a line, tokenize, handle the
`halt` shortcut, hand everything else to the dispatcher.

Recovery:
  - parse errors      : reported, line dropped, re-prompt (non-UTF-8 input included)
  - validation errors : reported by the dispatcher, re-prompt
  - spawn errors      : returned, the interpreter exits non-zero
  - end of input      : loop stops normally
*/

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::dispatch::{Dispatch, Dispatcher};
use super::format::{Role, StyleOptions, color, diagnostic};
use super::tokenize::tokenize_with_limit;
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::{log_debug, log_error, log_trace};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    Halted,
    EndOfInput,
}

pub struct Repl {
    dispatcher: Dispatcher,
    config: ShellConfig,
}

impl Repl {
    pub fn new(dispatcher: Dispatcher, config: ShellConfig) -> Self {
        Self { dispatcher, config }
    }

    fn prompt(&self) {
        let style = StyleOptions::detect_stdout();
        print!("{}", color(Role::Primary, &self.config.prompt, &style));
        let _ = std::io::stdout().flush();
    }

    /// Drive the loop over any line source until `halt`, end of input, or a
    /// fatal spawn failure.
    pub async fn run<R>(&self, mut reader: R) -> Result<ReplExit, ShellError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            self.prompt();

            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => return Ok(ReplExit::EndOfInput),
                Ok(_) => {}
                Err(e) => {
                    log_error!("reading input failed: {e}");
                    return Ok(ReplExit::EndOfInput);
                }
            }
            // Tokens become file names; a lossy decode would name a different file.
            let Ok(line) = std::str::from_utf8(&buf) else {
                diagnostic(ShellError::InvalidUtf8.to_string());
                continue;
            };
            log_trace!("read line: {:?}", line);

            let parsed = match tokenize_with_limit(line, self.config.max_args) {
                Ok(p) => p,
                Err(e) => {
                    diagnostic(e.to_string());
                    continue;
                }
            };
            if parsed.is_empty() {
                continue;
            }

            if parsed.tokens.len() == 1 && parsed.tokens[0] == "halt" {
                println!("Exiting myshell. Goodbye!");
                return Ok(ReplExit::Halted);
            }

            if parsed.background {
                println!("Running command in background");
            }

            match self
                .dispatcher
                .dispatch(&parsed.tokens, parsed.background)
                .await
            {
                Ok(Dispatch::Rejected) => log_debug!("dispatch rejected"),
                Ok(Dispatch::WaitedOn { pid }) => log_debug!("foreground child {pid} done"),
                Ok(Dispatch::Detached { pid }) => log_debug!("background child {pid} detached"),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => diagnostic(e.to_string()),
            }
        }
    }
}

/// Entry point for the interactive interpreter.
pub fn execute_repl(config: ShellConfig) -> Result<()> {
    let program =
        std::env::current_exe().context("Failed to locate the interpreter binary")?;
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    if config.banner {
        println!(
            "Welcome to myshell! PID = {}. Type 'halt' to exit.",
            std::process::id()
        );
    }

    let repl = Repl::new(Dispatcher::new(program, &config), config);
    let exit = rt.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        repl.run(stdin).await
    })?;
    log_debug!("read loop stopped: {:?}", exit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // Any command that reaches the spawn step fails with a Spawn error, which
    // makes "was something dispatched?" observable.
    fn repl_with(config: ShellConfig) -> Repl {
        let d = Dispatcher::new(PathBuf::from("/nonexistent/myshell"), &config);
        Repl::new(d, config)
    }

    fn repl() -> Repl {
        repl_with(ShellConfig::default())
    }

    #[tokio::test]
    async fn halt_stops_before_later_lines() {
        let out = repl().run(&b"halt\ndir\n"[..]).await.unwrap();
        assert_eq!(out, ReplExit::Halted);
    }

    #[tokio::test]
    async fn halt_without_newline() {
        let out = repl().run(&b"  halt"[..]).await.unwrap();
        assert_eq!(out, ReplExit::Halted);
    }

    #[tokio::test]
    async fn halt_with_arguments_is_not_the_shortcut() {
        let out = repl().run(&b"halt now\n"[..]).await.unwrap();
        assert_eq!(out, ReplExit::EndOfInput);
    }

    #[tokio::test]
    async fn blank_and_marker_lines_do_not_dispatch() {
        let out = repl().run(&b"\n   \n&\n  & \n"[..]).await.unwrap();
        assert_eq!(out, ReplExit::EndOfInput);
    }

    #[tokio::test]
    async fn parse_and_validation_errors_are_recovered() {
        let input = b"create \"oops\nfoo bar\nlist\nhalt\n";
        let out = repl().run(&input[..]).await.unwrap();
        assert_eq!(out, ReplExit::Halted);
    }

    #[tokio::test]
    async fn non_utf8_line_is_dropped_before_dispatch() {
        let out = repl().run(&b"create \xff.txt\nhalt\n"[..]).await.unwrap();
        assert_eq!(out, ReplExit::Halted);
    }

    #[tokio::test]
    async fn configured_token_limit_applies() {
        let config = ShellConfig {
            max_args: 2,
            ..ShellConfig::default()
        };
        // Four tokens exceed the limit, so `update` never reaches the spawn step.
        let out = repl_with(config).run(&b"update a 1 b\n"[..]).await.unwrap();
        assert_eq!(out, ReplExit::EndOfInput);
    }

    #[tokio::test]
    async fn spawn_failure_ends_the_loop() {
        let err = repl().run(&b"dir\nhalt\n"[..]).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
