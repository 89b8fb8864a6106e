/*!
Interpreter modules.

Layout:
  src/cmd/
    mod.rs       (this file)
    command.rs   (ShellCommand table + Invocation validation)
    tokenize.rs  (line -> tokens + background flag)
    dispatch.rs  (parent side: validate, spawn, wait / detach)
    builtin.rs   (child side: create / update / list / dir)
    repl.rs      (banner, prompt, read loop, `halt`)
    format.rs    (prompt / diagnostic styling)

Conventions:
  - Each entry module exposes one public `execute_*` function.
  - Argument structs derive `clap::Args` and are kept minimal.
  - User-facing failures are `crate::error::ShellError` values; `anyhow`
    is only used at the process boundary.
*/

pub mod builtin;
pub mod command;
pub mod dispatch;
pub mod format;
pub mod repl;
pub mod tokenize;

pub use builtin::{BuiltinArgs, execute_builtin};
pub use repl::execute_repl;
