use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod config;
mod error;
mod utils;

use cmd::BuiltinArgs;

/// myshell - a tiny interactive interpreter for four file commands.
///
/// Commands (typed at the `shell> ` prompt):
///   create <name>                 create an empty file (refuses to overwrite)
///   update <name> <count> <text>  append <text> <count> times, slowly
///   list <name>                   print a file's contents
///   dir                           list the current directory
///   halt                          leave the interpreter
///
/// Each command runs in its own child process. End a line with a standalone
/// `&` to return to the prompt without waiting for the child.
/// Double quotes group words into one argument: create "my file.txt"
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (logs go to stderr)
///   -q / --quiet    Errors only, no banner
///   --config PATH   YAML or JSON config file (or MYSHELL_CONFIG env)
#[derive(Parser, Debug)]
#[command(
    name = "myshell",
    version,
    about = "myshell - tiny interactive interpreter for file commands",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error log output and the banner
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (YAML or JSON). Falls back to MYSHELL_CONFIG env.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Prompt text (overrides config)
    #[arg(long, value_name = "TEXT")]
    prompt: Option<String>,

    /// Do not print the welcome banner
    #[arg(long)]
    no_banner: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one command in this process (used for spawned children)
    #[command(hide = true)]
    Builtin(BuiltinArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    if let Some(Commands::Builtin(args)) = cli.command {
        if let Err(e) = cmd::execute_builtin(args) {
            cmd::format::diagnostic(e.to_string());
            std::process::exit(1);
        }
        return Ok(());
    }

    // Config: --config flag > MYSHELL_CONFIG env > defaults, then CLI overrides
    let config_path = config::resolve_config_path(cli.config);
    let mut shell_config = match config::load_or_default(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };
    if let Some(path) = &config_path {
        utils::logging::info(format!("loaded config from {}", path.display()));
    }
    if let Some(prompt) = cli.prompt {
        shell_config.prompt = prompt;
    }
    if cli.no_banner || cli.quiet {
        shell_config.banner = false;
    }

    cmd::execute_repl(shell_config)
}
