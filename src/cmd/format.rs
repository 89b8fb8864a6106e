/*!
format.rs

Console styling for the interactive surface (prompt + diagnostics).

  - Color is ON when NO_COLOR is unset and the stream is a terminal.
  - Piped / redirected output is always plain, so scripted sessions and
    tests see the exact message text.

Public API Summary:
  - StyleOptions::detect_stdout() / detect_stderr()
  - color(role, text, &StyleOptions) -> String
  - diagnostic(msg) -> prints to stderr in the error role
*/

use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleOptions {
    pub use_color: bool,
}

impl StyleOptions {
    fn detect(is_terminal: bool) -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        StyleOptions {
            use_color: !no_color && is_terminal,
        }
    }

    pub fn detect_stdout() -> Self {
        Self::detect(std::io::stdout().is_terminal())
    }

    pub fn detect_stderr() -> Self {
        Self::detect(std::io::stderr().is_terminal())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Warning,
    Error,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45", // cyan-ish
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// Report a user-facing failure on stderr.
pub fn diagnostic(msg: impl AsRef<str>) {
    let style = StyleOptions::detect_stderr();
    eprintln!("{}", color(Role::Error, msg, &style));
}

/// Report a non-fatal warning on stderr.
pub fn warning(msg: impl AsRef<str>) {
    let style = StyleOptions::detect_stderr();
    eprintln!("{}", color(Role::Warning, msg, &style));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_passthrough() {
        assert_eq!(color(Role::Error, "x", &StyleOptions { use_color: false }), "x");
    }

    #[test]
    fn colored_wraps_with_reset() {
        let s = color(Role::Primary, "shell> ", &StyleOptions { use_color: true });
        assert!(s.starts_with("\x1b[38;5;45m"));
        assert!(s.ends_with("\x1b[0m"));
        assert!(s.contains("shell> "));
    }
}
