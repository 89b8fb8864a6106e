/*!
`tokenize.rs`

Line tokenizer: one left-to-right scan, no backtracking.

Rules:
  - runs of whitespace separate tokens
  - `"..."` is one token (may contain whitespace, may be empty); quotes are stripped
  - a standalone `&` (whitespace or end-of-line on both sides) sets the
    background flag and produces no token; `a&` or `&b` are ordinary tokens
  - any other run of non-whitespace is one token (embedded quotes kept as-is)

Failures: unmatched opening quote, or more tokens than the configured maximum.
On failure no partial token list is returned.
*/

use crate::error::ShellError;

/// Upper bound on tokens per line (16 slots, one reserved for the terminator).
pub const MAX_ARGS: usize = 15;

/// Result of tokenizing one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    /// Ordered tokens; `tokens[0]` is the command name. Only a quoted `""`
    /// produces an empty token.
    pub tokens: Vec<String>,
    /// A standalone `&` appeared somewhere on the line.
    pub background: bool,
}

impl ParsedLine {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// C `isspace` set: space, \t, \n, \v, \f, \r.
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

pub fn tokenize_with_limit(line: &str, max_args: usize) -> Result<ParsedLine, ShellError> {
    let mut parsed = ParsedLine::default();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| is_space(*c)).is_some() {}

        let Some(&c) = chars.peek() else {
            break;
        };

        if c == '&' {
            let mut ahead = chars.clone();
            ahead.next();
            if ahead.peek().is_none_or(|n| is_space(*n)) {
                parsed.background = true;
                chars.next();
                continue;
            }
        }

        let token = if c == '"' {
            chars.next();
            let mut tok = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => tok.push(ch),
                    None => return Err(ShellError::UnmatchedQuote),
                }
            }
            tok
        } else {
            let mut tok = String::new();
            while let Some(ch) = chars.next_if(|ch| !is_space(*ch)) {
                tok.push(ch);
            }
            tok
        };

        if parsed.tokens.len() >= max_args {
            return Err(ShellError::TooManyArguments { max: max_args });
        }
        parsed.tokens.push(token);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(line: &str) -> Result<ParsedLine, ShellError> {
        tokenize_with_limit(line, MAX_ARGS)
    }

    fn words(line: &str) -> Vec<String> {
        tokenize(line).unwrap().tokens
    }

    #[test]
    fn blank_and_marker_only_lines_are_empty() {
        for line in ["", "   ", "\t\n", "&", "  &  ", "& &\n"] {
            let p = tokenize(line).unwrap();
            assert!(p.is_empty(), "expected no tokens for {line:?}");
        }
        assert!(tokenize(" & ").unwrap().background);
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(words("  create   a.txt \n"), vec!["create", "a.txt"]);
        assert_eq!(words("dir\t"), vec!["dir"]);
    }

    #[test]
    fn quoted_token_keeps_inner_space() {
        let p = tokenize(r#"create "my file.txt""#).unwrap();
        assert_eq!(p.tokens, vec!["create", "my file.txt"]);
        assert!(!p.background);
    }

    #[test]
    fn empty_quotes_yield_empty_token() {
        assert_eq!(words(r#"update f 1 """#), vec!["update", "f", "1", ""]);
    }

    #[test]
    fn closing_quote_ends_token_immediately() {
        assert_eq!(words(r#""ab"cd"#), vec!["ab", "cd"]);
    }

    #[test]
    fn quote_inside_bare_word_is_literal() {
        assert_eq!(words(r#"ab"c d""#), vec![r#"ab"c"#, r#"d""#]);
    }

    #[test]
    fn trailing_ampersand_sets_background() {
        let p = tokenize("update log.txt 3 hi &").unwrap();
        assert_eq!(p.tokens, vec!["update", "log.txt", "3", "hi"]);
        assert!(p.background);
    }

    #[test]
    fn standalone_ampersand_need_not_be_last() {
        let p = tokenize("dir & ").unwrap();
        assert!(p.background);
        let p = tokenize("list & a.txt").unwrap();
        assert_eq!(p.tokens, vec!["list", "a.txt"]);
        assert!(p.background);
    }

    #[test]
    fn attached_ampersand_is_a_plain_token() {
        let p = tokenize("list a.txt&").unwrap();
        assert_eq!(p.tokens, vec!["list", "a.txt&"]);
        assert!(!p.background);
        let p = tokenize("list &a.txt").unwrap();
        assert_eq!(p.tokens, vec!["list", "&a.txt"]);
        assert!(!p.background);
    }

    #[test]
    fn unmatched_quote_fails() {
        let err = tokenize(r#"create "oops"#).unwrap_err();
        assert!(matches!(err, ShellError::UnmatchedQuote));
    }

    #[test]
    fn token_limit() {
        let at_limit = vec!["w"; MAX_ARGS].join(" ");
        assert_eq!(tokenize(&at_limit).unwrap().tokens.len(), MAX_ARGS);

        let over = vec!["w"; MAX_ARGS + 1].join(" ");
        let err = tokenize(&over).unwrap_err();
        assert!(matches!(err, ShellError::TooManyArguments { max: MAX_ARGS }));
    }

    #[test]
    fn custom_limit() {
        assert!(tokenize_with_limit("a b c", 3).is_ok());
        assert!(tokenize_with_limit("a b c d", 3).is_err());
        // `&` does not count toward the limit.
        assert!(tokenize_with_limit("a b c &", 3).unwrap().background);
    }
}
