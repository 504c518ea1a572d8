//! Splitting raw input lines into a label and tokens.

use sommand_types::error::{Result, SommandError};

/// Split `input` on whitespace, honoring quotes and backslash escapes.
///
/// Single quotes are literal. Inside double quotes a backslash escapes `"`
/// and `\`. Outside quotes a backslash escapes any character.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string ("") is still a token.
    let mut pending = false;
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            match ch {
                '"' => in_double = false,
                '\\' => match chars.next_if(|&next| next == '"' || next == '\\') {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                },
                _ => current.push(ch),
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    pending = true;
                },
                '"' => {
                    in_double = true;
                    pending = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        pending = true;
                    }
                },
                c if c.is_whitespace() => {
                    if pending || !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                        pending = false;
                    }
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(SommandError::Parse("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(SommandError::Parse("unterminated double quote".to_string()));
    }

    if pending || !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// The root alias as typed.
    pub label: String,
    /// Tokens after the label.
    pub tokens: Vec<String>,
    /// Whether the line ended in unquoted whitespace.
    pub trailing_space: bool,
}

impl CommandLine {
    /// Parse `line`, stripping a leading `prefix` (such as `/`) if present.
    ///
    /// Returns `None` for a line with no label.
    pub fn parse(line: &str, prefix: &str) -> Result<Option<Self>> {
        let body = line.trim_start();
        let body = if prefix.is_empty() {
            body
        } else {
            body.strip_prefix(prefix).unwrap_or(body)
        };
        let mut tokens = tokenize(body)?.into_iter();
        let Some(label) = tokens.next() else {
            return Ok(None);
        };
        Ok(Some(Self {
            label,
            tokens: tokens.collect(),
            trailing_space: ends_in_separator(body),
        }))
    }

    /// Tokens as seen by completion: a trailing space starts a new, empty
    /// token.
    pub fn completion_tokens(&self) -> Vec<String> {
        let mut tokens = self.tokens.clone();
        if self.trailing_space {
            tokens.push(String::new());
        }
        tokens
    }

    /// Whether the cursor is still inside the label.
    pub fn is_completing_label(&self) -> bool {
        self.tokens.is_empty() && !self.trailing_space
    }
}

/// Whitespace at the end of `body` that is neither escaped nor quoted.
/// Assumes `body` already tokenized cleanly, so quotes are balanced.
fn ends_in_separator(body: &str) -> bool {
    if !body.ends_with(char::is_whitespace) {
        return false;
    }
    let mut escaped = false;
    let mut quote: Option<char> = None;
    let mut last_was_separator = false;
    for ch in body.chars() {
        last_was_separator = false;
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('"'), '\\') => escaped = true,
            (Some(_), _) => {},
            (None, '\\') => escaped = true,
            (None, '\'' | '"') => quote = Some(ch),
            (None, c) if c.is_whitespace() => last_was_separator = true,
            (None, _) => {},
        }
    }
    last_was_separator
}
