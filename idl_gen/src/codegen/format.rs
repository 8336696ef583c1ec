//! Formatting boundary.
//!
//! The assembled buffer is handed to a [`SourceFormatter`] before it is
//! written anywhere. A rejection here is the last line of defence against a
//! generator defect that produced malformed Go, so callers treat it as fatal.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    /// The formatter could not be started or talked to.
    #[error("failed to run {program}: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The formatter ran and refused the input.
    #[error("rejected source: {message}")]
    Rejected { message: String },
}

pub trait SourceFormatter {
    fn name(&self) -> &str;

    /// Validates `source` and returns its formatted form.
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Pipes the buffer through the `gofmt` binary.
#[derive(Debug, Clone)]
pub struct Gofmt {
    pub program: PathBuf,
}

impl Default for Gofmt {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gofmt"),
        }
    }
}

impl SourceFormatter for Gofmt {
    fn name(&self) -> &str {
        "gofmt"
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        let program = self.program.display().to_string();
        let unavailable = |source| FormatError::Unavailable {
            program: program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(unavailable)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).map_err(unavailable)?;
        }
        let output = child.wait_with_output().map_err(unavailable)?;

        if !output.status.success() {
            return Err(FormatError::Rejected {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Dependency-free check used when no Go toolchain is around: verifies that
/// brackets balance outside string literals and comments, and returns the
/// text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxCheck;

impl SourceFormatter for SyntaxCheck {
    fn name(&self) -> &str {
        "syntax check"
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        check_delimiters(source)?;
        Ok(source.to_string())
    }
}

fn check_delimiters(source: &str) -> Result<(), FormatError> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                /* line comment: skip to end of line */
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                    }
                    if prev == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    prev = next;
                }
                if !closed {
                    return Err(rejected(line, "unterminated block comment"));
                }
            }
            '"' | '\'' => {
                let quote = ch;
                let mut closed = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => return Err(rejected(line, "newline in string literal")),
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(rejected(line, "unterminated string literal"));
                }
            }
            '`' => {
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                    }
                    if next == '`' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(rejected(line, "unterminated raw string"));
                }
            }
            '(' | '[' | '{' => stack.push((ch, line)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, opened_at)) => {
                        return Err(rejected(
                            line,
                            &format!("'{}' closes '{}' opened on line {}", ch, open, opened_at),
                        ));
                    }
                    None => return Err(rejected(line, &format!("unmatched '{}'", ch))),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, opened_at)) => Err(rejected(opened_at, &format!("unclosed '{}'", open))),
        None => Ok(()),
    }
}

fn rejected(line: usize, message: &str) -> FormatError {
    FormatError::Rejected {
        message: format!("line {}: {}", line, message),
    }
}
