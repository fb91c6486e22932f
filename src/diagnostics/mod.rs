use crate::span::Span;
use std::path::PathBuf;
use thiserror::Error;

/// Lexer/parser failure in the reference host.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Syntax error: {msg}")]
pub struct SyntaxError {
    pub msg: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(msg: impl Into<String>, span: Span) -> Self {
        Self { msg: msg.into(), span }
    }
}

/// The scan observed the cancellation signal and gave up.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Failure to apply an offered action to a document snapshot.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Stale edit: no {expected} at path {path:?} in document '{document}'")]
    StalePath {
        document: String,
        path: Vec<usize>,
        expected: &'static str,
    },
}

impl ApplyError {
    pub fn stale(document: impl Into<String>, path: &[usize], expected: &'static str) -> Self {
        Self::StalePath { document: document.into(), path: path.to_vec(), expected }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Render a syntax error as `line:col: message` with the offending source line.
pub fn render_syntax_error(source: &str, err: &SyntaxError) -> String {
    let offset = err.span.start.min(source.len());
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[offset..].find('\n').map(|i| offset + i).unwrap_or(source.len());
    let line_no = source[..offset].matches('\n').count() + 1;
    let col = offset - line_start + 1;
    let width = err.span.len().max(1).min(line_end.saturating_sub(offset).max(1));
    format!(
        "{line_no}:{col}: {}\n  {}\n  {}{}",
        err.msg,
        &source[line_start..line_end],
        " ".repeat(col - 1),
        "^".repeat(width),
    )
}
