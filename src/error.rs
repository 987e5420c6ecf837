use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::scanner::token::Span;

/// Exit status for command-line usage errors (BSD `EX_USAGE`).
pub const EX_USAGE: i32 = 64;

/// Exit status for malformed input data (BSD `EX_DATAERR`).
pub const EX_DATAERR: i32 = 65;

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("[line {line}] Error: {message}")]
    #[diagnostic(code(lox::scan))]
    Scan {
        message: String,
        line: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn scan(message: impl Into<String>, line: usize, span: Span) -> Self {
        Self::Scan {
            message: message.into(),
            line,
            span: span.into(),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        match self {
            Self::Scan {
                message, line, span, ..
            } => Self::Scan {
                message,
                line,
                span,
                src: miette::NamedSource::new(name.into(), source.into()),
            },
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Scan { line, .. } => *line,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Scan { message, .. } => message,
        }
    }
}

/// Receiver for recoverable diagnostics. The scanner reports into a sink and
/// keeps going; the caller inspects the sink afterwards.
pub trait ErrorSink {
    fn report(&mut self, error: CompileError);

    fn had_error(&self) -> bool;
}

impl ErrorSink for Vec<CompileError> {
    fn report(&mut self, error: CompileError) {
        self.push(error);
    }

    fn had_error(&self) -> bool {
        !self.is_empty()
    }
}

// ============= Code generator errors =============

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Usage: generate_ast <output directory>")]
    Usage,

    #[error("malformed grammar rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("variant '{0}' is defined more than once")]
    DuplicateVariant(String),

    #[error("write '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn malformed(rule: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage => EX_USAGE,
            _ => 1,
        }
    }
}

// ============= Tests =============
