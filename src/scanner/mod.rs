pub mod lexer;
pub mod token;

use crate::error::{CompileError, ErrorSink};
use lexer::Lexer;
use token::Token;

/// Scan source code into a list of tokens.
pub fn scan(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    lexer::scan_all(source)
}

/// Scan source code, reporting every lexical error into `sink`. The returned
/// tokens are always `Eof`-terminated; check `sink.had_error()` before
/// trusting them.
pub fn scan_with(source: &str, sink: &mut impl ErrorSink) -> Vec<Token> {
    Lexer::new(source).scan_tokens(sink)
}
