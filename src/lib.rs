pub mod ast;
pub mod error;
pub mod generate;
pub mod scanner;

// Re-export error types for convenience
pub use error::{CompileError, ErrorSink, GenerateError};
