use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use lox_syntax::error::{CompileError, EX_DATAERR};
use lox_syntax::scanner;

#[derive(Parser, Debug)]
#[command(name = "lox-syntax", version, about = "Scan Lox source and dump its tokens")]
struct Cli {
    /// Lox source file to scan
    file: PathBuf,

    /// Token output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

fn report_lox_errors(errors: Vec<CompileError>, name: &str, source: &str) {
    for e in errors {
        let report = miette::Report::new(e.with_source_code(name, source));
        eprintln!("{report:?}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("read source file '{}'", cli.file.display()))?;

    let mut errors: Vec<CompileError> = Vec::new();
    let tokens = scanner::scan_with(&source, &mut errors);

    match cli.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&tokens).context("serialize tokens to JSON")?;
            println!("{json}");
        }
        _ => {
            for token in &tokens {
                println!("{token}");
            }
        }
    }

    if !errors.is_empty() {
        report_lox_errors(errors, &cli.file.display().to_string(), &source);
        process::exit(EX_DATAERR);
    }
    Ok(())
}
