use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;

use lox_syntax::error::GenerateError;
use lox_syntax::generate::{self, EXPR_GRAMMAR};

#[derive(Parser, Debug)]
#[command(
    name = "generate_ast",
    version,
    about = "Generate the Lox syntax tree definitions"
)]
struct Cli {
    /// Directory to write the generated sources into
    #[arg(allow_hyphen_values = true)]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            let usage = GenerateError::Usage;
            eprintln!("{usage}");
            process::exit(usage.exit_code());
        }
    };

    let path = generate::write_ast(&cli.output_dir, "Expr", EXPR_GRAMMAR)
        .with_context(|| format!("generate syntax tree into '{}'", cli.output_dir.display()))?;
    eprintln!("wrote '{}'", path.display());
    Ok(())
}
