use std::{fs::File, path::PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use proto3_parser::ParseOptions;

#[derive(Debug, Parser)]
pub struct Args {
    #[clap(value_name = "PROTO_FILE", value_parser)]
    file: PathBuf,
    /// Accept message literals as option values.
    #[clap(long, value_parser)]
    permissive: bool,
    /// Keep comments after the last declaration of a body.
    #[clap(long, value_parser)]
    body_including_comments: bool,
    /// Emit a tracing event for every token read.
    #[clap(long, value_parser)]
    debug: bool,
}

pub fn main() -> Result<()> {
    miette::set_panic_hook();

    let args = Args::parse();
    let file = File::open(&args.file).into_diagnostic()?;
    let proto = ParseOptions::new()
        .filename(args.file.display().to_string())
        .permissive(args.permissive)
        .body_including_comments(args.body_including_comments)
        .debug(args.debug)
        .parse_reader(file)?;

    println!("{:#?}", proto);
    Ok(())
}
