//! Hide a message in a PDF:
//!
//! ```text
//! inject <input.pdf> <output.pdf> <message> [passphrase]
//! ```
//!
//! The input is normalized with qpdf into a temporary file first, so any
//! well-formed PDF is accepted.

use std::process::ExitCode;

use pdf_stego::{PDFStego, QPDFConverter};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        eprintln!("usage: {} <input.pdf> <output.pdf> <message> [passphrase]", args[0]);
        return ExitCode::FAILURE;
    }
    let (input, output, message) = (&args[1], &args[2], &args[3]);
    let passphrase = args.get(4).map(String::as_str);

    match run(input, output, message, passphrase) {
        Ok(object_number) => {
            println!("hidden object {} written to {}", object_number, output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(
    input: &str,
    output: &str,
    message: &str,
    passphrase: Option<&str>,
) -> Result<u32, Box<dyn std::error::Error>> {
    let converter = QPDFConverter::new();
    if !converter.is_available() {
        return Err("qpdf is not installed or not on PATH".into());
    }

    let workdir = tempfile::tempdir()?;
    let normalized = workdir.path().join("normalized.pdf");
    converter.normalize(std::path::Path::new(input), &normalized)?;

    let pdf_data = std::fs::read(&normalized)?;
    let outcome = PDFStego::new().inject_text(&pdf_data, message, passphrase)?;
    std::fs::write(output, &outcome.pdf)?;
    Ok(outcome.object_number)
}
