//! Recover hidden payloads from a PDF:
//!
//! ```text
//! extract <input.pdf> [passphrase] [--files <dir>]
//! ```
//!
//! Without `--files`, prints recovered text messages. With `--files <dir>`,
//! writes recovered file payloads into the directory instead.

use std::path::Path;
use std::process::ExitCode;

use pdf_stego::PDFStego;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut passphrase = None;
    let mut files_dir = None;
    let mut input = None;

    let mut it = args.iter().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--files" {
            files_dir = it.next().cloned();
            if files_dir.is_none() {
                eprintln!("--files requires a directory");
                return ExitCode::FAILURE;
            }
        } else if input.is_none() {
            input = Some(arg.clone());
        } else {
            passphrase = Some(arg.clone());
        }
    }

    let Some(input) = input else {
        eprintln!("usage: {} <input.pdf> [passphrase] [--files <dir>]", args[0]);
        return ExitCode::FAILURE;
    };

    match run(&input, passphrase.as_deref(), files_dir.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(
    input: &str,
    passphrase: Option<&str>,
    files_dir: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pdf_data = std::fs::read(input)?;
    let stego = PDFStego::new();

    match files_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let recovered = stego.extract_files_to(&pdf_data, passphrase, Path::new(dir))?;
            for file in &recovered {
                println!("object {}: {} ({} bytes)", file.object_number, file.name, file.bytes.len());
            }
            if recovered.is_empty() {
                println!("no hidden files found");
            }
        }
        None => {
            let messages = stego.extract_text(&pdf_data, passphrase)?;
            for (number, message) in &messages {
                println!("object {}: {}", number, message);
            }
            if messages.is_empty() {
                println!("no hidden messages found");
            }
        }
    }
    Ok(())
}
