//! `dmr-encode`: encode JSON (stdin) to DMR (stdout).
//!
//! Usage:
//!   dmr-encode [--format base64|binary] [--binary]

use dmr::cli::{init_logging, pack, CliError};
use std::io::{self, Read, Write};

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().collect();

    let mut format = "base64".to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--binary" => {
                format = "binary".to_string();
            }
            "--format" => {
                i += 1;
                if let Some(f) = args.get(i) {
                    format = f.clone();
                }
            }
            _ => {}
        }
        i += 1;
    }

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match pack(buf.trim(), &format) {
        Ok(bytes) => {
            if let Err(e) = io::stdout().write_all(&bytes) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(CliError::UnknownFormat(f)) => {
            eprintln!("Unknown format: {f}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
