//! `dmr-decode`: decode base64 or binary DMR (stdin) to DMR text or JSON
//! (stdout).
//!
//! Usage:
//!   dmr-decode [--format dmr|json] [--json] [--compact]

use dmr::cli::{init_logging, unpack, CliError};
use std::io::{self, Read, Write};

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().collect();

    let mut format = "dmr".to_string();
    let mut compact = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => { format = "json".to_string(); }
            "--compact" => { compact = true; }
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

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match unpack(&buf, &format, compact) {
        Ok(text) => {
            let mut out = io::stdout();
            if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.write_all(b"\n")) {
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
