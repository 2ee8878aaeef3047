//! uxntal-asm CLI
//!
//! Command-line front end: reads one source file, assembles it, and
//! writes the ROM to an output path.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Two-pass assembler for a small stack-machine ISA.
#[derive(Parser, Debug)]
#[command(name = "uxntal-asm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file to assemble
    input: PathBuf,

    /// Path to write the assembled ROM to
    output: PathBuf,

    /// Emit debug/trace logging of the pass driver on stderr
    #[arg(short, long)]
    verbose: bool,
}

const USAGE: &str = "usage: uxntal-asm [-v] <input.tal> <output.rom>";

/// Exit code used for CLI and I/O failures, matching the assembler's
/// own convention of reporting those as status -1.
const FAILURE: u8 = 255;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => {
            eprintln!("{USAGE}");
            return ExitCode::from(FAILURE);
        }
    };

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("uxntal_asm=debug")
            .init();
    }

    let data = match std::fs::read(&args.input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {e}", args.input.display());
            return ExitCode::from(FAILURE);
        }
    };

    let source = match std::str::from_utf8(&data) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: '{}' is not valid UTF-8: {e}", args.input.display());
            return ExitCode::from(FAILURE);
        }
    };

    let start = Instant::now();
    let output = uxntal_asm::assemble(source);

    for diagnostic in output.diagnostics.records() {
        eprintln!("{diagnostic}");
    }

    if output.diagnostics.had_error() {
        // Assembly errors exit zero but write nothing; only CLI/I/O
        // failures return a nonzero status.
        return ExitCode::SUCCESS;
    }

    if output.code.is_empty() {
        eprintln!("Warning: Output rom is empty.");
    }

    if let Err(e) = std::fs::write(&args.output, &output.code) {
        eprintln!("Error: cannot write '{}': {e}", args.output.display());
        return ExitCode::from(FAILURE);
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("Assembled '{}' in {elapsed_ms}ms", args.input.display());

    let bytes = output.code.len();
    let percent = bytes as f64 / 652.80;
    let overflow = if bytes >= 0xffff { "!" } else { "" };
    let label_word = if output.label_count == 1 {
        "label"
    } else {
        "labels"
    };
    println!("{bytes} bytes ({percent:.2}%{overflow}), {} {label_word}, 0 macros.", output.label_count);

    ExitCode::SUCCESS
}
