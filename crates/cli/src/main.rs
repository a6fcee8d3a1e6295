//! CLI tool for converting chart documents into slide-deck documents.

use anyhow::{Context, Result};
use chartdeck_core::{validate, SlideConverter, SlideDocument};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert chart JSON documents into renderer-ready slide documents.
#[derive(Parser, Debug)]
#[command(name = "chartdeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input chart JSON file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let converter = SlideConverter::new();

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &converter) {
            Ok(output) => {
                if args.print {
                    println!("{}", output);
                } else {
                    let output_path = get_output_path(input_path, args.output.as_ref())?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Convert a single chart document file into serialized slide JSON.
///
/// Read and parse failures still yield the empty-slides fallback document so
/// downstream consumers always receive a well-formed payload.
fn process_file(input_path: &Path, args: &Args, converter: &SlideConverter) -> Result<String> {
    let document = match fs::read_to_string(input_path) {
        Ok(raw) => converter.convert_json_str(&raw),
        Err(e) => {
            log::error!("Failed to read {}: {}", input_path.display(), e);
            SlideDocument::empty()
        }
    };

    if args.verbose {
        eprintln!("  Converted {} slides", document.slide_count());
    }

    let value = serde_json::to_value(&document).context("Failed to serialize slide document")?;
    if !validate(&value) {
        log::warn!(
            "Converted document for {} failed structural validation",
            input_path.display()
        );
    }

    // 2-space indentation, non-ASCII preserved literally
    serde_json::to_string_pretty(&document).context("Failed to serialize slide document")
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.slides.json", stem);

    let output_path = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write to {}", path.display()))
}
