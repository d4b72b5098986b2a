//! # nkf-bridge CLI - buffer-oriented kanji code conversion front end
//!
//! Command-line interface over the conversion and detection entry points,
//! taking the engine options as one shell-style string.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use nkf_bridge::Converter;

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// nkf-bridge: buffer-oriented kanji code converter
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "nkf-bridge")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert input according to an engine option string
    Convert(ConvertArgs),

    /// Guess the input's encoding and print the coarse code
    Guess(GuessArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Engine option string, split shell-style (e.g. "--oc=UTF-16BE")
    #[arg(short = 'O', long = "options")]
    options: String,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct GuessArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionReport {
    success: bool,
    bytes_read: usize,
    bytes_written: usize,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct GuessReport {
    encoding: &'static str,
    code: i32,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Guess(ref args) => guess_command(args, &cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&PathBuf>, verbose: bool) -> Result<Vec<u8>> {
    if let Some(path) = path {
        if verbose {
            eprintln!("Reading from: {}", path.display());
        }
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))
    } else {
        if verbose {
            eprintln!("Reading from stdin");
        }
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    }
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let input_data = read_input(args.input.as_ref(), cli.verbose)?;

    if cli.verbose {
        eprintln!("Engine options: {}", args.options);
    }

    let mut converter = Converter::default();
    let output_data = converter
        .convert(&args.options, &input_data)
        .context("Conversion failed")?;

    if let Some(ref output_path) = args.output {
        fs::write(output_path, &output_data)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
        if cli.verbose {
            eprintln!("Wrote to: {}", output_path.display());
        }
    } else {
        io::stdout()
            .write_all(&output_data)
            .context("Failed to write to stdout")?;
    }

    if cli.verbose {
        eprintln!(
            "Processed {} bytes -> {} bytes",
            input_data.len(),
            output_data.len()
        );
    }

    if let OutputFormat::Json = cli.format {
        let report = ConversionReport {
            success: true,
            bytes_read: input_data.len(),
            bytes_written: output_data.len(),
        };
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn guess_command(args: &GuessArgs, cli: &Cli) -> Result<()> {
    let input_data = read_input(args.input.as_ref(), cli.verbose)?;

    let mut converter = Converter::default();
    let guessed = converter.guess(&input_data).context("Detection failed")?;

    match cli.format {
        OutputFormat::Json => {
            let report = GuessReport {
                encoding: guessed.name(),
                code: guessed.code(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("{} ({})", guessed.name(), guessed.code());
        }
    }

    Ok(())
}
