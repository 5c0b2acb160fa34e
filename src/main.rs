use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

mod alternating;
mod bitio;
mod error;
mod rle;

use alternating::{compress_alternating, expand_alternating};
use bitio::{BitReader, BitWriter};
use rle::{compress_rle, expand_rle};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transform to apply: `-` compresses, `+` expands
    #[arg(value_parser = parse_mode)]
    mode: Mode,
    /// Input file path (use - for stdin)
    #[arg(default_value = "-")]
    input: String,
    /// Output file path (use - for stdout)
    #[arg(default_value = "-")]
    output: String,
    /// Use the legacy alternating-run wire format
    #[arg(long)]
    legacy: bool,
}

#[derive(Clone, Copy)]
enum Mode {
    Compress,
    Expand,
}

fn parse_mode(arg: &str) -> std::result::Result<Mode, String> {
    match arg {
        "-" => Ok(Mode::Compress),
        "+" => Ok(Mode::Expand),
        _ => Err(format!("expected `-` (compress) or `+` (expand), got `{arg}`")),
    }
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file = File::create(path).with_context(|| format!("Failed to create output file: {}", path))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut reader = BitReader::new(open_input(&cli.input)?);
    let mut writer = BitWriter::new(open_output(&cli.output)?);

    let result = match (cli.mode, cli.legacy) {
        (Mode::Compress, false) => {
            info!("compressing {} to {}", cli.input, cli.output);
            compress_rle(&mut reader, &mut writer)
        }
        (Mode::Compress, true) => {
            info!("compressing {} to {} (legacy format)", cli.input, cli.output);
            compress_alternating(&mut reader, &mut writer)
        }
        (Mode::Expand, false) => {
            info!("expanding {} to {}", cli.input, cli.output);
            expand_rle(&mut reader, &mut writer)
        }
        (Mode::Expand, true) => {
            info!("expanding {} to {} (legacy format)", cli.input, cli.output);
            expand_alternating(&mut reader, &mut writer)
        }
    };

    // Close even when the codec failed, so bits already produced are
    // flushed before the error surfaces
    writer.close().context("Failed to flush output")?;
    result.with_context(|| {
        let verb = match cli.mode {
            Mode::Compress => "Compression",
            Mode::Expand => "Expansion",
        };
        format!("{} failed from {} to {}", verb, cli.input, cli.output)
    })?;

    debug!("done");
    Ok(())
}
