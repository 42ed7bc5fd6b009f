mod config;

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tonecast_core::{
    bytes_to_bits, text_to_bits, AudioModemError, CodecConfig, DecodedPayload, Decoder, Encoder,
};

use crate::config::{parse_fingerprint, CodecArgs, ConfigFile};

/// Characters of decoded text shown in the preview
const PREVIEW_CHARS: usize = 500;

#[derive(Parser)]
#[command(name = "tonecast")]
#[command(about = "Send data as audible two-tone FSK and recover it from a WAV recording")]
struct Cli {
    #[command(flatten)]
    codec: CodecArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file to a WAV audio file
    Encode {
        /// Input file (any content)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Encode text (one byte per character, U+0000..U+00FF) to a WAV audio file
    EncodeText {
        /// Text to encode
        #[arg(value_name = "TEXT")]
        text: String,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Decode a WAV audio file and report what was received
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Save the decoded bytes to this file
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Print the whole decoded text instead of a preview
        #[arg(long)]
        full: bool,

        /// Abort unless the active parameters have this fingerprint (hex)
        #[arg(long, value_name = "HEX", value_parser = parse_fingerprint)]
        expect_fingerprint: Option<u16>,
    },

    /// Print the active codec parameters and their fingerprint
    Config,
}

#[derive(Serialize)]
struct DecodeReport {
    samples: usize,
    frames: usize,
    carry_over_frames: usize,
    bits: String,
    bytes: usize,
    text: String,
    utf8: bool,
    file_type: String,
    extension: Option<&'static str>,
}

#[derive(Serialize)]
struct ConfigReport {
    fingerprint: String,
    samples_per_frame: usize,
    #[serde(flatten)]
    params: ConfigFile,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.codec.resolve()?;

    match cli.command {
        Commands::Encode { input, output } => encode_command(&config, &input, &output)?,
        Commands::EncodeText { text, output } => encode_text_command(&config, &text, &output)?,
        Commands::Decode {
            input,
            output,
            json,
            full,
            expect_fingerprint,
        } => {
            if let Some(expected) = expect_fingerprint {
                config.ensure_fingerprint(expected)?;
            }
            decode_command(&config, &input, output.as_deref(), json, full)?
        }
        Commands::Config => config_command(&config)?,
    }

    Ok(())
}

fn write_bits(config: &CodecConfig, bits: &[bool], output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let encoder = Encoder::new(config.clone())?;
    let frames = encoder.write_wav(output_path, bits)?;
    let seconds = (frames * config.samples_per_frame()) as f64 / config.sample_rate as f64;

    println!(
        "Encoded {} bits into {} frames ({:.1} s) at {} Hz",
        bits.len(),
        frames,
        seconds,
        config.sample_rate
    );
    println!(
        "Wrote {} (fingerprint {:04x})",
        output_path.display(),
        config.fingerprint()
    );
    Ok(())
}

fn encode_command(config: &CodecConfig, input_path: &Path, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path).map_err(|source| AudioModemError::SourceUnavailable {
        path: input_path.to_path_buf(),
        source,
    })?;
    info!("Read {} bytes from {}", data.len(), input_path.display());

    write_bits(config, &bytes_to_bits(&data), output_path)
}

fn encode_text_command(config: &CodecConfig, text: &str, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Encoding text: {}", text);
    let bits = text_to_bits(text)?;
    write_bits(config, &bits, output_path)
}

fn decode_command(
    config: &CodecConfig,
    input_path: &Path,
    output_path: Option<&Path>,
    json: bool,
    full: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let samples = tonecast_core::wav::read_wav(input_path, config)?;
    info!("Read {} samples from {}", samples.len(), input_path.display());

    let decoder = Decoder::new(config.clone())?;
    let reports = decoder.analyze(&samples);
    let carry_over_frames = reports.iter().filter(|r| r.decision.is_ambiguous()).count();
    let payload = DecodedPayload::from_bits(reports.iter().map(|r| r.decision.bit()).collect());
    let file_type = payload.guess_type();

    if json {
        let report = DecodeReport {
            samples: samples.len(),
            frames: reports.len(),
            carry_over_frames,
            bits: payload.bit_string(),
            bytes: payload.bytes.len(),
            text: payload.display_text().into_owned(),
            utf8: payload.text().is_some(),
            file_type: file_type.name().to_owned(),
            extension: file_type.extension(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Decoded binary data: {}", payload.bit_string());
        if carry_over_frames > 0 {
            println!(
                "[*] {} of {} frames had no clear carrier and repeated the previous bit",
                carry_over_frames,
                reports.len()
            );
        }
        print_preview(&payload, full);
        println!("[*] Suggested file type: {}", file_type);
    }

    if let Some(path) = output_path {
        std::fs::write(path, &payload.bytes)?;
        info!("Wrote {} bytes to {}", payload.bytes.len(), path.display());
    }

    Ok(())
}

fn print_preview(payload: &DecodedPayload, full: bool) {
    let text = payload.display_text();
    let total = text.chars().count();
    let shown: String = if full {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_CHARS).collect()
    };

    println!("\n[*] Decoded text:");
    println!("------------------------");
    println!("{}", shown);
    println!("------------------------");
    if !full && total > PREVIEW_CHARS {
        println!("[*] Showing {} of {} characters; pass --full to print everything.", PREVIEW_CHARS, total);
    }
    if payload.text().is_none() {
        println!("[*] Not valid UTF-8; shown one character per byte.");
        println!("[*] If it looks like gibberish it is probably a binary file; pass an OUTPUT path to save it.");
    }
}

fn config_command(config: &CodecConfig) -> Result<(), Box<dyn std::error::Error>> {
    let report = ConfigReport {
        fingerprint: format!("{:04x}", config.fingerprint()),
        samples_per_frame: config.samples_per_frame(),
        params: config.into(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
