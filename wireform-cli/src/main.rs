//! Wireform command-line front end.
//!
//! Loads a capture file (2-channel WAV via hound, or raw interleaved
//! little-endian f32), runs the core analyzer and renders the result as
//! a text table or JSON.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use wireform_core::{
    AnalysisOptions, Analyzer, EstimatorConfig, IqInput, Modulation, SourceError,
};

#[derive(Parser, Debug)]
#[command(version, about = "Recover modulation parameters and protocol fields from an IQ capture")]
struct Args {
    /// Capture file: .wav (1 or 2 channels) or raw interleaved f32
    /// (.cf32, .cfile, .iq, .raw)
    input: PathBuf,

    /// Sample rate in Hz for raw captures
    #[arg(long, default_value_t = 1_000_000.0)]
    sample_rate: f64,

    /// Skip the classifier and demodulate as ASK, FSK or PSK
    #[arg(long)]
    modulation: Option<String>,

    /// Override the estimated noise floor
    #[arg(long)]
    noise: Option<f32>,

    /// Estimator profile as a TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit the analysis result as JSON
    #[arg(long)]
    json: bool,

    /// Print the estimator decision log to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading estimator profile {}", path.display()))?;
            toml::from_str::<EstimatorConfig>(&text)
                .wrap_err_with(|| format!("parsing estimator profile {}", path.display()))?
        }
        None => EstimatorConfig::default(),
    };

    let modulation = args
        .modulation
        .as_deref()
        .map(str::parse::<Modulation>)
        .transpose()
        .map_err(|e| eyre!(e.to_string()))?;
    let options = AnalysisOptions {
        noise: args.noise,
        modulation,
    };

    let input = read_capture(&args.input).wrap_err_with(|| {
        format!("loading capture {}", args.input.display())
    })?;

    let mut analyzer = Analyzer::new(config);
    let result = analyzer
        .analyze_iq(&input, &options)
        .map_err(|e| eyre!(e.to_string()))?;

    if args.verbose {
        eprintln!("sample rate {} Hz", args.sample_rate);
        eprint!("{}", analyzer.logger());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match &result.signal_parameters {
        Some(params) => {
            println!("modulation : {}", params.modulation);
            println!("bit length : {} samples", params.bit_length);
            println!("center     : {:.6}", params.center);
            println!("noise      : {:.6}", params.noise);
            println!("tolerance  : {} samples", params.tolerance);
        }
        None => println!("no signal parameters recovered"),
    }
    println!("messages   : {}", result.num_messages);
    for (index, message) in result.messages.iter().enumerate() {
        println!(
            "  [{index:3}] {} bits  hex {}  pause {}",
            message.len(),
            message.hex(),
            message.pause()
        );
    }
    if !result.protocol_fields.is_empty() {
        println!("fields:");
        for field in &result.protocol_fields {
            println!(
                "  {:>15}  [{:4}, {:4})  {}",
                field.label.as_str(),
                field.start,
                field.end,
                field.message_type
            );
        }
    }
    Ok(())
}

/// Map a capture file onto a tagged input buffer.
fn read_capture(path: &Path) -> Result<IqInput, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "wav" => read_wav(path),
        "cf32" | "cfile" | "iq" | "raw" => read_raw_f32(path),
        other => Err(SourceError::UnknownFormat(other.to_string())),
    }
}

fn read_wav(path: &Path) -> Result<IqInput, SourceError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| SourceError::CorruptHeader {
        origin: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| SourceError::CorruptHeader {
                origin: path.display().to_string(),
                detail: e.to_string(),
            })?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| SourceError::CorruptHeader {
                    origin: path.display().to_string(),
                    detail: e.to_string(),
                })?
        }
    };

    match spec.channels {
        1 => Ok(IqInput::ScalarReal(samples)),
        2 => Ok(IqInput::InterleavedReal(samples)),
        n => Err(SourceError::UnsupportedVariant {
            format: "wav".to_string(),
            detail: format!("{n} channels, expected 1 or 2"),
        }),
    }
}

fn read_raw_f32(path: &Path) -> Result<IqInput, SourceError> {
    let bytes = fs::read(path)?;
    if bytes.len() % 8 != 0 {
        return Err(SourceError::CorruptHeader {
            origin: path.display().to_string(),
            detail: format!("{} bytes is not a whole number of IQ pairs", bytes.len()),
        });
    }
    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(IqInput::InterleavedReal(values))
}
