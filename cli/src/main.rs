mod io;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use serde::Serialize;
use sonify_core::decoder::symbols_to_string;
use sonify_core::{
    visualize, ContentAnalyzer, ContentProfile, Decoder, Encoder, FallbackReason, FrequencyRange, RangeOptimizer,
    RasterMap, SonifyError, Transcriber, Transcription, UnavailableTranscriber, SAMPLE_RATE,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] SonifyError),

    #[error("Unsupported audio format: {0}")]
    UnsupportedAudio(String),

    #[error("{0}")]
    Usage(String),
}

#[derive(Parser)]
#[command(name = "sonify")]
#[command(about = "Encode text and images as tone sequences and decode them back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Explicit band; both bounds must be given together
#[derive(Args, Debug, Clone, Copy)]
struct RangeArgs {
    /// Lowest symbol frequency in Hz
    #[arg(long, requires = "max")]
    min: Option<f64>,

    /// Highest symbol frequency in Hz
    #[arg(long, requires = "min")]
    max: Option<f64>,
}

impl RangeArgs {
    fn explicit(&self) -> Result<Option<FrequencyRange>, CliError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Ok(Some(FrequencyRange::new(min, max)?)),
            _ => Ok(None),
        }
    }

    fn or_profile(&self, profile: ContentProfile) -> Result<FrequencyRange, CliError> {
        Ok(self.explicit()?.unwrap_or_else(|| profile.default_range()))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a text file to a WAV tone sequence
    Encode {
        /// Input text file (printable ASCII)
        #[arg(value_name = "INPUT.TXT")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Pick the band from the text's content profile
        #[arg(long, conflicts_with_all = ["min", "max"])]
        optimize: bool,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Decode a WAV tone sequence back to text
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Write the text here instead of stdout
        #[arg(short, long, value_name = "OUTPUT.TXT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Encode an image's intensities to a WAV tone sequence
    EncodeImage {
        /// Input image (PNG, JPEG, BMP or GIF)
        #[arg(value_name = "INPUT.IMG")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Pick the band from the image's content profile
        #[arg(long, conflicts_with_all = ["min", "max"])]
        optimize: bool,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Decode a WAV tone sequence into a grayscale PNG
    DecodeImage {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Output PNG file
        #[arg(value_name = "OUTPUT.PNG")]
        output: PathBuf,

        /// Grid width printed by encode-image
        #[arg(long)]
        width: usize,

        /// Grid height printed by encode-image
        #[arg(long)]
        height: usize,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Classify content and print the recommended band as JSON
    Analyze {
        /// Text file to analyse
        #[arg(long, value_name = "FILE", conflicts_with = "image")]
        text: Option<PathBuf>,

        /// Image file to analyse
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },

    /// Print waveform and spectrum traces of a WAV file as JSON
    Visualize {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Write the JSON here instead of stdout
        #[arg(short, long, value_name = "OUTPUT.JSON")]
        output: Option<PathBuf>,
    },

    /// Ask the configured speech-to-text backend for a transcript
    Transcribe {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            optimize,
            range,
        } => encode_command(&input, &output, optimize, range)?,
        Commands::Decode { input, output, range } => decode_command(&input, output.as_deref(), range)?,
        Commands::EncodeImage {
            input,
            output,
            optimize,
            range,
        } => encode_image_command(&input, &output, optimize, range)?,
        Commands::DecodeImage {
            input,
            output,
            width,
            height,
            range,
        } => decode_image_command(&input, &output, width, height, range)?,
        Commands::Analyze { text, image } => analyze_command(text.as_deref(), image.as_deref())?,
        Commands::Visualize { input, output } => visualize_command(&input, output.as_deref())?,
        Commands::Transcribe { input } => transcribe_command(&input, &UnavailableTranscriber)?,
    }

    Ok(())
}

/// Read a text payload, dropping the trailing newline editors add
fn read_text(path: &Path) -> Result<String, CliError> {
    let text = std::fs::read_to_string(path)?;
    let text = text.trim_end_matches(['\n', '\r']).to_string();
    info!("Read {} characters from {}", text.chars().count(), path.display());
    Ok(text)
}

fn print_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn encode_command(input: &Path, output: &Path, optimize: bool, range_args: RangeArgs) -> Result<(), CliError> {
    let text = read_text(input)?;

    let range = if optimize {
        let recommendation = RangeOptimizer::new().recommend_for_text(&text);
        info!("{}", recommendation.reasoning);
        recommendation.range
    } else {
        range_args.or_profile(ContentProfile::TextGeneral)?
    };

    let samples = Encoder::new().encode_text(&text, &range)?;
    info!("Encoded {} characters to {} audio samples", text.chars().count(), samples.len());
    io::write_wav(output, &samples, SAMPLE_RATE)?;

    // Needed to decode
    println!("range: {:.2}-{:.2} Hz", range.min, range.max);
    Ok(())
}

fn decode_command(input: &Path, output: Option<&Path>, range_args: RangeArgs) -> Result<(), CliError> {
    let audio = io::read_wav(input)?;
    let range = range_args.or_profile(ContentProfile::TextGeneral)?;

    let symbols = Decoder::new().decode_sequence(&audio.samples, audio.sample_rate, &range)?;
    let text = symbols_to_string(&symbols);
    info!("Decoded {} characters", symbols.len());

    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn encode_image_command(input: &Path, output: &Path, optimize: bool, range_args: RangeArgs) -> Result<(), CliError> {
    let raster = io::load_raster(input)?;

    let range = if optimize {
        let recommendation = RangeOptimizer::new().recommend_for_raster(&raster);
        info!("{}", recommendation.reasoning);
        recommendation.range
    } else {
        range_args.or_profile(ContentProfile::ImageHighDetail)?
    };

    let grid = raster.to_intensity();
    let map = RasterMap::new();
    let (width, height) = map.encoded_size(&grid);
    let frequencies = map.raster_to_frequencies(&grid, &range)?;

    let samples = Encoder::new().encode_frequencies(&frequencies)?;
    info!("Encoded {} pixels to {} audio samples", frequencies.len(), samples.len());
    io::write_wav(output, &samples, SAMPLE_RATE)?;

    println!("grid: {}x{}", width, height);
    println!("range: {:.2}-{:.2} Hz", range.min, range.max);
    Ok(())
}

fn decode_image_command(
    input: &Path,
    output: &Path,
    width: usize,
    height: usize,
    range_args: RangeArgs,
) -> Result<(), CliError> {
    if width == 0 || height == 0 {
        return Err(CliError::Usage("width and height must be positive".into()));
    }
    let audio = io::read_wav(input)?;
    let range = range_args.or_profile(ContentProfile::ImageHighDetail)?;

    let frequencies = Decoder::new().decode_frequencies(&audio.samples, audio.sample_rate)?;
    let ambiguous = frequencies.iter().filter(|f| f.is_none()).count();
    if ambiguous > 0 {
        warn!("{} pixels had no clear tone and were set to black", ambiguous);
    }

    let recovered: Vec<f64> = frequencies.into_iter().map(|f| f.unwrap_or(0.0)).collect();
    let grid = RasterMap::new().frequencies_to_raster(&recovered, width, height, &range)?;
    io::save_grid(output, &grid)
}

fn analyze_command(text: Option<&Path>, image: Option<&Path>) -> Result<(), CliError> {
    let optimizer = RangeOptimizer::new();

    let recommendation = match (text, image) {
        (Some(path), _) => optimizer.recommend_for_text(&read_text(path)?),
        (None, Some(path)) => match io::load_raster(path) {
            Ok(raster) => optimizer.recommend_for_raster(&raster),
            Err(e) => {
                let reason = FallbackReason::Unreadable(e.to_string());
                optimizer.recommend(ContentAnalyzer::fallback_image(reason), None)
            }
        },
        (None, None) => optimizer.recommend_default(),
    };

    info!("{}", recommendation.reasoning);
    print_json(&recommendation, None)
}

fn visualize_command(input: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let audio = io::read_wav(input)?;
    let data = visualize(&audio.samples, audio.sample_rate)?;
    print_json(&data, output)
}

fn transcribe_command(input: &Path, transcriber: &dyn Transcriber) -> Result<(), CliError> {
    let audio = io::read_wav(input)?;
    let outcome = transcriber.transcribe(&audio.samples, audio.sample_rate);
    if let Transcription::Unavailable(reason) = &outcome {
        warn!("Transcription unavailable: {}", reason);
    }
    print_json(&outcome, None)
}
