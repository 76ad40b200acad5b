//! CLI command definitions using clap

use animcheck::{AnimationMode, FrameSize, SizeHandling};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Animcheck: round-trip conformance checks for animated GIF encoding
#[derive(Parser, Debug)]
#[command(name = "animcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode the wipe animation, decode it and compare every frame
    Verify(VerifyArgs),

    /// Encode the wipe animation to a GIF file
    Encode(EncodeArgs),

    /// Verify every playback mode and size policy combination
    Matrix(MatrixArgs),
}

/// Options describing the animation and its encoding pipeline.
///
/// Every option is optional so that values from `--config` can fill the gaps.
#[derive(Args, Debug, Clone, Default)]
pub struct AnimationArgs {
    /// YAML run file; command-line flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Gradient width in pixels [default: 60]
    #[arg(long)]
    pub width: Option<u32>,

    /// Gradient height in pixels; the animation has twice as many frames [default: 20]
    #[arg(long)]
    pub height: Option<u32>,

    /// Playback mode [default: normal]
    #[arg(long)]
    pub mode: Option<ModeArg>,

    /// Size-handling policy [default: error-if-differs]
    #[arg(long)]
    pub size_handling: Option<SizeHandlingArg>,

    /// Stream frame size, e.g. 80x40 [default: the canvas size]
    #[arg(long, value_parser = parse_size)]
    pub size: Option<FrameSize>,

    /// Color quantizer [default: optimized]
    #[arg(long)]
    pub quantizer: Option<QuantizerArg>,

    /// Maximum colors for the optimized quantizer [default: 255]
    #[arg(long)]
    pub max_colors: Option<usize>,

    /// Background for blending partially transparent pixels [default: black]
    #[arg(long)]
    pub background: Option<BackgroundArg>,

    /// Dithering strategy [default: none]
    #[arg(long)]
    pub ditherer: Option<DithererArg>,

    /// Delay between wipe steps in milliseconds [default: 20]
    #[arg(long)]
    pub step_delay_ms: Option<u64>,

    /// Delay on the final frame in milliseconds [default: 3000]
    #[arg(long)]
    pub hold_delay_ms: Option<u64>,

    /// Loop count, 0 loops forever [default: 0]
    #[arg(long)]
    pub loop_count: Option<u16>,
}

/// Arguments for the verify command
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Animation options
    #[command(flatten)]
    pub animation: AnimationArgs,

    /// Source frame index to exclude from comparison (repeatable)
    #[arg(long = "release", value_name = "INDEX")]
    pub release: Vec<usize>,

    /// Directory for the encoded stream and diff images
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the encode command
#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Animation options
    #[command(flatten)]
    pub animation: AnimationArgs,

    /// Output GIF path
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,
}

/// Arguments for the matrix command
#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    /// Animation options (mode and size policy are iterated)
    #[command(flatten)]
    pub animation: AnimationArgs,

    /// Summary format
    #[arg(long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Playback mode argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Play forward once per loop
    Normal,
    /// Play forward then backward
    PingPong,
}

impl From<ModeArg> for AnimationMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Normal => Self::Normal,
            ModeArg::PingPong => Self::PingPong,
        }
    }
}

/// Size-handling argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeHandlingArg {
    /// Fail when sizes differ
    ErrorIfDiffers,
    /// Scale to the stream size
    Resize,
    /// Center unscaled on the stream frame
    Center,
}

impl From<SizeHandlingArg> for SizeHandling {
    fn from(arg: SizeHandlingArg) -> Self {
        match arg {
            SizeHandlingArg::ErrorIfDiffers => Self::ErrorIfDiffers,
            SizeHandlingArg::Resize => Self::Resize,
            SizeHandlingArg::Center => Self::Center,
        }
    }
}

/// Quantizer argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuantizerArg {
    /// Content-adaptive palette (exact or NeuQuant)
    #[default]
    Optimized,
    /// 216-color web-safe cube
    WebSafe,
    /// 16 gray levels
    Grayscale,
    /// Black and white
    BlackAndWhite,
    /// True color; only works when frames have at most 256 colors
    Rgb888,
}

/// Background argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundArg {
    /// Blend over black
    #[default]
    Black,
    /// Blend over white
    White,
}

/// Ditherer argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DithererArg {
    /// No dithering
    #[default]
    None,
    /// Floyd-Steinberg error diffusion
    FloydSteinberg,
    /// 8x8 ordered Bayer matrix
    Bayer,
}

fn parse_size(s: &str) -> Result<FrameSize, String> {
    s.parse::<FrameSize>().map_err(|e| e.to_string())
}
