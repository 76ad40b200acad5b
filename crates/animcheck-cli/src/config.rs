//! CLI configuration: global flags and the YAML run file

use crate::commands::{AnimationArgs, BackgroundArg, DithererArg, QuantizerArg};
use crate::error::{CliError, CliResult};
use animcheck::{
    AnimationConfig, AnimationMode, ErrorDiffusion, FrameSize, OptimizedPalette, OrderedDither,
    PredefinedColors, SizeHandling, WipeAnimation,
};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gradient width when neither flag nor run file sets one
pub const DEFAULT_WIDTH: u32 = 60;
/// Gradient height when neither flag nor run file sets one
pub const DEFAULT_HEIGHT: u32 = 20;
/// Wipe step delay in milliseconds
pub const DEFAULT_STEP_DELAY_MS: u64 = 20;
/// Final-frame hold in milliseconds
pub const DEFAULT_HOLD_DELAY_MS: u64 = 3000;
/// Palette size for the optimized quantizer
pub const DEFAULT_MAX_COLORS: usize = 255;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - stage-level logs
    Verbose,
    /// Debug - per-frame logs
    Debug,
    /// Trace - everything
    Trace,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug | Self::Trace)
    }

    /// Default `tracing` filter directive for this level
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Text,
    /// JSON lines
    Json,
}

/// CLI configuration derived from global flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Log line format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set log format
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

/// Contents of a `--config` YAML run file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Gradient width
    pub width: Option<u32>,
    /// Gradient height
    pub height: Option<u32>,
    /// Playback mode
    pub mode: Option<AnimationMode>,
    /// Size-handling policy
    pub size_handling: Option<SizeHandling>,
    /// Stream frame size
    pub size: Option<FrameSize>,
    /// Quantizer
    pub quantizer: Option<QuantizerArg>,
    /// Palette size for the optimized quantizer
    pub max_colors: Option<usize>,
    /// Blend background
    pub background: Option<BackgroundArg>,
    /// Ditherer
    pub ditherer: Option<DithererArg>,
    /// Wipe step delay in milliseconds
    pub step_delay_ms: Option<u64>,
    /// Final-frame hold in milliseconds
    pub hold_delay_ms: Option<u64>,
    /// Loop count (0 = forever)
    pub loop_count: Option<u16>,
    /// Source frames excluded from comparison
    pub release: Vec<usize>,
    /// Artifact directory
    pub save_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Parse a YAML run file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or contains unknown keys
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read run file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or unknown keys
    pub fn from_yaml(text: &str) -> CliResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }
}

/// Fully merged run settings: flags over run file over defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRun {
    /// Gradient width
    pub width: u32,
    /// Gradient height
    pub height: u32,
    /// Playback mode
    pub mode: AnimationMode,
    /// Size-handling policy
    pub size_handling: SizeHandling,
    /// Stream frame size, `None` for the canvas size
    pub size: Option<FrameSize>,
    /// Quantizer
    pub quantizer: QuantizerArg,
    /// Palette size for the optimized quantizer
    pub max_colors: usize,
    /// Blend background
    pub background: BackgroundArg,
    /// Ditherer
    pub ditherer: DithererArg,
    /// Wipe step delay in milliseconds
    pub step_delay_ms: u64,
    /// Final-frame hold in milliseconds
    pub hold_delay_ms: u64,
    /// Loop count
    pub loop_count: u16,
    /// Released source frames
    pub release: Vec<usize>,
    /// Artifact directory
    pub save_dir: Option<PathBuf>,
}

impl ResolvedRun {
    /// Merge animation flags with the run file they name, if any
    ///
    /// # Errors
    ///
    /// Returns error if the run file cannot be loaded
    pub fn from_args(
        args: &AnimationArgs,
        release: &[usize],
        save_dir: Option<&Path>,
    ) -> CliResult<Self> {
        let file = match &args.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        Ok(Self::merge(args, release, save_dir, file))
    }

    /// Merge flags over `file` over defaults
    #[must_use]
    pub fn merge(
        args: &AnimationArgs,
        release: &[usize],
        save_dir: Option<&Path>,
        file: RunConfig,
    ) -> Self {
        let mut released = if release.is_empty() {
            file.release
        } else {
            release.to_vec()
        };
        released.sort_unstable();
        released.dedup();

        Self {
            width: args.width.or(file.width).unwrap_or(DEFAULT_WIDTH),
            height: args.height.or(file.height).unwrap_or(DEFAULT_HEIGHT),
            mode: args.mode.map(Into::into).or(file.mode).unwrap_or_default(),
            size_handling: args
                .size_handling
                .map(Into::into)
                .or(file.size_handling)
                .unwrap_or_default(),
            size: args.size.or(file.size),
            quantizer: args.quantizer.or(file.quantizer).unwrap_or_default(),
            max_colors: args
                .max_colors
                .or(file.max_colors)
                .unwrap_or(DEFAULT_MAX_COLORS),
            background: args.background.or(file.background).unwrap_or_default(),
            ditherer: args.ditherer.or(file.ditherer).unwrap_or_default(),
            step_delay_ms: args
                .step_delay_ms
                .or(file.step_delay_ms)
                .unwrap_or(DEFAULT_STEP_DELAY_MS),
            hold_delay_ms: args
                .hold_delay_ms
                .or(file.hold_delay_ms)
                .unwrap_or(DEFAULT_HOLD_DELAY_MS),
            loop_count: args.loop_count.or(file.loop_count).unwrap_or(0),
            release: released,
            save_dir: save_dir.map(Path::to_path_buf).or(file.save_dir),
        }
    }

    /// Background colour for blending
    #[must_use]
    pub const fn background_color(&self) -> Rgba<u8> {
        match self.background {
            BackgroundArg::Black => Rgba([0, 0, 0, 255]),
            BackgroundArg::White => Rgba([255, 255, 255, 255]),
        }
    }

    /// Build the wipe animation
    ///
    /// # Errors
    ///
    /// Returns error on a zero dimension or a hold delay not longer than the step delay
    pub fn wipe(&self) -> CliResult<WipeAnimation> {
        let wipe = WipeAnimation::from_gradient(self.width, self.height)?.with_delays(
            Duration::from_millis(self.step_delay_ms),
            Duration::from_millis(self.hold_delay_ms),
        )?;
        Ok(wipe)
    }

    /// Build the animation configuration with the given playback mode and policy
    ///
    /// # Errors
    ///
    /// Returns error if the wipe or the quantizer cannot be built
    pub fn animation_config_with(
        &self,
        mode: AnimationMode,
        size_handling: SizeHandling,
    ) -> CliResult<AnimationConfig> {
        let background = self.background_color();
        let mut config = AnimationConfig::new(self.wipe()?)?
            .with_mode(mode)
            .with_size_handling(size_handling)
            .with_loop_count(self.loop_count);
        if let Some(size) = self.size {
            config = config.with_size(size);
        }

        config = match self.quantizer {
            QuantizerArg::Optimized => config.with_quantizer(
                OptimizedPalette::new(self.max_colors)?.with_background(background),
            ),
            QuantizerArg::WebSafe => config.with_quantizer(PredefinedColors::web_safe(background)),
            QuantizerArg::Grayscale => {
                config.with_quantizer(PredefinedColors::grayscale(background))
            }
            QuantizerArg::BlackAndWhite => {
                config.with_quantizer(PredefinedColors::black_and_white(background))
            }
            QuantizerArg::Rgb888 => config.with_quantizer(PredefinedColors::rgb888(background)),
        };

        config = match self.ditherer {
            DithererArg::None => config,
            DithererArg::FloydSteinberg => config.with_ditherer(ErrorDiffusion::floyd_steinberg()),
            DithererArg::Bayer => config.with_ditherer(OrderedDither::bayer8x8()),
        };
        Ok(config)
    }

    /// Build the animation configuration for this run
    ///
    /// # Errors
    ///
    /// Returns error if the wipe or the quantizer cannot be built
    pub fn animation_config(&self) -> CliResult<AnimationConfig> {
        self.animation_config_with(self.mode, self.size_handling)
    }
}
