use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, debug};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};
use vipsize::config::{self, VipsizeConfig};
use vipsize::engine::{self, Engine};
use vipsize::imaging::{
    Angle, AutoRotated, Extend, Gravity, ImageFormat, Interpolator, Options, Quality,
};
use vipsize::output;

#[derive(Parser)]
#[command(name = "vipsize")]
#[command(about = "Resize and auto-rotate JPEG, PNG and WebP images")]
#[command(long_about = "\
Resize and auto-rotate JPEG, PNG and WebP images

Input format is detected from the file content. Large JPEGs are decoded at
reduced scale when the target is much smaller, and EXIF orientation is
applied unless --no-auto-rotate is given.

Option precedence (last wins):
  stock defaults → vipsize.toml [defaults] → command-line flags

Run 'vipsize gen-config' to generate a documented vipsize.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./vipsize.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Request flags. Anything left out falls back to the config file.
#[derive(clap::Args, Clone, Default)]
struct OptionArgs {
    /// Target width in pixels (0 = derive from height)
    #[arg(long)]
    width: Option<u32>,
    /// Target height in pixels (0 = derive from width)
    #[arg(long)]
    height: Option<u32>,
    /// Fill the target box and cut the overflow
    #[arg(long, overrides_with = "no_crop")]
    crop: bool,
    /// Turn off crop set in the config file
    #[arg(long, overrides_with = "crop")]
    no_crop: bool,
    /// Allow upscaling
    #[arg(long, overrides_with = "no_enlarge")]
    enlarge: bool,
    /// Turn off enlarge set in the config file
    #[arg(long, overrides_with = "enlarge")]
    no_enlarge: bool,
    /// Pad to the full target box
    #[arg(long, overrides_with = "no_embed")]
    embed: bool,
    /// Turn off embed set in the config file
    #[arg(long, overrides_with = "embed")]
    no_embed: bool,
    /// Border colour for --embed
    #[arg(long, value_enum)]
    extend: Option<ExtendArg>,
    /// Resampling kernel
    #[arg(long, value_enum)]
    interpolator: Option<InterpolatorArg>,
    /// Crop anchor
    #[arg(long, value_enum)]
    gravity: Option<GravityArg>,
    /// Custom gravity x position (0.0-1.0)
    #[arg(long)]
    left_pos: Option<f32>,
    /// Custom gravity y position (0.0-1.0)
    #[arg(long)]
    top_pos: Option<f32>,
    /// Encoder quality 1-100 (JPEG only)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,
    /// Output format (default: from config, else jpeg)
    #[arg(long, value_enum)]
    savetype: Option<FormatArg>,
    /// Ignore the EXIF orientation tag
    #[arg(long, overrides_with = "auto_rotate")]
    no_auto_rotate: bool,
    /// Follow the EXIF orientation tag even if the config file says not to
    #[arg(long, overrides_with = "no_auto_rotate")]
    auto_rotate: bool,
    /// Clockwise rotation in degrees (rounded down to 0/90/180/270)
    #[arg(long, allow_negative_numbers = true)]
    rotate: Option<i64>,
    /// Mirror left-right
    #[arg(long, overrides_with = "no_flip")]
    flip: bool,
    /// Turn off flip set in the config file
    #[arg(long, overrides_with = "flip")]
    no_flip: bool,
    /// Mirror top-bottom
    #[arg(long, overrides_with = "no_flop")]
    flop: bool,
    /// Turn off flop set in the config file
    #[arg(long, overrides_with = "flop")]
    no_flop: bool,
}

/// Resolve a `--x` / `--no-x` pair. `None` when neither was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum ExtendArg {
    Black,
    White,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum InterpolatorArg {
    Bicubic,
    Bilinear,
    Nohalo,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum GravityArg {
    Centre,
    North,
    East,
    South,
    West,
    Custom,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum FormatArg {
    Jpeg,
    Png,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

impl OptionArgs {
    /// Overlay the flags that were given on top of `base`.
    fn apply(&self, base: &Options) -> Options {
        let mut opts = base.clone();
        if let Some(width) = self.width {
            opts.width = width;
        }
        if let Some(height) = self.height {
            opts.height = height;
        }
        // Asking for one canvas mode drops the other one from the config.
        if let Some(crop) = switch(self.crop, self.no_crop) {
            opts.crop = crop;
            opts.embed &= !crop;
        }
        if let Some(embed) = switch(self.embed, self.no_embed) {
            opts.embed = embed;
            opts.crop &= !embed;
        }
        if let Some(enlarge) = switch(self.enlarge, self.no_enlarge) {
            opts.enlarge = enlarge;
        }
        if let Some(extend) = self.extend {
            opts.extend = match extend {
                ExtendArg::Black => Extend::Black,
                ExtendArg::White => Extend::White,
            };
        }
        if let Some(interpolator) = self.interpolator {
            opts.interpolator = match interpolator {
                InterpolatorArg::Bicubic => Interpolator::Bicubic,
                InterpolatorArg::Bilinear => Interpolator::Bilinear,
                InterpolatorArg::Nohalo => Interpolator::Nohalo,
            };
        }
        if let Some(gravity) = self.gravity {
            opts.gravity = match gravity {
                GravityArg::Centre => Gravity::Centre,
                GravityArg::North => Gravity::North,
                GravityArg::East => Gravity::East,
                GravityArg::South => Gravity::South,
                GravityArg::West => Gravity::West,
                GravityArg::Custom => Gravity::Custom,
            };
        }
        if let Some(left_pos) = self.left_pos {
            opts.left_pos = left_pos;
        }
        if let Some(top_pos) = self.top_pos {
            opts.top_pos = top_pos;
        }
        if let Some(quality) = self.quality {
            opts.quality = Quality::new(quality);
        }
        if let Some(savetype) = self.savetype {
            opts.savetype = savetype.into();
        }
        if let Some(no_auto_rotate) = switch(self.no_auto_rotate, self.auto_rotate) {
            opts.no_auto_rotate = no_auto_rotate;
        }
        if let Some(degrees) = self.rotate {
            opts.rotate = Angle::from_degrees(degrees);
        }
        if let Some(flip) = switch(self.flip, self.no_flip) {
            opts.flip = flip;
        }
        if let Some(flop) = switch(self.flop, self.no_flop) {
            opts.flop = flop;
        }
        opts
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resize an image and write the re-encoded result
    Resize {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Apply the EXIF orientation and write an upright copy
    AutoRotate {
        input: PathBuf,
        output: PathBuf,
        /// Output format (default: from config, else jpeg)
        #[arg(long, value_enum)]
        savetype: Option<FormatArg>,
        /// Encoder quality 1-100 (JPEG only)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        quality: Option<u32>,
    },
    /// Show the resize plan for an image without processing it
    Plan {
        input: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Print a stock vipsize.toml with all options documented
    GenConfig,
}

fn init_tracing(verbosity: u8) {
    // map -v to log level
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("vipsize={level}")
            .parse()
            .unwrap_or_else(|_| LevelFilter::from_level(level).into()),
    );
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<VipsizeConfig, config::ConfigError> {
    let config = config::load_config(path)?;
    debug!("effective config: {config:?}");
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize {
            input,
            output,
            options,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let opts = options.apply(&config.defaults);
            let engine = Engine::new(config.engine);
            let buf = std::fs::read(&input)?;
            let encoded = engine.resize(&buf, &opts)?;
            std::fs::write(&output, &encoded)?;
            output::print_resize_output(&input, &output, opts.savetype, encoded.len());
        }
        Command::AutoRotate {
            input,
            output,
            savetype,
            quality,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut opts = config.defaults.clone();
            if let Some(savetype) = savetype {
                opts.savetype = savetype.into();
            }
            if let Some(quality) = quality {
                opts.quality = Quality::new(quality);
            }
            let engine = Engine::new(config.engine);
            let outcome = engine.auto_rotate(&input, &opts)?;
            if let AutoRotated::Rotated(encoded) = &outcome {
                std::fs::write(&output, encoded)?;
            }
            output::print_auto_rotate_output(&input, &output, opts.savetype, &outcome);
        }
        Command::Plan {
            input,
            json,
            options,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let opts = options.apply(&config.defaults);
            let engine = Engine::new(config.engine);
            let buf = std::fs::read(&input)?;
            let request = engine.plan(&buf, &opts)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output::plan_json(&request))?);
            } else {
                output::print_plan_output(&request);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    engine::shutdown();
    Ok(())
}
