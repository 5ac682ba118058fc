use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ionstage",
    author,
    version,
    about = "Procedural lightning stage with a scroll-driven media reveal",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scene file (TOML). Without one, `scene.toml` in the config directory
    /// is tried, then the built-in single-section scene.
    #[arg(value_name = "SCENE")]
    pub scene: Option<PathBuf>,

    /// Override the window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap for the animation loop (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Base hue of the bolt in degrees, [0, 360).
    #[arg(long, value_name = "DEGREES", value_parser = parse_hue, conflicts_with = "scene")]
    pub hue: Option<f32>,

    /// Horizontal shift of the bolt in normalized units.
    #[arg(
        long,
        value_name = "OFFSET",
        allow_negative_numbers = true,
        conflicts_with = "scene"
    )]
    pub x_offset: Option<f32>,

    /// Time multiplier for the noise flow.
    #[arg(long, value_name = "FACTOR", conflicts_with = "scene")]
    pub speed: Option<f32>,

    /// Brightness multiplier.
    #[arg(long, value_name = "FACTOR", conflicts_with = "scene")]
    pub intensity: Option<f32>,

    /// Noise frequency multiplier.
    #[arg(long, value_name = "FACTOR", conflicts_with = "scene")]
    pub pattern_size: Option<f32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a scene file and print a summary without opening a window.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Scene file to validate.
    #[arg(value_name = "SCENE")]
    pub scene: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("surface size must not be empty".to_string());
    }

    let (w, h) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT (e.g. 1280x720)".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in surface size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in surface size".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface width and height must be nonzero".to_string());
    }
    Ok((width, height))
}

pub fn parse_hue(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("hue must not be empty".to_string());
    }

    let hue: f32 = trimmed
        .parse()
        .map_err(|_| format!("invalid hue '{trimmed}'"))?;
    if !(0.0..360.0).contains(&hue) {
        return Err(format!("hue must be in [0, 360); got {hue}"));
    }
    Ok(hue)
}
