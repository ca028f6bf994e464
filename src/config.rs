use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sdf-sandbox",
    version,
    about = "Live tiled box-SDF pattern with a tweakable parameter panel"
)]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Preset applied at startup (see --list-presets).
    #[arg(long)]
    pub preset: Option<String>,

    /// Initial tiling repeat factor. Must be positive.
    #[arg(long, default_value_t = 4.0, value_parser = parse_tile)]
    pub tile: f32,

    /// Shader samples per pixel axis.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=8))]
    pub samples: u32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Write logs here; without it logs are discarded (the terminal is in raw mode).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub list_presets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
}

fn parse_tile(raw: &str) -> Result<f32, String> {
    let v: f32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("tile must be a positive finite number, got {v}"));
    }
    Ok(v)
}
