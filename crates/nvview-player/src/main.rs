mod app;
mod source;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nvview_engine::device::GpuInit;
use nvview_engine::logging::{init_logging, LoggingConfig};
use nvview_engine::render::yuv::{frame_len, PixelFormat, RendererConfig};
use nvview_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

use app::{PlayerApp, StreamInfo};
use source::FrameSource;

#[derive(Parser, Clone, Debug)]
#[command(version, about = "Plays raw NV21/NV12 frames in a window")]
pub struct Config {
    /// Raw frame file, frames stored back to back. Color bars when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Frame width in pixels (even).
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Frame height in pixels (even).
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Chroma order: nv21 or nv12.
    #[arg(long, default_value = "nv21")]
    pub format: PixelFormat,

    /// Flip the picture horizontally.
    #[arg(long)]
    pub mirror: bool,

    /// Rotation in degrees: 0, 90, 180 or 270.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub orientation: i32,

    /// Playback rate of the stream.
    #[arg(long, default_value_t = 30.0)]
    pub fps: f32,

    /// Clear to opaque black instead of transparent.
    #[arg(long)]
    pub opaque: bool,

    /// Log filter, env_logger syntax. Overrides RUST_LOG.
    #[arg(long)]
    pub log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    init_logging(LoggingConfig {
        env_filter: config.log.clone(),
        ..LoggingConfig::default()
    });

    let len = frame_len(config.width, config.height).context("invalid frame size")?;

    let mut renderer_config =
        RendererConfig::from_host(config.mirror, config.orientation).context("invalid orientation")?;
    if config.opaque {
        renderer_config.clear_color = wgpu::Color::BLACK;
    }

    let source = match &config.input {
        Some(path) => FrameSource::open(path)?,
        None => FrameSource::bars(),
    };

    log::info!(
        "playing {} {}x{} at {} fps (mirror={}, orientation={})",
        config.format,
        config.width,
        config.height,
        config.fps,
        config.mirror,
        renderer_config.orientation.degrees()
    );

    let stream = StreamInfo {
        width: config.width,
        height: config.height,
        format: config.format,
        fps: config.fps,
    };

    Runtime::run(
        RuntimeConfig {
            title: format!("nvview - {} {}x{}", config.format, config.width, config.height),
            initial_size: LogicalSize::new(config.width as f64, config.height as f64),
        },
        GpuInit::default(),
        PlayerApp::new(stream, renderer_config, source, len),
    )
}
