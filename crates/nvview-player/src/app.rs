use nvview_engine::coords::Viewport;
use nvview_engine::core::{App, AppControl, FrameCtx};
use nvview_engine::render::yuv::{PixelFormat, RendererConfig, YuvFrame, YuvRenderer};
use nvview_engine::time::FramePacer;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::source::FrameSource;

/// Frame geometry and format shared by the source and the renderer.
#[derive(Debug, Copy, Clone)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub fps: f32,
}

/// Plays a [`FrameSource`] through a [`YuvRenderer`].
///
/// The renderer is created on the first frame, once a device exists.
pub struct PlayerApp {
    stream: StreamInfo,
    renderer_config: RendererConfig,
    source: FrameSource,
    buffer: Vec<u8>,
    pacer: FramePacer,
    has_frame: bool,
    renderer: Option<YuvRenderer>,
}

impl PlayerApp {
    /// `frame_len` must be the validated byte length of one frame.
    pub fn new(
        stream: StreamInfo,
        renderer_config: RendererConfig,
        source: FrameSource,
        frame_len: usize,
    ) -> Self {
        Self {
            stream,
            renderer_config,
            source,
            buffer: vec![0; frame_len],
            pacer: FramePacer::new(stream.fps),
            has_frame: false,
            renderer: None,
        }
    }

    fn advance_source(&mut self, dt: f32) -> anyhow::Result<()> {
        let steps = if self.has_frame { self.pacer.advance(dt) } else { 1 };
        let StreamInfo { width, height, format, .. } = self.stream;
        for _ in 0..steps {
            self.source.next_frame(&mut self.buffer, width, height, format)?;
        }
        self.has_frame = true;
        Ok(())
    }
}

/// Whether the renderer's viewport lags behind the configured surface.
///
/// The surface is also reconfigured on scale-factor changes, which carry no
/// size of their own. Before the first resize the renderer draws to the full
/// target and needs nothing.
fn viewport_is_stale(renderer: Option<Viewport>, surface: Viewport) -> bool {
    renderer.is_some_and(|vp| vp != surface)
}

impl App for PlayerApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
                AppControl::Continue
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.renderer.is_none() {
            match YuvRenderer::new(&ctx.gpu.render_ctx(), self.renderer_config) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(err) => {
                    log::error!("failed to initialize renderer: {err}");
                    return AppControl::Exit;
                }
            }
        }

        let surface = ctx.gpu.viewport();
        if let Some(renderer) = self.renderer.as_mut() {
            if viewport_is_stale(renderer.viewport(), surface) {
                renderer.resize(surface.width, surface.height);
            }
        }

        if let Err(err) = self.advance_source(ctx.time.dt) {
            log::error!("{err:#}");
            return AppControl::Exit;
        }

        let StreamInfo { width, height, format, .. } = self.stream;
        let frame = match YuvFrame::new(&self.buffer, width, height, format) {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::error!("invalid frame: {err}");
                None
            }
        };

        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Exit;
        };

        ctx.render(|rctx, target| renderer.render(rctx, target, frame.as_ref()))
    }
}

impl Drop for PlayerApp {
    fn drop(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            let stats = renderer.stats();
            log::info!(
                "played {} frames ({} skipped)",
                stats.frames_rendered,
                stats.frames_skipped
            );
            renderer.shutdown();
        }
    }
}
