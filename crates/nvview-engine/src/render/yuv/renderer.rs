use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::render::{RenderCtx, RenderTarget};

use super::quad::{tex_coord_layout, texture_coords, Orientation, QuadVertex, QUAD_INDICES, QUAD_VERTICES};
use super::shader::{program_source, validate_program};
use super::textures::{PlaneSlot, TextureState};
use super::{PixelFormat, RenderError, YuvFrame};

/// Session-wide renderer settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererConfig {
    /// Flip the frame horizontally (front cameras).
    pub mirror: bool,
    /// Rotation applied when sampling the frame.
    pub orientation: Orientation,
    /// Color the target is cleared to before each frame.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            mirror: false,
            orientation: Orientation::Deg0,
            clear_color: wgpu::Color::TRANSPARENT,
        }
    }
}

impl RendererConfig {
    /// Builds a config from the raw `(mirror, degrees)` pair a host passes in.
    pub fn from_host(mirror: bool, orientation_degrees: i32) -> Result<Self, RenderError> {
        Ok(Self {
            mirror,
            orientation: Orientation::from_degrees(orientation_degrees)?,
            ..Self::default()
        })
    }
}

/// Counters describing what the renderer has done so far.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub frames_rendered: u64,
    /// Render calls that arrived without a frame.
    pub frames_skipped: u64,
    pub texture_allocations: u64,
    pub texture_releases: u64,
}

impl RendererStats {
    /// Texture pairs currently held (0 or 1).
    pub fn live_texture_pairs(&self) -> u64 {
        self.texture_allocations - self.texture_releases
    }
}

/// Shader module and pipeline for one pixel format.
struct FormatProgram {
    module: wgpu::ShaderModule,
    pipeline: wgpu::RenderPipeline,
}

impl FormatProgram {
    fn new(
        ctx: &RenderCtx<'_>,
        layout: &wgpu::PipelineLayout,
        format: PixelFormat,
    ) -> Result<Self, RenderError> {
        let source = program_source(format);
        if let Err(log) = validate_program(&source) {
            log::error!("error building {format} program: {log}");
            return Err(RenderError::ShaderCompile { format, log });
        }

        let label = format!("nvview {format} shader");
        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline = build_pipeline(ctx.device, layout, &module, ctx.surface_format);

        Ok(Self { module, pipeline })
    }
}

/// Draws NV21/NV12 frames as a full-target textured quad.
///
/// Owns every GPU resource it creates; dropping the renderer releases them.
/// Plane textures are kept across frames of the same size and rebuilt after
/// [`resize`](Self::resize) or when the frame size changes.
pub struct YuvRenderer {
    config: RendererConfig,
    tex_coords: [[f32; 2]; 4],

    // pipelines
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline_format: wgpu::TextureFormat,
    nv21: FormatProgram,
    nv12: FormatProgram,
    sampler: wgpu::Sampler,

    // geometry
    position_vbo: wgpu::Buffer,
    tex_coord_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,

    planes: PlaneSlot,

    viewport: Option<Viewport>,
    stats: RendererStats,
}

impl YuvRenderer {
    /// Builds both format programs, the sampler and the static quad buffers.
    ///
    /// Fails with [`RenderError::ShaderCompile`] when a program does not
    /// validate; nothing is kept alive in that case.
    pub fn new(ctx: &RenderCtx<'_>, config: RendererConfig) -> Result<Self, RenderError> {
        log::debug!(
            "YuvRenderer::new(mirror={}, orientation={})",
            config.mirror,
            config.orientation.degrees()
        );

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nvview plane bgl"),
            entries: &[
                plane_layout_entry(0),
                plane_layout_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nvview yuv pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let nv21 = FormatProgram::new(ctx, &pipeline_layout, PixelFormat::Nv21)?;
        let nv12 = FormatProgram::new(ctx, &pipeline_layout, PixelFormat::Nv12)?;

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nvview plane sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let tex_coords = texture_coords(config.orientation, config.mirror);
        if config.mirror {
            log::debug!("mirroring enabled");
        }

        let position_vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nvview quad position vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coord_vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nvview quad tex coord vbo"),
            contents: bytemuck::cast_slice(&tex_coords),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nvview quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            config,
            tex_coords,
            bind_group_layout,
            pipeline_layout,
            pipeline_format: ctx.surface_format,
            nv21,
            nv12,
            sampler,
            position_vbo,
            tex_coord_vbo,
            quad_ibo,
            planes: PlaneSlot::default(),
            viewport: None,
            stats: RendererStats::default(),
        })
    }

    /// Texture coordinates uploaded for the quad corners.
    pub fn texture_coords(&self) -> [[f32; 2]; 4] {
        self.tex_coords
    }

    pub fn texture_state(&self) -> TextureState {
        self.planes.state()
    }

    /// Viewport set by the last [`resize`](Self::resize), if any.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Records a new surface size.
    ///
    /// The next frame draws into `(0, 0, width, height)` and gets a fresh
    /// texture pair.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("YuvRenderer::resize({width}, {height})");
        self.planes.invalidate();
        self.viewport = Some(Viewport::new(width, height));
    }

    /// Uploads `frame` and draws it into `target`.
    ///
    /// A missing frame, or one larger than the device's texture limit, is
    /// logged and skipped without touching the GPU.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: Option<&YuvFrame<'_>>,
    ) {
        let Some(frame) = frame else {
            log::error!("render called without a frame buffer; skipping");
            self.stats.frames_skipped += 1;
            return;
        };

        let max_dim = ctx.device.limits().max_texture_dimension_2d;
        if frame.width() > max_dim || frame.height() > max_dim {
            log::error!(
                "frame {}x{} exceeds the device texture limit of {max_dim}; skipping",
                frame.width(),
                frame.height()
            );
            self.stats.frames_skipped += 1;
            return;
        }

        self.ensure_pipelines(ctx);

        let planes = self.planes.ensure(
            ctx.device,
            &self.bind_group_layout,
            &self.sampler,
            frame.width(),
            frame.height(),
            &mut self.stats,
        );
        planes.upload(ctx.queue, frame);

        let viewport = self.viewport.and_then(|vp| vp.clamped_to(target.size));
        let pipeline = match frame.format() {
            PixelFormat::Nv21 => &self.nv21.pipeline,
            PixelFormat::Nv12 => &self.nv12.pipeline,
        };

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("nvview yuv pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(vp) = viewport {
                rpass.set_viewport(0.0, 0.0, vp.width as f32, vp.height as f32, 0.0, 1.0);
            }

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, planes.bind_group(), &[]);
            rpass.set_vertex_buffer(0, self.position_vbo.slice(..));
            rpass.set_vertex_buffer(1, self.tex_coord_vbo.slice(..));
            rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }

        self.stats.frames_rendered += 1;
    }

    /// Releases the renderer and every GPU resource it owns.
    pub fn shutdown(self) {
        log::debug!("YuvRenderer::shutdown");
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == ctx.surface_format {
            return;
        }

        log::debug!(
            "target format changed {:?} -> {:?}; rebuilding pipelines",
            self.pipeline_format,
            ctx.surface_format
        );

        for program in [&mut self.nv21, &mut self.nv12] {
            program.pipeline =
                build_pipeline(ctx.device, &self.pipeline_layout, &program.module, ctx.surface_format);
        }
        self.pipeline_format = ctx.surface_format;
    }
}

impl Drop for YuvRenderer {
    fn drop(&mut self) {
        if self.planes.release() {
            self.stats.texture_releases += 1;
        }
        log::debug!(
            "YuvRenderer released: {} frames rendered, {} skipped, {} texture pairs allocated",
            self.stats.frames_rendered,
            self.stats.frames_skipped,
            self.stats.texture_allocations
        );
    }
}

fn plane_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("nvview yuv pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[QuadVertex::layout(), tex_coord_layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessGpu;
    use crate::render::yuv::frame_len;

    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    const TARGET_SIZE: Viewport = Viewport::new(32, 32);

    // ── helpers ───────────────────────────────────────────────────────────

    fn headless() -> Option<HeadlessGpu> {
        match pollster::block_on(HeadlessGpu::new()) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                eprintln!("skipping GPU test: {err:#}");
                None
            }
        }
    }

    fn gray_frame(width: u32, height: u32) -> Vec<u8> {
        vec![128u8; frame_len(width, height).unwrap()]
    }

    fn draw(gpu: &HeadlessGpu, renderer: &mut YuvRenderer, frame: Option<&YuvFrame<'_>>) -> wgpu::Texture {
        let ctx = gpu.render_ctx(TARGET_FORMAT);
        let texture = gpu.offscreen_target(TARGET_SIZE, TARGET_FORMAT);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test encoder") });
        {
            let mut target = RenderTarget::new(&mut encoder, &view, TARGET_SIZE);
            renderer.render(&ctx, &mut target, frame);
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));
        texture
    }

    /// Renders `frame` and returns the RGBA target pixels.
    fn draw_pixels(gpu: &HeadlessGpu, renderer: &mut YuvRenderer, frame: &YuvFrame<'_>) -> Vec<u8> {
        let texture = draw(gpu, renderer, Some(frame));
        gpu.read_pixels(&texture).unwrap()
    }

    fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * TARGET_SIZE.width + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    /// Red channel of the four target corners: top-left, top-right,
    /// bottom-left, bottom-right.
    fn corner_reds(pixels: &[u8]) -> [u8; 4] {
        let (r, b) = (TARGET_SIZE.width - 1, TARGET_SIZE.height - 1);
        [pixel(pixels, 0, 0)[0], pixel(pixels, r, 0)[0], pixel(pixels, 0, b)[0], pixel(pixels, r, b)[0]]
    }

    /// 4x2 frame: left half white, right half black, neutral chroma.
    fn half_white_frame() -> Vec<u8> {
        let mut data = vec![128u8; frame_len(4, 2).unwrap()];
        data[..8].copy_from_slice(&[255, 255, 0, 0, 255, 255, 0, 0]);
        data
    }

    fn is_white(red: u8) -> bool {
        red > 250
    }

    fn renderer(gpu: &HeadlessGpu, config: RendererConfig) -> YuvRenderer {
        YuvRenderer::new(&gpu.render_ctx(TARGET_FORMAT), config).unwrap()
    }

    // ── config ────────────────────────────────────────────────────────────

    #[test]
    fn host_config_accepts_quarter_turns() {
        let config = RendererConfig::from_host(true, 270).unwrap();
        assert!(config.mirror);
        assert_eq!(config.orientation, Orientation::Deg270);
        assert_eq!(config.clear_color, wgpu::Color::TRANSPARENT);
    }

    #[test]
    fn host_config_rejects_other_angles() {
        assert!(matches!(
            RendererConfig::from_host(false, 100),
            Err(RenderError::InvalidOrientation(100))
        ));
    }

    #[test]
    fn live_pairs_is_allocations_minus_releases() {
        let stats = RendererStats {
            texture_allocations: 3,
            texture_releases: 2,
            ..RendererStats::default()
        };
        assert_eq!(stats.live_texture_pairs(), 1);
    }

    // ── GPU-backed ────────────────────────────────────────────────────────

    #[test]
    fn init_uploads_expected_coords_for_every_combination() {
        let Some(gpu) = headless() else { return };
        for degrees in [0, 90, 180, 270] {
            for mirror in [false, true] {
                let config = RendererConfig::from_host(mirror, degrees).unwrap();
                let r = renderer(&gpu, config);
                assert_eq!(r.texture_coords(), texture_coords(config.orientation, mirror));
                assert_eq!(r.texture_state(), TextureState::Unallocated);
                assert_eq!(r.viewport(), None);
            }
        }
    }

    #[test]
    fn missing_frame_is_skipped_without_gpu_work() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());

        draw(&gpu, &mut r, None);

        let stats = r.stats();
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(stats.frames_rendered, 0);
        assert_eq!(stats.texture_allocations, 0);
        assert_eq!(r.texture_state(), TextureState::Unallocated);
    }

    #[test]
    fn oversized_frame_is_skipped() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());
        let width = (gpu.device().limits().max_texture_dimension_2d + 2) & !1;
        let data = gray_frame(width, 2);
        let frame = YuvFrame::new(&data, width, 2, PixelFormat::Nv21).unwrap();

        draw(&gpu, &mut r, Some(&frame));

        let stats = r.stats();
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(stats.frames_rendered, 0);
        assert_eq!(stats.texture_allocations, 0);
        assert_eq!(r.texture_state(), TextureState::Unallocated);
    }

    #[test]
    fn red_frame_converts_to_red_in_both_formats() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());

        // Full-range red: Y=76, U=85, V=255.
        let nv21 = [76u8, 76, 76, 76, 255, 85];
        let nv12 = [76u8, 76, 76, 76, 85, 255];

        for (data, format) in [(nv21, PixelFormat::Nv21), (nv12, PixelFormat::Nv12)] {
            let frame = YuvFrame::new(&data, 2, 2, format).unwrap();
            let pixels = draw_pixels(&gpu, &mut r, &frame);
            let [red, green, blue, alpha] = pixel(&pixels, TARGET_SIZE.width / 2, TARGET_SIZE.height / 2);
            assert!(red >= 250, "{format}: red={red}");
            assert!(green <= 5, "{format}: green={green}");
            assert!(blue <= 5, "{format}: blue={blue}");
            assert_eq!(alpha, 255);
        }
    }

    #[test]
    fn orientation_and_mirror_move_the_picture() {
        let Some(gpu) = headless() else { return };
        let data = half_white_frame();
        let frame = YuvFrame::new(&data, 4, 2, PixelFormat::Nv21).unwrap();

        let cases = [
            (false, 0, [true, false, true, false]),
            (false, 90, [true, true, false, false]),
            (true, 0, [false, true, false, true]),
        ];
        for (mirror, degrees, expected) in cases {
            let mut r = renderer(&gpu, RendererConfig::from_host(mirror, degrees).unwrap());
            let corners = corner_reds(&draw_pixels(&gpu, &mut r, &frame));
            assert_eq!(
                corners.map(is_white),
                expected,
                "mirror={mirror} degrees={degrees} corners={corners:?}"
            );
        }
    }

    #[test]
    fn same_size_frames_reuse_textures() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());
        let data = gray_frame(16, 8);
        let frame = YuvFrame::new(&data, 16, 8, PixelFormat::Nv21).unwrap();

        draw(&gpu, &mut r, Some(&frame));
        draw(&gpu, &mut r, Some(&frame));

        let stats = r.stats();
        assert_eq!(stats.frames_rendered, 2);
        assert_eq!(stats.texture_allocations, 1);
        assert_eq!(stats.live_texture_pairs(), 1);
        assert_eq!(r.texture_state(), TextureState::Allocated { width: 16, height: 8 });
    }

    #[test]
    fn resize_forces_a_fresh_texture_pair() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());
        let data = gray_frame(16, 8);
        let frame = YuvFrame::new(&data, 16, 8, PixelFormat::Nv12).unwrap();

        draw(&gpu, &mut r, Some(&frame));
        // Larger than the target; the draw clamps it.
        r.resize(1920, 1080);
        assert_eq!(r.texture_state(), TextureState::Stale);
        assert_eq!(r.viewport(), Some(Viewport::new(1920, 1080)));
        draw(&gpu, &mut r, Some(&frame));

        let stats = r.stats();
        assert_eq!(stats.texture_allocations, 2);
        assert_eq!(stats.texture_releases, 1);
        assert_eq!(stats.live_texture_pairs(), 1);
    }

    #[test]
    fn size_change_replaces_previous_pair() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());
        let small = gray_frame(4, 4);
        let large = gray_frame(8, 6);

        draw(&gpu, &mut r, Some(&YuvFrame::new(&small, 4, 4, PixelFormat::Nv21).unwrap()));
        draw(&gpu, &mut r, Some(&YuvFrame::new(&large, 8, 6, PixelFormat::Nv21).unwrap()));
        draw(&gpu, &mut r, Some(&YuvFrame::new(&small, 4, 4, PixelFormat::Nv21).unwrap()));

        let stats = r.stats();
        assert_eq!(stats.texture_allocations, 3);
        assert_eq!(stats.texture_releases, 2);
        assert_eq!(stats.live_texture_pairs(), 1);
    }

    #[test]
    fn formats_can_alternate_per_frame() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::from_host(true, 90).unwrap());
        let data = gray_frame(2, 2);

        draw(&gpu, &mut r, Some(&YuvFrame::new(&data, 2, 2, PixelFormat::Nv21).unwrap()));
        draw(&gpu, &mut r, Some(&YuvFrame::new(&data, 2, 2, PixelFormat::Nv12).unwrap()));

        assert_eq!(r.stats().frames_rendered, 2);
        assert_eq!(r.stats().texture_allocations, 1);
        r.shutdown();
    }

    #[test]
    fn target_format_change_rebuilds_pipelines() {
        let Some(gpu) = headless() else { return };
        let mut r = renderer(&gpu, RendererConfig::default());
        let data = gray_frame(4, 2);
        let frame = YuvFrame::new(&data, 4, 2, PixelFormat::Nv12).unwrap();

        let format = wgpu::TextureFormat::Bgra8Unorm;
        let ctx = gpu.render_ctx(format);
        let texture = gpu.offscreen_target(TARGET_SIZE, format);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut target = RenderTarget::new(&mut encoder, &view, TARGET_SIZE);
            r.render(&ctx, &mut target, Some(&frame));
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));

        assert_eq!(r.pipeline_format, format);
        assert_eq!(r.stats().frames_rendered, 1);
    }
}
