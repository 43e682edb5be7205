//! Luma/chroma plane textures and their allocation policy.

use super::{RendererStats, YuvFrame};

/// Allocation state of the plane textures.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TextureState {
    /// Nothing allocated yet.
    #[default]
    Unallocated,
    /// Allocated, but a surface resize asked for a fresh pair.
    Stale,
    /// Allocated for frames of exactly this size.
    Allocated { width: u32, height: u32 },
}

/// What the next upload has to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UploadPlan {
    /// Create a new texture pair (and drop the previous one, if any).
    Allocate,
    /// Overwrite the existing pair in place.
    Reuse,
}

impl TextureState {
    pub fn plan(self, width: u32, height: u32) -> UploadPlan {
        match self {
            Self::Allocated { width: w, height: h } if w == width && h == height => {
                UploadPlan::Reuse
            }
            _ => UploadPlan::Allocate,
        }
    }

    /// Forces the next upload to allocate.
    pub fn invalidate(&mut self) {
        if let Self::Allocated { .. } = self {
            *self = Self::Stale;
        }
    }
}

/// The renderer's current texture pair and the state it was allocated for.
#[derive(Default)]
pub(super) struct PlaneSlot {
    state: TextureState,
    planes: Option<PlaneTextures>,
}

impl PlaneSlot {
    pub(super) fn state(&self) -> TextureState {
        self.state
    }

    pub(super) fn invalidate(&mut self) {
        self.state.invalidate();
    }

    /// Returns a pair sized for `width` x `height`, allocating one if the
    /// current pair cannot be reused.
    pub(super) fn ensure(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
        stats: &mut RendererStats,
    ) -> &PlaneTextures {
        if self.state.plan(width, height) == UploadPlan::Allocate {
            if self.planes.take().is_some() {
                stats.texture_releases += 1;
            }
            log::debug!("allocating plane textures for {width}x{height}");
            self.state = TextureState::Allocated { width, height };
        }

        self.planes.get_or_insert_with(|| {
            stats.texture_allocations += 1;
            PlaneTextures::new(device, layout, sampler, width, height)
        })
    }

    /// Drops the held pair. Returns whether there was one.
    pub(super) fn release(&mut self) -> bool {
        self.state = TextureState::Unallocated;
        self.planes.take().is_some()
    }
}

/// One luma + chroma texture pair bound for sampling.
pub(super) struct PlaneTextures {
    luma: wgpu::Texture,
    chroma: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl PlaneTextures {
    pub(super) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let luma = plane_texture(device, "nvview luma plane", width, height, wgpu::TextureFormat::R8Unorm);
        let chroma = plane_texture(
            device,
            "nvview chroma plane",
            width / 2,
            height / 2,
            wgpu::TextureFormat::Rg8Unorm,
        );

        let luma_view = luma.create_view(&wgpu::TextureViewDescriptor::default());
        let chroma_view = chroma.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nvview plane bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&luma_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&chroma_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            luma,
            chroma,
            bind_group,
        }
    }

    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Copies both planes of `frame` into the textures.
    ///
    /// The frame must match the size the pair was allocated for.
    pub(super) fn upload(&self, queue: &wgpu::Queue, frame: &YuvFrame<'_>) {
        write_plane(queue, &self.luma, frame.luma(), frame.width(), frame.height(), 1);
        write_plane(
            queue,
            &self.chroma,
            frame.chroma(),
            frame.chroma_width(),
            frame.chroma_height(),
            2,
        );
    }
}

fn plane_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_plane(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes: &[u8],
    width: u32,
    height: u32,
    bytes_per_texel: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        // Rows are tightly packed; no stride padding in NV21/NV12 buffers.
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_texel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_upload_allocates() {
        assert_eq!(TextureState::Unallocated.plan(640, 480), UploadPlan::Allocate);
    }

    #[test]
    fn same_size_reuses() {
        let state = TextureState::Allocated { width: 640, height: 480 };
        assert_eq!(state.plan(640, 480), UploadPlan::Reuse);
    }

    #[test]
    fn size_change_allocates() {
        let state = TextureState::Allocated { width: 640, height: 480 };
        assert_eq!(state.plan(1280, 720), UploadPlan::Allocate);
    }

    #[test]
    fn invalidate_marks_allocated_pair_stale() {
        let mut state = TextureState::Allocated { width: 640, height: 480 };
        state.invalidate();
        assert_eq!(state, TextureState::Stale);
        assert_eq!(state.plan(640, 480), UploadPlan::Allocate);
    }

    #[test]
    fn invalidate_leaves_unallocated_alone() {
        let mut state = TextureState::Unallocated;
        state.invalidate();
        assert_eq!(state, TextureState::Unallocated);
    }

    #[test]
    fn empty_slot_has_nothing_to_release() {
        let mut slot = PlaneSlot::default();
        slot.invalidate();
        assert!(!slot.release());
        assert_eq!(slot.state(), TextureState::Unallocated);
    }
}
