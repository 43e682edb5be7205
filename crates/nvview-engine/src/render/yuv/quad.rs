//! Fixed full-target quad and its texture coordinates.

use bytemuck::{Pod, Zeroable};

use super::RenderError;

/// Display rotation applied to the sampled frame, clockwise.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Accepts any multiple of 90, normalized into `[0, 360)`.
    pub fn from_degrees(degrees: i32) -> Result<Self, RenderError> {
        if degrees % 90 != 0 {
            return Err(RenderError::InvalidOrientation(degrees));
        }

        Ok(match degrees.rem_euclid(360) {
            0 => Self::Deg0,
            90 => Self::Deg90,
            180 => Self::Deg180,
            _ => Self::Deg270,
        })
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() as i32 * 90
    }

    #[inline]
    pub fn quarter_turns(self) -> usize {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }
}

// ── geometry ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 4], // clip space, w = 1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Top-left, bottom-left, bottom-right, top-right.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, 1.0, 0.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0, 0.0, 1.0] },
    QuadVertex { position: [1.0, -1.0, 0.0, 1.0] },
    QuadVertex { position: [1.0, 1.0, 0.0, 1.0] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── texture coordinates ───────────────────────────────────────────────────

/// Unrotated `(s, t)` for each entry of [`QUAD_VERTICES`].
pub const BASE_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

const TEX_COORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

pub(super) fn tex_coord_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEX_COORD_ATTRS,
    }
}

/// Texture coordinates for the quad corners.
///
/// Each quarter turn shifts the four coordinates one slot to the left. Mirroring
/// then exchanges the `s` components of corners 0/2 and 1/3, which flips the
/// image along the frame's horizontal axis.
pub fn texture_coords(orientation: Orientation, mirror: bool) -> [[f32; 2]; 4] {
    let mut coords = BASE_TEX_COORDS;
    coords.rotate_left(orientation.quarter_turns());

    if mirror {
        for i in 0..2 {
            let s = coords[i][0];
            coords[i][0] = coords[i + 2][0];
            coords[i + 2][0] = s;
        }
    }

    coords
}
