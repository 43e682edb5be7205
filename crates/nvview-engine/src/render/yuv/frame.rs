use std::fmt;
use std::str::FromStr;

use super::FrameError;

/// Chroma byte order of a semi-planar 4:2:0 frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Chroma pairs stored as V, U.
    Nv21,
    /// Chroma pairs stored as U, V.
    Nv12,
}

impl PixelFormat {
    /// Host tag for NV21 (`android.graphics.ImageFormat.NV21`).
    pub const NV21_TAG: i32 = 17;
    /// Host tag for NV12 (fourcc `NV12`).
    pub const NV12_TAG: i32 = 0x3231_564E;

    /// Maps the integer tag a host passes alongside a frame.
    pub fn from_tag(tag: i32) -> Result<Self, FrameError> {
        match tag {
            Self::NV21_TAG => Ok(Self::Nv21),
            Self::NV12_TAG => Ok(Self::Nv12),
            other => Err(FrameError::UnknownFormat(format!("tag {other}"))),
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            Self::Nv21 => Self::NV21_TAG,
            Self::Nv12 => Self::NV12_TAG,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nv21 => "nv21",
            Self::Nv12 => "nv12",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nv21" => Ok(Self::Nv21),
            "nv12" => Ok(Self::Nv12),
            _ => Err(FrameError::UnknownFormat(s.to_string())),
        }
    }
}

/// Byte length of a `width` x `height` semi-planar frame.
///
/// Both dimensions must be even and non-zero; chroma is sampled at half
/// resolution on each axis.
pub fn frame_len(width: u32, height: u32) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::ZeroDimensions { width, height });
    }
    if width % 2 != 0 || height % 2 != 0 {
        return Err(FrameError::OddDimensions { width, height });
    }

    let luma = width as usize * height as usize;
    Ok(luma + luma / 2)
}

/// Borrowed view of one caller-owned NV21/NV12 frame.
///
/// Construction checks the layout contract, so every `YuvFrame` can be
/// uploaded without further validation.
#[derive(Debug, Copy, Clone)]
pub struct YuvFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl<'a> YuvFrame<'a> {
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        let expected = frame_len(width, height)?;
        if data.len() < expected {
            return Err(FrameError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data: &data[..expected],
            width,
            height,
            format,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Chroma plane width in texels (one texel = one byte pair).
    #[inline]
    pub fn chroma_width(&self) -> u32 {
        self.width / 2
    }

    #[inline]
    pub fn chroma_height(&self) -> u32 {
        self.height / 2
    }

    /// The `width * height` luma bytes.
    pub fn luma(&self) -> &'a [u8] {
        &self.data[..self.luma_len()]
    }

    /// The interleaved chroma bytes that follow the luma plane.
    pub fn chroma(&self) -> &'a [u8] {
        &self.data[self.luma_len()..]
    }

    fn luma_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
