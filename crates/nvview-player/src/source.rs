//! Where the player's frames come from.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nvview_engine::render::yuv::PixelFormat;

/// Produces consecutive NV21/NV12 frames into a caller-provided buffer.
pub enum FrameSource {
    /// Raw frames stored back to back; loops at end of file.
    File { path: PathBuf, file: File },
    /// Scrolling color bars.
    Bars { frame_index: u64 },
}

impl FrameSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self::File {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn bars() -> Self {
        Self::Bars { frame_index: 0 }
    }

    /// Fills `buf` with the next frame.
    pub fn next_frame(
        &mut self,
        buf: &mut [u8],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<()> {
        match self {
            Self::File { path, file } => read_looping(file, buf)
                .with_context(|| format!("failed to read a frame from {}", path.display())),
            Self::Bars { frame_index } => {
                color_bars(buf, width, height, format, *frame_index);
                *frame_index = frame_index.wrapping_add(1);
                Ok(())
            }
        }
    }
}

fn read_looping(file: &mut File, buf: &mut [u8]) -> io::Result<()> {
    match file.read_exact(buf) {
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            log::debug!("end of input; looping");
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(buf)
        }
        other => other,
    }
}

// ── color bars ────────────────────────────────────────────────────────────

/// White, yellow, cyan, green, magenta, red, blue, black.
const BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 255, 0],
    [0, 255, 255],
    [0, 255, 0],
    [255, 0, 255],
    [255, 0, 0],
    [0, 0, 255],
    [0, 0, 0],
];

/// Full-range RGB to YUV, inverse of the renderer's conversion matrix.
pub fn rgb_to_yuv([r, g, b]: [u8; 3]) -> (u8, u8, u8) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = (b - y) / 1.770 + 128.0;
    let v = (r - y) / 1.403 + 128.0;
    let clamp = |x: f32| x.round().clamp(0.0, 255.0) as u8;
    (clamp(y), clamp(u), clamp(v))
}

/// Writes eight vertical bars, shifted left by `frame_index` pixels.
///
/// `buf` must hold a full `width` x `height` frame.
pub fn color_bars(buf: &mut [u8], width: u32, height: u32, format: PixelFormat, frame_index: u64) {
    let (w, h) = (width as usize, height as usize);
    let shift = (frame_index % w.max(1) as u64) as usize;
    let bar_at = |x: usize| rgb_to_yuv(BARS[((x + shift) % w) * BARS.len() / w]);

    let (luma, chroma) = buf.split_at_mut(w * h);

    for row in luma.chunks_exact_mut(w).take(h) {
        for (x, px) in row.iter_mut().enumerate() {
            *px = bar_at(x).0;
        }
    }

    for row in chroma.chunks_exact_mut(w).take(h / 2) {
        for (cx, pair) in row.chunks_exact_mut(2).enumerate() {
            let (_, u, v) = bar_at(cx * 2);
            let (first, second) = match format {
                PixelFormat::Nv12 => (u, v),
                PixelFormat::Nv21 => (v, u),
            };
            pair[0] = first;
            pair[1] = second;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvview_engine::render::yuv::frame_len;

    #[test]
    fn neutral_colors_have_centered_chroma() {
        assert_eq!(rgb_to_yuv([255, 255, 255]), (255, 128, 128));
        assert_eq!(rgb_to_yuv([0, 0, 0]), (0, 128, 128));
    }

    #[test]
    fn red_pushes_v_up() {
        let (_, u, v) = rgb_to_yuv([255, 0, 0]);
        assert!(v > 200);
        assert!(u < 128);
    }

    #[test]
    fn bars_write_chroma_in_format_order() {
        let (w, h) = (16u32, 4u32);
        let mut nv12 = vec![0u8; frame_len(w, h).unwrap()];
        let mut nv21 = nv12.clone();
        color_bars(&mut nv12, w, h, PixelFormat::Nv12, 0);
        color_bars(&mut nv21, w, h, PixelFormat::Nv21, 0);

        let luma = (w * h) as usize;
        assert_eq!(nv12[..luma], nv21[..luma]);
        for (a, b) in nv12[luma..].chunks_exact(2).zip(nv21[luma..].chunks_exact(2)) {
            assert_eq!((a[0], a[1]), (b[1], b[0]));
        }
    }

    #[test]
    fn first_bar_is_white_and_last_is_black() {
        let (w, h) = (16u32, 2u32);
        let mut buf = vec![0u8; frame_len(w, h).unwrap()];
        color_bars(&mut buf, w, h, PixelFormat::Nv21, 0);
        assert_eq!(buf[0], 255);
        assert_eq!(buf[15], 0);
    }

    #[test]
    fn bars_scroll_with_frame_index() {
        let (w, h) = (16u32, 2u32);
        let mut a = vec![0u8; frame_len(w, h).unwrap()];
        let mut b = a.clone();
        color_bars(&mut a, w, h, PixelFormat::Nv12, 0);
        color_bars(&mut b, w, h, PixelFormat::Nv12, 2);
        assert_eq!(a[2..16], b[..14]);
    }

    #[test]
    fn file_source_loops_at_end() {
        let path = std::env::temp_dir().join(format!("nvview-source-{}.yuv", std::process::id()));
        std::fs::write(&path, [1u8, 2, 3, 4, 5, 6]).unwrap();

        let mut source = FrameSource::open(&path).unwrap();
        let mut buf = [0u8; 6];
        // Frame size is irrelevant to the file reader; only buf.len() counts.
        source.next_frame(&mut buf, 2, 2, PixelFormat::Nv21).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
        source.next_frame(&mut buf, 2, 2, PixelFormat::Nv21).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(FrameSource::open(Path::new("/nonexistent/nvview.yuv")).is_err());
    }
}
