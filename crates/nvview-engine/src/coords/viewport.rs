/// Viewport size in physical pixels, anchored at the target origin.
///
/// Mirrors the `(0, 0, w, h)` rectangle a renderer draws into.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Clamps the viewport so it fits inside `bounds`.
    ///
    /// Returns `None` when the result has no area; callers then fall back to
    /// the full target.
    pub fn clamped_to(self, bounds: Viewport) -> Option<Viewport> {
        let clamped = Viewport::new(self.width.min(bounds.width), self.height.min(bounds.height));
        clamped.is_valid().then_some(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_viewport_inside_bounds() {
        let vp = Viewport::new(1920, 1080);
        assert_eq!(vp.clamped_to(Viewport::new(1280, 720)), Some(Viewport::new(1280, 720)));
    }

    #[test]
    fn clamp_smaller_viewport_unchanged() {
        let vp = Viewport::new(320, 240);
        assert_eq!(vp.clamped_to(Viewport::new(640, 480)), Some(vp));
    }

    #[test]
    fn clamp_zero_area_is_none() {
        assert_eq!(Viewport::new(0, 480).clamped_to(Viewport::new(640, 480)), None);
        assert_eq!(Viewport::new(640, 480).clamped_to(Viewport::new(640, 0)), None);
    }
}
