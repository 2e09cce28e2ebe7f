//! The storm's rotating spiral overlay
//!
//! Pure presentation: angle, radial falloff, and the storm's phase produce
//! pseudo-rotating bands of opacity over the footprint; per-pixel jitter
//! breaks the banding up frame to frame. Collision sampling never looks at
//! any of this.

use rand::Rng;

/// One overlay pixel: an offset from the storm center and an opacity in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPx {
    pub dx: i32,
    pub dy: i32,
    pub alpha: f32,
}

/// Build the spiral pattern for a footprint of `radius` pixels at the given
/// animation `phase`.
///
/// Uses the *linear* normalized radius (unlike collision sampling, which
/// works on the squared one) and excludes the center pixel the same way.
/// A radius of zero or less yields no pixels.
pub fn spiral(radius: i32, phase: u32, rng: &mut impl Rng) -> Vec<OverlayPx> {
    let mut out = Vec::new();
    if radius <= 0 {
        return out;
    }
    let i = phase as f32 * 0.05;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r = ((dx * dx + dy * dy) as f32).sqrt() / radius as f32;
            if 0.0 < r && r <= 1.0 {
                let a = (dy as f32).atan2(dx as f32) / std::f32::consts::PI;
                let c = ((1.0 + a - i) * 7.0 + r.powf(0.1) * 50.0 + rng.random::<f32>()) * 0.3;
                out.push(OverlayPx {
                    dx,
                    dy,
                    alpha: c - c.floor(),
                });
            }
        }
    }
    out
}
