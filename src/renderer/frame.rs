//! The 64x64 playfield framebuffer

use glam::Vec2;
use rand::Rng;

use super::spiral::spiral;
use crate::consts::MAP_SIZE;
use crate::sim::TerrainMap;

/// RGBA framebuffer the size of the terrain map. Rebuilt every frame:
/// terrain first, then the storm overlay.
#[derive(Debug, Clone)]
pub struct Frame {
    rgba: Vec<u8>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Self {
            rgba: vec![0; (MAP_SIZE * MAP_SIZE * 4) as usize],
        }
    }

    /// Raw RGBA bytes, row-major, for canvas upload
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Copy the level bitmap in
    pub fn blit_terrain(&mut self, map: &TerrainMap) {
        let n = self.rgba.len().min(map.rgba().len());
        self.rgba[..n].copy_from_slice(&map.rgba()[..n]);
    }

    /// Blend the storm's spiral over the terrain: white pixels at the
    /// pattern's opacity. Offsets landing outside the playfield are skipped.
    pub fn draw_storm(&mut self, center: Vec2, radius: i32, phase: u32, rng: &mut impl Rng) {
        let cx = center.x.floor() as i32;
        let cy = center.y.floor() as i32;
        for px in spiral(radius, phase, rng) {
            let x = cx + px.dx;
            let y = cy + px.dy;
            if x < 0 || y < 0 || x >= MAP_SIZE || y >= MAP_SIZE {
                continue;
            }
            let i = 4 * (MAP_SIZE * y + x) as usize;
            for ch in 0..3 {
                let d = self.rgba[i + ch] as f32;
                self.rgba[i + ch] = (d + (255.0 - d) * px.alpha) as u8;
            }
        }
    }

    #[cfg(test)]
    fn pixel(&self, x: i32, y: i32) -> (u8, u8, u8) {
        let i = 4 * (MAP_SIZE * y + x) as usize;
        (self.rgba[i], self.rgba[i + 1], self.rgba[i + 2])
    }
}
