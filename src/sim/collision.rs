//! Footprint sampling over the terrain bitmap
//!
//! The load-bearing part of the game: every tick the disc of terrain under
//! the storm is sampled pixel by pixel, classified by dominant color channel,
//! and accumulated into a weighted tally that drives pressure and casualties.

use glam::Vec2;

use super::terrain::{Terrain, TerrainMap};

/// Weighted terrain tally for one footprint sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FootprintTally {
    pub city: f32,
    pub land: f32,
    pub ocean: f32,
    pub total: f32,
}

impl FootprintTally {
    /// True when no pixel fell inside the footprint
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0
    }

    fn add(&mut self, kind: Terrain, weight: f32) {
        match kind {
            Terrain::City => self.city += weight,
            Terrain::Land => self.land += weight,
            Terrain::Ocean => self.ocean += weight,
        }
        self.total += weight;
    }
}

/// Sample the disc of `radius` pixels around `center` and tally the terrain
/// under it, weighted by a center-heavy linear falloff `1 - r` on the squared
/// normalized distance.
///
/// Only offsets with `0 < r <= 1` count: the center pixel is excluded and so
/// is everything outside the disc. Offsets landing outside the map are
/// skipped, and a radius of zero or less yields the empty tally. None of
/// these are errors.
pub fn sample_footprint(map: &TerrainMap, center: Vec2, radius: i32) -> FootprintTally {
    let mut tally = FootprintTally::default();
    if radius <= 0 {
        return tally;
    }
    let cx = center.x.floor() as i32;
    let cy = center.y.floor() as i32;
    let r2 = (radius * radius) as f32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let Some(kind) = map.terrain_at(cx + dx, cy + dy) else {
                continue;
            };
            let r = (dx * dx + dy * dy) as f32 / r2;
            if 0.0 < r && r <= 1.0 {
                tally.add(kind, 1.0 - r);
            }
        }
    }
    tally
}
