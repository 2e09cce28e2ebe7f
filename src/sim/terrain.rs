//! Terrain bitmap and color classification
//!
//! Terrain kind is never stored; it is re-derived from pixel color at sample
//! time. Canvas pipelines shift image colors slightly, so a pixel's kind is
//! whichever RGB channel is largest - never an exact color match.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::MAP_SIZE;

/// Seed for the built-in level, so every session plays the same map
const ISLAND_SEED: u64 = 0x5457_4154;

/// Terrain categories, keyed by dominant color channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    /// Red-dominant pixels
    City,
    /// Green-dominant pixels
    Land,
    /// Blue-dominant pixels
    Ocean,
}

impl Terrain {
    /// Classify a pixel by its largest channel.
    ///
    /// Assume R is biggest first; G replaces it only when strictly greater,
    /// then B replaces the running max only when strictly greater. Ties keep
    /// the earlier winner, so recolored assets must give each kind a clearly
    /// dominant channel.
    pub fn classify(r: u8, g: u8, b: u8) -> Terrain {
        let mut kind = Terrain::City;
        let mut max = r;
        if max < g {
            kind = Terrain::Land;
            max = g;
        }
        if max < b {
            kind = Terrain::Ocean;
        }
        kind
    }
}

/// A fixed-size RGBA terrain raster, immutable for the lifetime of a run
#[derive(Debug, Clone)]
pub struct TerrainMap {
    width: i32,
    height: i32,
    rgba: Vec<u8>,
}

impl TerrainMap {
    /// Wrap raw RGBA bytes (e.g. canvas `ImageData`). Returns `None` when
    /// the buffer length does not match the dimensions.
    pub fn from_rgba(width: i32, height: i32, rgba: Vec<u8>) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGB at pixel coordinates; `None` outside the map
    pub fn pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let i = 4 * (self.width * y + x) as usize;
        Some((self.rgba[i], self.rgba[i + 1], self.rgba[i + 2]))
    }

    /// Terrain kind at pixel coordinates; `None` outside the map
    pub fn terrain_at(&self, x: i32, y: i32) -> Option<Terrain> {
        self.pixel(x, y).map(|(r, g, b)| Terrain::classify(r, g, b))
    }

    /// The built-in level: an island with city clusters, generated from a
    /// fixed seed so it stands in for a hand-drawn map asset. The lower-left
    /// spawn corner and the upper-right exit corner stay open ocean.
    pub fn island() -> Self {
        let mut rng = Pcg32::seed_from_u64(ISLAND_SEED);
        let w = MAP_SIZE;
        let h = MAP_SIZE;
        let mut rgba = vec![0u8; (w as usize) * (h as usize) * 4];

        // Ocean backdrop with a little depth variation
        for i in 0..(w * h) as usize {
            let depth = rng.random_range(0..24u8);
            rgba[4 * i] = 12;
            rgba[4 * i + 1] = 48;
            rgba[4 * i + 2] = 160 + depth;
            rgba[4 * i + 3] = 255;
        }

        // Landmass as a union of radial blobs, kept away from the spawn and
        // exit corners
        let blobs: Vec<(f32, f32, f32)> = (0..6)
            .map(|_| {
                (
                    rng.random_range(20.0..54.0f32),
                    rng.random_range(12.0..44.0f32),
                    rng.random_range(5.0..10.0f32),
                )
            })
            .collect();
        for y in 0..h {
            for x in 0..w {
                let field: f32 = blobs
                    .iter()
                    .map(|&(bx, by, br)| {
                        let d2 = (x as f32 - bx).powi(2) + (y as f32 - by).powi(2);
                        br * br / (d2 + 1.0)
                    })
                    .sum();
                if field > 1.0 {
                    let i = 4 * (w * y + x) as usize;
                    let shade = rng.random_range(0..28u8);
                    rgba[i] = 52;
                    rgba[i + 1] = 140 + shade;
                    rgba[i + 2] = 44;
                }
            }
        }

        let mut map = Self {
            width: w,
            height: h,
            rgba,
        };

        // City blocks: 2x2 red patches scattered over the land
        let mut placed = 0;
        for _ in 0..4096 {
            if placed == 9 {
                break;
            }
            let x = rng.random_range(1..w - 1);
            let y = rng.random_range(1..h - 1);
            if map.terrain_at(x, y) != Some(Terrain::Land) {
                continue;
            }
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                if map.terrain_at(x + dx, y + dy) == Some(Terrain::Land) {
                    map.put(x + dx, y + dy, 208, 72, 48);
                }
            }
            placed += 1;
        }

        map
    }

    fn put(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        let i = 4 * (self.width * y + x) as usize;
        self.rgba[i] = r;
        self.rgba[i + 1] = g;
        self.rgba[i + 2] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SPAWN_X, SPAWN_Y};

    #[test]
    fn test_classify_dominant_channel() {
        assert_eq!(Terrain::classify(200, 10, 10), Terrain::City);
        assert_eq!(Terrain::classify(10, 200, 10), Terrain::Land);
        assert_eq!(Terrain::classify(10, 10, 200), Terrain::Ocean);
    }

    #[test]
    fn test_classify_tie_breaks() {
        // G does not beat R on a tie
        assert_eq!(Terrain::classify(100, 100, 50), Terrain::City);
        // B does not beat the running max on a tie
        assert_eq!(Terrain::classify(50, 100, 100), Terrain::Land);
        assert_eq!(Terrain::classify(100, 50, 100), Terrain::City);
        assert_eq!(Terrain::classify(100, 100, 100), Terrain::City);
        // Strictly greater always wins
        assert_eq!(Terrain::classify(100, 101, 100), Terrain::Land);
        assert_eq!(Terrain::classify(100, 101, 102), Terrain::Ocean);
    }

    #[test]
    fn test_classify_near_equal_noise() {
        // Anti-aliasing level wobble must not flip a clearly dominant channel
        assert_eq!(Terrain::classify(13, 47, 161), Terrain::Ocean);
        assert_eq!(Terrain::classify(11, 49, 158), Terrain::Ocean);
        assert_eq!(Terrain::classify(53, 139, 45), Terrain::Land);
    }

    #[test]
    fn test_from_rgba_validates_length() {
        assert!(TerrainMap::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(TerrainMap::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(TerrainMap::from_rgba(0, 2, vec![]).is_none());
        assert!(TerrainMap::from_rgba(-1, 2, vec![]).is_none());
    }

    #[test]
    fn test_pixel_bounds() {
        let map = TerrainMap::from_rgba(2, 2, vec![7; 16]).unwrap();
        assert_eq!(map.pixel(0, 0), Some((7, 7, 7)));
        assert_eq!(map.pixel(1, 1), Some((7, 7, 7)));
        assert_eq!(map.pixel(2, 0), None);
        assert_eq!(map.pixel(0, -1), None);
    }

    #[test]
    fn test_island_is_deterministic() {
        assert_eq!(TerrainMap::island().rgba(), TerrainMap::island().rgba());
    }

    #[test]
    fn test_island_has_all_terrain_kinds() {
        let map = TerrainMap::island();
        let mut city = 0;
        let mut land = 0;
        let mut ocean = 0;
        for y in 0..map.height() {
            for x in 0..map.width() {
                match map.terrain_at(x, y).unwrap() {
                    Terrain::City => city += 1,
                    Terrain::Land => land += 1,
                    Terrain::Ocean => ocean += 1,
                }
            }
        }
        assert!(city > 0, "no city pixels");
        assert!(land > city, "land should outnumber city blocks");
        assert!(ocean > land, "most of the map is ocean");
    }

    #[test]
    fn test_island_spawn_corner_is_ocean() {
        let map = TerrainMap::island();
        let kind = map.terrain_at(SPAWN_X as i32, SPAWN_Y as i32);
        assert_eq!(kind, Some(Terrain::Ocean));
    }
}
