//! Canvas-style rasterization of tiles.
//!
//! When a viewport holds too many features for interactive vector
//! rendering, tiles are drawn into flat pixel buffers instead. The
//! painter here produces a square coverage mask from a pixel-space
//! tile: points as single pixels, lines stepped pixel by pixel,
//! polygons filled by even-odd scanline parity so holes stay empty.

use crate::tile::{Tile, TileGeometry};

/// Value written for covered pixels.
const COVERED: u8 = 255;

/// Paints tiles into `size x size` coverage masks.
#[derive(Debug, Clone, Copy)]
pub struct TileRaster {
    size: u32,
}

impl TileRaster {
    /// A painter producing masks of the given edge length.
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rasterize a pixel-space tile into a row-major coverage mask.
    ///
    /// `extent` is the tile coordinate space being mapped onto the
    /// mask. Buffered geometry outside `[0, extent]` falls off the mask
    /// edge and is skipped pixel by pixel.
    pub fn paint(&self, tile: &Tile, extent: u16) -> Vec<u8> {
        let mut mask = vec![0u8; (self.size * self.size) as usize];
        let scale = self.size as f64 / extent as f64;

        for feature in &tile.features {
            match &feature.geometry {
                TileGeometry::Points(points) => {
                    for p in points {
                        self.set_pixel(
                            &mut mask,
                            (p.x * scale).floor() as i64,
                            (p.y * scale).floor() as i64,
                        );
                    }
                }
                TileGeometry::Lines(rings) => {
                    for ring in rings {
                        for pair in ring.windows(2) {
                            self.draw_line(
                                &mut mask,
                                (pair[0].x * scale).floor() as i64,
                                (pair[0].y * scale).floor() as i64,
                                (pair[1].x * scale).floor() as i64,
                                (pair[1].y * scale).floor() as i64,
                            );
                        }
                    }
                }
                TileGeometry::Polygons(rings) => {
                    let scaled: Vec<Vec<(f64, f64)>> = rings
                        .iter()
                        .map(|ring| ring.iter().map(|p| (p.x * scale, p.y * scale)).collect())
                        .collect();
                    self.fill_rings(&mut mask, &scaled);
                }
            }
        }

        mask
    }

    fn set_pixel(&self, mask: &mut [u8], x: i64, y: i64) {
        if x >= 0 && y >= 0 && x < self.size as i64 && y < self.size as i64 {
            mask[(y * self.size as i64 + x) as usize] = COVERED;
        }
    }

    /// Bresenham line stepping; off-mask pixels are skipped.
    fn draw_line(&self, mask: &mut [u8], x0: i64, y0: i64, x1: i64, y1: i64) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };

        let mut x = x0;
        let mut y = y0;
        let mut err = dx + dy;

        loop {
            self.set_pixel(mask, x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Even-odd scanline fill across all rings of one polygon feature.
    ///
    /// Sampling at pixel-row centers sidesteps vertex double counting;
    /// running the parity over every ring at once leaves holes empty.
    fn fill_rings(&self, mask: &mut [u8], rings: &[Vec<(f64, f64)>]) {
        let mut crossings: Vec<f64> = Vec::new();

        for row in 0..self.size {
            let yc = row as f64 + 0.5;
            crossings.clear();

            for ring in rings {
                let n = ring.len();
                for i in 0..n {
                    let a = ring[i];
                    let b = ring[(i + 1) % n];
                    if a == b {
                        continue;
                    }
                    if (a.1 <= yc && b.1 > yc) || (b.1 <= yc && a.1 > yc) {
                        let t = (yc - a.1) / (b.1 - a.1);
                        crossings.push(a.0 + t * (b.0 - a.0));
                    }
                }
            }

            crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as i64;
                let end = ((span[1] - 0.5).floor() as i64).min(self.size as i64 - 1);
                for x in start..=end {
                    self.set_pixel(mask, x, row as i64);
                }
            }
        }
    }
}
