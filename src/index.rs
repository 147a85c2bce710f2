//! The tile index: a lazily deepened quadtree of tiles.
//!
//! The index eagerly splits the projected feature set down to
//! `index_max_zoom` (or until tiles are small enough), caching every
//! tile it builds under a packed `(z, x, y)` id. Deeper tiles are
//! produced on demand by re-running the splitting pass from the nearest
//! ancestor that still holds its source geometry, so the effective zoom
//! range is unbounded while the eager work stays bounded.

use crate::clip::{Axis, clip};
use crate::config::{Config, MAX_ZOOM_CEILING};
use crate::error::Result;
use crate::feature::{Feature, Geometry};
use crate::project::convert;
use crate::tile::{Tile, create_tile, transform_point, transform_tile};
use crate::wrap::wrap;
use geojson::GeoJson;
use rustc_hash::FxHashMap;

/// Address of a built tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Aggregate statistics over all cached tiles.
#[derive(Debug, Clone)]
pub struct TileIndexStats {
    /// Number of cached tiles.
    pub tile_count: usize,
    /// Features across all cached tiles.
    pub total_features: usize,
    /// Retained points across all cached tiles.
    pub total_points: usize,
}

/// A quadtree of tiles built from one GeoJSON dataset.
///
/// Construct once per dataset; tiles are created lazily and never
/// evicted, so the index owns every tile for its lifetime.
#[derive(Debug)]
pub struct TileIndex {
    config: Config,
    tiles: FxHashMap<u64, Tile>,
    tile_coords: Vec<TileCoord>,
}

impl TileIndex {
    /// Project, wrap and eagerly tile the dataset.
    ///
    /// Fails only on invalid configuration; problematic input features
    /// are skipped with a warning during projection.
    pub fn new(data: &GeoJson, config: Config) -> Result<Self> {
        config.validate()?;

        let z2 = (1u64 << config.max_zoom) as f64;
        let tolerance = config.tolerance / (config.extent as f64 * z2);
        let features = convert(data, tolerance);
        log::debug!("projected {} features", features.len());

        let features = wrap(features, config.buffer as f64 / config.extent as f64);

        let mut index = Self {
            config,
            tiles: FxHashMap::default(),
            tile_coords: Vec::new(),
        };

        if !features.is_empty() {
            index.split_tile(features, 0, 0, 0, None);
        }
        log::debug!("eagerly built {} tiles", index.tiles.len());

        Ok(index)
    }

    /// Fetch the tile at `(z, x, y)`, building it on demand.
    ///
    /// The `x` coordinate wraps modulo `2^z`. The returned tile is in
    /// pixel space and must be treated as read-only; it stays cached
    /// inside the index.
    pub fn get_tile(&mut self, z: u8, x: u32, y: u32) -> Option<&Tile> {
        if z > MAX_ZOOM_CEILING {
            return None;
        }

        let z2 = 1u64 << z;
        let x = (x as u64 % z2) as u32;

        let extent = self.config.extent;
        let buffer = self.config.buffer;

        let id = tile_id(z, x, y);
        if self.tiles.contains_key(&id) {
            let tile = self.tiles.get_mut(&id)?;
            transform_tile(tile, extent);
            return Some(&*tile);
        }

        // walk up to the nearest cached ancestor
        let mut z0 = z;
        let mut x0 = x;
        let mut y0 = y;
        let mut parent_id = None;

        while parent_id.is_none() && z0 > 0 {
            z0 -= 1;
            x0 /= 2;
            y0 /= 2;
            let candidate = tile_id(z0, x0, y0);
            if self.tiles.contains_key(&candidate) {
                parent_id = Some(candidate);
            }
        }

        let parent_id = parent_id?;
        let parent_is_square = {
            let parent = self.tiles.get(&parent_id)?;
            parent.source.as_ref()?;
            is_clipped_square(parent, extent, buffer)
        };

        if parent_is_square {
            // a solid square covers every descendant, serve it directly
            let parent = self.tiles.get_mut(&parent_id)?;
            transform_tile(parent, extent);
            return Some(&*parent);
        }

        let source = self.tiles.get_mut(&parent_id)?.source.take()?;

        log::debug!("drilling down to z{z} {x}-{y} from z{z0} {x0}-{y0}");
        let solid = self.split_tile(source, z0, x0, y0, Some(TileCoord { z, x, y }));

        // a solid ancestor discovered on the way serves in place of the
        // requested tile
        let id = match solid {
            Some(solid_zoom) => {
                let m = 1u32 << (z - solid_zoom);
                tile_id(solid_zoom, x / m, y / m)
            }
            None => id,
        };

        let tile = self.tiles.get_mut(&id)?;
        transform_tile(tile, extent);
        Some(&*tile)
    }

    /// Addresses of every tile built so far, in creation order.
    pub fn tile_coords(&self) -> &[TileCoord] {
        &self.tile_coords
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Aggregate statistics over the cached tiles.
    pub fn stats(&self) -> TileIndexStats {
        let mut total_features = 0;
        let mut total_points = 0;

        for tile in self.tiles.values() {
            total_features += tile.features.len();
            total_points += tile.num_simplified;
        }

        TileIndexStats {
            tile_count: self.tiles.len(),
            total_features,
            total_points,
        }
    }

    /// Split tiles from `(z, x, y)` downwards using an explicit work
    /// stack.
    ///
    /// Without a target this is the eager pass bounded by
    /// `index_max_zoom`/`index_max_points`. With a target it descends
    /// only along the path towards the requested tile, stopping at its
    /// zoom. Returns the zoom of a solid clipped-square tile when one
    /// terminates a targeted descent.
    fn split_tile(
        &mut self,
        features: Vec<Feature>,
        z: u8,
        x: u32,
        y: u32,
        target: Option<TileCoord>,
    ) -> Option<u8> {
        let max_zoom = self.config.max_zoom;
        let index_max_zoom = self.config.index_max_zoom;
        let index_max_points = self.config.index_max_points;
        let tolerance = self.config.tolerance;
        let extent = self.config.extent;
        let buffer = self.config.buffer;

        let mut solid = None;
        let mut stack: Vec<(Vec<Feature>, u8, u32, u32)> = vec![(features, z, x, y)];

        while let Some((features, z, x, y)) = stack.pop() {
            let z2 = 1u64 << z;
            let id = tile_id(z, x, y);

            if !self.tiles.contains_key(&id) {
                let tile_tolerance = if z == max_zoom {
                    0.0
                } else {
                    tolerance / (extent as f64 * z2 as f64)
                };
                let tile = create_tile(&features, z2, x, y, tile_tolerance, z == max_zoom);
                log::debug!(
                    "tile z{z} {x}-{y}: {} points, {} retained",
                    tile.num_points,
                    tile.num_simplified
                );
                self.tiles.insert(id, tile);
                self.tile_coords.push(TileCoord { z, x, y });
            }

            let Some(tile) = self.tiles.get_mut(&id) else {
                continue;
            };

            // keep the untiled source so a later request can drill down
            tile.source = Some(features);

            let stop = match target {
                // eager pass: stop at the index depth or when the tile
                // is simple enough
                None => z == index_max_zoom || tile.num_points <= index_max_points,
                // targeted descent: stop at the requested zoom and skip
                // tiles off the path
                Some(t) => {
                    if z == max_zoom || z == t.z {
                        true
                    } else {
                        let m = 1u32 << (t.z - z);
                        x != t.x / m || y != t.y / m
                    }
                }
            };
            if stop {
                continue;
            }

            // a tile filled edge-to-edge by one square clips into four
            // identical children; splitting it further is pointless
            if is_clipped_square(tile, extent, buffer) {
                if target.is_some() {
                    solid = Some(z);
                }
                continue;
            }

            let Some(features) = tile.source.take() else {
                continue;
            };
            if features.is_empty() {
                continue;
            }

            let k1 = 0.5 * buffer as f64 / extent as f64;
            let k2 = 0.5 - k1;
            let k3 = 0.5 + k1;
            let k4 = 1.0 + k1;
            let scale = z2 as f64;
            let xf = x as f64;
            let yf = y as f64;

            let left = clip(&features, scale, xf - k1, xf + k3, Axis::X);
            let right = clip(&features, scale, xf + k2, xf + k4, Axis::X);

            let mut tl = None;
            let mut bl = None;
            let mut tr = None;
            let mut br = None;

            if let Some(left) = left {
                tl = clip(&left, scale, yf - k1, yf + k3, Axis::Y);
                bl = clip(&left, scale, yf + k2, yf + k4, Axis::Y);
            }
            if let Some(right) = right {
                tr = clip(&right, scale, yf - k1, yf + k3, Axis::Y);
                br = clip(&right, scale, yf + k2, yf + k4, Axis::Y);
            }

            if let Some(tl) = tl {
                stack.push((tl, z + 1, x * 2, y * 2));
            }
            if let Some(bl) = bl {
                stack.push((bl, z + 1, x * 2, y * 2 + 1));
            }
            if let Some(tr) = tr {
                stack.push((tr, z + 1, x * 2 + 1, y * 2));
            }
            if let Some(br) = br {
                stack.push((br, z + 1, x * 2 + 1, y * 2 + 1));
            }
        }

        solid
    }
}

/// Pack `(z, x, y)` into a single cache key.
fn tile_id(z: u8, x: u32, y: u32) -> u64 {
    (((1u64 << z) * y as u64 + x as u64) * 32) + z as u64
}

/// Whether a tile's source is a single polygon covering the tile's
/// buffered square edge-to-edge.
fn is_clipped_square(tile: &Tile, extent: u16, buffer: u16) -> bool {
    let Some(features) = tile.source.as_ref() else {
        return false;
    };
    if features.len() != 1 {
        return false;
    }

    let rings = match &features[0].geometry {
        Geometry::Polygons(rings) => rings,
        _ => return false,
    };
    if rings.len() > 1 || rings[0].points.len() != 5 {
        return false;
    }

    let lo = -(buffer as f64);
    let hi = (extent + buffer) as f64;
    let z2 = tile.z2 as f64;
    let tx = tile.x as f64;
    let ty = tile.y as f64;

    rings[0].points.iter().all(|p| {
        let p = transform_point(p, extent, z2, tx, ty);
        (p.x == lo || p.x == hi) && (p.y == lo || p.y == hi)
    })
}
