//! Tile Cache Manager: asynchronous assembly of the night-lights composite.
//!
//! The manager owns at most one composite raster at a time, identified by a
//! [`TileKey`] (viewport footprint in whole tiles) and stamped with the
//! current **generation** token. Tile fetches are fire-and-forget: each
//! request carries a [`TileTicket`] and its completion is delivered back into
//! [`TileCacheManager::on_tile`] with no ordering guarantee. Completions whose
//! generation or raster identity no longer match are inert — that is the only
//! form of cancellation.
//!
//! State machine per key:
//!
//! ```text
//! Idle ── key change, nothing in flight ──▶ Loading (pending = tiles_x·tiles_y)
//! Loading ── each completion ──▶ pending − 1 (success also draws the tile)
//! Loading ── pending == 0 ──▶ Idle: raster bound, textureInfo computed,
//!                              deferred request (if any) replayed once
//! Loading ── new key ──▶ deferred slot overwritten (latest wins), no cancel
//! Idle ── identical key, already bound ──▶ no-op
//! ```
//!
//! A failed fetch still counts toward `pending` and leaves its slot blank:
//! partial failure degrades the city-lights raster instead of blocking it.

pub mod fetch;

use std::sync::Arc;

use image::RgbaImage;
use itertools::iproduct;
use log::{debug, trace, warn};
use nalgebra::Vector2;

use crate::constants::TILE_SIZE;
use crate::grid::Viewport;

/// Monotonic context token; bumped on renderer reset.
pub type Generation = u64;

/// Identity of a composite-raster footprint: pixel size, whole-tile offsets
/// and zoom. Equal keys mean the same remote tiles and the same placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Composite raster width, pixels (multiple of the tile size).
    pub pixel_width: u32,
    /// Composite raster height, pixels (multiple of the tile size).
    pub pixel_height: u32,
    /// Index of the leftmost tile column covering the viewport.
    pub tile_x_offset: i64,
    /// Index of the topmost tile row covering the viewport.
    pub tile_y_offset: i64,
    /// Zoom level.
    pub zoom: u8,
}

impl TileKey {
    /// Footprint key for a viewport at a zoom scale.
    ///
    /// Expands the viewport to whole tiles: offsets are the floor of the
    /// top-left pixel position divided by the tile size, and the pixel extent
    /// covers every tile the viewport touches.
    ///
    /// Arguments
    /// -----------------
    /// * `viewport`: Current viewport footprint (world units + pixels).
    /// * `zoom_scale`: `2^zoom` from the projection collaborator.
    ///
    /// Return
    /// ----------
    /// * The [`TileKey`] of the covering tile block.
    pub fn for_viewport(viewport: &Viewport, zoom_scale: f64) -> TileKey {
        let tile = f64::from(TILE_SIZE);
        let x_px = viewport.top_left.x * zoom_scale;
        let y_px = viewport.top_left.y * zoom_scale;

        let tile_x_offset = (x_px / tile).floor() as i64;
        let tile_y_offset = (y_px / tile).floor() as i64;
        let tiles_x = ((x_px + f64::from(viewport.width_px)) / tile).ceil() as i64 - tile_x_offset;
        let tiles_y = ((y_px + f64::from(viewport.height_px)) / tile).ceil() as i64 - tile_y_offset;

        TileKey {
            pixel_width: tiles_x.max(1) as u32 * TILE_SIZE,
            pixel_height: tiles_y.max(1) as u32 * TILE_SIZE,
            tile_x_offset,
            tile_y_offset,
            zoom: zoom_scale.log2().round().max(0.0) as u8,
        }
    }

    fn tiles_x(&self) -> u32 {
        self.pixel_width / TILE_SIZE
    }

    fn tiles_y(&self) -> u32 {
        self.pixel_height / TILE_SIZE
    }
}

/// Stamp carried by every fetch so its completion can be matched (or
/// discarded) later: context generation, raster identity, and the tile's
/// column/row inside the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileTicket {
    pub generation: Generation,
    pub raster_id: u64,
    pub column: u32,
    pub row: u32,
}

/// One outgoing tile fetch.
#[derive(Debug, Clone)]
pub struct TileRequest {
    pub url: String,
    pub ticket: TileTicket,
}

/// One incoming tile completion. `image: None` is the failure signal; the
/// slot stays blank and still counts toward `pending`.
#[derive(Debug, Clone)]
pub struct TileCompletion {
    pub ticket: TileTicket,
    pub image: Option<RgbaImage>,
}

/// Transport collaborator: fire-and-forget tile fetch by URL.
///
/// Implementations deliver completions back to the owner of the
/// [`TileCacheManager`] at their leisure and in any order; see
/// [`fetch::HttpTileFetcher`] for the reqwest-backed one.
pub trait TileFetcher {
    fn fetch(&mut self, request: TileRequest);
}

/// Placement/scale metadata mapping world coordinates into raster UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    pub tile_x_offset: i64,
    pub tile_y_offset: i64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// `2^zoom` of the raster's key.
    pub zoom_scale: f64,
}

impl TextureInfo {
    fn for_key(key: &TileKey) -> TextureInfo {
        TextureInfo {
            tile_x_offset: key.tile_x_offset,
            tile_y_offset: key.tile_y_offset,
            pixel_width: key.pixel_width,
            pixel_height: key.pixel_height,
            zoom_scale: f64::from(1u32 << u32::from(key.zoom)),
        }
    }

    /// UV coordinates of a world point inside the composite raster.
    pub fn world_to_uv(&self, world: Vector2<f64>) -> Vector2<f64> {
        let tile = f64::from(TILE_SIZE);
        Vector2::new(
            (world.x * self.zoom_scale - self.tile_x_offset as f64 * tile)
                / f64::from(self.pixel_width),
            (world.y * self.zoom_scale - self.tile_y_offset as f64 * tile)
                / f64::from(self.pixel_height),
        )
    }
}

/// Composite raster published to the rasterizer: read-only once bound.
#[derive(Debug, Clone)]
pub struct BoundRaster {
    pub raster: Arc<RgbaImage>,
    pub info: TextureInfo,
}

/// In-flight (or just-finished) composite raster. Exclusively mutated by the
/// manager while `pending > 0`.
struct CacheEntry {
    key: TileKey,
    raster_id: u64,
    generation: Generation,
    pending: u32,
    raster: RgbaImage,
}

/// Owner of the composite night-lights raster and its load state machine.
pub struct TileCacheManager {
    base_url: String,
    generation: Generation,
    next_raster_id: u64,
    entry: Option<CacheEntry>,
    /// Single-slot deferred request, overwritten on repeated requests while a
    /// load is in flight: latest wins.
    deferred: Option<TileKey>,
    bound: Option<BoundRaster>,
}

impl TileCacheManager {
    /// Create a manager fetching from `{base_url}/nighttile/...`.
    pub fn new(base_url: impl Into<String>) -> TileCacheManager {
        TileCacheManager {
            base_url: base_url.into(),
            generation: 0,
            next_raster_id: 0,
            entry: None,
            deferred: None,
            bound: None,
        }
    }

    /// Current generation token.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The composite raster currently published to the rasterizer, if any.
    pub fn bound(&self) -> Option<&BoundRaster> {
        self.bound.as_ref()
    }

    /// Renderer reset: bump the generation and drop all cache state.
    ///
    /// Every completion captured before the bump becomes permanently inert,
    /// regardless of its pending countdown; there is no other cancellation.
    pub fn reset_context(&mut self) {
        self.generation += 1;
        self.entry = None;
        self.deferred = None;
        self.bound = None;
        debug!("tile cache reset, generation now {}", self.generation);
    }

    /// Whether a request for `key` can short-circuit: the bound raster
    /// already has this footprint and no load is in flight.
    fn can_skip_load(&self, key: &TileKey) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.key == *key && entry.pending == 0)
    }

    /// Request the composite raster for a viewport footprint.
    ///
    /// Identical already-loaded keys are no-ops. If a load is in flight the
    /// request is parked in the single deferred slot (overwriting any earlier
    /// parked request) and replayed once the in-flight load completes —
    /// in-flight fetches are never cancelled. Otherwise a new raster is
    /// allocated and one fetch per tile is issued through `fetcher`.
    ///
    /// Arguments
    /// -----------------
    /// * `key`: Footprint key, usually from [`TileKey::for_viewport`].
    /// * `fetcher`: Transport collaborator receiving the per-tile requests.
    pub fn request(&mut self, key: TileKey, fetcher: &mut impl TileFetcher) {
        if self.can_skip_load(&key) {
            debug!("tile cache hit for {key:?}, skipping load");
            return;
        }
        if self.entry.as_ref().is_some_and(|entry| entry.pending > 0) {
            debug!("tile load in flight, deferring request for {key:?}");
            self.deferred = Some(key);
            return;
        }
        self.start_load(key, fetcher);
    }

    fn start_load(&mut self, key: TileKey, fetcher: &mut impl TileFetcher) {
        let raster_id = self.next_raster_id;
        self.next_raster_id += 1;

        let raster = RgbaImage::new(key.pixel_width, key.pixel_height);
        let pending = key.tiles_x() * key.tiles_y();
        debug!(
            "allocating {}x{} composite (raster {raster_id}, {pending} tiles, generation {})",
            key.pixel_width, key.pixel_height, self.generation
        );

        if self.bound.is_none() {
            // First raster of this context: publish the blank composite right
            // away so the rasterizer never samples an unbound texture. The
            // finished pixels replace it atomically at pending == 0.
            self.bound = Some(BoundRaster {
                raster: Arc::new(raster.clone()),
                info: TextureInfo::for_key(&key),
            });
        }

        self.entry = Some(CacheEntry {
            key,
            raster_id,
            generation: self.generation,
            pending,
            raster,
        });

        for (row, column) in iproduct!(0..key.tiles_y(), 0..key.tiles_x()) {
            fetcher.fetch(TileRequest {
                url: tile_url(&self.base_url, &key, column, row),
                ticket: TileTicket {
                    generation: self.generation,
                    raster_id,
                    column,
                    row,
                },
            });
        }

        if pending == 0 {
            self.finish_load(fetcher);
        }
    }

    /// Deliver one tile completion.
    ///
    /// Stale completions — wrong generation, superseded raster, or arriving
    /// after the raster already finished — are ignored entirely. A live
    /// completion decrements `pending`; success additionally draws the tile
    /// at its column/row offset. At `pending == 0` the raster is bound and
    /// the deferred request, if any, fires exactly once.
    ///
    /// Arguments
    /// -----------------
    /// * `completion`: Ticket plus decoded tile image (or `None` on failure).
    /// * `fetcher`: Transport collaborator, needed if a deferred request fires.
    pub fn on_tile(&mut self, completion: TileCompletion, fetcher: &mut impl TileFetcher) {
        let ticket = completion.ticket;
        if ticket.generation != self.generation {
            trace!("dropping completion from stale generation {}", ticket.generation);
            return;
        }
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if ticket.raster_id != entry.raster_id || entry.pending == 0 {
            trace!("dropping completion for superseded raster {}", ticket.raster_id);
            return;
        }

        match completion.image {
            Some(tile) => {
                image::imageops::overlay(
                    &mut entry.raster,
                    &tile,
                    i64::from(ticket.column * TILE_SIZE),
                    i64::from(ticket.row * TILE_SIZE),
                );
            }
            None => warn!(
                "tile ({}, {}) of raster {} failed, leaving slot blank",
                ticket.column, ticket.row, entry.raster_id
            ),
        }

        entry.pending -= 1;
        trace!(
            "tile ({}, {}) resolved, {} pending on raster {}",
            ticket.column,
            ticket.row,
            entry.pending,
            entry.raster_id
        );
        if entry.pending == 0 {
            self.finish_load(fetcher);
        }
    }

    fn finish_load(&mut self, fetcher: &mut impl TileFetcher) {
        let (raster, key, raster_id) = match self.entry.as_mut() {
            Some(entry) => (
                std::mem::replace(&mut entry.raster, RgbaImage::new(0, 0)),
                entry.key,
                entry.raster_id,
            ),
            None => return,
        };
        self.bound = Some(BoundRaster {
            raster: Arc::new(raster),
            info: TextureInfo::for_key(&key),
        });
        debug!(
            "bound composite raster {raster_id} ({}x{})",
            key.pixel_width, key.pixel_height
        );

        if let Some(next) = self.deferred.take() {
            debug!("replaying deferred request for {next:?}");
            self.request(next, fetcher);
        }
    }
}

/// URL of one remote night tile.
///
/// Pattern: `{base}/nighttile/{zoom}/{x mod 2^zoom}/{2^zoom − 1 − y mod 2^zoom}.png`,
/// with non-negative wrap-around of the tile indices and the y axis flipped
/// to the tile server's bottom-up convention.
fn tile_url(base_url: &str, key: &TileKey, column: u32, row: u32) -> String {
    let span = 1i64 << i64::from(key.zoom);
    let tile_x = (key.tile_x_offset + i64::from(column)).rem_euclid(span);
    let tile_y = span - 1 - (key.tile_y_offset + i64::from(row)).rem_euclid(span);
    format!("{base_url}/nighttile/{}/{tile_x}/{tile_y}.png", key.zoom)
}

#[cfg(test)]
mod tile_tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_key_for_viewport_covers_whole_tiles() {
        let viewport = Viewport {
            top_left: Vector2::new(100.0, 80.0),
            width_px: 600,
            height_px: 300,
        };
        let key = TileKey::for_viewport(&viewport, 4.0);
        assert_eq!(
            key,
            TileKey {
                pixel_width: 768,
                pixel_height: 512,
                tile_x_offset: 1,
                tile_y_offset: 1,
                zoom: 2,
            }
        );
        assert_eq!(key.tiles_x(), 3);
        assert_eq!(key.tiles_y(), 2);
    }

    #[test]
    fn test_tile_url_wraps_and_flips() {
        let key = TileKey {
            pixel_width: 768,
            pixel_height: 512,
            tile_x_offset: 3,
            tile_y_offset: 0,
            zoom: 2,
        };
        // Column 2 wraps past the antimeridian: (3 + 2) mod 4 = 1.
        assert_eq!(tile_url("http://t", &key, 2, 0), "http://t/nighttile/2/1/3.png");
        // Row 1: y index = 4 − 1 − 1 = 2.
        assert_eq!(tile_url("http://t", &key, 0, 1), "http://t/nighttile/2/3/2.png");
        // Negative offsets wrap non-negatively.
        let west = TileKey {
            tile_x_offset: -1,
            ..key
        };
        assert_eq!(tile_url("http://t", &west, 0, 0), "http://t/nighttile/2/3/3.png");
    }

    #[test]
    fn test_texture_info_world_to_uv() {
        let key = TileKey {
            pixel_width: 768,
            pixel_height: 512,
            tile_x_offset: 1,
            tile_y_offset: 1,
            zoom: 2,
        };
        let info = TextureInfo::for_key(&key);
        // Top-left corner of the tile block maps to UV (0, 0).
        let origin = Vector2::new(256.0 / 4.0, 256.0 / 4.0);
        let uv = info.world_to_uv(origin);
        assert_relative_eq!(uv.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(uv.y, 0.0, epsilon = 1e-12);
        // One tile further right/down.
        let inner = Vector2::new(512.0 / 4.0, 512.0 / 4.0);
        let uv = info.world_to_uv(inner);
        assert_relative_eq!(uv.x, 256.0 / 768.0, epsilon = 1e-12);
        assert_relative_eq!(uv.y, 256.0 / 512.0, epsilon = 1e-12);
    }
}
