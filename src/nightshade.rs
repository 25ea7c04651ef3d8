//! # Nightshade: overlay façade and frame contract
//!
//! This module defines the [`Nightshade`] struct, the central façade that
//! wires together:
//!
//! 1. **Eclipse geometry** — an ordered Besselian dataset table and its
//!    per-tick selection/interpolation.
//! 2. **Solar position** — declination, equation of time and UTC time of day.
//! 3. **Viewport state** — the per-row sample grid and the night-lights
//!    tile cache.
//!
//! The host drives it from two places:
//!
//! - a ~1 Hz timer tick calls [`frame`](Nightshade::frame) and feeds the
//!   resulting scalars to the render sink
//!   (via [`scalar_uniforms`](Nightshade::scalar_uniforms));
//! - viewport-change notifications call
//!   [`update_viewport`](Nightshade::update_viewport), and the host's event
//!   loop pumps fetched tiles through [`pump_tiles`](Nightshade::pump_tiles).
//!
//! On renderer reset (context loss) the host calls
//! [`reset_context`](Nightshade::reset_context); every tile completion in
//! flight at that moment becomes inert.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use nightshade::nightshade::{Nightshade, NightshadeConfig};
//!
//! let overlay = Nightshade::new(NightshadeConfig {
//!     tile_base_url: "https://tiles.example.org".into(),
//!     ..NightshadeConfig::default()
//! });
//!
//! // Timer tick:
//! let frame = overlay.frame();
//! for uniform in overlay.scalar_uniforms(&frame) {
//!     // sink.set_uniform(uniform.name, uniform.value);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::eclipse::{builtin_datasets, elements_for, EclipseDataset, InterpolatedElements};
use crate::grid::{build_samples, GeoSample, Projection, Viewport};
use crate::nightshade_errors::NightshadeError;
use crate::obscuration::{obscuration, Obscuration};
use crate::solar::{situation, SolarSituation};
use crate::tiles::{BoundRaster, TileCacheManager, TileCompletion, TileFetcher, TileKey};
use crate::time::{Clock, SystemClock};
use crate::uniforms::{scalar_uniforms, ScalarUniform, SCALAR_UNIFORM_COUNT};

/// Host-facing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightshadeConfig {
    /// Base URL of the night-tile server.
    pub tile_base_url: String,
    /// Maximum night opacity in `[0, 1]`; the umbral override may exceed it.
    pub obscure_factor: f64,
    /// Whether the city-light channel is evaluated at all.
    pub city_lights_enabled: bool,
}

impl Default for NightshadeConfig {
    fn default() -> Self {
        NightshadeConfig {
            tile_base_url: String::new(),
            obscure_factor: 0.75,
            city_lights_enabled: true,
        }
    }
}

/// Everything the rasterizer needs for one frame, recomputed per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub elements: InterpolatedElements,
    pub situation: SolarSituation,
}

/// Central overlay state: dataset table, clock, config, sample grid and tile
/// cache.
pub struct Nightshade {
    datasets: Vec<EclipseDataset>,
    config: NightshadeConfig,
    clock: Box<dyn Clock>,
    cache: TileCacheManager,
    samples: Vec<GeoSample>,
}

impl Nightshade {
    /// Construct with the built-in eclipse table and the system clock.
    pub fn new(config: NightshadeConfig) -> Nightshade {
        let cache = TileCacheManager::new(config.tile_base_url.clone());
        Nightshade {
            datasets: builtin_datasets().to_vec(),
            config,
            clock: Box::new(SystemClock),
            cache,
            samples: Vec::new(),
        }
    }

    /// Construct with an injected clock (tests, replays).
    pub fn with_clock(config: NightshadeConfig, clock: Box<dyn Clock>) -> Nightshade {
        Nightshade {
            clock,
            ..Nightshade::new(config)
        }
    }

    /// Replace the eclipse dataset table.
    ///
    /// Arguments
    /// -----------------
    /// * `datasets`: Table that must be strictly ordered by `t0`.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`NightshadeError::UnorderedDatasetTable`] if the
    ///   ordering invariant is violated.
    pub fn set_datasets(&mut self, datasets: Vec<EclipseDataset>) -> Result<(), NightshadeError> {
        if let Some(pair) = datasets.windows(2).find(|pair| pair[0].t0 >= pair[1].t0) {
            return Err(NightshadeError::UnorderedDatasetTable(format!(
                "t0 {} is not before t0 {}",
                pair[0].t0, pair[1].t0
            )));
        }
        self.datasets = datasets;
        Ok(())
    }

    /// Compute the per-tick frame state: dataset selection, Besselian
    /// interpolation with window check, and solar position, all at the
    /// clock's current instant.
    pub fn frame(&self) -> FrameState {
        let now = self.clock.now();
        FrameState {
            elements: elements_for(&self.datasets, now),
            situation: situation(now),
        }
    }

    /// The frame's scalar uniforms for the render sink.
    pub fn scalar_uniforms(&self, frame: &FrameState) -> [ScalarUniform; SCALAR_UNIFORM_COUNT] {
        scalar_uniforms(&frame.elements, &frame.situation)
    }

    /// Viewport-change notification: rebuild the per-row sample grid and
    /// request the covering tile footprint (deduplicated/deferred by the
    /// cache manager).
    ///
    /// Arguments
    /// -----------------
    /// * `viewport`: Current viewport footprint; must span at least one pixel.
    /// * `projection`: Host projection collaborator.
    /// * `fetcher`: Transport collaborator receiving the per-tile requests.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`NightshadeError::InvalidViewport`] for a degenerate
    ///   viewport, leaving the sample grid and cache untouched.
    pub fn update_viewport(
        &mut self,
        viewport: &Viewport,
        projection: &impl Projection,
        fetcher: &mut impl TileFetcher,
    ) -> Result<(), NightshadeError> {
        if viewport.width_px == 0 || viewport.height_px == 0 {
            return Err(NightshadeError::InvalidViewport(format!(
                "viewport must span at least one pixel, got {}x{}",
                viewport.width_px, viewport.height_px
            )));
        }
        self.samples = build_samples(viewport, projection);
        let key = TileKey::for_viewport(viewport, projection.zoom_scale());
        self.cache.request(key, fetcher);
        Ok(())
    }

    /// Feed a batch of tile completions into the cache manager.
    pub fn pump_tiles(
        &mut self,
        completions: impl IntoIterator<Item = TileCompletion>,
        fetcher: &mut impl TileFetcher,
    ) {
        for completion in completions {
            self.cache.on_tile(completion, fetcher);
        }
    }

    /// Renderer reset: all in-flight tile completions become inert.
    pub fn reset_context(&mut self) {
        self.cache.reset_context();
    }

    /// Per-row samples for the current viewport.
    pub fn samples(&self) -> &[GeoSample] {
        &self.samples
    }

    /// The composite night-lights raster currently bound, if any.
    pub fn bound_raster(&self) -> Option<&BoundRaster> {
        self.cache.bound()
    }

    /// Evaluate the obscuration of one sample under this overlay's
    /// configuration.
    ///
    /// Arguments
    /// -----------------
    /// * `frame`: Frame state from [`frame`](Nightshade::frame).
    /// * `sample`: Geographic sample, usually from
    ///   [`samples`](Nightshade::samples).
    /// * `night_sample`: Night-raster RGB at the sample, if loaded.
    pub fn obscuration(
        &self,
        frame: &FrameState,
        sample: &GeoSample,
        night_sample: Option<[f64; 3]>,
    ) -> Obscuration {
        obscuration(
            &frame.elements,
            &frame.situation,
            sample,
            self.config.obscure_factor,
            self.config.city_lights_enabled,
            night_sample,
        )
    }
}
