//! # Nightshade: solar-illumination overlay core
//!
//! `nightshade` computes everything a tiled-map host needs to draw a
//! time-varying day/night overlay: the solar terminator with its civil-twilight
//! blend, an optional eclipse umbra/penumbra derived from Besselian elements,
//! and a composite night-lights raster assembled asynchronously from remote
//! image tiles.
//!
//! The crate deliberately stops at the host boundary: the map projection, the
//! viewport, the clock and the tile transport are **collaborators** consumed
//! through small traits ([`grid::Projection`], [`time::Clock`],
//! [`tiles::TileFetcher`]), and the outputs are plain data — per-sample
//! opacities, named scalar uniforms and a bound composite raster — that the
//! host's rasterizer turns into pixels.
//!
//! Entry point is the [`Nightshade`](crate::nightshade::Nightshade) façade; the
//! individual stages (dataset selection, Besselian interpolation, solar
//! position, obscuration, sample grid, tile cache) are public for hosts that
//! want to drive them directly.

pub mod constants;
pub mod eclipse;
pub mod grid;
pub mod nightshade;
pub mod nightshade_errors;
pub mod obscuration;
pub mod solar;
pub mod tiles;
pub mod time;
pub mod uniforms;
