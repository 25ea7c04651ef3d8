//! Projection collaborator, viewport description and the Sample Grid Builder.
//!
//! World coordinates follow the usual tiled-map convention: the projection
//! maps geographic coordinates into a square world space that spans one tile
//! (256 px) at zoom 0, and `zoom_scale() = 2^zoom` converts world units into
//! pixels at the current zoom. The grid builder emits one geographic/world
//! sample pair per raster row of the viewport; latitude is constant along a
//! row under such projections, so a row sample is enough for the rasterizer.

use nalgebra::Vector2;

use crate::constants::Degree;

/// Geographic ↔ world mapping provided by the host map widget.
pub trait Projection {
    /// World point for a geographic coordinate (zoom-0 world units).
    fn to_world_point(&self, lat: Degree, lng: Degree) -> Vector2<f64>;
    /// Geographic coordinate `(lat, lng)` for a world point.
    fn to_geo(&self, world: Vector2<f64>) -> (Degree, Degree);
    /// `2^zoom` for the current zoom level.
    fn zoom_scale(&self) -> f64;
}

/// Current viewport footprint in world coordinates and device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// World coordinate of the viewport's top-left corner.
    pub top_left: Vector2<f64>,
    /// Viewport width in pixels.
    pub width_px: u32,
    /// Viewport height in pixels.
    pub height_px: u32,
}

/// One per-row evaluation point: geographic position plus its world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoSample {
    /// Latitude, degrees.
    pub lat: Degree,
    /// Longitude, degrees.
    pub lng: Degree,
    /// World coordinate of the sample (zoom-0 units).
    pub world: Vector2<f64>,
}

/// Build the per-row sample set for a viewport.
///
/// Produces `height_px` samples, one per raster row, each anchored at the
/// viewport's left edge. Ephemeral: callers rebuild on every bounds change.
///
/// Arguments
/// -----------------
/// * `viewport`: Current viewport footprint.
/// * `projection`: Host projection collaborator.
///
/// Return
/// ----------
/// * One [`GeoSample`] per raster row, top to bottom.
pub fn build_samples(viewport: &Viewport, projection: &impl Projection) -> Vec<GeoSample> {
    let scale = projection.zoom_scale();
    (0..viewport.height_px)
        .map(|row| {
            let world = Vector2::new(
                viewport.top_left.x,
                viewport.top_left.y + f64::from(row) / scale,
            );
            let (lat, lng) = projection.to_geo(world);
            GeoSample { lat, lng, world }
        })
        .collect()
}

#[cfg(test)]
mod grid_tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Plate-carrée test projection over a 256-unit world square.
    struct Equirectangular {
        zoom: u32,
    }

    impl Projection for Equirectangular {
        fn to_world_point(&self, lat: f64, lng: f64) -> Vector2<f64> {
            Vector2::new((lng + 180.0) / 360.0 * 256.0, (90.0 - lat) / 180.0 * 256.0)
        }

        fn to_geo(&self, world: Vector2<f64>) -> (f64, f64) {
            (90.0 - world.y / 256.0 * 180.0, world.x / 256.0 * 360.0 - 180.0)
        }

        fn zoom_scale(&self) -> f64 {
            f64::from(1u32 << self.zoom)
        }
    }

    #[test]
    fn test_one_sample_per_row() {
        let projection = Equirectangular { zoom: 2 };
        let viewport = Viewport {
            top_left: Vector2::new(64.0, 32.0),
            width_px: 512,
            height_px: 4,
        };
        let samples = build_samples(&viewport, &projection);
        assert_eq!(samples.len(), 4);
        for (row, sample) in samples.iter().enumerate() {
            assert_eq!(sample.world.x, 64.0);
            assert_relative_eq!(sample.world.y, 32.0 + row as f64 / 4.0, epsilon = 1e-12);
        }
        // Top row of the world quarter: lat decreases going down.
        assert!(samples[0].lat > samples[3].lat);
        assert_relative_eq!(samples[0].lng, -90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_round_trip() {
        let projection = Equirectangular { zoom: 3 };
        let world = projection.to_world_point(45.0, -120.0);
        let (lat, lng) = projection.to_geo(world);
        assert_relative_eq!(lat, 45.0, epsilon = 1e-12);
        assert_relative_eq!(lng, -120.0, epsilon = 1e-12);
    }
}
