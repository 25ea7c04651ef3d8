//! # Constants and type definitions for Nightshade
//!
//! This module centralizes the **numeric constants**, **conversion factors**,
//! and **common type aliases** used throughout the `nightshade` library:
//!
//! - Angular and time conversions
//! - The eclipse-dataset validity window
//! - The hand-tuned thresholds of the obscuration model
//! - Tile geometry shared by the cache manager and the texture metadata

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Number of milliseconds in a day
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Number of milliseconds in an hour
pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Half-width of the validity window around a dataset's reference epoch.
/// Outside `t0 ± 4 h` the eclipse geometry is disabled entirely.
pub const DATASET_WINDOW_SECONDS: f64 = 4.0 * SECONDS_PER_HOUR;

/// Ratio of sidereal to mean solar rate, used when converting the ΔT
/// correction into shadow hour angle.
pub const SIDEREAL_RATE: f64 = 1.002738;

/// Half-width of the civil-twilight blending band (radians of solar altitude).
/// Day/night opacity is interpolated linearly across `±TWILIGHT_BAND_RAD`.
pub const TWILIGHT_BAND_RAD: f64 = 0.018;

/// Clamp applied to the approximated solar declination (degrees).
pub const DECLINATION_CLAMP_DEG: f64 = 89.9;

/// Base obscuration above which the umbra-edge override starts ramping.
/// Hand-tuned to hide the seam between the linear penumbral falloff and the
/// full-shadow override; do not expect it to generalize.
pub const UMBRA_RAMP_CUTOFF: f64 = 0.95;

/// Base obscuration above which city lights become visible; luminance ramps
/// linearly from 0 here to full at 1.0.
pub const CITY_LIGHTS_THRESHOLD: f64 = 0.90;

/// Floor subtracted from the averaged night-raster sample before scaling the
/// city-light luminance.
pub const CITY_LIGHTS_FLOOR: f64 = 0.1;

/// Edge length of a remote night-lights tile, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Instant on the Unix epoch scale, in seconds (fractional).
pub type EpochSeconds = f64;

/// Angle in degrees.
pub type Degree = f64;

/// Angle in radians.
pub type Radian = f64;

/// Duration or time-of-day expressed in hours.
pub type Hour = f64;
