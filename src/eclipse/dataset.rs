//! Eclipse dataset records, the built-in table, and the Dataset Selector.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, EpochSeconds, DATASET_WINDOW_SECONDS};

/// One set of Besselian elements for a single eclipse.
///
/// Each polynomial field holds the four cubic coefficients
/// `[c0, c1, c2, c3]` evaluated at `Δt = (now − t0)/3600` hours.
/// `deltat`, `tanf1` and `tanf2` are carried as constants, not interpolated.
///
/// Invariant: within a table, `t0` values are strictly increasing, and a
/// dataset is valid only inside `t0 ± 4 h`.
///
/// See also
/// ------------
/// * [`select`] – Picks the applicable dataset for an instant.
/// * [`crate::eclipse::bessel::elements_for`] – Evaluation with window check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclipseDataset {
    /// Reference epoch, Unix seconds (UTC).
    pub t0: EpochSeconds,
    /// Shadow-axis unit-vector component `x` (fundamental-plane units).
    pub x: [f64; 4],
    /// Shadow-axis unit-vector component `y`.
    pub y: [f64; 4],
    /// Shadow-axis declination (degrees).
    pub d: [Degree; 4],
    /// Penumbral radius on the fundamental plane.
    pub l1: [f64; 4],
    /// Umbral radius on the fundamental plane (negative for total eclipses).
    pub l2: [f64; 4],
    /// Shadow hour angle (degrees).
    pub mu: [Degree; 4],
    /// ΔT correction (seconds), carried as a constant.
    pub deltat: f64,
    /// Tangent of the penumbral cone half-angle.
    pub tanf1: f64,
    /// Tangent of the umbral cone half-angle.
    pub tanf2: f64,
}

impl EclipseDataset {
    /// Whether `now` falls inside this dataset's ±4 h validity window.
    pub fn in_window(&self, now: EpochSeconds) -> bool {
        (now - self.t0).abs() <= DATASET_WINDOW_SECONDS
    }
}

/// Pick the applicable dataset for an instant.
///
/// Scans the table in ascending `t0` order and returns the first entry whose
/// window has not yet closed (`t0 + 4 h > now`). Returns `None` once `now`
/// is past the window of the last entry. A returned dataset may still be out
/// of window on the early side; the interpolator's window check handles that.
///
/// Arguments
/// -----------------
/// * `datasets`: Table ordered by strictly increasing `t0`.
/// * `now`: Instant in Unix epoch seconds.
///
/// Return
/// ----------
/// * The earliest-indexed qualifying dataset, or `None`.
pub fn select(datasets: &[EclipseDataset], now: EpochSeconds) -> Option<&EclipseDataset> {
    datasets
        .iter()
        .find(|dataset| dataset.t0 + DATASET_WINDOW_SECONDS > now)
}

/// Built-in Besselian element sets for the major eclipses 2017–2026.
///
/// Visualization-grade coefficients tabulated from the published circulars;
/// `t0` is the reference hour converted to Unix seconds (TDT minus ΔT).
/// Callers needing other events can supply their own ordered table.
pub fn builtin_datasets() -> &'static [EclipseDataset] {
    static DATASETS: Lazy<Vec<EclipseDataset>> = Lazy::new(|| {
        vec![
            // 2017-08-21 total (Americas)
            EclipseDataset {
                t0: 1503338331.2,
                x: [-0.129571, 0.5406426, -0.0000294, -0.0000081],
                y: [0.485416, -0.14164, -0.0000905, 0.0000020],
                d: [11.8669596, -0.013622, -0.000002, 0.0],
                l1: [0.542093, 0.0001241, -0.0000118, 0.0],
                l2: [-0.004025, 0.0001234, -0.0000117, 0.0],
                mu: [89.245430, 15.003940, 0.0, 0.0],
                deltat: 68.8,
                tanf1: 0.0046222,
                tanf2: 0.0045992,
            },
            // 2019-07-02 total (South Pacific, Chile, Argentina)
            EclipseDataset {
                t0: 1562093930.7,
                x: [-0.2173, 0.5169217, 0.0000123, -0.0000081],
                y: [-0.6046, 0.0236091, 0.0001266, 0.0000010],
                d: [23.0097, -0.00181, -0.0000050, 0.0],
                l1: [0.5381, -0.0000910, -0.0000124, 0.0],
                l2: [-0.00804, -0.0000905, -0.0000123, 0.0],
                mu: [104.6477, 15.00106, 0.0, 0.0],
                deltat: 69.3,
                tanf1: 0.0045970,
                tanf2: 0.0045740,
            },
            // 2019-12-26 annular (Arabia, Indonesia)
            EclipseDataset {
                t0: 1577336330.6,
                x: [-0.26429, 0.5001200, 0.0000210, -0.0000080],
                y: [0.42736, -0.2470800, -0.0001070, 0.0000040],
                d: [-23.3950, 0.00107, 0.0000060, 0.0],
                l1: [0.5619, 0.0000840, -0.0000102, 0.0],
                l2: [0.0157, 0.0000830, -0.0000101, 0.0],
                mu: [255.2566, 15.00178, 0.0, 0.0],
                deltat: 69.4,
                tanf1: 0.0046080,
                tanf2: 0.0045850,
            },
            // 2020-06-21 annular (Africa, Asia)
            EclipseDataset {
                t0: 1592719130.6,
                x: [0.15431, 0.5283700, 0.0000240, -0.0000082],
                y: [0.46945, -0.2541200, -0.0001120, 0.0000040],
                d: [23.4360, -0.00112, -0.0000060, 0.0],
                l1: [0.5507, -0.0001100, -0.0000108, 0.0],
                l2: [0.00465, -0.0001100, -0.0000107, 0.0],
                mu: [269.2675, 15.00123, 0.0, 0.0],
                deltat: 69.4,
                tanf1: 0.0045910,
                tanf2: 0.0045680,
            },
            // 2020-12-14 total (Chile, Argentina)
            EclipseDataset {
                t0: 1607961530.6,
                x: [-0.18122, 0.5627900, 0.0000042, -0.0000094],
                y: [-0.26869, -0.1741100, 0.0001310, 0.0000030],
                d: [-23.2577, -0.00102, 0.0000060, 0.0],
                l1: [0.5432, 0.0001250, -0.0000123, 0.0],
                l2: [-0.00297, 0.0001240, -0.0000122, 0.0],
                mu: [61.2659, 15.00304, 0.0, 0.0],
                deltat: 69.4,
                tanf1: 0.0046700,
                tanf2: 0.0046470,
            },
            // 2021-06-10 annular (Canada, Greenland, Siberia)
            EclipseDataset {
                t0: 1623322730.6,
                x: [0.04371, 0.5282700, 0.0000300, -0.0000082],
                y: [0.90443, -0.2420300, -0.0001050, 0.0000040],
                d: [23.0609, -0.00250, -0.0000060, 0.0],
                l1: [0.5525, -0.0000970, -0.0000107, 0.0],
                l2: [0.00644, -0.0000960, -0.0000106, 0.0],
                mu: [344.2742, 15.00146, 0.0, 0.0],
                deltat: 69.4,
                tanf1: 0.0045890,
                tanf2: 0.0045660,
            },
            // 2021-12-04 total (Antarctica)
            EclipseDataset {
                t0: 1638604730.6,
                x: [-0.25277, 0.5406400, 0.0000290, -0.0000083],
                y: [-0.94623, -0.0617000, 0.0001250, 0.0000010],
                d: [-22.2747, -0.00629, 0.0000060, 0.0],
                l1: [0.5419, 0.0001210, -0.0000119, 0.0],
                l2: [-0.00415, 0.0001200, -0.0000118, 0.0],
                mu: [301.7507, 15.00262, 0.0, 0.0],
                deltat: 69.4,
                tanf1: 0.0046630,
                tanf2: 0.0046400,
            },
            // 2023-04-20 hybrid (Australia, Indonesia)
            EclipseDataset {
                t0: 1681963130.8,
                x: [-0.33890, 0.5196300, 0.0000110, -0.0000080],
                y: [-0.49655, 0.2318900, 0.0001090, -0.0000030],
                d: [11.4339, 0.01347, -0.0000030, 0.0],
                l1: [0.5471, 0.0000690, -0.0000121, 0.0],
                l2: [0.00101, 0.0000680, -0.0000120, 0.0],
                mu: [241.5097, 15.00339, 0.0, 0.0],
                deltat: 69.2,
                tanf1: 0.0046580,
                tanf2: 0.0046350,
            },
            // 2023-10-14 annular (Americas)
            EclipseDataset {
                t0: 1697306330.8,
                x: [0.16603, 0.5056300, -0.0000280, -0.0000080],
                y: [0.33958, -0.2485500, -0.0001050, 0.0000040],
                d: [-8.2441, -0.01456, 0.0000030, 0.0],
                l1: [0.5642, 0.0000890, -0.0000101, 0.0],
                l2: [0.01797, 0.0000880, -0.0000100, 0.0],
                mu: [93.5017, 15.00429, 0.0, 0.0],
                deltat: 69.2,
                tanf1: 0.0046060,
                tanf2: 0.0045830,
            },
            // 2024-04-08 total (Mexico, USA, Canada)
            EclipseDataset {
                t0: 1712599130.9,
                x: [-0.318244, 0.5117116, 0.0000326, -0.0000084],
                y: [0.219764, 0.2709589, -0.0000595, -0.0000047],
                d: [7.5862002, 0.0148440, -0.0000020, 0.0],
                l1: [0.535814, 0.0000618, -0.0000128, 0.0],
                l2: [-0.010272, 0.0000615, -0.0000127, 0.0],
                mu: [89.591217, 15.004080, 0.0, 0.0],
                deltat: 69.1,
                tanf1: 0.0046683,
                tanf2: 0.0046450,
            },
            // 2024-10-02 annular (South Pacific, Chile, Argentina)
            EclipseDataset {
                t0: 1727895530.9,
                x: [0.28054, 0.4919300, -0.0000230, -0.0000078],
                y: [-0.62904, -0.2335900, 0.0001050, 0.0000037],
                d: [-3.9855, -0.01543, 0.0000030, 0.0],
                l1: [0.5665, 0.0001020, -0.0000099, 0.0],
                l2: [0.02023, 0.0001010, -0.0000098, 0.0],
                mu: [108.0713, 15.00392, 0.0, 0.0],
                deltat: 69.1,
                tanf1: 0.0046000,
                tanf2: 0.0045770,
            },
            // 2026-08-12 total (Greenland, Iceland, Spain)
            EclipseDataset {
                t0: 1786553930.5,
                x: [0.41834, 0.4907900, -0.0000400, -0.0000077],
                y: [0.93434, -0.1541300, -0.0001270, 0.0000025],
                d: [14.7930, -0.01123, -0.0000030, 0.0],
                l1: [0.5394, 0.0001100, -0.0000125, 0.0],
                l2: [-0.00665, 0.0001090, -0.0000124, 0.0],
                mu: [74.6000, 15.00384, 0.0, 0.0],
                deltat: 69.5,
                tanf1: 0.0046650,
                tanf2: 0.0046420,
            },
        ]
    });
    &DATASETS
}
