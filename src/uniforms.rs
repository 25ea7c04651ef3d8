//! Render-sink scalar uniform mapping.
//!
//! The rasterizer consumes the interpolated elements and the solar situation
//! as named scalar uniforms. The mapping from struct fields to `u_<name>`
//! slots is enumerated here explicitly and fixed at compile time — no
//! reflection over field names.

use crate::eclipse::InterpolatedElements;
use crate::solar::SolarSituation;

/// Number of scalar uniforms fed to the render sink per frame.
pub const SCALAR_UNIFORM_COUNT: usize = 12;

/// One named scalar destined for a render-sink slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarUniform {
    pub name: &'static str,
    pub value: f64,
}

/// The full per-frame scalar uniform set, in a fixed order.
///
/// Arguments
/// -----------------
/// * `elements`: Interpolated shadow geometry for the frame.
/// * `situation`: Solar geometry for the frame.
///
/// Return
/// ----------
/// * The twelve `u_<field>` scalars, elements first, situation last.
pub fn scalar_uniforms(
    elements: &InterpolatedElements,
    situation: &SolarSituation,
) -> [ScalarUniform; SCALAR_UNIFORM_COUNT] {
    [
        ScalarUniform { name: "u_x", value: elements.x },
        ScalarUniform { name: "u_y", value: elements.y },
        ScalarUniform { name: "u_d", value: elements.d },
        ScalarUniform { name: "u_l1", value: elements.l1 },
        ScalarUniform { name: "u_l2", value: elements.l2 },
        ScalarUniform { name: "u_mu", value: elements.mu },
        ScalarUniform { name: "u_deltat", value: elements.deltat },
        ScalarUniform { name: "u_tanf1", value: elements.tanf1 },
        ScalarUniform { name: "u_tanf2", value: elements.tanf2 },
        ScalarUniform { name: "u_local_time", value: situation.local_time },
        ScalarUniform { name: "u_declination", value: situation.declination },
        ScalarUniform { name: "u_equation", value: situation.equation },
    ]
}
