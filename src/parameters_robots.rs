//! Hardcoded dimensions for the reference machines

use crate::parameters::{DeltaParams, QuattroParams, SixRusParams};

impl DeltaParams {
    /// Dimensions of the reference Delta build.
    pub fn reference() -> Self {
        DeltaParams {
            base_radius: 41.7,
            effector_radius: 27.6,
            l1: 48.6,
            l2: 166.8,
        }
    }
}

impl QuattroParams {
    /// Dimensions of the reference Quattro build.
    pub fn reference() -> Self {
        QuattroParams {
            base_radius: 55.6,
            effector_bar: 39.3,
            l1: 75.8,
            l2: 166.8,
        }
    }
}

impl SixRusParams {
    /// Dimensions of the 6-RUS with the big end effector (the default build).
    pub fn big_effector() -> Self {
        SixRusParams {
            l1: 58.0,
            l2: 200.0,
            dx: 23.6,
            dy: 12.5,
            base_dx: 50.0,
            base_dy: 12.5,
        }
    }

    /// Dimensions of the 6-RUS with the small end effector.
    #[allow(dead_code)]
    pub fn small_effector() -> Self {
        SixRusParams {
            l1: 57.0,
            l2: 92.0,
            dx: 11.0,
            dy: 9.5,
            base_dx: 63.0,
            base_dy: 12.0,
        }
    }
}
