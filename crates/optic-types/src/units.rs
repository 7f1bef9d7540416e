//! Imperial hardware dimensions, in millimetres.

pub const INCH: f64 = 25.4;

/// Depth of a through hole cut into a baseplate.
pub const DRILL_DEPTH: f64 = 100.0;

/// Default beam height above the baseplate working surface.
pub const DEFAULT_OPTICS_DZ: f64 = INCH / 2.0;

/// Diameter of the alignment pins used under small kinematic mounts.
pub const PIN_DIA: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltSpec {
    pub name: &'static str,
    pub clear_dia: f64,
    pub tap_dia: f64,
    pub head_dia: f64,
    pub head_dz: f64,
    pub washer_dia: Option<f64>,
}

pub const BOLT_4_40: BoltSpec = BoltSpec {
    name: "4-40",
    clear_dia: 0.120 * INCH,
    tap_dia: 0.089 * INCH,
    head_dia: 5.50,
    head_dz: 2.5,
    washer_dia: None,
};

pub const BOLT_8_32: BoltSpec = BoltSpec {
    name: "8-32",
    clear_dia: 0.172 * INCH,
    tap_dia: 0.136 * INCH,
    head_dia: 7.0,
    head_dz: 4.4,
    washer_dia: None,
};

pub const BOLT_14_20: BoltSpec = BoltSpec {
    name: "1/4-20",
    clear_dia: 0.260 * INCH,
    tap_dia: 0.201 * INCH,
    head_dia: 9.8,
    head_dz: 10.0,
    washer_dia: Some(9.0 / 16.0 * INCH),
};

impl BoltSpec {
    /// Counterbore diameter: the washer if the bolt uses one, else the head.
    pub fn counterbore_dia(&self) -> f64 {
        self.washer_dia.unwrap_or(self.head_dia)
    }
}
