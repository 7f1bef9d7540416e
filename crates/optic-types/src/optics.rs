//! Optical behaviour of a component as seen by the beam resolver.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::direction::{line_angle, normalize_deg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpticalTag {
    /// Folds the beam about the element's reflecting surface.
    Reflect,
    /// Passes the beam, optionally deviating it by a fixed angle.
    Transmit,
    /// Produces both a transmitted and a reflected onward branch.
    Split,
}

/// Capability tags plus the geometric parameters the resolver needs.
///
/// All angles are in degrees. `reflection_offset` is added to the
/// element yaw to obtain the orientation of the reflecting surface normal;
/// `deflection` is added to the heading of a transmitted beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalRole {
    pub tags: BTreeSet<OpticalTag>,
    pub aperture_half_width: f64,
    pub reflection_offset: f64,
    pub deflection: f64,
    pub max_acceptance: f64,
}

/// Outgoing headings produced by one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitHeadings {
    pub transmitted: Option<f64>,
    pub reflected: Option<f64>,
}

impl ExitHeadings {
    pub fn blocked() -> Self {
        Self {
            transmitted: None,
            reflected: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.transmitted.is_none() && self.reflected.is_none()
    }
}

impl OpticalRole {
    /// No optical interaction: the element ends any beam that reaches it.
    pub fn inert() -> Self {
        Self {
            tags: BTreeSet::new(),
            aperture_half_width: 0.0,
            reflection_offset: 0.0,
            deflection: 0.0,
            max_acceptance: 0.0,
        }
    }

    pub fn reflector(aperture_half_width: f64, max_acceptance: f64) -> Self {
        Self {
            tags: BTreeSet::from([OpticalTag::Reflect]),
            aperture_half_width,
            max_acceptance,
            ..Self::inert()
        }
    }

    pub fn transmitter(aperture_half_width: f64, deflection: f64, max_acceptance: f64) -> Self {
        Self {
            tags: BTreeSet::from([OpticalTag::Transmit]),
            aperture_half_width,
            deflection,
            max_acceptance,
            ..Self::inert()
        }
    }

    pub fn splitter(
        aperture_half_width: f64,
        reflection_offset: f64,
        max_acceptance: f64,
    ) -> Self {
        Self {
            tags: BTreeSet::from([OpticalTag::Reflect, OpticalTag::Transmit, OpticalTag::Split]),
            aperture_half_width,
            reflection_offset,
            max_acceptance,
            ..Self::inert()
        }
    }

    /// Splits by diffraction: the undeviated order continues straight and
    /// the first order leaves at `deflection`.
    pub fn diffractive_splitter(
        aperture_half_width: f64,
        deflection: f64,
        max_acceptance: f64,
    ) -> Self {
        Self {
            tags: BTreeSet::from([OpticalTag::Transmit, OpticalTag::Split]),
            aperture_half_width,
            deflection,
            max_acceptance,
            ..Self::inert()
        }
    }

    /// Terminal element that still has an entrance aperture (fiber couplers, detectors).
    pub fn terminal(aperture_half_width: f64, max_acceptance: f64) -> Self {
        Self {
            aperture_half_width,
            max_acceptance,
            ..Self::inert()
        }
    }

    pub fn has(&self, tag: OpticalTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_split(&self) -> bool {
        self.has(OpticalTag::Split)
    }

    /// Heading of a beam leaving the reflecting surface.
    ///
    /// `exit = 2 * (yaw + reflection_offset) - incoming + 180`
    pub fn reflect_heading(&self, element_yaw: f64, incoming: f64) -> f64 {
        normalize_deg(2.0 * (element_yaw + self.reflection_offset) - incoming + 180.0)
    }

    pub fn transmit_heading(&self, incoming: f64) -> f64 {
        normalize_deg(incoming + self.deflection)
    }

    /// Exit headings after `fold_count` internal reflections have turned
    /// the incoming beam around that many times.
    ///
    /// A splitter's straight branch keeps the incoming heading; its second
    /// branch is reflected when the element reflects, otherwise deflected.
    pub fn exit_headings(&self, element_yaw: f64, incoming: f64, fold_count: u32) -> ExitHeadings {
        let incoming = normalize_deg(incoming + 180.0 * f64::from(fold_count % 2));
        if self.is_split() {
            let deviated = if self.has(OpticalTag::Reflect) {
                self.reflect_heading(element_yaw, incoming)
            } else {
                self.transmit_heading(incoming)
            };
            return ExitHeadings {
                transmitted: Some(incoming),
                reflected: Some(deviated),
            };
        }
        if self.has(OpticalTag::Reflect) {
            return ExitHeadings {
                transmitted: None,
                reflected: Some(self.reflect_heading(element_yaw, incoming)),
            };
        }
        if self.has(OpticalTag::Transmit) {
            return ExitHeadings {
                transmitted: Some(self.transmit_heading(incoming)),
                reflected: None,
            };
        }
        ExitHeadings::blocked()
    }

    /// Angle between the incoming beam line and the element's optical axis, in [0, 90].
    pub fn incidence(&self, element_yaw: f64, incoming: f64) -> f64 {
        line_angle(incoming, element_yaw)
    }

    /// Aperture half-width projected onto the plane normal to the beam.
    pub fn effective_half_width(&self, element_yaw: f64, incoming: f64) -> f64 {
        self.aperture_half_width * self.incidence(element_yaw, incoming).to_radians().cos()
    }
}
