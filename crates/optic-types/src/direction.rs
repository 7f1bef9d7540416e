use serde::{Deserialize, Serialize};

/// Wrap an angle in degrees into (-180, 180].
pub fn normalize_deg(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Unsigned angle between two headings in degrees, in [0, 180].
pub fn heading_difference(a: f64, b: f64) -> f64 {
    normalize_deg(a - b).abs()
}

/// Angle between the lines carrying two headings, in [0, 90].
pub fn line_angle(a: f64, b: f64) -> f64 {
    let d = heading_difference(a, b);
    d.min(180.0 - d)
}

/// Unit vector in the plate plane for a heading in degrees.
pub fn heading_vector(heading_deg: f64) -> (f64, f64) {
    let r = heading_deg.to_radians();
    (r.cos(), r.sin())
}

/// Beam propagation directions in the plate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    Right,
    Left,
    Up,
    Down,
}

impl Cardinal {
    pub fn degrees(self) -> f64 {
        match self {
            Cardinal::Right => 0.0,
            Cardinal::Left => 180.0,
            Cardinal::Up => 90.0,
            Cardinal::Down => -90.0,
        }
    }
}

/// Mirror orientations that fold a beam by 90 degrees.
///
/// `UpRight` takes a beam travelling up and sends it right, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    UpRight,
    RightUp,
    UpLeft,
    LeftUp,
    DownRight,
    RightDown,
    DownLeft,
    LeftDown,
}

impl Turn {
    pub fn degrees(self) -> f64 {
        match self {
            Turn::UpRight => -45.0,
            Turn::RightUp => 135.0,
            Turn::UpLeft => -135.0,
            Turn::LeftUp => 45.0,
            Turn::DownRight => 45.0,
            Turn::RightDown => -135.0,
            Turn::DownLeft => 135.0,
            Turn::LeftDown => -45.0,
        }
    }

    pub fn incoming(self) -> Cardinal {
        match self {
            Turn::UpRight | Turn::UpLeft => Cardinal::Up,
            Turn::RightUp | Turn::RightDown => Cardinal::Right,
            Turn::DownRight | Turn::DownLeft => Cardinal::Down,
            Turn::LeftUp | Turn::LeftDown => Cardinal::Left,
        }
    }

    pub fn outgoing(self) -> Cardinal {
        match self {
            Turn::UpRight | Turn::DownRight => Cardinal::Right,
            Turn::UpLeft | Turn::DownLeft => Cardinal::Left,
            Turn::RightUp | Turn::LeftUp => Cardinal::Up,
            Turn::RightDown | Turn::LeftDown => Cardinal::Down,
        }
    }
}
