// 3D geometry primitives for the venue graph.
//
// `Position` is the only spatial type in the crate. X and Y are screen-space
// corridor coordinates (in description units), Z is the floor: floor-changer
// anchors always sit on integer Z, and `floor()` truncates Z to the integer
// floor index.
//
// Positions are compared by exact coordinate value. Equality and ordering use
// `f64::total_cmp` so `Position` can key a `BTreeMap` (the canonical
// position -> node map in `venue.rs`). Negative zero is normalized on
// construction so `-0.0` and `0.0` resolve to the same node.
//
// See also: `venue.rs` for node interning, `narrate.rs` for the turn-angle and
// collinearity tests used when merging instructions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// An immutable point (or displacement) in venue space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        // `-0.0 + 0.0 == +0.0`, which keeps total_cmp consistent with `==`.
        Self {
            x: x + 0.0,
            y: y + 0.0,
            z: z + 0.0,
        }
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Multiply every component by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn distance_sq(self, other: Self) -> f64 {
        let d = self - other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// Euclidean distance. This is the edge weight used by the router.
    pub fn distance(self, other: Self) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Integer floor index (Z truncated toward zero).
    pub fn floor(self) -> i32 {
        self.z.trunc() as i32
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// True when the cross product is exactly zero. Opposite directions count
    /// as collinear too; the narrator relies on that when merging runs.
    pub fn is_collinear_with(self, other: Self) -> bool {
        let c = self.cross(other);
        c.x == 0.0 && c.y == 0.0 && c.z == 0.0
    }

    /// Signed angle in degrees from `self` to `other`, projected onto the XY
    /// plane. Positive is counter-clockwise (a left turn with Y pointing up),
    /// negative is clockwise. Zero when either vector has no XY extent.
    pub fn turn_angle_degrees(self, other: Self) -> f64 {
        let cross = self.x * other.y - self.y * other.x;
        let dot = self.x * other.x + self.y * other.y;
        if cross == 0.0 && dot == 0.0 {
            return 0.0;
        }
        cross.atan2(dot).to_degrees()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Position {
        self.scale(rhs)
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.total_cmp(&other.z))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
