// Core identifiers and enums shared across the crate.
//
// Node and POI ids are dense integers assigned in creation order, so they
// index `Vec`s directly (distance/parent arrays in the router, per-node POI
// lists in the venue). The floor-changer enums encode the
// (Stairs | Lift) x (Up | Down) cross product and its complement relation,
// which both the linker and the router depend on.

use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Compact identifier for a graph node. Index into `Venue::nodes()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Compact identifier for a point of interest. Index into `Venue::pois()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoiId(pub u32);

impl PoiId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poi#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Orientation (screen-space directions)
// ---------------------------------------------------------------------------

/// Screen-space direction used both for cursor movement and for which side
/// of the corridor a POI is attached to. Not related to floor up/down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    /// Parse a direction token: a single letter (`U`, `D`, `L`, `R`) or the
    /// full word.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "U" | "Up" => Some(Self::Up),
            "D" | "Down" => Some(Self::Down),
            "L" | "Left" => Some(Self::Left),
            "R" | "Right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit displacement on the current floor. Up is +Y, Right is +X.
    pub fn unit(self) -> Position {
        match self {
            Self::Up => Position::new(0.0, 1.0, 0.0),
            Self::Down => Position::new(0.0, -1.0, 0.0),
            Self::Left => Position::new(-1.0, 0.0, 0.0),
            Self::Right => Position::new(1.0, 0.0, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Floor changers
// ---------------------------------------------------------------------------

/// The physical means of changing floors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Conveyance {
    Stairs,
    Lift,
}

impl Conveyance {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Stairs" => Some(Self::Stairs),
            "Lift" => Some(Self::Lift),
            _ => None,
        }
    }
}

impl fmt::Display for Conveyance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stairs => write!(f, "Stairs"),
            Self::Lift => write!(f, "Lift"),
        }
    }
}

/// Travel direction between floors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vertical {
    Up,
    Down,
}

impl Vertical {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Up" => Some(Self::Up),
            "Down" => Some(Self::Down),
            _ => None,
        }
    }

    /// +1 for Up, -1 for Down.
    pub fn floor_delta(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
        }
    }
}

/// Direction-typed floor-changer kind. A StairsUp on floor N pairs with a
/// StairsDown on floor N+1 carrying the same index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FloorChangerKind {
    StairsUp,
    StairsDown,
    LiftUp,
    LiftDown,
}

impl FloorChangerKind {
    pub fn new(conveyance: Conveyance, vertical: Vertical) -> Self {
        match (conveyance, vertical) {
            (Conveyance::Stairs, Vertical::Up) => Self::StairsUp,
            (Conveyance::Stairs, Vertical::Down) => Self::StairsDown,
            (Conveyance::Lift, Vertical::Up) => Self::LiftUp,
            (Conveyance::Lift, Vertical::Down) => Self::LiftDown,
        }
    }

    pub fn conveyance(self) -> Conveyance {
        match self {
            Self::StairsUp | Self::StairsDown => Conveyance::Stairs,
            Self::LiftUp | Self::LiftDown => Conveyance::Lift,
        }
    }

    pub fn vertical(self) -> Vertical {
        match self {
            Self::StairsUp | Self::LiftUp => Vertical::Up,
            Self::StairsDown | Self::LiftDown => Vertical::Down,
        }
    }

    /// The kind found at the other end of the crossing.
    pub fn complement(self) -> Self {
        match self {
            Self::StairsUp => Self::StairsDown,
            Self::StairsDown => Self::StairsUp,
            Self::LiftUp => Self::LiftDown,
            Self::LiftDown => Self::LiftUp,
        }
    }

    pub fn floor_delta(self) -> i32 {
        self.vertical().floor_delta()
    }
}

impl fmt::Display for FloorChangerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.conveyance(), self.vertical())
    }
}

// ---------------------------------------------------------------------------
// Landmark ranking
// ---------------------------------------------------------------------------

/// Coarse POI class used to rank landmarks in directions. Earlier entries in
/// `NavConfig::landmark_preference` win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LandmarkClass {
    Room,
    Washroom,
    Fixture,
    Lift,
    Stairs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_is_involution() {
        for kind in [
            FloorChangerKind::StairsUp,
            FloorChangerKind::StairsDown,
            FloorChangerKind::LiftUp,
            FloorChangerKind::LiftDown,
        ] {
            assert_eq!(kind.complement().complement(), kind);
            assert_ne!(kind.complement(), kind);
            assert_eq!(kind.complement().conveyance(), kind.conveyance());
            assert_eq!(kind.complement().floor_delta(), -kind.floor_delta());
        }
    }

    #[test]
    fn kind_from_parts() {
        assert_eq!(
            FloorChangerKind::new(Conveyance::Lift, Vertical::Down),
            FloorChangerKind::LiftDown
        );
        assert_eq!(FloorChangerKind::StairsUp.to_string(), "StairsUp");
    }

    #[test]
    fn orientation_tokens() {
        assert_eq!(Orientation::parse("U"), Some(Orientation::Up));
        assert_eq!(Orientation::parse("Left"), Some(Orientation::Left));
        assert_eq!(Orientation::parse("X"), None);
        assert_eq!(Orientation::Left.unit(), Position::new(-1.0, 0.0, 0.0));
        assert_eq!(Orientation::Up.unit(), Position::new(0.0, 1.0, 0.0));
    }
}
