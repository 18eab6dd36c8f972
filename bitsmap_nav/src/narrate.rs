// Turn-by-turn directions from a computed route.
//
// Instruction `k` describes what to do at route node `k + 1`, the next
// decision point the walker reaches; a route of n >= 2 nodes has n - 1
// instructions and the last one is the arrival message. A route whose first
// edge crosses floors (it starts on a stairway or lift) gets one extra
// leading instruction for that edge, and the rest shift up by one. Each
// instruction is one of:
//
// - arrival:      "Goto <destination>"
// - floor change: "Climb Up Stairs (i)", "Climb Down Stairs (i)",
//                 "Take Lift (i) to Floor: f"
// - corridor run: optional "Turn Left/Right by N° " prefix, then
//                 "Goto <landmark>" or "Keep Going"
//
// A corridor run follows consecutive same-floor segments while their
// direction vectors stay collinear. Collinearity is a pure cross-product
// test, so a reversal continues the run. The landmark is the highest-ranked
// POI (per `NavConfig::landmark_preference`) at the furthest node along the
// run that has one, the decision node included; that node is reported as the
// camera focus.
//
// See also: `pathfinding.rs` for `Route`, `geometry.rs` for the angle and
// collinearity tests.

use crate::config::NavConfig;
use crate::error::RouteError;
use crate::geometry::Position;
use crate::pathfinding::Route;
use crate::types::{Conveyance, FloorChangerKind, NodeId, PoiId, Vertical};
use crate::venue::{PointOfInterest, Venue};
use serde::Serialize;

/// The connector used to change floors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Connector {
    pub kind: FloorChangerKind,
    pub index: u32,
    pub poi: PoiId,
}

/// Floor-change details of an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FloorChange {
    pub from_floor: i32,
    pub to_floor: i32,
    /// `None` when the edge crosses floors without a matching connector pair.
    pub connector: Option<Connector>,
}

/// One rendered direction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Instruction {
    /// Instruction index after clamping.
    pub index: usize,
    /// The route node the instruction is about.
    pub node: NodeId,
    pub text: String,
    /// Signed turn in degrees at `node` (positive = left). `None` when the
    /// turn does not exceed the configured threshold.
    pub turn_angle: Option<f64>,
    pub floor_change: Option<FloorChange>,
    /// Node the presentation layer should center on.
    pub focus: Option<NodeId>,
    /// The landmark named in `text`, if any.
    pub landmark: Option<PoiId>,
}

/// Renders instructions for routes over one venue.
pub struct Narrator<'a> {
    venue: &'a Venue,
    config: &'a NavConfig,
}

impl<'a> Narrator<'a> {
    pub fn new(venue: &'a Venue, config: &'a NavConfig) -> Self {
        Self { venue, config }
    }

    /// Number of instructions for a route (at least one).
    pub fn instruction_count(&self, route: &Route) -> usize {
        let lead = usize::from(self.departs_across_floors(route));
        route.len().saturating_sub(1).max(1) + lead
    }

    /// Every instruction in order.
    pub fn narrate_all(&self, route: &Route) -> Result<Vec<Instruction>, RouteError> {
        (0..self.instruction_count(route))
            .map(|i| self.narrate(route, i))
            .collect()
    }

    /// Instruction `index`, clamped to the valid range.
    pub fn narrate(&self, route: &Route, index: usize) -> Result<Instruction, RouteError> {
        self.check_route(route)?;
        let nodes = &route.nodes;
        let n = nodes.len();
        let lead = self.departs_across_floors(route);
        let index = index.min(self.instruction_count(route) - 1);
        if lead && index == 0 {
            return Ok(self.floor_change_instruction(index, nodes[0], nodes[1], None));
        }
        let d = (index - usize::from(lead) + 1).min(n - 1);

        if d == n - 1 {
            return Ok(self.arrival(route, index));
        }

        let here = nodes[d];
        let next = nodes[d + 1];
        let p_here = self.pos(here);
        let p_next = self.pos(next);
        let incoming = p_here - self.pos(nodes[d - 1]);
        let outgoing = p_next - p_here;

        let angle = incoming.turn_angle_degrees(outgoing);
        let turn_angle = (angle.abs() > self.config.turn_threshold_degrees).then_some(angle);

        if p_here.z != p_next.z {
            return Ok(self.floor_change_instruction(index, here, next, turn_angle));
        }

        // Follow the run while segments stay collinear and on this floor.
        let mut landmark = self.best_landmark(here).map(|p| (p.id, here));
        let mut direction = outgoing;
        let mut j = d + 1;
        loop {
            if let Some(poi) = self.best_landmark(nodes[j]) {
                landmark = Some((poi.id, nodes[j]));
            }
            if j + 1 >= n {
                break;
            }
            let (a, b) = (self.pos(nodes[j]), self.pos(nodes[j + 1]));
            let next_direction = b - a;
            if a.z != b.z || !direction.is_collinear_with(next_direction) {
                break;
            }
            direction = next_direction;
            j += 1;
        }
        let run_end = nodes[j];

        let prefix = turn_angle.map(turn_text).unwrap_or_default();
        let (text, focus, landmark_id) = match landmark {
            Some((poi, at)) => {
                let name = &self.venue.pois()[poi.index()].name;
                (format!("{prefix}Goto {name}"), at, Some(poi))
            }
            None => (format!("{prefix}Keep Going"), run_end, None),
        };

        Ok(Instruction {
            index,
            node: here,
            text,
            turn_angle,
            floor_change: None,
            focus: Some(focus),
            landmark: landmark_id,
        })
    }

    fn floor_change_instruction(
        &self,
        index: usize,
        here: NodeId,
        next: NodeId,
        turn_angle: Option<f64>,
    ) -> Instruction {
        let floor_change = self.floor_change(here, next);
        Instruction {
            index,
            node: here,
            text: floor_change_text(&floor_change, self.pos(next)),
            turn_angle,
            floor_change: Some(floor_change),
            focus: None,
            landmark: None,
        }
    }

    /// Whether the first edge of the route changes floor.
    fn departs_across_floors(&self, route: &Route) -> bool {
        match route.nodes.as_slice() {
            [a, b, ..] => match (self.venue.get_node(*a), self.venue.get_node(*b)) {
                (Some(a), Some(b)) => a.position.z != b.position.z,
                _ => false,
            },
            _ => false,
        }
    }

    fn arrival(&self, route: &Route, index: usize) -> Instruction {
        let destination = route.destination();
        let landmark = route
            .destination_poi
            .and_then(|id| self.venue.poi(id))
            .or_else(|| self.best_landmark(destination));
        let name = landmark.map_or("destination", |p| p.name.as_str());
        Instruction {
            index,
            node: destination,
            text: format!("Goto {name}"),
            turn_angle: None,
            floor_change: None,
            focus: None,
            landmark: landmark.map(|p| p.id),
        }
    }

    /// The connector pair joining `from` and `to`: complementary kinds, the
    /// same index, and `from`'s recorded other end at `to`.
    fn floor_change(&self, from: NodeId, to: NodeId) -> FloorChange {
        let target = self.pos(to);
        let connector = self.venue.floor_changers_at(from).find_map(|(poi, fc)| {
            let paired = self.venue.floor_changers_at(to).any(|(_, other)| {
                other.kind == fc.kind.complement() && other.index == fc.index
            });
            (paired && fc.other_end == target).then(|| Connector {
                kind: fc.kind,
                index: fc.index,
                poi: poi.id,
            })
        });
        FloorChange {
            from_floor: self.pos(from).floor(),
            to_floor: target.floor(),
            connector,
        }
    }

    /// Highest-ranked POI at a node. Equal ranks go to the later POI.
    fn best_landmark(&self, node: NodeId) -> Option<&'a PointOfInterest> {
        let venue: &'a Venue = self.venue;
        let mut best: Option<&'a PointOfInterest> = None;
        for &id in venue.pois_at(node) {
            let Some(poi) = venue.poi(id) else {
                continue;
            };
            let rank = self.config.landmark_rank(poi.kind.landmark_class());
            let better =
                best.is_none_or(|b| rank <= self.config.landmark_rank(b.kind.landmark_class()));
            if better {
                best = Some(poi);
            }
        }
        best
    }

    fn pos(&self, node: NodeId) -> Position {
        self.venue.position(node)
    }

    fn check_route(&self, route: &Route) -> Result<(), RouteError> {
        if route.is_empty() {
            return Err(RouteError::InvalidQuery("cannot narrate an empty route".into()));
        }
        if let Some(bad) = route.nodes.iter().find(|id| self.venue.get_node(**id).is_none()) {
            return Err(RouteError::InvalidQuery(format!("{bad} is not in the venue")));
        }
        Ok(())
    }
}

/// Narrate one instruction with the default configuration.
pub fn narrate(venue: &Venue, route: &Route, index: usize) -> Result<Instruction, RouteError> {
    let config = NavConfig::default();
    Narrator::new(venue, &config).narrate(route, index)
}

/// Narrate a whole route with the default configuration.
pub fn narrate_all(venue: &Venue, route: &Route) -> Result<Vec<Instruction>, RouteError> {
    let config = NavConfig::default();
    Narrator::new(venue, &config).narrate_all(route)
}

fn turn_text(angle: f64) -> String {
    let side = if angle < 0.0 { "Right" } else { "Left" };
    format!("Turn {side} by {}° ", angle.abs().round() as i64)
}

fn floor_change_text(change: &FloorChange, target: Position) -> String {
    match &change.connector {
        Some(c) => match (c.kind.conveyance(), c.kind.vertical()) {
            (Conveyance::Stairs, Vertical::Up) => format!("Climb Up Stairs ({})", c.index),
            (Conveyance::Stairs, Vertical::Down) => format!("Climb Down Stairs ({})", c.index),
            (Conveyance::Lift, _) => {
                format!("Take Lift ({}) to Floor: {}", c.index, target.floor())
            }
        },
        None => format!("Go to Floor: {}", change.to_floor),
    }
}
