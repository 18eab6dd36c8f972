// The compiled venue: nodes, undirected adjacency, points of interest and the
// floor-changer index.
//
// A `Venue` is built once by `compiler.rs`, completed by `linker.rs`, and is
// read-only afterwards. Mutating methods are `pub(crate)` so nothing outside
// the build pipeline can edit it; a finished `Venue` can be shared by
// reference across any number of routing/narration calls.
//
// Storage follows the nav graph convention of dense ids: `nodes`,
// `adjacency` and `pois_by_node` are `Vec`s indexed by `NodeId`, `pois` is
// indexed by `PoiId`. Keyed lookups (position -> node, label -> node,
// floor-changer key -> POI) use `BTreeMap` for deterministic iteration.
//
// Nodes are interned by exact `Position`: revisiting a position always
// resolves to the node created on the first visit.

use crate::geometry::Position;
use crate::types::{FloorChangerKind, LandmarkClass, NodeId, Orientation, PoiId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// A graph vertex at a unique position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
}

/// One end of a stairway or lift crossing between adjacent floors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorChanger {
    pub kind: FloorChangerKind,
    /// Which physical stairway/lift this belongs to. Parallel stairs carry
    /// different indices.
    pub index: u32,
    /// Position of the matching connector one floor away.
    pub other_end: Position,
    /// Ramp present (stairs) or step-free (lift).
    pub accessible: bool,
}

/// What a point of interest is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PoiKind {
    Room,
    Washroom,
    /// Drinking water, extinguishers and any other generic fixture.
    Fixture,
    FloorChanger(FloorChanger),
}

impl PoiKind {
    pub fn landmark_class(&self) -> LandmarkClass {
        match self {
            Self::Room => LandmarkClass::Room,
            Self::Washroom => LandmarkClass::Washroom,
            Self::Fixture => LandmarkClass::Fixture,
            Self::FloorChanger(fc) => match fc.kind {
                FloorChangerKind::LiftUp | FloorChangerKind::LiftDown => LandmarkClass::Lift,
                FloorChangerKind::StairsUp | FloorChangerKind::StairsDown => LandmarkClass::Stairs,
            },
        }
    }
}

/// A named landmark anchored to one node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub name: String,
    pub kind: PoiKind,
    /// Which side of the corridor the POI is attached to.
    pub orientation: Orientation,
    pub node: NodeId,
    pub position: Position,
}

impl PointOfInterest {
    pub fn floor(&self) -> i32 {
        self.position.floor()
    }

    pub fn floor_changer(&self) -> Option<&FloorChanger> {
        match &self.kind {
            PoiKind::FloorChanger(fc) => Some(fc),
            _ => None,
        }
    }

    /// The label shown in search results, e.g. `"Room 101, Floor: 0"`.
    pub fn search_label(&self) -> String {
        format!("{}, Floor: {}", self.name, self.floor())
    }
}

/// Floor-changer index key: (kind, index, floor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FloorChangerKey {
    pub kind: FloorChangerKind,
    pub index: u32,
    pub floor: i32,
}

impl FloorChangerKey {
    /// Key of the connector this one should pair with.
    pub fn partner(self) -> Self {
        Self {
            kind: self.kind.complement(),
            index: self.index,
            floor: self.floor + self.kind.floor_delta(),
        }
    }
}

/// Aggregate counts, for logging and the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSummary {
    pub nodes: usize,
    pub edges: usize,
    pub pois: usize,
    pub floor_changers: usize,
    pub labels: usize,
    pub floors: Vec<i32>,
}

/// The compiled venue graph.
#[derive(Clone, Debug, Default)]
pub struct Venue {
    nodes: Vec<Node>,
    node_by_position: BTreeMap<Position, NodeId>,
    adjacency: Vec<SmallVec<[NodeId; 4]>>,
    edge_count: usize,
    pois: Vec<PointOfInterest>,
    pois_by_node: Vec<SmallVec<[PoiId; 2]>>,
    floor_changers: BTreeMap<FloorChangerKey, PoiId>,
    labels: BTreeMap<String, NodeId>,
    floors: BTreeSet<i32>,
}

impl Venue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // -- construction (compiler / linker only) ------------------------------

    /// Return the node at `position`, creating it on first visit.
    pub(crate) fn intern_node(&mut self, position: Position) -> NodeId {
        if let Some(&id) = self.node_by_position.get(&position) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, position });
        self.adjacency.push(SmallVec::new());
        self.pois_by_node.push(SmallVec::new());
        self.node_by_position.insert(position, id);
        self.floors.insert(position.floor());
        id
    }

    /// Add an undirected edge. Returns false if the edge already existed or
    /// would be a self-loop.
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || self.adjacency[a.index()].contains(&b) {
            return false;
        }
        self.adjacency[a.index()].push(b);
        self.adjacency[b.index()].push(a);
        self.edge_count += 1;
        true
    }

    pub(crate) fn add_poi(
        &mut self,
        node: NodeId,
        name: String,
        kind: PoiKind,
        orientation: Orientation,
    ) -> PoiId {
        let id = PoiId(self.pois.len() as u32);
        let position = self.nodes[node.index()].position;
        self.pois.push(PointOfInterest {
            id,
            name,
            kind,
            orientation,
            node,
            position,
        });
        self.pois_by_node[node.index()].push(id);
        id
    }

    /// Register a floor-changer POI under its key. Returns the previously
    /// registered POI if the key was already taken (and leaves it in place).
    pub(crate) fn register_floor_changer(
        &mut self,
        key: FloorChangerKey,
        poi: PoiId,
    ) -> Result<(), PoiId> {
        match self.floor_changers.get(&key) {
            Some(&existing) => Err(existing),
            None => {
                self.floor_changers.insert(key, poi);
                Ok(())
            }
        }
    }

    /// Bind a label; returns the node it was bound to before, if any.
    pub(crate) fn bind_label(&mut self, label: &str, node: NodeId) -> Option<NodeId> {
        self.labels.insert(label.to_string(), node)
    }

    // -- nodes and edges ----------------------------------------------------

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn position(&self, id: NodeId) -> Position {
        self.nodes[id.index()].position
    }

    pub fn node_at(&self, position: Position) -> Option<NodeId> {
        self.node_by_position.get(&position).copied()
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adjacency[id.index()]
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Every undirected edge once, as `(lower id, higher id)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(i, adj)| {
            let a = NodeId(i as u32);
            adj.iter().filter(move |&&b| a < b).map(move |&b| (a, b))
        })
    }

    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(a.index())
            .is_some_and(|adj| adj.contains(&b))
    }

    // -- points of interest -------------------------------------------------

    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    pub fn poi(&self, id: PoiId) -> Option<&PointOfInterest> {
        self.pois.get(id.index())
    }

    /// Node a POI is anchored to.
    pub fn poi_node(&self, id: PoiId) -> Option<NodeId> {
        self.poi(id).map(|p| p.node)
    }

    /// POIs anchored at a node, in creation order.
    pub fn pois_at(&self, node: NodeId) -> &[PoiId] {
        self.pois_by_node
            .get(node.index())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Floor-changers anchored at a node.
    pub fn floor_changers_at(
        &self,
        node: NodeId,
    ) -> impl Iterator<Item = (&PointOfInterest, &FloorChanger)> + '_ {
        self.pois_at(node).iter().filter_map(move |&id| {
            let poi = &self.pois[id.index()];
            poi.floor_changer().map(|fc| (poi, fc))
        })
    }

    pub fn floor_changer(
        &self,
        kind: FloorChangerKind,
        index: u32,
        floor: i32,
    ) -> Option<&PointOfInterest> {
        let key = FloorChangerKey { kind, index, floor };
        self.floor_changers.get(&key).map(|&id| &self.pois[id.index()])
    }

    /// The floor-changer index in key order.
    pub fn floor_changer_entries(&self) -> impl Iterator<Item = (FloorChangerKey, PoiId)> + '_ {
        self.floor_changers.iter().map(|(&k, &v)| (k, v))
    }

    /// Case-insensitive substring search over POI search labels, in POI id
    /// order. An empty (or all-whitespace) query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&PointOfInterest> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.pois
            .iter()
            .filter(|p| p.search_label().to_lowercase().contains(&needle))
            .collect()
    }

    // -- labels and floors --------------------------------------------------

    pub fn label(&self, name: &str) -> Option<NodeId> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.labels.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Every integer floor that holds at least one node.
    pub fn floors(&self) -> &BTreeSet<i32> {
        &self.floors
    }

    pub fn min_floor(&self) -> Option<i32> {
        self.floors.first().copied()
    }

    pub fn max_floor(&self) -> Option<i32> {
        self.floors.last().copied()
    }

    pub fn summary(&self) -> VenueSummary {
        VenueSummary {
            nodes: self.nodes.len(),
            edges: self.edge_count,
            pois: self.pois.len(),
            floor_changers: self.floor_changers.len(),
            labels: self.labels.len(),
            floors: self.floors.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64, y: f64, z: f64) -> Position {
        Position::new(x, y, z)
    }

    #[test]
    fn intern_assigns_sequential_ids_and_reuses() {
        let mut venue = Venue::new();
        let a = venue.intern_node(pos(0.0, 0.0, 0.0));
        let b = venue.intern_node(pos(5.0, 0.0, 0.0));
        let a2 = venue.intern_node(pos(0.0, 0.0, 0.0));
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(a2, a);
        assert_eq!(venue.node_count(), 2);
        assert_eq!(venue.node_at(pos(5.0, 0.0, 0.0)), Some(b));
    }

    #[test]
    fn connect_is_symmetric_and_deduplicated() {
        let mut venue = Venue::new();
        let a = venue.intern_node(pos(0.0, 0.0, 0.0));
        let b = venue.intern_node(pos(5.0, 0.0, 0.0));
        assert!(venue.connect(a, b));
        assert!(!venue.connect(b, a));
        assert!(!venue.connect(a, a));
        assert_eq!(venue.neighbors(a), &[b]);
        assert_eq!(venue.neighbors(b), &[a]);
        assert_eq!(venue.edge_count(), 1);
        assert_eq!(venue.edges().collect::<Vec<_>>(), vec![(a, b)]);
    }

    #[test]
    fn pois_are_indexed_by_node() {
        let mut venue = Venue::new();
        let a = venue.intern_node(pos(0.0, 0.0, 2.0));
        let room = venue.add_poi(a, "Room 201".into(), PoiKind::Room, Orientation::Up);
        let wash = venue.add_poi(a, "WashroomMen".into(), PoiKind::Washroom, Orientation::Down);
        assert_eq!(venue.pois_at(a), &[room, wash]);
        assert_eq!(venue.poi_node(room), Some(a));
        assert_eq!(venue.poi(room).unwrap().search_label(), "Room 201, Floor: 2");
        assert_eq!(venue.pois_at(NodeId(99)), &[] as &[PoiId]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut venue = Venue::new();
        let a = venue.intern_node(pos(0.0, 0.0, 0.0));
        let b = venue.intern_node(pos(0.0, 0.0, 1.0));
        venue.add_poi(a, "Library".into(), PoiKind::Room, Orientation::Left);
        venue.add_poi(b, "Lab 2".into(), PoiKind::Room, Orientation::Left);
        let names: Vec<_> = venue.search("LIB").iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Library"]);
        assert_eq!(venue.search("floor: 1").len(), 1);
        assert_eq!(venue.search("l").len(), 2);
        assert!(venue.search("   ").is_empty());
    }

    #[test]
    fn duplicate_floor_changer_key_rejected() {
        let mut venue = Venue::new();
        let a = venue.intern_node(pos(0.0, 0.0, 0.0));
        let fc = FloorChanger {
            kind: FloorChangerKind::StairsUp,
            index: 1,
            other_end: pos(0.0, 1.0, 1.0),
            accessible: false,
        };
        let kind = PoiKind::FloorChanger(fc);
        let p1 = venue.add_poi(a, "StairsUp1".into(), kind.clone(), Orientation::Up);
        let p2 = venue.add_poi(a, "StairsUp1".into(), kind, Orientation::Up);
        let key = FloorChangerKey {
            kind: FloorChangerKind::StairsUp,
            index: 1,
            floor: 0,
        };
        assert_eq!(venue.register_floor_changer(key, p1), Ok(()));
        assert_eq!(venue.register_floor_changer(key, p2), Err(p1));
        assert_eq!(venue.floor_changer(FloorChangerKind::StairsUp, 1, 0).unwrap().id, p1);
        assert_eq!(venue.floor_changers_at(a).count(), 2);
    }

    #[test]
    fn partner_key_moves_one_floor() {
        let key = FloorChangerKey {
            kind: FloorChangerKind::LiftDown,
            index: 3,
            floor: 2,
        };
        let partner = key.partner();
        assert_eq!(partner.kind, FloorChangerKind::LiftUp);
        assert_eq!(partner.index, 3);
        assert_eq!(partner.floor, 1);
        assert_eq!(partner.partner(), key);
    }

    #[test]
    fn floors_track_nodes() {
        let mut venue = Venue::new();
        venue.intern_node(pos(0.0, 0.0, 1.0));
        venue.intern_node(pos(0.0, 0.0, -1.0));
        venue.intern_node(pos(3.0, 0.0, 1.0));
        assert_eq!(venue.min_floor(), Some(-1));
        assert_eq!(venue.max_floor(), Some(1));
        assert_eq!(venue.summary().floors, vec![-1, 1]);
    }

    #[test]
    fn labels_list_in_name_order() {
        let mut venue = Venue::new();
        let a = venue.intern_node(pos(0.0, 0.0, 0.0));
        let b = venue.intern_node(pos(5.0, 0.0, 0.0));
        venue.bind_label("west", a);
        venue.bind_label("east", b);
        assert_eq!(venue.bind_label("east", a), Some(b));
        assert_eq!(venue.labels().collect::<Vec<_>>(), vec![("east", a), ("west", a)]);
        assert_eq!(venue.get_node(b).map(|n| n.position), Some(pos(5.0, 0.0, 0.0)));
        assert!(venue.get_node(NodeId(7)).is_none());
    }

    #[test]
    fn landmark_classes() {
        let lift = PoiKind::FloorChanger(FloorChanger {
            kind: FloorChangerKind::LiftDown,
            index: 0,
            other_end: Position::ORIGIN,
            accessible: true,
        });
        assert_eq!(lift.landmark_class(), LandmarkClass::Lift);
        assert_eq!(PoiKind::Fixture.landmark_class(), LandmarkClass::Fixture);
    }
}
