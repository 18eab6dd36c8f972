// Shortest-path search over the venue graph.
//
// Dijkstra with a `BinaryHeap` (min-heap via reversed ordering). The heap key
// is the cumulative tentative distance from the source; edge weights are the
// Euclidean distance between endpoint positions, computed at query time.
// Distance, parent and settled flags live in `Vec`s indexed by `NodeId`.
// `OpenEntry` follows the same pattern as an A* open-set entry (reversed
// `Ord` over `total_cmp`), keyed on distance instead of f-score.
//
// With `accessible` set, an edge between different floors is only traversable
// when both ends host matching accessible floor-changers (see
// `transition_allowed`). Same-floor edges are always traversable.
//
// See also: `venue.rs` for the graph, `narrate.rs` which turns a `Route` into
// directions.

use crate::error::RouteError;
use crate::types::{NodeId, PoiId, Vertical};
use crate::venue::Venue;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    /// Nodes from source to destination, inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along `nodes`.
    pub total_cost: f64,
    /// The POI the route was requested for, if any. Used to name the
    /// destination in the arrival instruction.
    pub destination_poi: Option<PoiId>,
}

impl Route {
    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry {
    node: NodeId,
    dist: f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist.total_cmp(&other.dist) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest distance is "greatest".
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.0.cmp(&self.node.0))
    }
}

/// Find the shortest path from `source` to `destination`.
///
/// Returns `RouteError::NoPathFound` when the destination is unreachable
/// (under the accessibility constraint if `accessible` is set), and
/// `RouteError::InvalidQuery` for ids that are not in the venue.
pub fn find_path(
    venue: &Venue,
    source: NodeId,
    destination: NodeId,
    accessible: bool,
) -> Result<Route, RouteError> {
    check_node(venue, source)?;
    check_node(venue, destination)?;

    if source == destination {
        return Ok(Route {
            nodes: vec![source],
            total_cost: 0.0,
            destination_poi: None,
        });
    }

    let n = venue.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<NodeId>> = vec![None; n];
    let mut settled = vec![false; n];

    dist[source.index()] = 0.0;
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        node: source,
        dist: 0.0,
    });

    while let Some(OpenEntry { node: u, dist: d }) = open.pop() {
        let ui = u.index();
        if settled[ui] {
            continue;
        }
        settled[ui] = true;

        if u == destination {
            let nodes = reconstruct_path(&parent, source, destination);
            debug!(
                %source,
                %destination,
                accessible,
                cost = d,
                hops = nodes.len() - 1,
                "route found"
            );
            return Ok(Route {
                nodes,
                total_cost: d,
                destination_poi: None,
            });
        }

        let pu = venue.position(u);
        for &v in venue.neighbors(u) {
            let vi = v.index();
            if settled[vi] || !transition_allowed(venue, u, v, accessible) {
                continue;
            }
            let tentative = d + pu.distance(venue.position(v));
            if tentative < dist[vi] {
                dist[vi] = tentative;
                parent[vi] = Some(u);
                open.push(OpenEntry {
                    node: v,
                    dist: tentative,
                });
            }
        }
    }

    debug!(%source, %destination, accessible, "no route");
    Err(RouteError::NoPathFound {
        from: source,
        to: destination,
        accessible,
    })
}

/// Route between the anchor nodes of two POIs.
pub fn route_between_pois(
    venue: &Venue,
    start: PoiId,
    destination: PoiId,
    accessible: bool,
) -> Result<Route, RouteError> {
    let from = venue
        .poi_node(start)
        .ok_or_else(|| RouteError::InvalidQuery(format!("unknown start {start}")))?;
    let to = venue
        .poi_node(destination)
        .ok_or_else(|| RouteError::InvalidQuery(format!("unknown destination {destination}")))?;
    let mut route = find_path(venue, from, to, accessible)?;
    route.destination_poi = Some(destination);
    Ok(route)
}

/// Whether the edge `from -> to` may be used.
///
/// Without the accessibility constraint every edge is usable. With it, a
/// floor-changing edge needs an accessible floor-changer at `from` whose
/// direction matches the floor delta, and an accessible floor-changer of
/// the complementary kind with the same index at `to`.
pub fn transition_allowed(venue: &Venue, from: NodeId, to: NodeId, accessible: bool) -> bool {
    if !accessible {
        return true;
    }
    let a = venue.position(from);
    let b = venue.position(to);
    if a.z == b.z {
        return true;
    }
    let departing = if b.z > a.z { Vertical::Up } else { Vertical::Down };

    venue
        .floor_changers_at(from)
        .filter(|(_, fc)| fc.accessible && fc.kind.vertical() == departing)
        .any(|(_, fc)| {
            venue.floor_changers_at(to).any(|(_, other)| {
                other.accessible && other.kind == fc.kind.complement() && other.index == fc.index
            })
        })
}

/// Every node reachable from `start`, in discovery order. Uses an explicit
/// stack and a per-call visited set.
pub fn reachable_from(
    venue: &Venue,
    start: NodeId,
    accessible: bool,
) -> Result<Vec<NodeId>, RouteError> {
    check_node(venue, start)?;
    let mut visited = vec![false; venue.node_count()];
    let mut order = Vec::new();
    let mut stack = vec![start];
    visited[start.index()] = true;

    while let Some(u) = stack.pop() {
        order.push(u);
        for &v in venue.neighbors(u) {
            if !visited[v.index()] && transition_allowed(venue, u, v, accessible) {
                visited[v.index()] = true;
                stack.push(v);
            }
        }
    }
    Ok(order)
}

/// Sum of edge weights along a node sequence.
pub fn path_cost(venue: &Venue, nodes: &[NodeId]) -> f64 {
    nodes
        .windows(2)
        .map(|w| venue.position(w[0]).distance(venue.position(w[1])))
        .sum()
}

fn check_node(venue: &Venue, id: NodeId) -> Result<(), RouteError> {
    if venue.get_node(id).is_none() {
        return Err(RouteError::InvalidQuery(format!("{id} is not in the venue")));
    }
    Ok(())
}

fn reconstruct_path(parent: &[Option<NodeId>], source: NodeId, destination: NodeId) -> Vec<NodeId> {
    let mut nodes = vec![destination];
    let mut current = destination;
    while current != source {
        match parent[current.index()] {
            Some(prev) => {
                nodes.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    nodes.reverse();
    nodes
}
