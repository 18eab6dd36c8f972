// bitsmap_nav: indoor venue navigation library.
//
// Compiles a line-oriented route description of a building into a
// multi-floor node graph with points of interest, links stairways and lifts
// across floors, finds shortest (optionally wheelchair-accessible) routes,
// and turns a route into turn-by-turn directions.
//
// Module overview:
// - `geometry.rs`:    Position (x, y, z = floor), vector ops, turn angle, collinearity.
// - `types.rs`:       NodeId / PoiId, Orientation, Conveyance, Vertical, FloorChangerKind.
// - `venue.rs`:       Venue graph: nodes, adjacency, POIs, floor-changer index, labels.
// - `compiler.rs`:    Route description parser and cursor-driven graph builder.
// - `linker.rs`:      Post-pass pairing floor-changers and adding cross-floor edges.
// - `pathfinding.rs`: Dijkstra router with the accessibility filter, reachability.
// - `narrate.rs`:     Route -> direction instructions (turns, landmarks, floor changes).
// - `config.rs`:      NavConfig: origin, turn threshold, parser strictness, landmark ranking.
// - `error.rs`:       CompileError / RouteError / ConfigError.
//
// A compiled `Venue` is immutable; routing and narration only borrow it, so
// one venue can serve any number of queries. Ordered collections are
// `BTreeMap`/`BTreeSet` so ids, search results and routes are deterministic
// across runs.

pub mod compiler;
pub mod config;
pub mod error;
pub mod geometry;
pub mod linker;
pub mod narrate;
pub mod pathfinding;
pub mod types;
pub mod venue;

pub use compiler::{compile_venue, compile_venue_file, compile_venue_with};
pub use config::NavConfig;
pub use error::{CompileError, ConfigError, RouteError};
pub use geometry::Position;
pub use narrate::{Instruction, Narrator, narrate, narrate_all};
pub use pathfinding::{Route, find_path, route_between_pois};
pub use types::{FloorChangerKind, NodeId, PoiId};
pub use venue::{PointOfInterest, Venue};
