// Venue compiler: route description text -> `Venue`.
//
// The description is a walking tour through the building, one statement per
// line. A cursor (current position + current node) starts at
// `NavConfig::origin` and is moved by the statements:
//
//   <label>:                                   bind label to cursor node
//   <Dir> <distance>                           walk, creating node + edge
//   <Dir> Room <words...>                      attach a Room POI
//   <Dir> Washroom <tag>                       attach a Washroom POI
//   <Dir> Stairs|Lift <i> Up|Down Ramp|NoRamp <dx> <dy>
//                                              attach a floor-changer POI
//   <Dir> <anything else>                      attach a fixture POI
//   CLIMB Up|Down Stairs|Lift <i>              jump to the other end
//   Connect <label>                            edge cursor <-> label
//   Goto <label>                               move cursor to label
//
// `<Dir>` is `U`, `D`, `L` or `R` (screen space, not floors). Blank lines and
// lines starting with `#` are skipped.
//
// Parsing (`parse_line` -> `Statement`) is separate from application
// (`apply`), and the cursor is an explicit `Cursor` value threaded through
// `apply`, so each step can be tested in isolation. Any reference to an
// unknown label or unregistered floor-changer aborts compilation.
//
// CLIMB adds no edge. Cross-floor edges are added afterwards by
// `linker.rs`, which `compile_venue` runs before returning.

use crate::config::NavConfig;
use crate::error::CompileError;
use crate::geometry::Position;
use crate::linker;
use crate::types::{Conveyance, FloorChangerKind, NodeId, Orientation, Vertical};
use crate::venue::{FloorChanger, FloorChangerKey, PoiKind, Venue};
use std::path::Path;
use tracing::{debug, info, warn};

/// One parsed description line.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Label(String),
    Move {
        direction: Orientation,
        distance: f64,
    },
    Room {
        side: Orientation,
        name: String,
    },
    Washroom {
        side: Orientation,
        tag: String,
    },
    Fixture {
        side: Orientation,
        name: String,
    },
    FloorChanger {
        side: Orientation,
        conveyance: Conveyance,
        index: u32,
        vertical: Vertical,
        accessible: bool,
        dx: f64,
        dy: f64,
    },
    Climb {
        vertical: Vertical,
        conveyance: Conveyance,
        index: u32,
    },
    Connect(String),
    Goto(String),
}

/// The compiler's current location in the tour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub position: Position,
    pub node: NodeId,
}

/// Compile and link a description with the default configuration.
pub fn compile_venue(text: &str) -> Result<Venue, CompileError> {
    compile_venue_with(text, &NavConfig::default())
}

/// Compile a description and link its floor-changers.
pub fn compile_venue_with(text: &str, config: &NavConfig) -> Result<Venue, CompileError> {
    let mut venue = compile_unlinked(text, config)?;
    let report = linker::link_floor_changers(&mut venue)?;
    let summary = venue.summary();
    info!(
        nodes = summary.nodes,
        edges = summary.edges,
        pois = summary.pois,
        floor_changers = summary.floor_changers,
        linked_pairs = report.linked_pairs,
        floors = ?summary.floors,
        "compiled venue"
    );
    Ok(venue)
}

/// Read a description file, then compile and link it.
pub fn compile_venue_file(
    path: impl AsRef<Path>,
    config: &NavConfig,
) -> Result<Venue, CompileError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    debug!(path = %path.as_ref().display(), bytes = text.len(), "read route description");
    compile_venue_with(&text, config)
}

/// Run every statement but skip floor-changer linking.
pub fn compile_unlinked(text: &str, config: &NavConfig) -> Result<Venue, CompileError> {
    config.validate()?;
    let mut venue = Venue::new();
    let origin = Position::from_array(config.origin);
    let mut cursor = Cursor {
        position: origin,
        node: venue.intern_node(origin),
    };

    let mut statements = 0usize;
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let Some(statement) = parse_line(raw, line, config.strict_lines)? else {
            continue;
        };
        apply(&mut venue, &mut cursor, &statement, line)?;
        statements += 1;
    }

    if statements == 0 {
        return Err(CompileError::EmptyDescription);
    }
    Ok(venue)
}

/// Parse one line. `Ok(None)` for blank lines, comments, and (when `strict`
/// is false) unrecognized lines.
pub fn parse_line(raw: &str, line: usize, strict: bool) -> Result<Option<Statement>, CompileError> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    // A single word ending in ':' is a label; "U Room Lobby:" is still a room.
    if let Some(label) = text.strip_suffix(':') {
        let label = label.trim_end();
        if label.is_empty() {
            return Err(CompileError::malformed(line, "empty label"));
        }
        if !label.contains(char::is_whitespace) {
            return Ok(Some(Statement::Label(label.to_string())));
        }
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens[0] {
        "CLIMB" => parse_climb(&tokens[1..], line).map(Some),
        "Connect" => Ok(Some(Statement::Connect(single_label(&tokens, line)?))),
        "Goto" => Ok(Some(Statement::Goto(single_label(&tokens, line)?))),
        first => match Orientation::parse(first) {
            Some(side) => parse_directed(side, &tokens[1..], line).map(Some),
            None if strict => Err(CompileError::malformed(
                line,
                format!("unrecognized statement '{text}'"),
            )),
            None => {
                warn!(line, text, "skipping unrecognized line");
                Ok(None)
            }
        },
    }
}

fn single_label(tokens: &[&str], line: usize) -> Result<String, CompileError> {
    match tokens {
        [_, label] => Ok((*label).to_string()),
        _ => Err(CompileError::malformed(
            line,
            format!("{} takes exactly one label", tokens[0]),
        )),
    }
}

fn parse_climb(args: &[&str], line: usize) -> Result<Statement, CompileError> {
    let [vertical, conveyance, index] = args else {
        return Err(CompileError::malformed(
            line,
            "expected 'CLIMB Up|Down Stairs|Lift <index>'",
        ));
    };
    Ok(Statement::Climb {
        vertical: parse_vertical(vertical, line)?,
        conveyance: parse_conveyance(conveyance, line)?,
        index: parse_index(index, line)?,
    })
}

/// Everything that starts with a direction letter.
fn parse_directed(
    side: Orientation,
    args: &[&str],
    line: usize,
) -> Result<Statement, CompileError> {
    let Some(&head) = args.first() else {
        return Err(CompileError::malformed(line, "missing argument after direction"));
    };

    if looks_numeric(head) {
        let distance: f64 = head
            .parse()
            .map_err(|_| CompileError::malformed(line, format!("invalid distance '{head}'")))?;
        if args.len() != 1 {
            return Err(CompileError::malformed(
                line,
                format!("unexpected tokens after distance {head}"),
            ));
        }
        if !distance.is_finite() {
            return Err(CompileError::malformed(line, "distance must be finite"));
        }
        return Ok(Statement::Move {
            direction: side,
            distance,
        });
    }

    match head {
        "Room" => {
            let name = args[1..].join(" ");
            if name.is_empty() {
                return Err(CompileError::malformed(line, "room has no name"));
            }
            Ok(Statement::Room { side, name })
        }
        "Washroom" => {
            let tag = args[1..].join(" ");
            if tag.is_empty() {
                return Err(CompileError::malformed(line, "washroom has no tag"));
            }
            Ok(Statement::Washroom { side, tag })
        }
        "Stairs" | "Lift" => parse_floor_changer(side, args, line),
        _ => Ok(Statement::Fixture {
            side,
            name: args.join(" "),
        }),
    }
}

/// Distances start like a decimal number; anything else is a POI word.
fn looks_numeric(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

fn parse_floor_changer(
    side: Orientation,
    args: &[&str],
    line: usize,
) -> Result<Statement, CompileError> {
    let [conveyance, index, vertical, ramp, dx, dy] = args else {
        return Err(CompileError::malformed(
            line,
            "expected 'Stairs|Lift <index> Up|Down Ramp|NoRamp <dx> <dy>'",
        ));
    };
    let accessible = match *ramp {
        "Ramp" => true,
        "NoRamp" => false,
        other => {
            return Err(CompileError::malformed(
                line,
                format!("expected Ramp or NoRamp, got '{other}'"),
            ));
        }
    };
    Ok(Statement::FloorChanger {
        side,
        conveyance: parse_conveyance(conveyance, line)?,
        index: parse_index(index, line)?,
        vertical: parse_vertical(vertical, line)?,
        accessible,
        dx: parse_offset(dx, line)?,
        dy: parse_offset(dy, line)?,
    })
}

fn parse_vertical(token: &str, line: usize) -> Result<Vertical, CompileError> {
    Vertical::parse(token)
        .ok_or_else(|| CompileError::malformed(line, format!("expected Up or Down, got '{token}'")))
}

fn parse_conveyance(token: &str, line: usize) -> Result<Conveyance, CompileError> {
    Conveyance::parse(token).ok_or_else(|| {
        CompileError::malformed(line, format!("expected Stairs or Lift, got '{token}'"))
    })
}

fn parse_index(token: &str, line: usize) -> Result<u32, CompileError> {
    token
        .parse()
        .map_err(|_| CompileError::malformed(line, format!("invalid index '{token}'")))
}

fn parse_offset(token: &str, line: usize) -> Result<f64, CompileError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CompileError::malformed(line, format!("invalid offset '{token}'"))),
    }
}

/// Apply one statement to the venue under construction.
pub fn apply(
    venue: &mut Venue,
    cursor: &mut Cursor,
    statement: &Statement,
    line: usize,
) -> Result<(), CompileError> {
    match statement {
        Statement::Label(label) => {
            if let Some(previous) = venue.bind_label(label, cursor.node) {
                if previous != cursor.node {
                    warn!(line, label = %label, %previous, now = %cursor.node, "label rebound");
                }
            }
        }
        Statement::Move {
            direction,
            distance,
        } => {
            let position = cursor.position + direction.unit() * *distance;
            let node = venue.intern_node(position);
            venue.connect(cursor.node, node);
            *cursor = Cursor { position, node };
        }
        Statement::Room { side, name } => {
            venue.add_poi(cursor.node, name.clone(), PoiKind::Room, *side);
        }
        Statement::Washroom { side, tag } => {
            venue.add_poi(cursor.node, format!("Washroom{tag}"), PoiKind::Washroom, *side);
        }
        Statement::Fixture { side, name } => {
            venue.add_poi(cursor.node, name.clone(), PoiKind::Fixture, *side);
        }
        Statement::FloorChanger {
            side,
            conveyance,
            index,
            vertical,
            accessible,
            dx,
            dy,
        } => {
            let kind = FloorChangerKind::new(*conveyance, *vertical);
            let other_end =
                cursor.position + Position::new(*dx, *dy, f64::from(vertical.floor_delta()));
            let floor_changer = FloorChanger {
                kind,
                index: *index,
                other_end,
                accessible: *accessible,
            };
            let poi = venue.add_poi(
                cursor.node,
                format!("{conveyance}{vertical}{index}"),
                PoiKind::FloorChanger(floor_changer),
                *side,
            );
            let key = FloorChangerKey {
                kind,
                index: *index,
                floor: cursor.position.floor(),
            };
            venue.register_floor_changer(key, poi).map_err(|existing| {
                CompileError::malformed(
                    line,
                    format!(
                        "{kind} {index} on floor {} is already defined ({existing})",
                        key.floor
                    ),
                )
            })?;
            debug!(line, %kind, index, floor = key.floor, %other_end, "floor-changer");
        }
        Statement::Climb {
            vertical,
            conveyance,
            index,
        } => {
            let kind = FloorChangerKind::new(*conveyance, *vertical);
            let floor = cursor.position.floor();
            let poi = venue.floor_changer(kind, *index, floor).ok_or_else(|| {
                CompileError::malformed(
                    line,
                    format!("no {kind} {index} registered on floor {floor}"),
                )
            })?;
            if poi.position != cursor.position {
                warn!(line, %kind, index, at = %poi.position, cursor = %cursor.position,
                    "climbing a floor-changer the cursor is not standing on");
            }
            let target = match poi.floor_changer() {
                Some(fc) => fc.other_end,
                None => {
                    return Err(CompileError::malformed(
                        line,
                        format!("{kind} {index} is not a floor-changer"),
                    ));
                }
            };
            *cursor = Cursor {
                position: target,
                node: venue.intern_node(target),
            };
        }
        Statement::Connect(label) => {
            let node = resolve_label(venue, label, line)?;
            venue.connect(cursor.node, node);
        }
        Statement::Goto(label) => {
            let node = resolve_label(venue, label, line)?;
            *cursor = Cursor {
                position: venue.position(node),
                node,
            };
        }
    }
    Ok(())
}

fn resolve_label(venue: &Venue, label: &str, line: usize) -> Result<NodeId, CompileError> {
    venue
        .label(label)
        .ok_or_else(|| CompileError::malformed(line, format!("unknown label '{label}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::types::PoiId;

    fn pos(x: f64, y: f64, z: f64) -> Position {
        Position::new(x, y, z)
    }

    fn strict(line: &str) -> Result<Option<Statement>, CompileError> {
        parse_line(line, 1, true)
    }

    #[test]
    fn parse_move_and_label() {
        assert_eq!(
            strict("R 5").unwrap(),
            Some(Statement::Move {
                direction: Orientation::Right,
                distance: 5.0
            })
        );
        assert_eq!(
            strict("  lobby:  ").unwrap(),
            Some(Statement::Label("lobby".into()))
        );
        assert_eq!(strict("").unwrap(), None);
        assert!(strict(":").is_err());
        assert_eq!(
            strict("U Room Lobby:").unwrap(),
            Some(Statement::Room {
                side: Orientation::Up,
                name: "Lobby:".into()
            })
        );
        assert_eq!(strict("# comment").unwrap(), None);
    }

    #[test]
    fn parse_room_joins_remaining_words() {
        assert_eq!(
            strict("U Room  101   Lecture Hall ").unwrap(),
            Some(Statement::Room {
                side: Orientation::Up,
                name: "101 Lecture Hall".into()
            })
        );
    }

    #[test]
    fn parse_floor_changer_line() {
        assert_eq!(
            strict("L Stairs 2 Up NoRamp 0 -3").unwrap(),
            Some(Statement::FloorChanger {
                side: Orientation::Left,
                conveyance: Conveyance::Stairs,
                index: 2,
                vertical: Vertical::Up,
                accessible: false,
                dx: 0.0,
                dy: -3.0,
            })
        );
        assert!(strict("L Stairs 2 Up Maybe 0 0").is_err());
        assert!(strict("L Lift 2 Up Ramp 0").is_err());
    }

    #[test]
    fn parse_fixture_and_washroom() {
        assert_eq!(
            strict("D DrinkingWater").unwrap(),
            Some(Statement::Fixture {
                side: Orientation::Down,
                name: "DrinkingWater".into()
            })
        );
        assert_eq!(
            strict("D Washroom Men").unwrap(),
            Some(Statement::Washroom {
                side: Orientation::Down,
                tag: "Men".into()
            })
        );
        assert!(strict("D Washroom").is_err());
    }

    #[test]
    fn parse_climb_connect_goto() {
        assert_eq!(
            strict("CLIMB Down Lift 1").unwrap(),
            Some(Statement::Climb {
                vertical: Vertical::Down,
                conveyance: Conveyance::Lift,
                index: 1
            })
        );
        assert_eq!(
            strict("Connect lobby").unwrap(),
            Some(Statement::Connect("lobby".into()))
        );
        assert_eq!(strict("Goto hall").unwrap(), Some(Statement::Goto("hall".into())));
        assert!(strict("Goto").is_err());
        assert!(strict("CLIMB Sideways Lift 1").is_err());
    }

    #[test]
    fn unrecognized_line_depends_on_strictness() {
        assert!(strict("Teleport now").is_err());
        assert_eq!(parse_line("Teleport now", 3, false).unwrap(), None);
    }

    #[test]
    fn distance_with_trailing_tokens_rejected() {
        assert!(strict("R 5 7").is_err());
        assert!(strict("R 1e999").is_err());
        assert!(strict("R 5x").is_err());
        assert_eq!(
            strict("R Infinity Pool").unwrap(),
            Some(Statement::Fixture {
                side: Orientation::Right,
                name: "Infinity Pool".into()
            })
        );
    }

    #[test]
    fn revisiting_a_position_reuses_the_node() {
        let venue = compile_venue("start:\nR 5\nU 5\nGoto start\nU 5\nR 5\n").unwrap();
        // (0,0) (5,0) (5,5) (0,5) -- the last move lands on (5,5) again.
        assert_eq!(venue.node_count(), 4);
        let corner = venue.node_at(pos(5.0, 5.0, 0.0)).unwrap();
        assert_eq!(venue.neighbors(corner).len(), 2);
        assert_eq!(venue.edge_count(), 4);
    }

    #[test]
    fn goto_moves_without_creating_nodes_or_edges() {
        let venue = compile_venue("a:\nR 5\nGoto a\n").unwrap();
        assert_eq!(venue.node_count(), 2);
        assert_eq!(venue.edge_count(), 1);
    }

    #[test]
    fn connect_adds_edge_to_label() {
        let venue = compile_venue("a:\nR 5\nU 5\nConnect a\n").unwrap();
        let a = venue.label("a").unwrap();
        let c = venue.node_at(pos(5.0, 5.0, 0.0)).unwrap();
        assert!(venue.are_connected(a, c));
        assert!(venue.are_connected(c, a));
    }

    #[test]
    fn unknown_label_is_fatal() {
        let err = compile_venue("R 5\nConnect nowhere\n").unwrap_err();
        match err {
            CompileError::MalformedDescription { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("nowhere"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(compile_venue("Goto nowhere\n").is_err());
    }

    #[test]
    fn pois_attach_to_cursor_node_in_order() {
        let venue = compile_venue("U Room Entrance\nR 4\nD Washroom Women\nU Fire Extinguisher\n")
            .unwrap();
        let names: Vec<_> = venue.pois().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Entrance", "WashroomWomen", "Fire Extinguisher"]);
        assert_eq!(venue.pois()[0].id, PoiId(0));
        assert_eq!(venue.pois()[2].id, PoiId(2));
        let east = venue.node_at(pos(4.0, 0.0, 0.0)).unwrap();
        assert_eq!(venue.pois_at(east), &[PoiId(1), PoiId(2)]);
        assert_eq!(venue.pois()[1].orientation, Orientation::Down);
    }

    #[test]
    fn floor_changer_records_other_end_and_name() {
        let venue = compile_unlinked("R 3\nU Stairs 2 Up NoRamp 1 2\n", &NavConfig::default())
            .unwrap();
        let poi = venue
            .floor_changer(FloorChangerKind::StairsUp, 2, 0)
            .unwrap();
        assert_eq!(poi.name, "StairsUp2");
        let fc = poi.floor_changer().unwrap();
        assert_eq!(fc.other_end, pos(4.0, 2.0, 1.0));
        assert!(!fc.accessible);
    }

    #[test]
    fn climb_jumps_without_edge() {
        let text = "R 3\nU Lift 1 Up Ramp 0 0\nCLIMB Up Lift 1\nR 2\n";
        let venue = compile_unlinked(text, &NavConfig::default()).unwrap();
        let upper = venue.node_at(pos(3.0, 0.0, 1.0)).unwrap();
        let lower = venue.node_at(pos(3.0, 0.0, 0.0)).unwrap();
        assert!(!venue.are_connected(lower, upper));
        let beyond = venue.node_at(pos(5.0, 0.0, 1.0)).unwrap();
        assert!(venue.are_connected(upper, beyond));
        assert_eq!(venue.floors().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn climb_unregistered_floor_changer_is_fatal() {
        let err = compile_venue("R 3\nCLIMB Up Stairs 4\n").unwrap_err();
        assert!(matches!(err, CompileError::MalformedDescription { line: 2, .. }));
    }

    #[test]
    fn duplicate_floor_changer_is_fatal() {
        let err = compile_venue("U Stairs 1 Up NoRamp 0 0\nR 2\nU Stairs 1 Up NoRamp 0 0\n")
            .unwrap_err();
        assert!(matches!(err, CompileError::MalformedDescription { line: 3, .. }));
    }

    #[test]
    fn empty_description_rejected() {
        assert!(matches!(
            compile_venue("\n# nothing here\n").unwrap_err(),
            CompileError::EmptyDescription
        ));
    }

    #[test]
    fn origin_comes_from_config() {
        let config = NavConfig {
            origin: [10.0, 10.0, 2.0],
            ..NavConfig::default()
        };
        let venue = compile_venue_with("L 4\n", &config).unwrap();
        assert!(venue.node_at(pos(6.0, 10.0, 2.0)).is_some());
        assert_eq!(venue.min_floor(), Some(2));
    }

    #[test]
    fn fractional_origin_floor_is_rejected() {
        // With z = -0.5 both -0.5 and 0.5 would truncate to floor 0 and the
        // stairs below would never pair up.
        let config = NavConfig {
            origin: [0.0, 0.0, -0.5],
            ..NavConfig::default()
        };
        let text = "U Stairs 1 Up NoRamp 0 0\nCLIMB Up Stairs 1\nD Stairs 1 Down NoRamp 0 0\n";
        let err = compile_venue_with(text, &config).unwrap_err();
        assert!(matches!(err, CompileError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn cursor_is_threaded_explicitly() {
        let mut venue = Venue::new();
        let mut cursor = Cursor {
            position: Position::ORIGIN,
            node: venue.intern_node(Position::ORIGIN),
        };
        let step = Statement::Move {
            direction: Orientation::Down,
            distance: 2.0,
        };
        apply(&mut venue, &mut cursor, &step, 1).unwrap();
        assert_eq!(cursor.position, pos(0.0, -2.0, 0.0));
        assert_eq!(cursor.node, NodeId(1));
    }

    #[test]
    fn compile_missing_file_is_io_error() {
        let err = compile_venue_file("/nonexistent/venue.txt", &NavConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
    }
}
