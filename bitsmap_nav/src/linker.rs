// Floor-changer linking: the post-pass that adds cross-floor edges.
//
// Every floor-changer registered under (kind, index, floor) looks for its
// partner under (complement(kind), index, floor +/- 1). When the partner
// exists the two anchor nodes are connected, and each side's `other_end`
// must equal the other's position. A mismatch means the description is
// malformed and is reported as `CompileError::LinkingInconsistency`.
//
// Connectors with no partner are legal (a stairway that only goes one way in
// the description) and are logged and reported in `LinkReport::unpaired`.

use crate::error::CompileError;
use crate::types::PoiId;
use crate::venue::{FloorChangerKey, Venue};
use tracing::{debug, warn};

/// Outcome of a linking pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Number of distinct connector pairs joined by an edge.
    pub linked_pairs: usize,
    /// Floor-changers with no partner one floor away.
    pub unpaired: Vec<PoiId>,
}

/// Pair up floor-changers and connect their anchor nodes.
pub fn link_floor_changers(venue: &mut Venue) -> Result<LinkReport, CompileError> {
    let mut report = LinkReport::default();
    let mut pairs = Vec::new();

    for (key, poi_id) in venue.floor_changer_entries() {
        let partner_key = key.partner();
        let partner =
            venue.floor_changer(partner_key.kind, partner_key.index, partner_key.floor);
        let Some(partner) = partner else {
            warn!(
                kind = %key.kind,
                index = key.index,
                floor = key.floor,
                "floor-changer has no partner"
            );
            report.unpaired.push(poi_id);
            continue;
        };
        check_pair(venue, key, poi_id, partner.id)?;
        // Each pair is seen from both sides; keep the upward view.
        if key.kind.floor_delta() > 0 {
            pairs.push((poi_id, partner.id));
        }
    }

    for (lower, upper) in pairs {
        let (Some(a), Some(b)) = (venue.poi_node(lower), venue.poi_node(upper)) else {
            continue;
        };
        venue.connect(a, b);
        report.linked_pairs += 1;
        debug!(%lower, %upper, from = %a, to = %b, "linked floor-changers");
    }

    Ok(report)
}

/// Both ends must point at each other.
fn check_pair(
    venue: &Venue,
    key: FloorChangerKey,
    this_id: PoiId,
    that_id: PoiId,
) -> Result<(), CompileError> {
    let (Some(this), Some(that)) = (venue.poi(this_id), venue.poi(that_id)) else {
        return Ok(());
    };
    let (Some(this_fc), Some(that_fc)) = (this.floor_changer(), that.floor_changer()) else {
        return Ok(());
    };
    if this_fc.other_end != that.position {
        return Err(CompileError::LinkingInconsistency {
            kind: key.kind,
            index: key.index,
            floor: key.floor,
            position: this.position,
            expected: this_fc.other_end,
            actual: that.position,
        });
    }
    if that_fc.other_end != this.position {
        return Err(CompileError::LinkingInconsistency {
            kind: that_fc.kind,
            index: that_fc.index,
            floor: that.floor(),
            position: that.position,
            expected: that_fc.other_end,
            actual: this.position,
        });
    }
    Ok(())
}
