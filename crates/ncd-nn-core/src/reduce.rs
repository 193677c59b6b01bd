//! Result reducer: drop items without a neighbor, sort the rest.

use crate::models::{Neighbor, NeighborResult};

/// Drop results with no neighbor and stable-sort by ascending distance.
///
/// Items without a neighbor are the identity-maximal item (ascending pair
/// rule) or the member of a singleton corpus. Equal distances keep their
/// relative input order.
pub fn reduce(results: Vec<NeighborResult>) -> Vec<Neighbor> {
    let mut rows: Vec<Neighbor> = results
        .into_iter()
        .filter_map(|r| {
            r.neighbor.map(|neighbor| Neighbor {
                identity: r.identity,
                neighbor,
                distance: r.distance,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    rows
}
