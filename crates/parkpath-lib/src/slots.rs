//! Nearest available slot selection.

use std::collections::HashSet;

use tracing::debug;

use crate::graph::{GraphView, NodeId};
use crate::path::{nearest_target, PathResult};

/// Pick the candidate slot with the shortest walking path from `from`.
///
/// `candidates` are slot nodes the caller considers available right now. An
/// empty candidate set returns `None` without searching. Unknown ids are
/// ignored; they can never be settled.
pub fn nearest_available_slot<G>(
    graph: &G,
    from: NodeId,
    candidates: &[NodeId],
) -> Option<(NodeId, PathResult)>
where
    G: GraphView + ?Sized,
{
    if candidates.is_empty() {
        debug!(%from, "no candidate slots supplied");
        return None;
    }

    let targets: HashSet<NodeId> = candidates.iter().copied().collect();
    let path = nearest_target(graph, from, &targets)?;
    let slot = path.goal()?.node;
    Some((slot, path))
}
