use crate::belief::view::TeamView;
use crate::belief::BeliefId;
use efg_lite::{InfosetId, PlayerId};
use noisy_float::types::R64;

/// Identity of a belief node during construction. Two histories are merged exactly when
/// they produce the same key. Children are referred to by their (construction) ids, so
/// keys are hash-consed bottom-up.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BeliefKey {
    Root,
    Decision {
        views: TeamView,
        member: usize,
        infoset: InfosetId,
    },
    Terminal {
        views: TeamView,
        payoffs: Vec<(PlayerId, R64)>,
    },
    /// Outcomes grouped by the node they lead to, with summed probabilities.
    Chance {
        views: TeamView,
        branches: Vec<(BeliefId, R64)>,
    },
    Observation {
        views: TeamView,
        branches: Vec<BeliefId>,
    },
}
