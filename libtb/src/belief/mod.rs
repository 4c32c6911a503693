mod builder;
mod dag;
mod key;
mod node;
mod view;

pub use self::builder::TeamBeliefDagBuilder;
pub use self::dag::TeamBeliefDag;
pub use self::node::{BeliefAction, BeliefKind, TeamBeliefNode};
pub use self::view::{TeamView, View};

use crate::error::Result;
use efg_lite::{ExtensiveFormGame, PlayerId};

/// Index of a belief node. Ids ascend in topological order and the root is always 0.
pub type BeliefId = usize;

/// Builds the team belief DAG of `game` for the two players in `team`.
pub fn build(game: &ExtensiveFormGame, team: &[PlayerId]) -> Result<TeamBeliefDag> {
    TeamBeliefDagBuilder::new(game, team)?.build()
}
