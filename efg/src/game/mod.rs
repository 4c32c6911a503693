mod extensive_form_game;
mod infoset;
mod node;
mod player;

pub use self::extensive_form_game::{ExtensiveFormGame, ExtensiveFormGameBuilder};
pub use self::infoset::{Infoset, InfosetId};
pub use self::node::{ChanceAction, GameNode, NodeId, NodeKind};
pub use self::player::PlayerId;

/// Chance probabilities at a node must sum to one within this tolerance.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[cfg(test)]
pub mod test_fixtures;
