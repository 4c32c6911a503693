#[macro_use]
extern crate approx;

pub mod error;
pub mod game;
pub mod loader;

pub use crate::error::GameError;
pub use crate::game::{
    ChanceAction, ExtensiveFormGame, ExtensiveFormGameBuilder, GameNode, Infoset, InfosetId,
    NodeId, NodeKind, PlayerId, PROBABILITY_TOLERANCE,
};
pub use crate::loader::{parse_efg, read_efg};
