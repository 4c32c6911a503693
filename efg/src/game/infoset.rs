use crate::game::{NodeId, PlayerId};

pub type InfosetId = usize;

/// A set of decision histories that its owner cannot tell apart. Every history in
/// an `Infoset` belongs to the same player and offers the same ordered action list;
/// `ExtensiveFormGame` refuses to build otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Infoset {
    name: String,
    player: PlayerId,
    histories: Vec<NodeId>,
}

impl Infoset {
    pub(crate) fn new(name: String, player: PlayerId, histories: Vec<NodeId>) -> Infoset {
        Infoset {
            name,
            player,
            histories,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn histories(&self) -> &[NodeId] {
        &self.histories
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.histories.contains(&node)
    }
}
