use crate::belief::node::TeamBeliefNode;
use crate::belief::BeliefId;
use crate::error::{inconsistent, Result};
use efg_lite::{ExtensiveFormGame, NodeId, PlayerId};
use std::collections::BTreeMap;

/// The team belief DAG of a game. Nodes live in an arena indexed by `BeliefId`; ids ascend
/// in topological order, so iterating over `topological_order()` visits every node after
/// all of its parents, and iterating in reverse visits every node after all its children.
///
/// The DAG also remembers which belief node every history of the originating game resolved
/// to, so that utilities over game leaves can be mapped to terminal belief nodes.
#[derive(Debug, Clone)]
pub struct TeamBeliefDag {
    team: [PlayerId; 2],
    nodes: Vec<TeamBeliefNode>,

    history_targets: Vec<BeliefId>,
    folded: Vec<bool>,
    path_index: BTreeMap<String, NodeId>,
}

impl TeamBeliefDag {
    /// See `belief::build`.
    pub fn build(game: &ExtensiveFormGame, team: &[PlayerId]) -> Result<TeamBeliefDag> {
        crate::belief::build(game, team)
    }

    pub(crate) fn new(
        team: [PlayerId; 2],
        nodes: Vec<TeamBeliefNode>,
        history_targets: Vec<BeliefId>,
        folded: Vec<bool>,
        game: &ExtensiveFormGame,
    ) -> TeamBeliefDag {
        let path_index = game
            .order()
            .map(|id| (game.node(id).path().to_string(), id))
            .collect();
        TeamBeliefDag {
            team,
            nodes,
            history_targets,
            folded,
            path_index,
        }
    }

    pub fn root(&self) -> BeliefId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn team(&self) -> [PlayerId; 2] {
        self.team
    }

    pub fn node(&self, id: BeliefId) -> Result<&TeamBeliefNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| inconsistent(format!("belief node {} is not in the DAG", id)))
    }

    pub fn nodes(&self) -> &[TeamBeliefNode] {
        &self.nodes
    }

    pub fn topological_order(&self) -> std::ops::Range<BeliefId> {
        0..self.nodes.len()
    }

    pub fn children(&self, id: BeliefId) -> Result<&[BeliefId]> {
        Ok(self.node(id)?.children())
    }

    pub fn parents(&self, id: BeliefId) -> Result<&[(BeliefId, usize)]> {
        Ok(self.node(id)?.parents())
    }

    pub fn child(&self, id: BeliefId, action: usize) -> Result<BeliefId> {
        self.node(id)?.children().get(action).cloned().ok_or_else(|| {
            inconsistent(format!("belief node {} has no action {}", id, action))
        })
    }

    pub fn num_edges(&self) -> usize {
        self.nodes.iter().map(|node| node.children().len()).sum()
    }

    pub fn decision_nodes(&self) -> Vec<BeliefId> {
        self.nodes
            .iter()
            .filter(|node| node.is_decision())
            .map(|node| node.id())
            .collect()
    }

    pub fn terminal_nodes(&self) -> Vec<BeliefId> {
        self.nodes
            .iter()
            .filter(|node| node.is_terminal())
            .map(|node| node.id())
            .collect()
    }

    /// Belief node a game history resolved to. Folded histories resolve to the node they
    /// collapsed into.
    pub fn belief_of_history(&self, path: &str) -> Option<BeliefId> {
        self.path_index
            .get(path)
            .and_then(|&id| self.belief_of_node(id))
    }

    /// Same as `belief_of_history()`, by node id of the originating game.
    pub fn belief_of_node(&self, id: NodeId) -> Option<BeliefId> {
        self.history_targets.get(id).cloned()
    }

    pub fn is_folded(&self, id: NodeId) -> bool {
        self.folded.get(id).cloned().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefKind;
    use crate::error::Error;
    use crate::test_fixtures::{COIN_OBSERVED, COIN_UNOBSERVED};
    use lazy_static::lazy_static;

    lazy_static! {
        static ref OBSERVED_DAG: TeamBeliefDag = TeamBeliefDag::build(&*COIN_OBSERVED, &[1, 2]).unwrap();
    }

    #[test]
    pub fn test_unknown_ids() {
        let dag = &*OBSERVED_DAG;
        match dag.node(dag.len()) {
            Err(Error::InconsistentState(_)) => {}
            other => panic!("expected an inconsistent state, got {:?}", other),
        }
        assert!(dag.children(100).is_err());
        assert!(dag.parents(100).is_err());
        assert!(dag.child(dag.root(), 1).is_err());
        assert_eq!(dag.belief_of_history("/nowhere"), None);
        assert_eq!(dag.belief_of_node(100), None);
        assert!(!dag.is_folded(100));
    }

    #[test]
    pub fn test_queries() {
        let dag = &*OBSERVED_DAG;
        assert!(!dag.is_empty());
        assert_eq!(dag.team(), [1, 2]);
        assert_eq!(dag.topological_order().len(), dag.len());
        // Root, chance and two decisions carry one edge per action.
        assert_eq!(dag.num_edges(), 1 + 2 + 2 + 2);
        assert!(dag.parents(dag.root()).unwrap().is_empty());
        for terminal in dag.terminal_nodes() {
            assert!(dag.children(terminal).unwrap().is_empty());
            assert_eq!(dag.parents(terminal).unwrap().len(), 1);
        }
    }

    #[test]
    pub fn test_keys() {
        let dag = &*OBSERVED_DAG;
        assert_eq!(dag.node(dag.root()).unwrap().key(), "root[/]");
        let heads = dag.belief_of_history("/H").unwrap();
        assert_eq!(dag.node(heads).unwrap().key(), "decision[/H]");

        let unobserved = TeamBeliefDag::build(&*COIN_UNOBSERVED, &[1, 2]).unwrap();
        let fold = unobserved.belief_of_history("/T/fold").unwrap();
        assert_eq!(unobserved.node(fold).unwrap().key(), "terminal[/H/fold,/T/fold]");
        let keys = unobserved
            .nodes()
            .iter()
            .map(|node| node.key())
            .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(keys.len(), unobserved.len());
        assert_eq!(unobserved.node(fold).unwrap().kind(), BeliefKind::Terminal);
    }
}
