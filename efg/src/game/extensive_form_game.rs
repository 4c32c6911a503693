use crate::error::GameError;
use crate::game::node::split_path;
use crate::game::PROBABILITY_TOLERANCE;
use crate::game::{GameNode, Infoset, InfosetId, NodeId, NodeKind, PlayerId};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// An immutable, validated extensive-form game.
///
/// Nodes are stored in the top-down order they were declared in, and a `NodeId` is simply
/// the position of a node in that order. Every parent appears before its children, so
/// iterating over `order()` visits the tree root-to-leaf, and iterating in reverse visits
/// children before parents.
///
/// The tree structure is not declared explicitly; it is recovered from the history paths
/// (see `split_path`). Children of a node are stored aligned with the node's action list.
///
/// Every player node belongs to exactly one information set. Player nodes which were not
/// placed in any declared information set are given a singleton information set named
/// after their path, i.e., they are treated as perfectly observed.
#[derive(Debug, Clone)]
pub struct ExtensiveFormGame {
    nodes: Vec<GameNode>,
    path_index: BTreeMap<String, NodeId>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Option<(NodeId, usize)>>,

    infosets: Vec<Infoset>,
    infoset_index: BTreeMap<String, InfosetId>,
    node_infoset: Vec<Option<InfosetId>>,

    players: Vec<PlayerId>,
}

impl ExtensiveFormGame {
    /// Ids of all nodes in the declared top-down order.
    pub fn order(&self) -> std::ops::Range<NodeId> {
        0..self.nodes.len()
    }

    /// The root is always the first node of the order.
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &GameNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[GameNode] {
        &self.nodes
    }

    pub fn node_by_path(&self, path: &str) -> Option<NodeId> {
        self.path_index.get(path).cloned()
    }

    /// Children of `id`, aligned with its action list. Empty for leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id]
    }

    /// The parent of `id` together with the index of the action leading into `id`.
    pub fn parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        self.parents[id]
    }

    pub fn infoset_of(&self, id: NodeId) -> Option<InfosetId> {
        self.node_infoset[id]
    }

    pub fn infoset(&self, id: InfosetId) -> &Infoset {
        &self.infosets[id]
    }

    pub fn infosets(&self) -> &[Infoset] {
        &self.infosets
    }

    pub fn infoset_by_name(&self, name: &str) -> Option<InfosetId> {
        self.infoset_index.get(name).cloned()
    }

    /// Sorted, distinct ids of every player that either owns a decision node or receives
    /// a payoff at some leaf.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Probability of the `action`-th outcome of chance node `id`, or `None` if `id` is
    /// not a chance node or has no such action.
    pub fn chance_probability(&self, id: NodeId, action: usize) -> Option<f64> {
        match self.nodes[id].kind() {
            NodeKind::Chance { actions } => actions.get(action).map(|a| a.probability),
            _ => None,
        }
    }

    /// Path from the root to `id` as a sequence of (node, action index) pairs, root first.
    pub fn history(&self, id: NodeId) -> Vec<(NodeId, usize)> {
        let mut steps = vec![];
        let mut current = id;
        while let Some((parent, action)) = self.parents[current] {
            steps.push((parent, action));
            current = parent;
        }
        steps.reverse();
        steps
    }
}

/// Accumulates node and information set declarations, and checks every structural
/// invariant of `ExtensiveFormGame` when `build()` is called.
#[derive(Debug, Clone, Default)]
pub struct ExtensiveFormGameBuilder {
    nodes: Vec<GameNode>,
    infosets: Vec<(String, Vec<String>)>,
}

impl ExtensiveFormGameBuilder {
    pub fn new() -> ExtensiveFormGameBuilder {
        ExtensiveFormGameBuilder::default()
    }

    /// Nodes must be added top-down, parents before children.
    pub fn add_node(&mut self, node: GameNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_infoset<S: Into<String>>(&mut self, name: S, paths: Vec<String>) -> &mut Self {
        self.infosets.push((name.into(), paths));
        self
    }

    pub fn build(&self) -> Result<ExtensiveFormGame, GameError> {
        let mut path_index = BTreeMap::<String, NodeId>::new();
        for (id, node) in self.nodes.iter().enumerate() {
            Self::validate_node(node)?;
            if path_index.insert(node.path().to_string(), id).is_some() {
                return Err(GameError::malformed(format!(
                    "duplicate node path {}",
                    node.path()
                )));
            }
        }

        let (children, parents) = self.link_nodes(&path_index)?;
        let (infosets, infoset_index, node_infoset) = self.collect_infosets(&path_index)?;

        let mut players = BTreeSet::<PlayerId>::new();
        for node in self.nodes.iter() {
            match node.kind() {
                NodeKind::Player { player, .. } => {
                    players.insert(*player);
                }
                NodeKind::Leaf { payoffs } => players.extend(payoffs.keys().cloned()),
                NodeKind::Chance { .. } => {}
            }
        }

        debug!(
            "Validated game with {} nodes, {} infosets and players {:?}",
            self.nodes.len(),
            infosets.len(),
            players
        );

        Ok(ExtensiveFormGame {
            nodes: self.nodes.clone(),
            path_index,
            children,
            parents,
            infosets,
            infoset_index,
            node_infoset,
            players: players.into_iter().collect(),
        })
    }

    /// Checks the invariants local to a single node.
    fn validate_node(node: &GameNode) -> Result<(), GameError> {
        let path = node.path();
        if path.is_empty() {
            return Err(GameError::malformed("empty node path"));
        }

        if !node.is_leaf() {
            let labels = node.action_labels();
            if labels.is_empty() {
                return Err(GameError::malformed(format!("node {} has no actions", path)));
            }
            let distinct = labels.iter().collect::<BTreeSet<_>>();
            if distinct.len() != labels.len() {
                return Err(GameError::malformed(format!(
                    "node {} declares an action twice",
                    path
                )));
            }
        }

        match node.kind() {
            NodeKind::Chance { actions } => {
                for action in actions.iter() {
                    let p = action.probability;
                    if !p.is_finite() || p <= 0.0 || p > 1.0 {
                        return Err(GameError::malformed(format!(
                            "chance node {} has probability {} for action {}",
                            path, p, action.label
                        )));
                    }
                }
                let total_prob: f64 = actions.iter().map(|a| a.probability).sum();
                if !abs_diff_eq!(total_prob, 1.0, epsilon = PROBABILITY_TOLERANCE) {
                    return Err(GameError::malformed(format!(
                        "chance probabilities at {} sum to {}",
                        path, total_prob
                    )));
                }
            }
            NodeKind::Leaf { payoffs } => {
                if let Some((player, value)) = payoffs.iter().find(|(_, v)| !v.is_finite()) {
                    return Err(GameError::malformed(format!(
                        "leaf {} has payoff {} for player {}",
                        path, value, player
                    )));
                }
            }
            NodeKind::Player { .. } => {}
        }
        Ok(())
    }

    /// Recovers parent/child links from the paths.
    fn link_nodes(
        &self,
        path_index: &BTreeMap<String, NodeId>,
    ) -> Result<(Vec<Vec<NodeId>>, Vec<Option<(NodeId, usize)>>), GameError> {
        let num_nodes = self.nodes.len();
        let mut slots: Vec<Vec<Option<NodeId>>> = self
            .nodes
            .iter()
            .map(|node| vec![None; node.num_actions()])
            .collect();
        let mut parents = vec![None; num_nodes];
        let mut num_roots = 0;

        for (id, node) in self.nodes.iter().enumerate() {
            let (parent_path, action) = match split_path(node.path()) {
                None => {
                    num_roots += 1;
                    if id != 0 {
                        return Err(GameError::malformed(format!(
                            "root {} is not the first node",
                            node.path()
                        )));
                    }
                    continue;
                }
                Some(split) => split,
            };

            let parent = match path_index.get(parent_path) {
                Some(parent) => *parent,
                None => {
                    return Err(GameError::malformed(format!(
                        "parent {} of node {} does not exist",
                        parent_path,
                        node.path()
                    )))
                }
            };
            if parent >= id {
                return Err(GameError::malformed(format!(
                    "node {} is listed before its parent {}",
                    node.path(),
                    parent_path
                )));
            }

            let action_idx = match self.nodes[parent].action_index(action) {
                Some(idx) => idx,
                None => {
                    return Err(GameError::malformed(format!(
                        "node {} is reached by action {} which {} does not declare",
                        node.path(),
                        action,
                        parent_path
                    )))
                }
            };
            if let Some(other) = slots[parent][action_idx] {
                return Err(GameError::malformed(format!(
                    "action {} of {} leads to both {} and {}",
                    action,
                    parent_path,
                    self.nodes[other].path(),
                    node.path()
                )));
            }
            slots[parent][action_idx] = Some(id);
            parents[id] = Some((parent, action_idx));
        }

        if num_roots != 1 {
            return Err(GameError::malformed(format!(
                "expected exactly one root, found {}",
                num_roots
            )));
        }

        let mut children = Vec::with_capacity(num_nodes);
        for (id, node_slots) in slots.into_iter().enumerate() {
            let mut node_children = Vec::with_capacity(node_slots.len());
            for (action_idx, slot) in node_slots.into_iter().enumerate() {
                match slot {
                    Some(child) => node_children.push(child),
                    None => {
                        return Err(GameError::malformed(format!(
                            "action {} of {} has no child node",
                            self.nodes[id].action_labels()[action_idx],
                            self.nodes[id].path()
                        )))
                    }
                }
            }
            children.push(node_children);
        }

        Ok((children, parents))
    }

    /// Resolves declared information sets and completes them with singletons.
    fn collect_infosets(
        &self,
        path_index: &BTreeMap<String, NodeId>,
    ) -> Result<(Vec<Infoset>, BTreeMap<String, InfosetId>, Vec<Option<InfosetId>>), GameError>
    {
        let mut infosets = Vec::<Infoset>::new();
        let mut infoset_index = BTreeMap::<String, InfosetId>::new();
        let mut node_infoset = vec![None; self.nodes.len()];

        for (name, paths) in self.infosets.iter() {
            if name.is_empty() {
                return Err(GameError::malformed("infoset with an empty name"));
            }
            if infoset_index.contains_key(name) {
                return Err(GameError::malformed(format!("duplicate infoset {}", name)));
            }
            if paths.is_empty() {
                return Err(GameError::malformed(format!("infoset {} has no nodes", name)));
            }

            let infoset_id = infosets.len();
            let mut histories = Vec::<NodeId>::with_capacity(paths.len());
            let mut owner = PlayerId::default();
            for path in paths.iter() {
                let id = match path_index.get(path) {
                    Some(id) => *id,
                    None => {
                        return Err(GameError::malformed(format!(
                            "infoset {} names unknown node {}",
                            name, path
                        )))
                    }
                };
                let node = &self.nodes[id];
                let player = match node.player() {
                    Some(player) => player,
                    None => {
                        return Err(GameError::malformed(format!(
                            "infoset {} contains {} which is not a player node",
                            name, path
                        )))
                    }
                };
                if let Some(&first) = histories.first() {
                    let reference: &GameNode = &self.nodes[first];
                    if reference.player() != Some(player) {
                        return Err(GameError::malformed(format!(
                            "infoset {} mixes players {} and {}",
                            name, owner, player
                        )));
                    }
                    if reference.action_labels() != node.action_labels() {
                        return Err(GameError::malformed(format!(
                            "infoset {} has differing actions at {}",
                            name, path
                        )));
                    }
                }
                owner = player;
                if node_infoset[id].is_some() {
                    return Err(GameError::malformed(format!(
                        "node {} belongs to more than one infoset",
                        path
                    )));
                }
                node_infoset[id] = Some(infoset_id);
                histories.push(id);
            }

            infoset_index.insert(name.clone(), infoset_id);
            infosets.push(Infoset::new(name.clone(), owner, histories));
        }

        // Perfectly observed decision nodes.
        for (id, node) in self.nodes.iter().enumerate() {
            if let (Some(player), None) = (node.player(), node_infoset[id]) {
                let name = node.path().to_string();
                if infoset_index.contains_key(&name) {
                    return Err(GameError::malformed(format!("duplicate infoset {}", name)));
                }
                let infoset_id = infosets.len();
                node_infoset[id] = Some(infoset_id);
                infoset_index.insert(name.clone(), infoset_id);
                infosets.push(Infoset::new(name, player, vec![id]));
            }
        }

        Ok((infosets, infoset_index, node_infoset))
    }
}
