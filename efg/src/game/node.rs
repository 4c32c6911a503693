use crate::game::PlayerId;
use std::collections::BTreeMap;

/// Index of a node in the top-down order of an `ExtensiveFormGame`.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct ChanceAction {
    pub label: String,
    pub probability: f64,
}

impl ChanceAction {
    pub fn new<S: Into<String>>(label: S, probability: f64) -> ChanceAction {
        ChanceAction {
            label: label.into(),
            probability,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Chance { actions: Vec<ChanceAction> },
    Player { player: PlayerId, actions: Vec<String> },
    Leaf { payoffs: BTreeMap<PlayerId, f64> },
}

/// A single history of the game tree, identified by its path.
#[derive(Debug, Clone, PartialEq)]
pub struct GameNode {
    path: String,
    kind: NodeKind,
}

impl GameNode {
    pub fn new<S: Into<String>>(path: S, kind: NodeKind) -> GameNode {
        GameNode {
            path: path.into(),
            kind,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        match self.kind {
            NodeKind::Leaf { .. } => true,
            _ => false,
        }
    }

    /// Owner of a decision node; `None` for chance and leaves.
    pub fn player(&self) -> Option<PlayerId> {
        match self.kind {
            NodeKind::Player { player, .. } => Some(player),
            _ => None,
        }
    }

    /// Action labels in declaration order. Leaves have none.
    pub fn action_labels(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::Chance { actions } => actions.iter().map(|a| a.label.as_str()).collect(),
            NodeKind::Player { actions, .. } => actions.iter().map(|a| a.as_str()).collect(),
            NodeKind::Leaf { .. } => vec![],
        }
    }

    pub fn num_actions(&self) -> usize {
        match &self.kind {
            NodeKind::Chance { actions } => actions.len(),
            NodeKind::Player { actions, .. } => actions.len(),
            NodeKind::Leaf { .. } => 0,
        }
    }

    pub fn action_index(&self, label: &str) -> Option<usize> {
        self.action_labels().iter().position(|a| *a == label)
    }

    pub fn payoffs(&self) -> Option<&BTreeMap<PlayerId, f64>> {
        match &self.kind {
            NodeKind::Leaf { payoffs } => Some(payoffs),
            _ => None,
        }
    }
}

/// Splits a history path into its parent path and the action leading into it.
/// Returns `None` for the root, i.e., `/` or any path without a `/`.
///
/// The parent is everything before the last `/` (or `/` itself when that is the
/// only separator). The action is the last segment, stripped of anything up to
/// and including its last `:`, so `/C:JQ/P1:r` is reached from `/C:JQ` via `r`.
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    let cut = path.rfind('/')?;
    let parent = if cut == 0 { "/" } else { &path[..cut] };
    let segment = &path[cut + 1..];
    let action = match segment.rfind(':') {
        Some(colon) => &segment[colon + 1..],
        None => segment,
    };
    Some((parent, action))
}
