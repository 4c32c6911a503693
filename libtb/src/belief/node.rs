use crate::belief::BeliefId;
use efg_lite::PlayerId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeliefKind {
    /// Synthetic entry point with the single action `root`.
    Root,
    Chance,
    /// A decision of the given team member.
    Decision { member: PlayerId },
    /// A point where the team learns which of several branches play went down, either
    /// through an opponent move or through chance revealed after one of its own actions.
    /// Every branch is followed.
    Observation,
    Terminal,
}

impl BeliefKind {
    pub fn tag(&self) -> &'static str {
        match self {
            BeliefKind::Root => "root",
            BeliefKind::Chance => "chance",
            BeliefKind::Decision { .. } => "decision",
            BeliefKind::Observation => "observation",
            BeliefKind::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeliefAction {
    pub label: String,
    /// Set for chance nodes only.
    pub probability: Option<f64>,
}

/// A point of the team belief DAG.
#[derive(Debug, Clone)]
pub struct TeamBeliefNode {
    pub(crate) id: BeliefId,
    pub(crate) kind: BeliefKind,
    pub(crate) histories: Vec<String>,
    pub(crate) folded: Vec<String>,
    pub(crate) actions: Vec<BeliefAction>,
    pub(crate) children: Vec<BeliefId>,
    pub(crate) parents: Vec<(BeliefId, usize)>,
    pub(crate) payoffs: Option<BTreeMap<PlayerId, f64>>,
    pub(crate) infoset: Option<String>,
}

impl TeamBeliefNode {
    pub fn id(&self) -> BeliefId {
        self.id
    }

    pub fn kind(&self) -> BeliefKind {
        self.kind
    }

    /// Stable identity: the kind tag followed by the sorted underlying history paths.
    pub fn key(&self) -> String {
        format!("{}[{}]", self.kind.tag(), self.histories.join(","))
    }

    /// Game histories merged into this node, sorted.
    pub fn histories(&self) -> &[String] {
        &self.histories
    }

    /// Chance and opponent histories that collapsed into this node because none of
    /// their outcomes is distinguishable by the team.
    pub fn folded(&self) -> &[String] {
        &self.folded
    }

    pub fn actions(&self) -> &[BeliefAction] {
        &self.actions
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Children aligned with `actions()`.
    pub fn children(&self) -> &[BeliefId] {
        &self.children
    }

    /// Every (parent, action) pair leading here, sorted.
    pub fn parents(&self) -> &[(BeliefId, usize)] {
        &self.parents
    }

    pub fn payoffs(&self) -> Option<&BTreeMap<PlayerId, f64>> {
        self.payoffs.as_ref()
    }

    /// Name of the infoset acted at, for decision nodes.
    pub fn infoset(&self) -> Option<&str> {
        self.infoset.as_ref().map(|name| name.as_str())
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == BeliefKind::Terminal
    }

    pub fn is_decision(&self) -> bool {
        match self.kind {
            BeliefKind::Decision { .. } => true,
            _ => false,
        }
    }
}
