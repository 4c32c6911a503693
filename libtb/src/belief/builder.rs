use crate::belief::key::BeliefKey;
use crate::belief::node::{BeliefAction, BeliefKind, TeamBeliefNode};
use crate::belief::view::{compute_views, member_index, TeamView};
use crate::belief::{BeliefId, TeamBeliefDag};
use crate::error::{malformed, Error, Result};
use efg_lite::{ExtensiveFormGame, InfosetId, NodeId, NodeKind, PlayerId};
use itertools::Itertools;
use log::{debug, info};
use noisy_float::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// A belief node under construction. Ids and children refer to construction ids, which
/// are only replaced by the final topological numbering at the very end.
#[derive(Debug, Clone)]
struct Draft {
    kind: BeliefKind,
    views: TeamView,
    histories: Vec<NodeId>,
    folded: Vec<NodeId>,
    actions: Vec<BeliefAction>,
    children: Vec<Option<BeliefId>>,
    payoffs: Option<BTreeMap<PlayerId, f64>>,
    decision: Option<(usize, InfosetId)>,
}

impl Draft {
    fn new(kind: BeliefKind, views: TeamView, actions: Vec<BeliefAction>) -> Draft {
        let num_actions = actions.len();
        Draft {
            kind,
            views,
            histories: vec![],
            folded: vec![],
            actions,
            children: vec![None; num_actions],
            payoffs: None,
            decision: None,
        }
    }

    fn with_children(mut self, children: &[BeliefId]) -> Draft {
        self.children = children.iter().map(|&child| Some(child)).collect();
        self
    }
}

/// Builds the team belief DAG of a game for a fixed team.
///
/// Construction runs in four passes over the game:
/// (1) team views are computed top-down and perfect recall of the team is checked,
/// (2) histories are resolved bottom-up, children before parents, each one either
///     interning a belief key or folding into the belief node all its children share,
/// (3) team decision edges whose histories disagree on the child are routed through an
///     observation node, and the synthetic root is attached,
/// (4) nodes are renumbered in topological order, root first.
pub struct TeamBeliefDagBuilder<'a> {
    game: &'a ExtensiveFormGame,
    team: [PlayerId; 2],
    views: Vec<TeamView>,

    drafts: Vec<Draft>,
    interned: BTreeMap<BeliefKey, BeliefId>,

    // Belief node each history resolved to, and whether it was folded into it.
    targets: Vec<Option<BeliefId>>,
    folded: Vec<bool>,

    // Children seen for every (decision draft, action) pair, with the child history.
    pending: BTreeMap<(BeliefId, usize), Vec<(BeliefId, NodeId)>>,
}

impl<'a> TeamBeliefDagBuilder<'a> {
    /// Validates the team and computes team views. The team must be exactly two
    /// distinct players of `game`.
    pub fn new(game: &'a ExtensiveFormGame, team: &[PlayerId]) -> Result<TeamBeliefDagBuilder<'a>> {
        let players = game.players();
        let is_valid = team.len() == 2
            && team[0] != team[1]
            && team.iter().all(|player| players.contains(player));
        if !is_valid {
            return Err(Error::InvalidTeam {
                team: team.to_vec(),
                players: players.to_vec(),
            });
        }
        let team = [team[0], team[1]];
        let views = compute_views(game, &team)?;

        Ok(TeamBeliefDagBuilder {
            game,
            team,
            views,
            drafts: vec![],
            interned: BTreeMap::new(),
            targets: vec![None; game.num_nodes()],
            folded: vec![false; game.num_nodes()],
            pending: BTreeMap::new(),
        })
    }

    pub fn build(mut self) -> Result<TeamBeliefDag> {
        self.resolve_histories()?;
        debug!(
            "Interned {} belief nodes from {} histories",
            self.drafts.len(),
            self.game.num_nodes()
        );
        self.resolve_decision_edges()?;
        let root = self.attach_root()?;
        let (children, parents) = self.link()?;
        let order = self.topological_order(root, &children, &parents)?;
        debug!("Renumbered {} belief nodes topologically", order.len());
        let dag = self.renumber(&order, &children, &parents)?;

        info!(
            "Built team belief DAG for team {:?}: {} nodes, {} edges, {} folded histories",
            dag.team(),
            dag.len(),
            dag.num_edges(),
            self.folded.iter().filter(|&&f| f).count()
        );
        Ok(dag)
    }

    /// Registers `histories` under `key`, creating the draft with `make` the first time the
    /// key is seen.
    fn intern<F>(&mut self, key: BeliefKey, histories: &[NodeId], make: F) -> BeliefId
    where
        F: FnOnce() -> Draft,
    {
        let belief = match self.interned.get(&key) {
            Some(&belief) => belief,
            None => {
                let belief = self.drafts.len();
                self.drafts.push(make());
                self.interned.insert(key, belief);
                belief
            }
        };
        self.drafts[belief].histories.extend_from_slice(histories);
        belief
    }

    fn target(&self, history: NodeId) -> Result<BeliefId> {
        self.targets[history].ok_or_else(|| {
            malformed(format!(
                "history {} was not resolved before its parent",
                self.game.node(history).path()
            ))
        })
    }

    fn resolve_histories(&mut self) -> Result<()> {
        let game = self.game;
        for id in game.order().rev() {
            match game.node(id).kind() {
                NodeKind::Leaf { payoffs } => {
                    let views = self.views[id];
                    let key = BeliefKey::Terminal {
                        views,
                        payoffs: payoffs.iter().map(|(&p, &v)| (p, r64(v))).collect(),
                    };
                    let belief = self.intern(key, &[id], || {
                        let mut draft = Draft::new(BeliefKind::Terminal, views, vec![]);
                        draft.payoffs = Some(payoffs.clone());
                        draft
                    });
                    self.targets[id] = Some(belief);
                }
                NodeKind::Player { player, actions } => match member_index(&self.team, *player) {
                    Some(member) => self.handle_team_decision(id, member, *player, actions)?,
                    None => self.handle_branching(id)?,
                },
                NodeKind::Chance { .. } => self.handle_branching(id)?,
            }
        }
        Ok(())
    }

    fn handle_team_decision(
        &mut self,
        id: NodeId,
        member: usize,
        player: PlayerId,
        actions: &[String],
    ) -> Result<()> {
        let game = self.game;
        let views = self.views[id];
        let infoset = game.infoset_of(id).ok_or_else(|| {
            malformed(format!("decision node {} has no infoset", game.node(id).path()))
        })?;

        let key = BeliefKey::Decision {
            views,
            member,
            infoset,
        };
        let belief = self.intern(key, &[id], || {
            let labels = actions
                .iter()
                .map(|label| BeliefAction {
                    label: label.clone(),
                    probability: None,
                })
                .collect();
            let mut draft = Draft::new(BeliefKind::Decision { member: player }, views, labels);
            draft.decision = Some((member, infoset));
            draft
        });
        self.targets[id] = Some(belief);

        for (action, &child) in game.children(id).iter().enumerate() {
            let target = self.target(child)?;
            self.pending
                .entry((belief, action))
                .or_insert_with(Vec::new)
                .push((target, child));
        }
        Ok(())
    }

    /// Chance and opponent histories. If every outcome leads to the same belief node the
    /// history is folded into it; otherwise outcomes are grouped by the node they lead to.
    fn handle_branching(&mut self, id: NodeId) -> Result<()> {
        let game = self.game;
        let children = game
            .children(id)
            .iter()
            .map(|&child| self.target(child))
            .collect::<Result<Vec<BeliefId>>>()?;

        let first = children[0];
        if children.iter().all(|&child| child == first) {
            self.targets[id] = Some(first);
            self.folded[id] = true;
            self.drafts[first].folded.push(id);
            return Ok(());
        }

        let groups = children
            .iter()
            .cloned()
            .unique()
            .map(|target| {
                let outcomes = (0..children.len())
                    .filter(|&action| children[action] == target)
                    .collect::<Vec<usize>>();
                (target, outcomes)
            })
            .collect::<Vec<_>>();
        let targets = groups.iter().map(|(target, _)| *target).collect::<Vec<_>>();
        let views = self.views[id];

        let belief = match game.node(id).kind() {
            NodeKind::Chance { actions } => {
                let branches = groups
                    .iter()
                    .map(|(target, outcomes)| {
                        let probability: f64 =
                            outcomes.iter().map(|&a| actions[a].probability).sum();
                        (*target, probability)
                    })
                    .collect::<Vec<_>>();
                let key = BeliefKey::Chance {
                    views,
                    branches: branches.iter().map(|&(t, p)| (t, r64(p))).collect(),
                };
                self.intern(key, &[id], || {
                    let labels = groups
                        .iter()
                        .zip(branches.iter())
                        .map(|((_, outcomes), &(_, probability))| BeliefAction {
                            label: outcomes.iter().map(|&a| actions[a].label.as_str()).join("|"),
                            probability: Some(probability),
                        })
                        .collect();
                    Draft::new(BeliefKind::Chance, views, labels).with_children(&targets)
                })
            }
            _ => {
                let key = BeliefKey::Observation {
                    views,
                    branches: targets.clone(),
                };
                self.intern(key, &[id], || {
                    let labels = groups
                        .iter()
                        .map(|(_, outcomes)| BeliefAction {
                            label: game.node(game.children(id)[outcomes[0]]).path().to_string(),
                            probability: None,
                        })
                        .collect();
                    Draft::new(BeliefKind::Observation, views, labels).with_children(&targets)
                })
            }
        };
        self.targets[id] = Some(belief);
        Ok(())
    }

    /// Points every team action at its child. When the histories of a decision node reach
    /// different nodes through the same action, the team learns something after acting and
    /// an observation node is inserted to branch on it.
    fn resolve_decision_edges(&mut self) -> Result<()> {
        let game = self.game;
        let pending = std::mem::replace(&mut self.pending, BTreeMap::new());
        let mut num_observations = 0;

        for ((belief, action), mut candidates) in pending.into_iter() {
            candidates.sort_by_key(|&(_, child)| child);
            let targets = candidates
                .iter()
                .map(|&(target, _)| target)
                .unique()
                .collect::<Vec<_>>();
            let child = if targets.len() == 1 {
                targets[0]
            } else {
                let views = match self.drafts[belief].decision {
                    Some((member, infoset)) => {
                        self.drafts[belief].views.with_decision(member, infoset, action)
                    }
                    None => self.drafts[belief].views,
                };
                let key = BeliefKey::Observation {
                    views,
                    branches: targets.clone(),
                };
                let histories = candidates.iter().map(|&(_, child)| child).collect::<Vec<_>>();
                num_observations += 1;
                let labels = observation_labels(game, &targets, &candidates)?;
                self.intern(key, &histories, || {
                    Draft::new(BeliefKind::Observation, views, labels).with_children(&targets)
                })
            };
            self.drafts[belief].children[action] = Some(child);
        }
        debug!("Split {} team actions with observation nodes", num_observations);
        Ok(())
    }

    fn attach_root(&mut self) -> Result<BeliefId> {
        let game_root = self.game.root();
        let start = self.target(game_root)?;
        let root = self.intern(BeliefKey::Root, &[game_root], || {
            let action = BeliefAction {
                label: "root".to_string(),
                probability: None,
            };
            Draft::new(BeliefKind::Root, TeamView::fresh(), vec![action]).with_children(&[start])
        });
        Ok(root)
    }

    /// Collects children and parent lists, rejecting any node that reaches one child
    /// through two different actions.
    fn link(&self) -> Result<(Vec<Vec<BeliefId>>, Vec<Vec<(BeliefId, usize)>>)> {
        let mut children = Vec::with_capacity(self.drafts.len());
        let mut parents = vec![Vec::<(BeliefId, usize)>::new(); self.drafts.len()];

        for (belief, draft) in self.drafts.iter().enumerate() {
            let mut seen = BTreeSet::<BeliefId>::new();
            let mut resolved = Vec::with_capacity(draft.children.len());
            for (action, child) in draft.children.iter().enumerate() {
                let child = child.ok_or_else(|| {
                    malformed(format!(
                        "action {} of {} has no child",
                        draft.actions[action].label,
                        self.describe(belief)
                    ))
                })?;
                // Unreachable under perfect recall, where the member views of two actions
                // always differ.
                if !seen.insert(child) {
                    return Err(malformed(format!(
                        "two actions of {} lead to the same belief node",
                        self.describe(belief)
                    )));
                }
                parents[child].push((belief, action));
                resolved.push(child);
            }
            children.push(resolved);
        }
        Ok((children, parents))
    }

    /// Kahn's algorithm from the root. Ready nodes are taken in order of their earliest
    /// history in the game order, then of construction.
    fn topological_order(
        &self,
        root: BeliefId,
        children: &[Vec<BeliefId>],
        parents: &[Vec<(BeliefId, usize)>],
    ) -> Result<Vec<BeliefId>> {
        let rank = |belief: BeliefId| {
            let earliest = self.drafts[belief]
                .histories
                .iter()
                .min()
                .cloned()
                .unwrap_or(NodeId::max_value());
            (earliest, belief)
        };

        let mut in_degree = parents.iter().map(|p| p.len()).collect::<Vec<_>>();
        if in_degree[root] != 0 {
            return Err(malformed("the root belief node has a parent"));
        }
        let mut ready = BTreeSet::<(NodeId, BeliefId)>::new();
        ready.insert(rank(root));

        let mut order = Vec::with_capacity(self.drafts.len());
        while let Some(next) = ready.iter().next().cloned() {
            ready.remove(&next);
            let belief = next.1;
            order.push(belief);
            for &child in children[belief].iter() {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(rank(child));
                }
            }
        }

        if order.len() != self.drafts.len() {
            return Err(malformed(format!(
                "belief graph has a cycle or unreachable nodes ({} of {} ordered)",
                order.len(),
                self.drafts.len()
            )));
        }
        Ok(order)
    }

    fn renumber(
        &self,
        order: &[BeliefId],
        children: &[Vec<BeliefId>],
        parents: &[Vec<(BeliefId, usize)>],
    ) -> Result<TeamBeliefDag> {
        let game = self.game;
        let mut new_id = vec![0; order.len()];
        for (position, &belief) in order.iter().enumerate() {
            new_id[belief] = position;
        }
        let paths = |ids: &[NodeId]| {
            ids.iter()
                .map(|&h| game.node(h).path().to_string())
                .sorted()
                .dedup()
                .collect::<Vec<String>>()
        };

        let nodes = order
            .iter()
            .enumerate()
            .map(|(position, &belief)| {
                let draft = &self.drafts[belief];
                TeamBeliefNode {
                    id: position,
                    kind: draft.kind,
                    histories: paths(&draft.histories),
                    folded: paths(&draft.folded),
                    actions: draft.actions.clone(),
                    children: children[belief].iter().map(|&c| new_id[c]).collect(),
                    parents: parents[belief]
                        .iter()
                        .map(|&(p, a)| (new_id[p], a))
                        .sorted()
                        .collect(),
                    payoffs: draft.payoffs.clone(),
                    infoset: draft
                        .decision
                        .map(|(_, infoset)| game.infoset(infoset).name().to_string()),
                }
            })
            .collect::<Vec<_>>();

        let history_targets = game
            .order()
            .map(|h| self.target(h).map(|belief| new_id[belief]))
            .collect::<Result<Vec<_>>>()?;

        Ok(TeamBeliefDag::new(
            self.team,
            nodes,
            history_targets,
            self.folded.clone(),
            game,
        ))
    }

    fn describe(&self, belief: BeliefId) -> String {
        let draft = &self.drafts[belief];
        match draft.histories.first() {
            Some(&h) => format!("{} node at {}", draft.kind.tag(), self.game.node(h).path()),
            None => format!("{} node", draft.kind.tag()),
        }
    }
}

/// Labels the branches of an observation node with the first history reaching each of them.
fn observation_labels(
    game: &ExtensiveFormGame,
    targets: &[BeliefId],
    candidates: &[(BeliefId, NodeId)],
) -> Result<Vec<BeliefAction>> {
    targets
        .iter()
        .map(|target| {
            candidates
                .iter()
                .find(|(t, _)| t == target)
                .map(|&(_, child)| BeliefAction {
                    label: game.node(child).path().to_string(),
                    probability: None,
                })
                .ok_or_else(|| malformed(format!("observed branch {} has no history", target)))
        })
        .collect()
}
