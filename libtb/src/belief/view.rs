use crate::error::{malformed, Result};
use efg_lite::{ExtensiveFormGame, InfosetId, NodeId, NodeKind, PlayerId};
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// What a single team member has done so far: nothing, or the most recent
/// (infoset, action) pair it played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum View {
    Fresh,
    Acted { infoset: InfosetId, action: usize },
}

/// The views of both team members at some history, indexed by the member's position
/// in the team. This is the team analogue of recording the previous sequence of each
/// player while walking down the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeamView {
    views: [View; 2],
}

impl TeamView {
    pub fn fresh() -> TeamView {
        TeamView {
            views: [View::Fresh; 2],
        }
    }

    pub fn member(&self, member: usize) -> View {
        self.views[member]
    }

    /// Create a new view with exactly one member's last decision replaced.
    pub fn with_decision(&self, member: usize, infoset: InfosetId, action: usize) -> TeamView {
        let mut views = self.views;
        views[member] = View::Acted { infoset, action };
        TeamView { views }
    }
}

/// Position of `player` within the team, if it is a member.
pub fn member_index(team: &[PlayerId; 2], player: PlayerId) -> Option<usize> {
    team.iter().position(|&member| member == player)
}

/// Computes the team view of every history, top-down, and checks that the team members
/// have perfect recall: every history of a team infoset carries the same prior view of
/// its owner, and no member reaches the same infoset twice along one path.
pub fn compute_views(game: &ExtensiveFormGame, team: &[PlayerId; 2]) -> Result<Vec<TeamView>> {
    let mut views = Vec::<TeamView>::with_capacity(game.num_nodes());
    let mut own_views = BTreeMap::<InfosetId, View>::new();

    for id in game.order() {
        let view = match game.parent(id) {
            None => TeamView::fresh(),
            Some((parent, action)) => match team_decision(game, team, parent) {
                Some((member, infoset)) => views[parent].with_decision(member, infoset, action),
                None => views[parent],
            },
        };

        if let Some((member, infoset)) = team_decision(game, team, id) {
            let own = view.member(member);
            if let View::Acted { infoset: last, .. } = own {
                if last == infoset {
                    return Err(malformed(format!(
                        "infoset {} is reached twice on the path to {}",
                        game.infoset(infoset).name(),
                        game.node(id).path()
                    )));
                }
            }
            match own_views.entry(infoset) {
                Entry::Vacant(entry) => {
                    entry.insert(own);
                }
                Entry::Occupied(entry) => {
                    if *entry.get() != own {
                        return Err(malformed(format!(
                            "player {} does not have perfect recall at infoset {}",
                            game.node(id).player().unwrap_or_default(),
                            game.infoset(infoset).name()
                        )));
                    }
                }
            }
        }
        views.push(view);
    }

    debug!(
        "Computed team views for {} histories and {} team infosets",
        views.len(),
        own_views.len()
    );
    Ok(views)
}

/// Member index and infoset of `id` if it is a decision node of the team.
fn team_decision(
    game: &ExtensiveFormGame,
    team: &[PlayerId; 2],
    id: NodeId,
) -> Option<(usize, InfosetId)> {
    match game.node(id).kind() {
        NodeKind::Player { player, .. } => {
            let member = member_index(team, *player)?;
            let infoset = game.infoset_of(id)?;
            Some((member, infoset))
        }
        _ => None,
    }
}
