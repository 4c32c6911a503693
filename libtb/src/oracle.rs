use crate::belief::{BeliefId, TeamBeliefDag};
use crate::error::{inconsistent, Result};
use crate::regmin::{Gradient, ReachProfile, EFFECTIVELY_ZERO};
use efg_lite::{ExtensiveFormGame, NodeId, NodeKind, PlayerId, PROBABILITY_TOLERANCE};
use log::debug;
use std::collections::BTreeMap;

/// Supplies the terminal losses of one iteration, given the reach profile the solver
/// just committed to.
pub trait GradientOracle {
    fn gradient(&mut self, dag: &TeamBeliefDag, reach: &ReachProfile) -> Result<Gradient>;
}

impl<F> GradientOracle for F
where
    F: FnMut(&TeamBeliefDag, &ReachProfile) -> Result<Gradient>,
{
    fn gradient(&mut self, dag: &TeamBeliefDag, reach: &ReachProfile) -> Result<Gradient> {
        self(dag, reach)
    }
}

/// Fixed behavioural strategy of the players outside the team, given per infoset name.
/// Infosets without an entry are played uniformly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpponentProfile {
    strategies: BTreeMap<String, Vec<f64>>,
}

impl OpponentProfile {
    pub fn uniform() -> OpponentProfile {
        OpponentProfile::default()
    }

    pub fn with_strategy<S: Into<String>>(mut self, infoset: S, probabilities: Vec<f64>) -> Self {
        self.strategies.insert(infoset.into(), probabilities);
        self
    }

    /// Probability that the owner of decision node `id` plays its `action`-th action.
    pub fn probability(&self, game: &ExtensiveFormGame, id: NodeId, action: usize) -> Result<f64> {
        let num_actions = game.node(id).num_actions();
        let infoset = match game.infoset_of(id) {
            Some(infoset) => game.infoset(infoset),
            None => {
                return Err(inconsistent(format!(
                    "{} is not a decision node",
                    game.node(id).path()
                )))
            }
        };
        match self.strategies.get(infoset.name()) {
            None => Ok(1.0 / num_actions as f64),
            Some(probabilities) => probabilities.get(action).cloned().ok_or_else(|| {
                inconsistent(format!(
                    "opponent strategy at {} has no action {}",
                    infoset.name(),
                    action
                ))
            }),
        }
    }

    /// Every strategy must name an existing opponent infoset and be a distribution over
    /// its actions.
    pub fn validate(&self, game: &ExtensiveFormGame, team: &[PlayerId; 2]) -> Result<()> {
        for (name, probabilities) in self.strategies.iter() {
            let infoset = match game.infoset_by_name(name) {
                Some(infoset) => game.infoset(infoset),
                None => return Err(inconsistent(format!("unknown opponent infoset {}", name))),
            };
            if team.contains(&infoset.player()) {
                return Err(inconsistent(format!(
                    "infoset {} belongs to team member {}",
                    name,
                    infoset.player()
                )));
            }
            let num_actions = infoset
                .histories()
                .first()
                .map(|&h| game.node(h).num_actions())
                .unwrap_or(0);
            let total: f64 = probabilities.iter().sum();
            let is_distribution = probabilities.len() == num_actions
                && probabilities.iter().all(|p| p.is_finite() && *p >= 0.0)
                && (total - 1.0).abs() <= PROBABILITY_TOLERANCE;
            if !is_distribution {
                return Err(inconsistent(format!(
                    "opponent strategy {:?} at {} is not a distribution over {} actions",
                    probabilities, name, num_actions
                )));
            }
        }
        Ok(())
    }
}

/// A game leaf as seen from the DAG.
#[derive(Debug, Clone)]
struct LeafTerm {
    terminal: BeliefId,
    /// Product of the chance and opponent probabilities on the path.
    probability: f64,
    /// Mean payoff of the two team members.
    payoff: f64,
    /// Team decisions on the path, as (belief node, action).
    decisions: Vec<(BeliefId, usize)>,
}

impl LeafTerm {
    /// Probability that the team takes its own actions on the path under `reach`. A decision
    /// node that is never reached contributes 0.
    fn team_probability(&self, reach: &ReachProfile) -> f64 {
        self.decisions
            .iter()
            .map(|&(belief, action)| {
                let node_reach = reach.node[belief];
                if node_reach > 0.0 {
                    reach.edge.get(belief, action) / node_reach
                } else {
                    0.0
                }
            })
            .product()
    }
}

/// Reference oracle for a fixed opponent profile. The loss of a terminal node is its negated
/// team payoff (the mean payoff of the two members).
///
/// Under a reach profile `x` the loss of terminal `T` is
/// `g[T] = -Σ p(z)·π(z)·u(z) / x[T]`, summed over the leaves `z` that resolve to `T`, where `p(z)`
/// is the chance and opponent probability of the path to `z` and `π(z)` the probability of the
/// team's own actions on it. `Σ x[T]·g[T]` is then the negated expected team payoff of `x`,
/// including terminals entered through routes of different weight.
///
/// Terminals with (almost) no reach use a baseline that does not depend on the strategy: a leaf
/// weighs `p(z)` divided by the chance groups kept as DAG chance nodes, and a terminal with
/// several incoming edges splits its summed loss evenly among them.
#[derive(Debug, Clone)]
pub struct ExpectedPayoffOracle {
    leaves: Vec<LeafTerm>,
    baseline: Gradient,
}

impl ExpectedPayoffOracle {
    pub fn new(
        game: &ExtensiveFormGame,
        dag: &TeamBeliefDag,
        profile: &OpponentProfile,
    ) -> Result<ExpectedPayoffOracle> {
        let team = dag.team();
        profile.validate(game, &team)?;

        let mut losses = BTreeMap::<BeliefId, f64>::new();
        for terminal in dag.terminal_nodes() {
            losses.insert(terminal, 0.0);
        }

        let mut leaves = vec![];
        for leaf in game.order() {
            let payoffs = match game.node(leaf).kind() {
                NodeKind::Leaf { payoffs } => payoffs,
                _ => continue,
            };
            let terminal = belief_of(dag, game, leaf)?;
            let payoff = team
                .iter()
                .map(|member| payoffs.get(member).cloned().unwrap_or(0.0))
                .sum::<f64>()
                / 2.0;

            let weight = leaf_weight(game, dag, profile, leaf)?;
            match losses.get_mut(&terminal) {
                Some(loss) => *loss -= weight * payoff,
                None => {
                    return Err(inconsistent(format!(
                        "leaf {} does not resolve to a terminal",
                        game.node(leaf).path()
                    )))
                }
            }

            let mut probability = 1.0;
            let mut decisions = vec![];
            for (history, action) in game.history(leaf) {
                match game.node(history).kind() {
                    NodeKind::Chance { actions } => probability *= actions[action].probability,
                    NodeKind::Player { player, .. } if team.contains(player) => {
                        decisions.push((belief_of(dag, game, history)?, action));
                    }
                    NodeKind::Player { .. } => {
                        probability *= profile.probability(game, history, action)?;
                    }
                    NodeKind::Leaf { .. } => {}
                }
            }
            leaves.push(LeafTerm {
                terminal,
                probability,
                payoff,
                decisions,
            });
        }

        let mut baseline = Gradient::new();
        for (terminal, loss) in losses.into_iter() {
            let routes = dag.parents(terminal)?.len().max(1);
            baseline.insert(terminal, loss / routes as f64);
        }
        debug!(
            "Prepared expected payoff oracle over {} leaves and {} terminals",
            leaves.len(),
            baseline.len()
        );
        Ok(ExpectedPayoffOracle { leaves, baseline })
    }

    /// Losses used for terminals the strategy does not reach.
    pub fn baseline_gradient(&self) -> &Gradient {
        &self.baseline
    }

    /// Expected team payoff of the strategy behind `reach`.
    pub fn expected_payoff(&self, reach: &ReachProfile) -> f64 {
        self.leaves
            .iter()
            .map(|leaf| leaf.probability * leaf.team_probability(reach) * leaf.payoff)
            .sum()
    }
}

impl GradientOracle for ExpectedPayoffOracle {
    fn gradient(&mut self, dag: &TeamBeliefDag, reach: &ReachProfile) -> Result<Gradient> {
        if reach.node.len() != dag.len() || reach.edge.num_nodes() != dag.len() {
            return Err(inconsistent(format!(
                "reach profile over {} nodes does not match a DAG of {} nodes",
                reach.node.len(),
                dag.len()
            )));
        }

        let mut losses = self
            .baseline
            .iter()
            .map(|(terminal, _)| (terminal, 0.0))
            .collect::<BTreeMap<BeliefId, f64>>();
        for leaf in self.leaves.iter() {
            if let Some(loss) = losses.get_mut(&leaf.terminal) {
                *loss -= leaf.probability * leaf.team_probability(reach) * leaf.payoff;
            }
        }

        Ok(losses
            .into_iter()
            .map(|(terminal, loss)| {
                let terminal_reach = reach.node[terminal];
                if terminal_reach > EFFECTIVELY_ZERO {
                    (terminal, loss / terminal_reach)
                } else {
                    (terminal, self.baseline.get(terminal).unwrap_or(0.0))
                }
            })
            .collect())
    }
}

fn belief_of(dag: &TeamBeliefDag, game: &ExtensiveFormGame, id: NodeId) -> Result<BeliefId> {
    dag.belief_of_node(id).ok_or_else(|| {
        inconsistent(format!(
            "history {} is not part of the DAG",
            game.node(id).path()
        ))
    })
}

/// Probability of the moves on the path to `leaf` that are not carried by DAG reach.
fn leaf_weight(
    game: &ExtensiveFormGame,
    dag: &TeamBeliefDag,
    profile: &OpponentProfile,
    leaf: NodeId,
) -> Result<f64> {
    let team = dag.team();
    let mut weight = 1.0;
    for (history, action) in game.history(leaf) {
        match game.node(history).kind() {
            NodeKind::Chance { actions } => {
                weight *= actions[action].probability;
                if dag.is_folded(history) {
                    continue;
                }
                let chance = dag.node(belief_of(dag, game, history)?)?;
                let child = belief_of(dag, game, game.children(history)[action])?;
                let group = chance
                    .children()
                    .iter()
                    .position(|&c| c == child)
                    .and_then(|g| chance.actions()[g].probability);
                match group {
                    Some(probability) => weight /= probability,
                    None => {
                        return Err(inconsistent(format!(
                            "chance node {} has no branch for {}",
                            chance.key(),
                            actions[action].label
                        )))
                    }
                }
            }
            NodeKind::Player { player, .. } if !team.contains(player) => {
                weight *= profile.probability(game, history, action)?;
            }
            _ => {}
        }
    }
    Ok(weight)
}
