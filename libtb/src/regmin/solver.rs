use crate::belief::{BeliefKind, TeamBeliefDag};
use crate::error::{inconsistent, Result};
use crate::oracle::GradientOracle;
use crate::regmin::{ActionTable, Gradient, ReachProfile, EFFECTIVELY_ZERO};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingStrategy,
    AwaitingUtility,
}

/// Regret minimization over a team belief DAG.
///
/// Every decision node runs regret matching on its own actions; chance nodes play their
/// fixed probabilities, and the root and observation nodes follow every action with
/// probability one. Each iteration is a pair of calls: `next_strategy()` computes the
/// local strategies and reach probabilities root-to-leaf, and `observe_utility()` takes
/// the loss of every terminal node and pushes counterfactual values leaf-to-root,
/// updating regrets on the way. The calls must strictly alternate, starting with
/// `next_strategy()`.
///
/// A node may have several parents, so values are attributed per (parent, action) slot
/// and never merged into a parent as a whole.
///
/// All tables are owned by the instance; several solvers over the same DAG are independent.
#[derive(Debug, Clone)]
pub struct DagRegMin<'a> {
    dag: &'a TeamBeliefDag,

    regrets: ActionTable,
    x_prime: ActionTable,
    current: ReachProfile,
    cumulative: ReachProfile,

    iterations: usize,
    phase: Phase,
}

impl<'a> DagRegMin<'a> {
    pub fn new(dag: &'a TeamBeliefDag) -> DagRegMin<'a> {
        DagRegMin {
            dag,
            regrets: ActionTable::zeros(dag),
            x_prime: ActionTable::zeros(dag),
            current: ReachProfile::zeros(dag),
            cumulative: ReachProfile::zeros(dag),
            iterations: 0,
            phase: Phase::AwaitingStrategy,
        }
    }

    pub fn dag(&self) -> &'a TeamBeliefDag {
        self.dag
    }

    /// Forward pass. Computes the local strategy of every node from its regrets and the
    /// reach of every node and edge, adds them to the running sum and returns them.
    pub fn next_strategy(&mut self) -> Result<&ReachProfile> {
        if self.phase != Phase::AwaitingStrategy {
            return Err(inconsistent(
                "next_strategy called twice without observing a utility",
            ));
        }

        let dag = self.dag;
        for id in dag.topological_order() {
            let node = dag.node(id)?;

            let reach = if id == dag.root() {
                1.0
            } else {
                let mut reach = 0.0;
                for &(parent, action) in node.parents().iter() {
                    if parent >= id {
                        return Err(inconsistent(format!(
                            "parent {} of belief node {} is not ordered before it",
                            parent, id
                        )));
                    }
                    reach += self.current.edge.get(parent, action);
                }
                reach
            };

            let local = self.x_prime.node_mut(id);
            match node.kind() {
                BeliefKind::Decision { .. } => regret_matching(self.regrets.node(id), local),
                BeliefKind::Chance => {
                    for (x, action) in local.iter_mut().zip(node.actions().iter()) {
                        *x = action.probability.unwrap_or(0.0);
                    }
                }
                BeliefKind::Root | BeliefKind::Observation => {
                    for x in local.iter_mut() {
                        *x = 1.0;
                    }
                }
                BeliefKind::Terminal => {}
            }

            self.current.node[id] = reach;
            let edges = self.current.edge.node_mut(id);
            for (edge, x) in edges.iter_mut().zip(self.x_prime.node(id).iter()) {
                *edge = reach * x;
            }
        }

        self.cumulative.add_assign(&self.current);
        self.phase = Phase::AwaitingUtility;
        Ok(&self.current)
    }

    /// Backward pass. `gradient` holds the loss of every terminal node under the strategy
    /// returned by the preceding `next_strategy()` call.
    pub fn observe_utility(&mut self, gradient: &Gradient) -> Result<()> {
        if self.phase != Phase::AwaitingUtility {
            return Err(inconsistent(
                "observe_utility called before next_strategy",
            ));
        }
        gradient.validate(self.dag)?;

        let dag = self.dag;
        // Value of the child behind every (node, action) slot.
        let mut slots = ActionTable::zeros(dag);

        for id in dag.topological_order().rev() {
            let node = dag.node(id)?;
            let value = if node.is_terminal() {
                gradient.get(id).unwrap_or(0.0)
            } else {
                let local = self.x_prime.node(id);
                let children = slots.node(id);
                let value = local
                    .iter()
                    .zip(children.iter())
                    .map(|(x, u)| x * u)
                    .sum::<f64>();
                if node.is_decision() {
                    let regrets = self.regrets.node_mut(id);
                    for (regret, u) in regrets.iter_mut().zip(children.iter()) {
                        *regret += value - u;
                    }
                }
                value
            };

            for &(parent, action) in node.parents().iter() {
                slots.node_mut(parent)[action] += value;
            }
        }

        self.iterations += 1;
        self.phase = Phase::AwaitingStrategy;
        Ok(())
    }

    /// Runs `iterations` strategy/utility rounds against `oracle`.
    pub fn run<O: GradientOracle>(&mut self, oracle: &mut O, iterations: usize) -> Result<()> {
        for _ in 0..iterations {
            self.step(oracle)?;
        }
        info!(
            "Ran {} iterations, max positive regret {}",
            self.iterations,
            self.max_positive_regret()
        );
        Ok(())
    }

    /// Runs until the average regret `max_positive_regret() / iterations()` drops below
    /// `threshold`, or `max_iterations` rounds have been run. Returns the number of rounds run.
    pub fn run_until<O: GradientOracle>(
        &mut self,
        oracle: &mut O,
        max_iterations: usize,
        threshold: f64,
    ) -> Result<usize> {
        let mut rounds = 0;
        while rounds < max_iterations {
            self.step(oracle)?;
            rounds += 1;
            let average_regret = self.max_positive_regret() / self.iterations as f64;
            if average_regret < threshold {
                info!(
                    "Average regret {} below {} after {} iterations",
                    average_regret, threshold, self.iterations
                );
                break;
            }
        }
        Ok(rounds)
    }

    fn step<O: GradientOracle>(&mut self, oracle: &mut O) -> Result<()> {
        self.next_strategy()?;
        let gradient = oracle.gradient(self.dag, &self.current)?;
        self.observe_utility(&gradient)?;
        debug!(
            "Iteration {}: max positive regret {}",
            self.iterations,
            self.max_positive_regret()
        );
        Ok(())
    }

    /// Local strategies computed by the last `next_strategy()` call.
    pub fn current_strategy(&self) -> &ActionTable {
        &self.x_prime
    }

    /// Reach probabilities computed by the last `next_strategy()` call.
    pub fn current_reach(&self) -> &ReachProfile {
        &self.current
    }

    /// Running, unnormalised sum of the reach profiles of all iterations.
    pub fn cumulative_reach(&self) -> &ReachProfile {
        &self.cumulative
    }

    pub fn regrets(&self) -> &ActionTable {
        &self.regrets
    }

    /// Number of completed strategy/utility rounds.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn max_positive_regret(&self) -> f64 {
        self.dag
            .decision_nodes()
            .into_iter()
            .flat_map(|id| self.regrets.node(id).iter().cloned())
            .fold(0.0, f64::max)
    }

    /// Time-averaged local strategy: cumulative edge reach over cumulative node reach.
    /// Nodes that were (almost) never reached play uniformly at decision nodes and their
    /// fixed strategy elsewhere.
    pub fn average_strategy(&self) -> ActionTable {
        let mut average = ActionTable::zeros(self.dag);
        for node in self.dag.nodes().iter() {
            let id = node.id();
            let reach = self.cumulative.node[id];
            let local = average.node_mut(id);
            if reach > EFFECTIVELY_ZERO {
                for (x, edge) in local.iter_mut().zip(self.cumulative.edge.node(id).iter()) {
                    *x = edge / reach;
                }
                continue;
            }
            match node.kind() {
                BeliefKind::Decision { .. } => {
                    let uniform = 1.0 / local.len() as f64;
                    for x in local.iter_mut() {
                        *x = uniform;
                    }
                }
                BeliefKind::Chance => {
                    for (x, action) in local.iter_mut().zip(node.actions().iter()) {
                        *x = action.probability.unwrap_or(0.0);
                    }
                }
                _ => {
                    for x in local.iter_mut() {
                        *x = 1.0;
                    }
                }
            }
        }
        average
    }
}

/// Plays proportionally to positive regret, or uniformly when no action has any.
fn regret_matching(regrets: &[f64], local: &mut [f64]) {
    let total: f64 = regrets.iter().map(|r| r.max(0.0)).sum();
    if total > 0.0 {
        for (x, r) in local.iter_mut().zip(regrets.iter()) {
            *x = r.max(0.0) / total;
        }
    } else {
        let uniform = 1.0 / local.len() as f64;
        for x in local.iter_mut() {
            *x = uniform;
        }
    }
}
