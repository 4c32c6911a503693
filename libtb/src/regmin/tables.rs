use crate::belief::{BeliefId, TeamBeliefDag};

/// One value per (belief node, action) pair, laid out per node in action order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTable {
    values: Vec<Vec<f64>>,
}

impl ActionTable {
    /// A table shaped like `dag`, filled with `value`.
    pub fn filled(dag: &TeamBeliefDag, value: f64) -> ActionTable {
        ActionTable {
            values: dag
                .nodes()
                .iter()
                .map(|node| vec![value; node.num_actions()])
                .collect(),
        }
    }

    pub fn zeros(dag: &TeamBeliefDag) -> ActionTable {
        ActionTable::filled(dag, 0.0)
    }

    pub fn num_nodes(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, node: BeliefId, action: usize) -> f64 {
        self.values[node][action]
    }

    pub fn node(&self, node: BeliefId) -> &[f64] {
        &self.values[node]
    }

    pub fn node_mut(&mut self, node: BeliefId) -> &mut [f64] {
        &mut self.values[node]
    }

    /// Entry-wise addition of a table of the same shape.
    pub fn add_assign(&mut self, other: &ActionTable) {
        for (mine, theirs) in self.values.iter_mut().zip(other.values.iter()) {
            for (x, y) in mine.iter_mut().zip(theirs.iter()) {
                *x += y;
            }
        }
    }
}

/// Reach probabilities of one strategy: `node[n]` is the probability of reaching `n` and
/// `edge[(n, a)] = node[n] * x_prime[n][a]` the probability of reaching `n` and taking `a`.
/// Chance probabilities of kept chance nodes are included; observation branches each carry
/// the full reach of their node.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachProfile {
    pub node: Vec<f64>,
    pub edge: ActionTable,
}

impl ReachProfile {
    pub fn zeros(dag: &TeamBeliefDag) -> ReachProfile {
        ReachProfile {
            node: vec![0.0; dag.len()],
            edge: ActionTable::zeros(dag),
        }
    }

    pub fn add_assign(&mut self, other: &ReachProfile) {
        for (x, y) in self.node.iter_mut().zip(other.node.iter()) {
            *x += y;
        }
        self.edge.add_assign(&other.edge);
    }
}
