use crate::belief::{BeliefId, TeamBeliefDag, TeamBeliefNode};
use crate::error::{inconsistent, Result};
use std::collections::BTreeMap;
use std::iter::FromIterator;

/// Loss assigned to every terminal belief node for one iteration. Lower is better for the
/// team, so a caller maximising payoffs supplies negated payoffs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradient {
    values: BTreeMap<BeliefId, f64>,
}

impl Gradient {
    pub fn new() -> Gradient {
        Gradient::default()
    }

    /// Evaluates `f` at every terminal node of `dag`.
    pub fn from_fn<F>(dag: &TeamBeliefDag, mut f: F) -> Gradient
    where
        F: FnMut(&TeamBeliefNode) -> f64,
    {
        dag.nodes()
            .iter()
            .filter(|node| node.is_terminal())
            .map(|node| (node.id(), f(node)))
            .collect()
    }

    pub fn insert(&mut self, terminal: BeliefId, value: f64) {
        self.values.insert(terminal, value);
    }

    pub fn get(&self, terminal: BeliefId) -> Option<f64> {
        self.values.get(&terminal).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BeliefId, f64)> + '_ {
        self.values.iter().map(|(&id, &value)| (id, value))
    }

    /// Checks that the gradient assigns a finite value to exactly the terminals of `dag`.
    pub fn validate(&self, dag: &TeamBeliefDag) -> Result<()> {
        for (id, value) in self.iter() {
            let node = dag.node(id)?;
            if !node.is_terminal() {
                return Err(inconsistent(format!(
                    "gradient names {} which is not a terminal",
                    node.key()
                )));
            }
            if !value.is_finite() {
                return Err(inconsistent(format!(
                    "gradient value {} at {} is not finite",
                    value,
                    node.key()
                )));
            }
        }
        if let Some(missing) = dag.terminal_nodes().into_iter().find(|&t| self.get(t).is_none()) {
            return Err(inconsistent(format!(
                "gradient has no value for terminal {}",
                missing
            )));
        }
        Ok(())
    }
}

impl FromIterator<(BeliefId, f64)> for Gradient {
    fn from_iter<I: IntoIterator<Item = (BeliefId, f64)>>(iter: I) -> Gradient {
        Gradient {
            values: iter.into_iter().collect(),
        }
    }
}
