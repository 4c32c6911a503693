// (LIB)rary for (T)eam (B)elief DAGs.
// Compresses an extensive-form game into the DAG of decision points a two-member team
// can tell apart, and runs regret minimization over that DAG.
//
// The pipeline is
//     ExtensiveFormGame --belief::build--> TeamBeliefDag --DagRegMin--> average strategy,
// where the terminal utilities of every iteration are supplied by a `GradientOracle`.

extern crate efg_lite;

pub mod belief;
pub mod error;
pub mod oracle;
pub mod regmin;

pub use belief::{BeliefAction, BeliefId, BeliefKind, TeamBeliefDag, TeamBeliefNode};
pub use error::{Error, Result};
pub use oracle::{ExpectedPayoffOracle, GradientOracle, OpponentProfile};
pub use regmin::{ActionTable, DagRegMin, Gradient, ReachProfile};

#[cfg(test)]
pub mod test_fixtures;
