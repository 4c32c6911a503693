mod gradient;
mod solver;
mod tables;

pub use self::gradient::Gradient;
pub use self::solver::DagRegMin;
pub use self::tables::{ActionTable, ReachProfile};

/// Reach mass below which a node is treated as never visited; the average strategy
/// at such nodes falls back to uniform.
pub const EFFECTIVELY_ZERO: f64 = 1e-12;
