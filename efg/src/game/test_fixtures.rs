use crate::game::ExtensiveFormGame;
use crate::loader::parse_efg;
pub use crate::loader::samples::{COIN_OBSERVED_TEXT, COIN_UNOBSERVED_TEXT};
use lazy_static::lazy_static;

// Two cards are dealt, Player 1 raises or calls, and Player 2 folds or calls a raise.
// Player 2's decisions carry no declared infoset.
pub const LEDUC_FRAGMENT_TEXT: &str = "
node / chance actions JQ=0.5 QJ=0.5
node /C:JQ player 1 actions r c
node /C:JQ/P1:r player 2 actions f c
node /C:JQ/P1:r/P2:f leaf payoffs 1=1 2=-1
node /C:JQ/P1:r/P2:c leaf payoffs 1=-2 2=2
node /C:JQ/P1:c leaf payoffs 1=-1 2=1
node /C:QJ player 1 actions r c
node /C:QJ/P1:r player 2 actions f c
node /C:QJ/P1:r/P2:f leaf payoffs 1=1 2=-1
node /C:QJ/P1:r/P2:c leaf payoffs 1=2 2=-2
node /C:QJ/P1:c leaf payoffs 1=1 2=-1
infoset P1:J nodes /C:JQ
infoset P1:Q nodes /C:QJ
";

lazy_static! {
    pub static ref COIN_OBSERVED: ExtensiveFormGame = parse_efg(COIN_OBSERVED_TEXT).unwrap();
    pub static ref COIN_UNOBSERVED: ExtensiveFormGame = parse_efg(COIN_UNOBSERVED_TEXT).unwrap();
    pub static ref LEDUC_FRAGMENT: ExtensiveFormGame = parse_efg(LEDUC_FRAGMENT_TEXT).unwrap();
}
