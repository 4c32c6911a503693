// Small game descriptions shared by the test suites of this crate and its dependents.

// A fair coin is flipped and Player 1 bets or folds. Player 2 acts nowhere and receives the
// same payoffs. In the observed variant Player 1 sees the coin.
pub const COIN_OBSERVED_TEXT: &str = "
node / chance actions H=0.5 T=0.5
node /H player 1 actions bet fold
node /H/bet leaf payoffs 1=2 2=2
node /H/fold leaf payoffs 1=0 2=0
node /T player 1 actions bet fold
node /T/bet leaf payoffs 1=-1 2=-1
node /T/fold leaf payoffs 1=0 2=0
infoset I_H nodes /H
infoset I_T nodes /T
";

pub const COIN_UNOBSERVED_TEXT: &str = "
node / chance actions H=0.5 T=0.5
node /H player 1 actions bet fold
node /H/bet leaf payoffs 1=2 2=2
node /H/fold leaf payoffs 1=0 2=0
node /T player 1 actions bet fold
node /T/bet leaf payoffs 1=-1 2=-1
node /T/fold leaf payoffs 1=0 2=0
infoset I nodes /H /T
";
