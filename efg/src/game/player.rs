/// Players are identified by the integer ids used in the game description.
/// Chance is not a player and has no id.
pub type PlayerId = u32;
