use efg_lite::{GameError, PlayerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The game violates a structural invariant, either of the game model itself or one the
    /// belief construction relies on (perfect recall, distinct children per action).
    #[error("malformed game: {0}")]
    MalformedGame(String),

    /// The team is not exactly two distinct players of the game. Raised before any
    /// construction work starts.
    #[error("invalid team {team:?}, expected two distinct players out of {players:?}")]
    InvalidTeam {
        team: Vec<PlayerId>,
        players: Vec<PlayerId>,
    },

    /// The solver was driven out of sequence, or was handed data that does not match its DAG.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

impl From<GameError> for Error {
    fn from(error: GameError) -> Error {
        Error::MalformedGame(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn malformed<S: Into<String>>(message: S) -> Error {
    Error::MalformedGame(message.into())
}

pub(crate) fn inconsistent<S: Into<String>>(message: S) -> Error {
    Error::InconsistentState(message.into())
}
