use thiserror::Error;

/// Failures raised while loading or validating an extensive-form game.
#[derive(Debug, Error)]
pub enum GameError {
    /// A line of the text description could not be understood. Lines are 1-based.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The described tree violates one of the structural invariants of the game model.
    #[error("malformed game: {0}")]
    Malformed(String),

    #[error("could not read game description: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub(crate) fn malformed<S: Into<String>>(message: S) -> GameError {
        GameError::Malformed(message.into())
    }
}
