//! Reader for the line-oriented game description format.
//!
//! ```text
//! node / chance actions H=0.5 T=0.5
//! node /H player 1 actions bet fold
//! node /H/bet leaf payoffs 1=2 2=2
//! infoset I nodes /H /T
//! ```
//!
//! Parsing is all-or-nothing: the first bad line aborts with its 1-based line number, and
//! the parsed declarations are only turned into a game once every line has been read.
mod directive;
#[doc(hidden)]
pub mod samples;

pub use self::directive::{parse_line, Directive};

use crate::error::GameError;
use crate::game::{ExtensiveFormGame, ExtensiveFormGameBuilder};
use log::info;
use std::path::Path;
use std::str::FromStr;

pub fn parse_efg(text: &str) -> Result<ExtensiveFormGame, GameError> {
    let mut builder = ExtensiveFormGameBuilder::new();
    for (idx, line) in text.lines().enumerate() {
        match parse_line(line, idx + 1)? {
            None => {}
            Some(Directive::Node(node)) => {
                builder.add_node(node);
            }
            Some(Directive::Infoset { name, paths }) => {
                builder.add_infoset(name, paths);
            }
        }
    }
    builder.build()
}

pub fn read_efg<P: AsRef<Path>>(path: P) -> Result<ExtensiveFormGame, GameError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let game = parse_efg(&text)?;
    info!(
        "Loaded {} with {} nodes and {} infosets",
        path.as_ref().display(),
        game.num_nodes(),
        game.infosets().len()
    );
    Ok(game)
}

impl FromStr for ExtensiveFormGame {
    type Err = GameError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_efg(text)
    }
}
