use crate::error::GameError;
use crate::game::{ChanceAction, GameNode, NodeKind, PlayerId};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One non-blank line of a game description.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Infoset { name: String, paths: Vec<String> },
    Node(GameNode),
}

/// Parses a single line. Blank lines give `Ok(None)`. `line` is the 1-based line
/// number used in error messages.
pub fn parse_line(text: &str, line: usize) -> Result<Option<Directive>, GameError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if let Some(content) = text.strip_prefix("infoset ") {
        let mut parts = content.splitn(2, " nodes ");
        match (parts.next(), parts.next()) {
            (Some(name), Some(paths)) => Ok(Some(Directive::Infoset {
                name: name.to_string(),
                paths: paths.split_whitespace().map(String::from).collect(),
            })),
            _ => Err(parse_error(line, "invalid infoset format")),
        }
    } else if let Some(content) = text.strip_prefix("node ") {
        let content = content.trim_start();
        let (path, rest) = match content.find(char::is_whitespace) {
            Some(cut) => (&content[..cut], content[cut..].trim_start()),
            None => {
                return Err(parse_error(
                    line,
                    "invalid format, expected path and node info",
                ))
            }
        };
        let kind = parse_node_kind(rest, line)?;
        Ok(Some(Directive::Node(GameNode::new(path, kind))))
    } else {
        Err(parse_error(
            line,
            format!(
                "expected line to start with 'node ' or 'infoset ', got: {}",
                truncated(text)
            ),
        ))
    }
}

fn parse_node_kind(rest: &str, line: usize) -> Result<NodeKind, GameError> {
    if let Some(actions) = rest.strip_prefix("chance actions ") {
        let mut parsed = vec![];
        for token in actions.split_whitespace() {
            let (label, probability) = key_value::<f64>(token, line, "action")?;
            parsed.push(ChanceAction::new(label, probability));
        }
        Ok(NodeKind::Chance { actions: parsed })
    } else if let Some(payoffs) = rest.strip_prefix("leaf payoffs ") {
        let mut parsed = BTreeMap::<PlayerId, f64>::new();
        for token in payoffs.split_whitespace() {
            let (player, value) = key_value::<f64>(token, line, "payoff")?;
            let player = parse_number::<PlayerId>(player, line, "player id")?;
            if parsed.insert(player, value).is_some() {
                return Err(parse_error(
                    line,
                    format!("payoff for player {} given twice", player),
                ));
            }
        }
        Ok(NodeKind::Leaf { payoffs: parsed })
    } else if let Some(decision) = rest.strip_prefix("player ") {
        let mut parts = decision.splitn(2, " actions ");
        match (parts.next(), parts.next()) {
            (Some(player), Some(actions)) => Ok(NodeKind::Player {
                player: parse_number::<PlayerId>(player.trim(), line, "player id")?,
                actions: actions.split_whitespace().map(String::from).collect(),
            }),
            _ => Err(parse_error(line, "invalid player node format")),
        }
    } else {
        Err(parse_error(
            line,
            format!("unknown node type in: {}", truncated(rest)),
        ))
    }
}

/// Splits `key=value` and parses the value.
fn key_value<'a, T: FromStr>(
    token: &'a str,
    line: usize,
    what: &str,
) -> Result<(&'a str, T), GameError> {
    let mut parts = token.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) if !key.is_empty() => {
            Ok((key, parse_number::<T>(value, line, what)?))
        }
        _ => Err(parse_error(
            line,
            format!("invalid {} format: {}", what, token),
        )),
    }
}

fn parse_number<T: FromStr>(text: &str, line: usize, what: &str) -> Result<T, GameError> {
    text.parse::<T>()
        .map_err(|_| parse_error(line, format!("cannot parse {} from '{}'", what, text)))
}

fn parse_error<S: Into<String>>(line: usize, message: S) -> GameError {
    GameError::Parse {
        line,
        message: message.into(),
    }
}

fn truncated(text: &str) -> String {
    text.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> Directive {
        parse_line(text, 1).unwrap().unwrap()
    }

    fn parse_err_line(text: &str, line: usize) -> usize {
        match parse_line(text, line) {
            Err(GameError::Parse { line, .. }) => line,
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    pub fn test_blank_lines() {
        assert_eq!(parse_line("", 1).unwrap(), None);
        assert_eq!(parse_line("   \t ", 2).unwrap(), None);
    }

    #[test]
    pub fn test_infoset_line() {
        match parse_ok("infoset P1:J nodes /C:JQ /C:JK") {
            Directive::Infoset { name, paths } => {
                assert_eq!(name, "P1:J");
                assert_eq!(paths, vec!["/C:JQ".to_string(), "/C:JK".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parse_err_line("infoset P1:J /C:JQ", 4), 4);
    }

    #[test]
    pub fn test_node_lines() {
        match parse_ok("  node / chance actions H=0.25 T=0.75  ") {
            Directive::Node(node) => {
                assert_eq!(node.path(), "/");
                assert_eq!(
                    node.kind(),
                    &NodeKind::Chance {
                        actions: vec![ChanceAction::new("H", 0.25), ChanceAction::new("T", 0.75)]
                    }
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_ok("node /H player 2 actions bet fold") {
            Directive::Node(node) => {
                assert_eq!(node.player(), Some(2));
                assert_eq!(node.action_labels(), vec!["bet", "fold"]);
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_ok("node /H/bet leaf payoffs 1=2 2=-1.5e0") {
            Directive::Node(node) => {
                let payoffs = node.payoffs().unwrap();
                assert_eq!(payoffs.get(&1), Some(&2.0));
                assert_eq!(payoffs.get(&2), Some(&-1.5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    pub fn test_rejected_lines() {
        assert_eq!(parse_err_line("edge / /a", 3), 3);
        assert_eq!(parse_err_line("node /", 5), 5);
        assert_eq!(parse_err_line("node / decision actions a", 6), 6);
        assert_eq!(parse_err_line("node / chance actions a=x", 7), 7);
        assert_eq!(parse_err_line("node / chance actions a", 8), 8);
        assert_eq!(parse_err_line("node / chance actions =0.5", 9), 9);
        assert_eq!(parse_err_line("node / player one actions a", 10), 10);
        assert_eq!(parse_err_line("node / player 1 a b", 11), 11);
        assert_eq!(parse_err_line("node /a leaf payoffs 1:2", 12), 12);
        assert_eq!(parse_err_line("node /a leaf payoffs x=2", 13), 13);
        assert_eq!(parse_err_line("node /a leaf payoffs 1=2 1=3", 14), 14);
    }
}
