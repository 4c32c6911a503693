use efg_lite::loader::samples::{COIN_OBSERVED_TEXT, COIN_UNOBSERVED_TEXT};
use efg_lite::{
    parse_efg, ChanceAction, ExtensiveFormGame, ExtensiveFormGameBuilder, GameNode, NodeKind,
    PlayerId,
};
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

// Player 1 forgets its own first action.
const FORGETFUL_TEXT: &str = "
node / player 1 actions a b
node /a player 1 actions x y
node /a/x leaf payoffs 1=1 2=1
node /a/y leaf payoffs 1=0 2=0
node /b player 1 actions x y
node /b/x leaf payoffs 1=0 2=0
node /b/y leaf payoffs 1=1 2=1
infoset K nodes /a /b
";

// Player 1 sees a coin and sends one of two signals; Player 2 sees only the signal and
// guesses the coin. The team is paid when the guess is right.
const SIGNALLING_TEXT: &str = "
node / chance actions H=0.5 T=0.5
node /H player 1 actions s1 s2
node /H/s1 player 2 actions h t
node /H/s1/h leaf payoffs 1=1 2=1
node /H/s1/t leaf payoffs 1=0 2=0
node /H/s2 player 2 actions h t
node /H/s2/h leaf payoffs 1=1 2=1
node /H/s2/t leaf payoffs 1=0 2=0
node /T player 1 actions s1 s2
node /T/s1 player 2 actions h t
node /T/s1/h leaf payoffs 1=0 2=0
node /T/s1/t leaf payoffs 1=1 2=1
node /T/s2 player 2 actions h t
node /T/s2/h leaf payoffs 1=0 2=0
node /T/s2/t leaf payoffs 1=1 2=1
infoset I_H nodes /H
infoset I_T nodes /T
infoset J_s1 nodes /H/s1 /T/s1
infoset J_s2 nodes /H/s2 /T/s2
";

// Chance outcomes x and y are indistinguishable to Player 1, z is not.
const CHANCE_GROUPS_TEXT: &str = "
node / chance actions x=0.2 y=0.3 z=0.5
node /x player 1 actions a b
node /x/a leaf payoffs 1=1 2=1
node /x/b leaf payoffs 1=0 2=0
node /y player 1 actions a b
node /y/a leaf payoffs 1=1 2=1
node /y/b leaf payoffs 1=-1 2=-1
node /z player 1 actions a b
node /z/a leaf payoffs 1=0 2=0
node /z/b leaf payoffs 1=2 2=2
infoset A nodes /x /y
infoset B nodes /z
";

// Player 3 plays against the team (1, 2) and moves first.
const OPPONENT_HIDDEN_TEXT: &str = "
node / player 3 actions l r
node /l player 1 actions a b
node /l/a leaf payoffs 1=1 2=1 3=-1
node /l/b leaf payoffs 1=0 2=0 3=0
node /r player 1 actions a b
node /r/a leaf payoffs 1=0 2=0 3=0
node /r/b leaf payoffs 1=1 2=1 3=-1
infoset P1 nodes /l /r
";

const OPPONENT_SEEN_TEXT: &str = "
node / player 3 actions l r
node /l player 1 actions a b
node /l/a leaf payoffs 1=1 2=1 3=-1
node /l/b leaf payoffs 1=0 2=0 3=0
node /r player 1 actions a b
node /r/a leaf payoffs 1=0 2=0 3=0
node /r/b leaf payoffs 1=1 2=1 3=-1
infoset P1_l nodes /l
infoset P1_r nodes /r
";

// The two team members act in opposite orders depending on chance. Both orders end in
// the same pair of team decisions, so every terminal is reached from two parents.
const CROSSED_ORDER_TEXT: &str = "
node / chance actions L=0.5 R=0.5
node /L player 1 actions a b
node /L/a player 2 actions c d
node /L/a/c leaf payoffs 1=3 2=3
node /L/a/d leaf payoffs 1=0 2=0
node /L/b player 2 actions c d
node /L/b/c leaf payoffs 1=1 2=1
node /L/b/d leaf payoffs 1=2 2=2
node /R player 2 actions c d
node /R/c player 1 actions a b
node /R/c/a leaf payoffs 1=3 2=3
node /R/c/b leaf payoffs 1=1 2=1
node /R/d player 1 actions a b
node /R/d/a leaf payoffs 1=0 2=0
node /R/d/b leaf payoffs 1=2 2=2
infoset P1 nodes /L /R/c /R/d
infoset P2 nodes /L/a /L/b /R
";

// Same crossing as above with an uneven chance move, and an opponent move after `/L/a/c`.
// The shared terminal of `/L/a/c/l` and `/R/c/a` is entered through routes of different weight.
const CROSSED_WITH_OPPONENT_TEXT: &str = "
node / chance actions L=0.8 R=0.2
node /L player 1 actions a b
node /L/a player 2 actions c d
node /L/a/c player 3 actions l r
node /L/a/c/l leaf payoffs 1=3 2=3 3=-3
node /L/a/c/r leaf payoffs 1=0 2=0 3=0
node /L/a/d leaf payoffs 1=0 2=0 3=0
node /L/b player 2 actions c d
node /L/b/c leaf payoffs 1=1 2=1 3=-1
node /L/b/d leaf payoffs 1=2 2=2 3=-2
node /R player 2 actions c d
node /R/c player 1 actions a b
node /R/c/a leaf payoffs 1=3 2=3 3=-3
node /R/c/b leaf payoffs 1=1 2=1 3=-1
node /R/d player 1 actions a b
node /R/d/a leaf payoffs 1=0 2=0 3=0
node /R/d/b leaf payoffs 1=2 2=2 3=-2
infoset P1 nodes /L /R/c /R/d
infoset P2 nodes /L/a /L/b /R
";

lazy_static! {
    pub static ref COIN_OBSERVED: ExtensiveFormGame = parse_efg(COIN_OBSERVED_TEXT).unwrap();
    pub static ref COIN_UNOBSERVED: ExtensiveFormGame = parse_efg(COIN_UNOBSERVED_TEXT).unwrap();
    pub static ref FORGETFUL: ExtensiveFormGame = parse_efg(FORGETFUL_TEXT).unwrap();
    pub static ref SIGNALLING: ExtensiveFormGame = parse_efg(SIGNALLING_TEXT).unwrap();
    pub static ref CHANCE_GROUPS: ExtensiveFormGame = parse_efg(CHANCE_GROUPS_TEXT).unwrap();
    pub static ref OPPONENT_HIDDEN: ExtensiveFormGame = parse_efg(OPPONENT_HIDDEN_TEXT).unwrap();
    pub static ref OPPONENT_SEEN: ExtensiveFormGame = parse_efg(OPPONENT_SEEN_TEXT).unwrap();
    pub static ref CROSSED_ORDER: ExtensiveFormGame = parse_efg(CROSSED_ORDER_TEXT).unwrap();
    pub static ref CROSSED_WITH_OPPONENT: ExtensiveFormGame =
        parse_efg(CROSSED_WITH_OPPONENT_TEXT).unwrap();
}

/// Random game between the team (1, 2), opponent 3 and chance, with small integer payoffs so
/// that leaves often coincide. Decision nodes of one player with the same number of actions and
/// the same own history of (node, action) pairs are grouped into infosets at random, which keeps
/// perfect recall.
pub fn random_team_game(seed: u64, max_depth: usize) -> ExtensiveFormGame {
    let mut generator = RandomGame {
        rng: ChaCha8Rng::seed_from_u64(seed),
        builder: ExtensiveFormGameBuilder::new(),
        candidates: BTreeMap::new(),
    };
    generator.grow("/".to_string(), max_depth, &BTreeMap::new());
    generator.declare_infosets();
    generator.builder.build().unwrap()
}

type OwnHistory = Vec<(String, usize)>;

struct RandomGame {
    rng: ChaCha8Rng,
    builder: ExtensiveFormGameBuilder,
    // Decision paths by (player, number of actions, own history).
    candidates: BTreeMap<(PlayerId, usize, OwnHistory), Vec<String>>,
}

impl RandomGame {
    fn grow(&mut self, path: String, depth: usize, own: &BTreeMap<PlayerId, OwnHistory>) {
        let is_root = path == "/";
        if depth == 0 || (!is_root && self.rng.gen_bool(0.25)) {
            let mut payoffs = BTreeMap::new();
            for player in 1..=3 {
                payoffs.insert(player, self.rng.gen_range(-1, 2) as f64);
            }
            self.builder
                .add_node(GameNode::new(path, NodeKind::Leaf { payoffs }));
            return;
        }

        let num_actions: usize = self.rng.gen_range(2, 4);
        let labels = (0..num_actions)
            .map(|a| format!("a{}", a))
            .collect::<Vec<_>>();
        let owner: Option<PlayerId> = match self.rng.gen_range(0, 4) {
            0 => None,
            1 => Some(3),
            choice => Some(choice as PlayerId - 1),
        };
        let kind = match owner {
            None => {
                let weights = (0..num_actions)
                    .map(|_| self.rng.gen_range(1, 5) as f64)
                    .collect::<Vec<_>>();
                let total: f64 = weights.iter().sum();
                NodeKind::Chance {
                    actions: labels
                        .iter()
                        .zip(weights.iter())
                        .map(|(label, w)| ChanceAction::new(label.as_str(), w / total))
                        .collect(),
                }
            }
            Some(player) => {
                let history = own.get(&player).cloned().unwrap_or_default();
                self.candidates
                    .entry((player, num_actions, history))
                    .or_insert_with(Vec::new)
                    .push(path.clone());
                NodeKind::Player {
                    player,
                    actions: labels.clone(),
                }
            }
        };
        self.builder.add_node(GameNode::new(path.clone(), kind));

        for (action, label) in labels.iter().enumerate() {
            let child = if is_root {
                format!("/{}", label)
            } else {
                format!("{}/{}", path, label)
            };
            let mut child_own = own.clone();
            if let Some(player) = owner {
                child_own
                    .entry(player)
                    .or_insert_with(Vec::new)
                    .push((path.clone(), action));
            }
            self.grow(child, depth - 1, &child_own);
        }
    }

    fn declare_infosets(&mut self) {
        let groups = self
            .candidates
            .values()
            .filter(|paths| paths.len() > 1)
            .cloned()
            .collect::<Vec<_>>();
        for (idx, paths) in groups.into_iter().enumerate() {
            if self.rng.gen_bool(0.7) {
                self.builder.add_infoset(format!("I{}", idx), paths);
            }
        }
    }
}
