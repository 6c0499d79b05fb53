// Adversarial search over the per-ply joint-move tree.
//
// Our snake is the maximizing player; the rest of the field is collapsed
// into a single worst-case minimizing adversary. That deliberately ignores
// multi-agent nuance (opponents are not truly cooperating) in exchange for
// tractability, and any rework should preserve the simplification.
//
// Agents choose moves in the board's list order with an explicit
// moved-marker set; the rule engine resolves the round simultaneously only
// once every living agent has chosen.

use std::time::Instant;

use crate::config::Config;
use crate::eval::{self, Outcome};
use crate::sim::{BoardState, RuleEngine, SnakeMove};
use crate::types::Direction;

/// What the root of the search concluded. Ties and all-terminal roots are
/// detected explicitly and handed to the fallback planner instead of being
/// silently resolved by iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootDecision {
    /// One direction strictly outranked the other three
    Decisive(Direction),
    /// Two or more directions share the best value
    Tied(Vec<Direction>),
    /// Every root move ends in a terminal sentinel
    AllTerminal,
}

struct SearchContext<'a> {
    self_id: &'a str,
    rules: &'a dyn RuleEngine,
    config: &'a Config,
    deadline: Instant,
}

/// Evaluates all four root directions with alpha-beta search and classifies
/// the result. The depth bound scales with the number of live snakes and the
/// deadline is checked at every node expansion, so the call always returns
/// within the caller's time budget.
pub fn search_root(
    board: &BoardState,
    self_id: &str,
    rules: &dyn RuleEngine,
    config: &Config,
    deadline: Instant,
) -> RootDecision {
    let ctx = SearchContext {
        self_id,
        rules,
        config,
        deadline,
    };
    let depth = config.search.depth_for(board.num_alive());

    let mut values = Vec::with_capacity(4);
    for dir in Direction::PRIORITY {
        let pending = vec![SnakeMove {
            id: self_id.to_string(),
            direction: dir,
        }];
        let value = ctx.node(board, &pending, depth, Outcome::MIN, Outcome::MAX);
        log::debug!("root {}: {:?}", dir.as_str(), value);
        values.push((dir, value));
    }

    let best = values
        .iter()
        .map(|(_, v)| *v)
        .max()
        .unwrap_or(Outcome::MIN);

    if best.is_terminal() {
        return RootDecision::AllTerminal;
    }

    let winners: Vec<Direction> = values
        .iter()
        .filter(|(_, v)| *v == best)
        .map(|(d, _)| *d)
        .collect();

    if winners.len() == 1 {
        RootDecision::Decisive(winners[0])
    } else {
        RootDecision::Tied(winners)
    }
}

impl<'a> SearchContext<'a> {
    /// Value of the node reached by the partial joint move `pending` (every
    /// move already assigned this round, most recent last) on `board`.
    fn node(
        &self,
        board: &BoardState,
        pending: &[SnakeMove],
        depth: u8,
        mut alpha: Outcome,
        mut beta: Outcome,
    ) -> Outcome {
        let immediate = eval::score_joint(self.self_id, pending, self.rules, board, self.config);

        // A terminal sentinel only binds once our own move is part of the
        // committed round; before that it reflects a synthesized stand-in
        // and must not prune our real branches
        let self_committed = pending.iter().any(|m| m.id == self.self_id);

        if depth == 0
            || (self_committed && immediate.is_terminal())
            || self.rules.is_game_over(board)
            || Instant::now() >= self.deadline
        {
            return immediate;
        }

        // Advance the round: either hand the turn to the next unmoved agent,
        // or resolve the completed joint move and start a fresh round
        let (child_board, child_pending, next_id) = match next_unmoved(board, pending) {
            Some(id) => (board.clone(), pending.to_vec(), id),
            None => {
                let next_board = match self.rules.next_state(board, pending) {
                    Ok(b) => b,
                    Err(e) => {
                        log::debug!("ply resolution failed mid-search: {}", e);
                        return Outcome::SimulationFailed;
                    }
                };
                let first_alive = next_board.alive_snakes().next().map(|s| s.id.clone());
                match first_alive {
                    Some(id) => (next_board, Vec::new(), id),
                    // Nobody left to move
                    None => return immediate,
                }
            }
        };

        let maximizing = next_id == self.self_id;
        let mut value = if maximizing { Outcome::MIN } else { Outcome::MAX };

        for dir in Direction::PRIORITY {
            let mut pending_next = child_pending.clone();
            pending_next.push(SnakeMove {
                id: next_id.clone(),
                direction: dir,
            });

            let child = self.node(&child_board, &pending_next, depth - 1, alpha, beta);

            if maximizing {
                value = value.max(child);
                alpha = alpha.max(value);
                if value >= beta {
                    break;
                }
            } else {
                value = value.min(child);
                beta = beta.min(value);
                if value <= alpha {
                    break;
                }
            }
        }

        value
    }
}

/// First living agent in board list order that has no move assigned this
/// round, scanning cyclically from the agent after the last mover.
fn next_unmoved(board: &BoardState, pending: &[SnakeMove]) -> Option<String> {
    let has_moved = |id: &str| pending.iter().any(|m| m.id == id);
    let n = board.snakes.len();
    if n == 0 {
        return None;
    }

    let start = pending
        .last()
        .and_then(|last| board.snakes.iter().position(|s| s.id == last.id))
        .map(|i| i + 1)
        .unwrap_or(0);

    for offset in 0..n {
        let snake = &board.snakes[(start + offset) % n];
        if snake.is_alive() && !has_moved(&snake.id) {
            return Some(snake.id.clone());
        }
    }
    None
}
