// Heuristic evaluation of one hypothetical joint move.
//
// A partial joint move (the moves already committed this round) is completed
// with synthesized moves for every undecided snake, the rule engine resolves
// the ply, and the resulting board is scored from our snake's perspective.
// Terminal conditions are tagged Outcome variants with a total order instead
// of reserved integer ranges, so no comparison ever depends on a magic
// threshold.

use crate::config::Config;
use crate::safety;
use crate::sim::{BoardState, RuleEngine, SnakeMove};
use crate::types::Direction;

/// Result of evaluating one joint move for our snake. The derived order puts
/// every terminal sentinel strictly below every Scored value, and Eliminated
/// below all other sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Outcome {
    /// The rule engine eliminated us this ply
    Eliminated,
    /// Our head left the board
    OutOfBounds,
    /// Our head landed on a non-tail body segment
    SelfCollision,
    /// The rule engine failed to resolve the ply; treated as loss-leaning
    SimulationFailed,
    /// Ordinary heuristic score
    Scored(i32),
}

impl Outcome {
    /// Lower bound for alpha initialization
    pub const MIN: Outcome = Outcome::Eliminated;
    /// Upper bound for beta initialization
    pub const MAX: Outcome = Outcome::Scored(i32::MAX);

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Scored(_))
    }
}

/// Scores one candidate direction for our snake on the given board
pub fn score_move(
    self_id: &str,
    direction: Direction,
    rules: &dyn RuleEngine,
    board: &BoardState,
    config: &Config,
) -> Outcome {
    let committed = [SnakeMove {
        id: self_id.to_string(),
        direction,
    }];
    score_joint(self_id, &committed, rules, board, config)
}

/// Scores a partial joint move from `self_id`'s perspective. Snakes missing
/// from `committed` get a synthesized move: opponents via the safe-move
/// analyzer's length bias, our own snake (when an opponent's node is being
/// scored before ours this round) a neutral first safe direction.
pub fn score_joint(
    self_id: &str,
    committed: &[SnakeMove],
    rules: &dyn RuleEngine,
    board: &BoardState,
    config: &Config,
) -> Outcome {
    let Some(us_before) = board.snake(self_id) else {
        return Outcome::Eliminated;
    };
    let length_before = us_before.length();

    let mut joint: Vec<SnakeMove> = committed.to_vec();
    for snake in board.alive_snakes() {
        if joint.iter().any(|m| m.id == snake.id) {
            continue;
        }
        let direction = if snake.id == self_id {
            safety::safe_moves(snake, board)
                .first()
                .copied()
                .unwrap_or(Direction::PRIORITY[0])
        } else {
            safety::assumed_move(snake, us_before, board, config.search.aggression_distance)
        };
        joint.push(SnakeMove {
            id: snake.id.clone(),
            direction,
        });
    }

    let next = match rules.next_state(board, &joint) {
        Ok(next) => next,
        Err(e) => {
            log::debug!("rule engine failed to resolve ply: {}", e);
            return Outcome::SimulationFailed;
        }
    };

    let Some(us) = next.snake(self_id) else {
        return Outcome::Eliminated;
    };
    if !us.is_alive() {
        return Outcome::Eliminated;
    }

    let head = us.head();
    if !next.in_bounds(&head) {
        return Outcome::OutOfBounds;
    }
    for snake in next.alive_snakes() {
        if snake.body[1..].contains(&head) {
            return Outcome::SelfCollision;
        }
    }

    let scores = &config.scores;
    let mut score = 0i32;

    // Mobility: running out of local exits is the strongest non-terminal
    // danger signal
    let exits = safety::safe_moves(us, &next).len();
    if exits == 0 {
        score -= scores.no_safe_moves_penalty;
    }

    // Starvation pressure biases toward food-seeking
    if us.health < scores.low_health_threshold {
        score -= scores.low_health_penalty;
    }

    // Food attraction is computed against the pre-move board so a just-eaten
    // item still pulls us toward its neighborhood
    for food in &board.food {
        if head == *food {
            score += scores.food_on_cell_bonus;
        }
        let dist = head.manhattan_distance(food).max(1);
        score += scores.food_proximity_base / dist;
    }
    if us.length() > length_before {
        score += scores.growth_bonus;
    }

    // Tail-chase positioning: a vacating opponent tail is safe ground
    for other in board.alive_snakes() {
        if other.id == self_id || other.has_stacked_tail() {
            continue;
        }
        let dist = head.manhattan_distance(&other.tail()).max(1);
        if dist <= scores.tail_proximity_distance {
            score += scores.tail_proximity_bonus / dist;
        }
    }

    // Head-to-head risk against each nearby opponent, amplified when we have
    // few outs left at the new position
    for other in next.alive_snakes() {
        if other.id == self_id {
            continue;
        }
        if head.manhattan_distance(&other.head()) <= scores.threat_distance {
            let swing = match exits {
                2 => scores.threat_two_exits,
                3 => scores.threat_three_exits,
                _ => 0,
            };
            if other.length() >= us.length() {
                score -= swing;
            } else {
                score += swing;
            }
        }
    }

    Outcome::Scored(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimSnake, StandardRules};
    use crate::types::Coord;

    struct FailingRules;

    impl RuleEngine for FailingRules {
        fn next_state(
            &self,
            _board: &BoardState,
            _moves: &[SnakeMove],
        ) -> Result<BoardState, String> {
            Err("injected failure".to_string())
        }

        fn is_game_over(&self, _board: &BoardState) -> bool {
            false
        }
    }

    fn snake(id: &str, health: i32, body: &[(i32, i32)]) -> SimSnake {
        SimSnake {
            id: id.to_string(),
            health,
            body: body.iter().map(|&(x, y)| Coord { x, y }).collect(),
            eliminated: None,
        }
    }

    fn board(snakes: Vec<SimSnake>, food: &[(i32, i32)]) -> BoardState {
        BoardState {
            width: 11,
            height: 11,
            food: food.iter().map(|&(x, y)| Coord { x, y }).collect(),
            hazards: vec![],
            snakes,
        }
    }

    #[test]
    fn test_outcome_total_order() {
        assert!(Outcome::Eliminated < Outcome::OutOfBounds);
        assert!(Outcome::OutOfBounds < Outcome::SelfCollision);
        assert!(Outcome::SelfCollision < Outcome::SimulationFailed);
        assert!(Outcome::SimulationFailed < Outcome::Scored(i32::MIN));
        assert!(Outcome::Scored(-5) < Outcome::Scored(3));
        assert!(Outcome::MIN <= Outcome::Eliminated);
        assert!(Outcome::Scored(i32::MAX) <= Outcome::MAX);
    }

    #[test]
    fn test_wall_move_is_terminal() {
        let b = board(vec![snake("me", 50, &[(0, 5), (1, 5), (2, 5)])], &[]);
        let outcome = score_move(
            "me",
            Direction::Left,
            &StandardRules,
            &b,
            &Config::default_hardcoded(),
        );
        assert!(outcome.is_terminal());
        assert!(outcome < Outcome::Scored(i32::MIN));
    }

    #[test]
    fn test_closer_to_food_scores_higher() {
        let config = Config::default_hardcoded();
        let b = board(vec![snake("me", 50, &[(5, 5), (5, 4), (5, 3)])], &[(5, 7)]);

        let up = score_move("me", Direction::Up, &StandardRules, &b, &config);
        let left = score_move("me", Direction::Left, &StandardRules, &b, &config);
        assert!(up > left, "up {:?} should beat left {:?}", up, left);
    }

    #[test]
    fn test_growth_is_rewarded() {
        let config = Config::default_hardcoded();
        let with_food = board(vec![snake("me", 50, &[(5, 5), (5, 4), (5, 3)])], &[(5, 6)]);
        let without = board(vec![snake("me", 50, &[(5, 5), (5, 4), (5, 3)])], &[]);

        let fed = score_move("me", Direction::Up, &StandardRules, &with_food, &config);
        let hungry = score_move("me", Direction::Up, &StandardRules, &without, &config);
        assert!(fed > hungry);
    }

    #[test]
    fn test_approaching_longer_opponent_scores_lower() {
        // Length-5 opponent two squares above us: walking toward it must
        // rank strictly below walking away
        let config = Config::default_hardcoded();
        let b = board(
            vec![
                snake("me", 50, &[(5, 5), (4, 5), (3, 5)]),
                snake("them", 50, &[(5, 7), (5, 8), (5, 9), (5, 10), (4, 10)]),
            ],
            &[],
        );

        let toward = score_move("me", Direction::Up, &StandardRules, &b, &config);
        let away = score_move("me", Direction::Down, &StandardRules, &b, &config);
        assert!(
            toward < away,
            "toward {:?} should rank below away {:?}",
            toward,
            away
        );
    }

    #[test]
    fn test_stacked_opponent_tail_gives_no_bonus() {
        let config = Config::default_hardcoded();
        let vacating = board(
            vec![
                snake("me", 50, &[(5, 5), (4, 5), (3, 5)]),
                snake("them", 50, &[(8, 8), (8, 7), (7, 7), (6, 7), (6, 6), (5, 6)]),
            ],
            &[],
        );
        let mut stacked = vacating.clone();
        stacked.snakes[1].body.push(Coord { x: 5, y: 6 });

        let near_tail = score_move("me", Direction::Up, &StandardRules, &vacating, &config);
        let near_stacked = score_move("me", Direction::Up, &StandardRules, &stacked, &config);
        assert!(near_tail > near_stacked);
    }

    #[test]
    fn test_low_health_is_penalized() {
        let config = Config::default_hardcoded();
        let healthy = board(vec![snake("me", 80, &[(5, 5), (5, 4), (5, 3)])], &[]);
        let starving = board(vec![snake("me", 15, &[(5, 5), (5, 4), (5, 3)])], &[]);

        let ok = score_move("me", Direction::Up, &StandardRules, &healthy, &config);
        let hungry = score_move("me", Direction::Up, &StandardRules, &starving, &config);
        assert!(ok > hungry);
    }

    #[test]
    fn test_committed_moves_override_synthesis() {
        // With both moves pinned there is no head-to-head: the committed
        // opponent move must be honored instead of the aggressive synthesis
        let config = Config::default_hardcoded();
        let b = board(
            vec![
                snake("me", 50, &[(5, 5), (4, 5), (3, 5)]),
                snake("them", 50, &[(5, 7), (5, 8), (5, 9), (5, 10), (4, 10)]),
            ],
            &[],
        );

        let committed = [
            SnakeMove {
                id: "me".to_string(),
                direction: Direction::Up,
            },
            SnakeMove {
                id: "them".to_string(),
                direction: Direction::Left,
            },
        ];
        let pinned = score_joint("me", &committed, &StandardRules, &b, &config);
        assert!(!pinned.is_terminal(), "no collision when them goes left");

        // Synthesis alone assumes the aggressive closing move and kills us
        let synthesized = score_move("me", Direction::Up, &StandardRules, &b, &config);
        assert_eq!(synthesized, Outcome::Eliminated);
    }

    #[test]
    fn test_rule_engine_failure_degrades_to_sentinel() {
        let b = board(vec![snake("me", 50, &[(5, 5), (5, 4), (5, 3)])], &[]);
        let outcome = score_move(
            "me",
            Direction::Up,
            &FailingRules,
            &b,
            &Config::default_hardcoded(),
        );
        assert_eq!(outcome, Outcome::SimulationFailed);
        assert!(outcome < Outcome::Scored(i32::MIN));
    }

    #[test]
    fn test_missing_self_is_eliminated() {
        let b = board(vec![snake("them", 50, &[(5, 5), (5, 4)])], &[]);
        let committed = [SnakeMove {
            id: "them".to_string(),
            direction: Direction::Up,
        }];
        let outcome = score_joint(
            "me",
            &committed,
            &StandardRules,
            &b,
            &Config::default_hardcoded(),
        );
        assert_eq!(outcome, Outcome::Eliminated);
    }
}
