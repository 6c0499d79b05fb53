// Bot orchestration: wires the board adapter, search engine, and fallback
// planner together behind the Battlesnake API endpoints.
//
// Every decision is a pure function of the incoming snapshot; nothing is
// kept between turns. The CPU-bound search runs on a blocking thread while
// the async side polls a lock-free shared state until the result lands or
// the time budget runs out.

use log::info;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DecisionLogger;
use crate::fallback;
use crate::search::{self, RootDecision};
use crate::sim::{BoardState, RuleEngine, StandardRules};
use crate::types::{Battlesnake, Board, Direction, Game};

/// Lock-free channel between the async poller and the search thread
#[derive(Debug)]
pub struct SharedSearchState {
    /// Chosen direction, encoded as an index into Direction::PRIORITY
    pub best_move: AtomicU8,
    /// Flag indicating the decision is final
    pub search_complete: AtomicBool,
}

impl SharedSearchState {
    pub fn new() -> Self {
        SharedSearchState {
            best_move: AtomicU8::new(0),
            search_complete: AtomicBool::new(false),
        }
    }

    pub fn store(&self, direction: Direction) {
        self.best_move
            .store(direction_index(direction), Ordering::Release);
        self.search_complete.store(true, Ordering::Release);
    }

    pub fn chosen(&self) -> Direction {
        Direction::PRIORITY[self.best_move.load(Ordering::Acquire) as usize % 4]
    }
}

impl Default for SharedSearchState {
    fn default() -> Self {
        Self::new()
    }
}

fn direction_index(direction: Direction) -> u8 {
    Direction::PRIORITY
        .iter()
        .position(|d| *d == direction)
        .unwrap_or(0) as u8
}

/// Move selector: runs the search and, when it is inconclusive, delegates to
/// the flood-fill fallback planner. Always returns exactly one direction,
/// even when every option is fatal.
pub fn select_move(
    board: &BoardState,
    self_id: &str,
    rules: &dyn RuleEngine,
    config: &Config,
    deadline: Instant,
) -> Direction {
    match search::search_root(board, self_id, rules, config, deadline) {
        RootDecision::Decisive(direction) => direction,
        RootDecision::Tied(dirs) => {
            info!("search tied between {:?}, using fallback planner", dirs);
            fallback::plan_fallback_move(board, self_id, config)
        }
        RootDecision::AllTerminal => {
            info!("no survivable root move, using fallback planner");
            fallback::plan_fallback_move(board, self_id, config)
        }
    }
}

/// Battlesnake bot holding the static configuration and the injected
/// per-decision logger
pub struct Bot {
    config: Config,
    logger: DecisionLogger,
}

impl Bot {
    pub fn new(config: Config, logger: DecisionLogger) -> Self {
        Bot { config, logger }
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "copperhead",
            "color": "#AF1E2D",
            "head": "missile",
            "tail": "missile",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME START {}", game.id);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, _turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {}", game.id);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    pub async fn get_move(
        &self,
        game: &Game,
        turn: &i32,
        board: &Board,
        you: &Battlesnake,
    ) -> Value {
        let start_time = Instant::now();
        let deadline = start_time + Duration::from_millis(self.config.timing.search_budget_ms());

        let shared = Arc::new(SharedSearchState::new());
        let shared_clone = shared.clone();

        let sim_board = BoardState::from_api(board);
        let self_id = you.id.clone();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let chosen = select_move(&sim_board, &self_id, &StandardRules, &config, deadline);
            shared_clone.store(chosen);
        });

        // Poll until the search lands or the effective budget elapses
        let effective_budget = self.config.timing.effective_budget_ms();
        let polling_interval = Duration::from_millis(self.config.timing.polling_interval_ms);

        loop {
            tokio::time::sleep(polling_interval).await;

            let elapsed = start_time.elapsed().as_millis() as u64;
            if elapsed >= effective_budget || shared.search_complete.load(Ordering::Acquire) {
                break;
            }
        }

        let chosen = shared.chosen();
        info!(
            "Turn {}: chose {} ({}ms)",
            turn,
            chosen.as_str(),
            start_time.elapsed().as_millis()
        );

        self.logger
            .log_decision(*turn, &game.id, &you.id, board.clone(), chosen);

        json!({ "move": chosen.as_str() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSnake;
    use crate::types::Coord;

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

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[test]
    fn test_decisive_search_bypasses_fallback() {
        // Only Right reaches the food within the horizon, so the search
        // answers on its own and the planner never runs
        let b = board(vec![snake("me", 50, &[(4, 5), (4, 4), (4, 3)])], &[(9, 5)]);
        let config = Config::default_hardcoded();
        let chosen = select_move(&b, "me", &StandardRules, &config, far_deadline());
        assert_eq!(chosen, Direction::Right);
    }

    #[test]
    fn test_tied_search_is_resolved_by_fallback() {
        // Perfectly symmetric solo board: the search ties, the planner's
        // fixed priority settles it deterministically
        let b = board(vec![snake("me", 90, &[(5, 5)])], &[]);
        let config = Config::default_hardcoded();
        let chosen = select_move(&b, "me", &StandardRules, &config, far_deadline());
        assert_eq!(chosen, Direction::Up);
    }

    #[test]
    fn test_boxed_in_still_yields_a_direction() {
        let b = board(
            vec![snake("me", 50, &[(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 0)])],
            &[],
        );
        let config = Config::default_hardcoded();
        let chosen = select_move(&b, "me", &StandardRules, &config, far_deadline());
        assert!(Direction::PRIORITY.contains(&chosen));
    }

    #[test]
    fn test_shared_state_round_trip() {
        let shared = SharedSearchState::new();
        assert_eq!(shared.chosen(), Direction::Up);

        for dir in Direction::PRIORITY {
            shared.store(dir);
            assert_eq!(shared.chosen(), dir);
            assert!(shared.search_complete.load(Ordering::Acquire));
        }
    }
}
