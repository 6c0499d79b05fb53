// Internal simulation representation and the rule-engine contract.
//
// The search never mutates a board in place: every simulated ply asks a
// RuleEngine for a fresh BoardState. StandardRules reproduces the official
// standard-mode semantics (simultaneous movement, food growth, elimination
// on starvation / out-of-bounds / collision); any substitute implementation
// must match those semantics or search results will diverge.

use crate::types::{Board, Coord, Direction};

/// Why a snake was removed from play during a simulated ply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationCause {
    Starvation,
    OutOfBounds,
    SelfCollision,
    BodyCollision,
    HeadToHead,
}

/// Simulation-side snake: identifier, health, and head-first body
#[derive(Debug, Clone)]
pub struct SimSnake {
    pub id: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub eliminated: Option<EliminationCause>,
}

impl SimSnake {
    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn tail(&self) -> Coord {
        self.body[self.body.len() - 1]
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn is_alive(&self) -> bool {
        self.eliminated.is_none()
    }

    /// A repeated final segment means the snake grew this turn, so its tail
    /// cell will not vacate on the next move.
    pub fn has_stacked_tail(&self) -> bool {
        let n = self.body.len();
        n >= 2 && self.body[n - 1] == self.body[n - 2]
    }
}

/// One snake's chosen direction within a joint move
#[derive(Debug, Clone)]
pub struct SnakeMove {
    pub id: String,
    pub direction: Direction,
}

/// Immutable board snapshot consumed by the search, evaluator, and planner
#[derive(Debug, Clone)]
pub struct BoardState {
    pub width: i32,
    pub height: i32,
    pub food: Vec<Coord>,
    pub hazards: Vec<Coord>,
    pub snakes: Vec<SimSnake>,
}

impl BoardState {
    /// Board adapter: converts the inbound API snapshot into the simulation
    /// representation. The API never reports eliminated snakes, so every
    /// adapted snake starts alive.
    pub fn from_api(board: &Board) -> Self {
        BoardState {
            width: board.width,
            height: board.height,
            food: board.food.clone(),
            hazards: board.hazards.clone(),
            snakes: board
                .snakes
                .iter()
                .map(|s| SimSnake {
                    id: s.id.clone(),
                    health: s.health,
                    body: s.body.clone(),
                    eliminated: None,
                })
                .collect(),
        }
    }

    /// Self is always found by identifier, never by list position
    pub fn snake(&self, id: &str) -> Option<&SimSnake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn alive_snakes(&self) -> impl Iterator<Item = &SimSnake> {
        self.snakes.iter().filter(|s| s.is_alive())
    }

    pub fn num_alive(&self) -> usize {
        self.alive_snakes().count()
    }

    pub fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }
}

/// Authoritative game-rule contract. The decision core never duplicates
/// movement or elimination rules outside an implementation of this trait.
pub trait RuleEngine {
    /// Applies one simultaneous joint move and returns the resulting board.
    /// Every living snake must appear in `moves` exactly once.
    fn next_state(&self, board: &BoardState, moves: &[SnakeMove]) -> Result<BoardState, String>;

    /// Whether the game has ended on this board
    fn is_game_over(&self, board: &BoardState) -> bool;
}

/// Standard-mode rules: one health lost per turn, food restores full health
/// and grows the snake by stacking its tail, eliminations are resolved
/// simultaneously after all heads have moved.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    pub const FULL_HEALTH: i32 = 100;

    fn find_move<'a>(moves: &'a [SnakeMove], id: &str) -> Option<&'a SnakeMove> {
        moves.iter().find(|m| m.id == id)
    }
}

impl RuleEngine for StandardRules {
    fn next_state(&self, board: &BoardState, moves: &[SnakeMove]) -> Result<BoardState, String> {
        let mut next = board.clone();

        // Phase 1: move every living snake and burn one health
        for snake in next.snakes.iter_mut().filter(|s| s.is_alive()) {
            let mv = Self::find_move(moves, &snake.id)
                .ok_or_else(|| format!("no move supplied for snake '{}'", snake.id))?;

            if snake.body.is_empty() {
                return Err(format!("snake '{}' has an empty body", snake.id));
            }

            let new_head = mv.direction.apply(&snake.head());
            snake.body.insert(0, new_head);
            snake.body.pop();
            snake.health -= 1;
        }

        // Phase 2: feeding. Food is consumed against the pre-move food list;
        // a fed snake refills health and stacks its tail.
        let mut eaten: Vec<Coord> = Vec::new();
        for snake in next.snakes.iter_mut().filter(|s| s.is_alive()) {
            let head = snake.head();
            if board.food.contains(&head) {
                snake.health = Self::FULL_HEALTH;
                let tail = snake.tail();
                snake.body.push(tail);
                if !eaten.contains(&head) {
                    eaten.push(head);
                }
            }
        }
        next.food.retain(|f| !eaten.contains(f));

        // Phase 3: simultaneous elimination. All checks run against the
        // post-move bodies of snakes that entered the turn alive.
        let width = next.width;
        let height = next.height;
        let post_move: Vec<SimSnake> = next
            .snakes
            .iter()
            .filter(|s| s.is_alive())
            .cloned()
            .collect();

        for snake in next.snakes.iter_mut().filter(|s| s.is_alive()) {
            let head = snake.head();

            if snake.health <= 0 {
                snake.eliminated = Some(EliminationCause::Starvation);
                continue;
            }

            if head.x < 0 || head.x >= width || head.y < 0 || head.y >= height {
                snake.eliminated = Some(EliminationCause::OutOfBounds);
                continue;
            }

            if snake.body[1..].contains(&head) {
                snake.eliminated = Some(EliminationCause::SelfCollision);
                continue;
            }

            for other in post_move.iter().filter(|o| o.id != snake.id) {
                if other.body[1..].contains(&head) {
                    snake.eliminated = Some(EliminationCause::BodyCollision);
                    break;
                }
                if other.head() == head && other.length() >= snake.length() {
                    snake.eliminated = Some(EliminationCause::HeadToHead);
                    break;
                }
            }
        }

        Ok(next)
    }

    fn is_game_over(&self, board: &BoardState) -> bool {
        let alive = board.num_alive();
        if board.snakes.len() <= 1 {
            // Solo game: play until the lone snake dies
            alive == 0
        } else {
            alive <= 1
        }
    }
}
