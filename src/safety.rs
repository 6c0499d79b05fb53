// Safe-move analyzer
//
// Computes the locally non-suicidal directions for a snake on a given board
// and synthesizes plausible moves for opponents whose true intentions are
// unknown. An empty safe set is a high-risk signal, not an error.

use crate::sim::{BoardState, SimSnake};
use crate::types::{Coord, Direction};

/// Returns the subset of directions that neither exit the board nor enter an
/// occupied body segment. A non-stacked tail cell vacates this turn and does
/// not count as occupied; a stacked tail does.
pub fn safe_moves(snake: &SimSnake, board: &BoardState) -> Vec<Direction> {
    let head = snake.head();

    Direction::PRIORITY
        .iter()
        .filter(|dir| {
            let next = dir.apply(&head);
            board.in_bounds(&next) && !is_occupied(&next, board)
        })
        .copied()
        .collect()
}

fn is_occupied(coord: &Coord, board: &BoardState) -> bool {
    for snake in board.alive_snakes() {
        let body = &snake.body;
        let check_len = if snake.has_stacked_tail() {
            body.len()
        } else {
            body.len().saturating_sub(1)
        };
        if body[..check_len].contains(coord) {
            return true;
        }
    }
    false
}

/// Synthesizes a plausible move for an opponent during simulation.
///
/// A longer-or-equal opponent near us is assumed to close in; a shorter one
/// is assumed to back off. Without a clear bias the first safe direction in
/// priority order is used, so the synthesis is fully deterministic.
pub fn assumed_move(
    opponent: &SimSnake,
    us: &SimSnake,
    board: &BoardState,
    aggression_distance: i32,
) -> Direction {
    let safe = safe_moves(opponent, board);
    if safe.is_empty() {
        // Boxed in: any direction is equally fatal, keep it deterministic
        return Direction::PRIORITY[0];
    }

    let our_head = us.head();
    let their_head = opponent.head();

    if their_head.manhattan_distance(&our_head) <= aggression_distance {
        let toward = opponent.length() >= us.length();
        return pick_biased(&safe, &their_head, &our_head, toward);
    }

    safe[0]
}

/// Picks the safe direction that moves strictly closest to (or farthest
/// from) the target; priority order breaks exact-distance ties because the
/// candidates are already priority-sorted.
fn pick_biased(safe: &[Direction], from: &Coord, target: &Coord, toward: bool) -> Direction {
    let mut best = safe[0];
    let mut best_dist = best.apply(from).manhattan_distance(target);

    for dir in &safe[1..] {
        let dist = dir.apply(from).manhattan_distance(target);
        let better = if toward {
            dist < best_dist
        } else {
            dist > best_dist
        };
        if better {
            best = *dir;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSnake;

    fn snake(id: &str, body: &[(i32, i32)]) -> SimSnake {
        SimSnake {
            id: id.to_string(),
            health: 50,
            body: body.iter().map(|&(x, y)| Coord { x, y }).collect(),
            eliminated: None,
        }
    }

    fn board(snakes: Vec<SimSnake>) -> BoardState {
        BoardState {
            width: 11,
            height: 11,
            food: vec![],
            hazards: vec![],
            snakes,
        }
    }

    #[test]
    fn test_walls_are_excluded() {
        let s = snake("a", &[(0, 0), (1, 0), (2, 0)]);
        let b = board(vec![s]);
        let safe = safe_moves(&b.snakes[0], &b);
        // Down and Left leave the board, Right is our own neck
        assert_eq!(safe, vec![Direction::Up]);
    }

    #[test]
    fn test_own_neck_is_excluded() {
        let s = snake("a", &[(5, 5), (5, 4), (5, 3)]);
        let b = board(vec![s]);
        let safe = safe_moves(&b.snakes[0], &b);
        assert!(!safe.contains(&Direction::Down));
        assert_eq!(safe.len(), 3);
    }

    #[test]
    fn test_vacating_tail_is_not_occupied() {
        // Opponent tail at (5,6) moves away this turn
        let us = snake("a", &[(5, 5), (5, 4), (5, 3)]);
        let them = snake("b", &[(5, 8), (5, 7), (5, 6)]);
        let b = board(vec![us, them]);
        let safe = safe_moves(&b.snakes[0], &b);
        assert!(safe.contains(&Direction::Up));
    }

    #[test]
    fn test_stacked_tail_is_occupied() {
        // Opponent just ate: tail at (5,6) is doubled and will not vacate
        let us = snake("a", &[(5, 5), (5, 4), (5, 3)]);
        let them = snake("b", &[(5, 8), (5, 7), (5, 6), (5, 6)]);
        let b = board(vec![us, them]);
        let safe = safe_moves(&b.snakes[0], &b);
        assert!(!safe.contains(&Direction::Up));
    }

    #[test]
    fn test_boxed_in_yields_empty_set() {
        // Head at (0,0) with own body blocking both exits
        let s = snake("a", &[(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 0)]);
        let b = board(vec![s]);
        let safe = safe_moves(&b.snakes[0], &b);
        assert!(safe.is_empty());
    }

    #[test]
    fn test_longer_opponent_closes_in() {
        let us = snake("a", &[(5, 5), (5, 4), (5, 3)]);
        let them = snake("b", &[(5, 8), (5, 9), (5, 10), (4, 10)]);
        let b = board(vec![us.clone(), them.clone()]);
        let mv = assumed_move(&b.snakes[1], &b.snakes[0], &b, 4);
        assert_eq!(mv, Direction::Down);
    }

    #[test]
    fn test_shorter_opponent_backs_off() {
        let us = snake("a", &[(5, 5), (5, 4), (5, 3), (5, 2)]);
        let them = snake("b", &[(5, 7), (5, 8)]);
        let b = board(vec![us, them]);
        let mv = assumed_move(&b.snakes[1], &b.snakes[0], &b, 4);
        // Up is the safe move that maximizes distance from our head
        assert_eq!(mv, Direction::Up);
    }

    #[test]
    fn test_distant_opponent_uses_priority_order() {
        let us = snake("a", &[(0, 0), (1, 0)]);
        let them = snake("b", &[(9, 5), (9, 4)]);
        let b = board(vec![us, them]);
        let mv = assumed_move(&b.snakes[1], &b.snakes[0], &b, 4);
        // First safe direction in fixed priority order
        assert_eq!(mv, Direction::Up);
    }

    #[test]
    fn test_boxed_opponent_still_gets_a_direction() {
        let us = snake("a", &[(9, 9), (9, 8)]);
        let them = snake("b", &[(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 0)]);
        let b = board(vec![us, them]);
        let mv = assumed_move(&b.snakes[1], &b.snakes[0], &b, 4);
        assert_eq!(mv, Direction::PRIORITY[0]);
    }
}
