// Flood-fill fallback planner.
//
// Used when the search is inconclusive: a tie at the root maximum, or no
// survivable root move at all. A static desirability map is built once per
// decision, and a bounded flood fill over its non-negative cells estimates
// how much room each adjacent cell opens up.

use std::collections::VecDeque;

use crate::config::Config;
use crate::sim::BoardState;
use crate::types::{Coord, Direction};

/// Per-cell signed weights for the current snapshot. Read-only once built.
#[derive(Debug)]
pub struct DesirabilityMap {
    width: i32,
    height: i32,
    weights: Vec<i32>,
}

impl DesirabilityMap {
    /// Builds the map for one decision: negative weight under occupied body
    /// cells (a stacked tail counts, a vacating tail does not) and hazards,
    /// an extra negative halo around opposing heads scaled by their length
    /// advantage over us, positive weight on food and a halo around it.
    pub fn build(board: &BoardState, self_id: &str, config: &Config) -> Self {
        let fallback = &config.fallback;
        let mut map = DesirabilityMap {
            width: board.width,
            height: board.height,
            weights: vec![0; (board.width * board.height).max(0) as usize],
        };

        let self_length = board.snake(self_id).map_or(0, |s| s.length() as i32);

        for snake in board.alive_snakes() {
            let body = &snake.body;
            let last = if snake.has_stacked_tail() {
                body.len()
            } else {
                body.len().saturating_sub(1)
            };
            for segment in body[..last].iter() {
                map.add(segment, fallback.body_weight);
            }

            if snake.id != self_id {
                let advantage = (snake.length() as i32 - self_length).max(0);
                let halo = fallback.head_halo_weight * (1 + advantage);
                let head = snake.head();
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        map.add(
                            &Coord {
                                x: head.x + dx,
                                y: head.y + dy,
                            },
                            halo,
                        );
                    }
                }
            }
        }

        for hazard in &board.hazards {
            map.add(hazard, fallback.hazard_weight);
        }

        for food in &board.food {
            map.add(food, fallback.food_weight);
            let r = fallback.food_halo_radius;
            for dx in -r..=r {
                for dy in -r..=r {
                    map.add(
                        &Coord {
                            x: food.x + dx,
                            y: food.y + dy,
                        },
                        fallback.food_halo_weight,
                    );
                }
            }
        }

        map
    }

    pub fn weight(&self, coord: &Coord) -> i32 {
        if self.in_bounds(coord) {
            self.weights[(coord.y * self.width + coord.x) as usize]
        } else {
            i32::MIN
        }
    }

    fn add(&mut self, coord: &Coord, delta: i32) {
        if self.in_bounds(coord) {
            self.weights[(coord.y * self.width + coord.x) as usize] += delta;
        }
    }

    fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }
}

/// Counts distinct cells reachable from `start` within `max_depth` steps,
/// expanding only through cells with non-negative weight. A blocked start
/// cell reaches nothing.
pub fn flood_fill_area(map: &DesirabilityMap, start: Coord, max_depth: u32) -> usize {
    if !map.in_bounds(&start) || map.weight(&start) < 0 {
        return 0;
    }

    let mut visited = vec![false; map.weights.len()];
    let mut queue: VecDeque<(Coord, u32)> = VecDeque::new();
    visited[(start.y * map.width + start.x) as usize] = true;
    queue.push_back((start, 0));
    let mut count = 1;

    while let Some((cell, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for dir in Direction::PRIORITY {
            let next = dir.apply(&cell);
            if !map.in_bounds(&next) || map.weight(&next) < 0 {
                continue;
            }
            let idx = (next.y * map.width + next.x) as usize;
            if !visited[idx] {
                visited[idx] = true;
                count += 1;
                queue.push_back((next, depth + 1));
            }
        }
    }

    count
}

/// Picks the adjacent cell with the best combined weight and reachable-area
/// score. The area contribution is capped at a small multiple of our length
/// so unbounded open space is not over-rewarded. Ties fall back to the fixed
/// direction priority; even a board where every option is fatal yields
/// exactly one direction.
pub fn plan_fallback_move(board: &BoardState, self_id: &str, config: &Config) -> Direction {
    let Some(us) = board.snake(self_id) else {
        return Direction::PRIORITY[0];
    };
    let head = us.head();
    let map = DesirabilityMap::build(board, self_id, config);
    let area_cap = config.fallback.area_cap_per_length * us.length() as i32;

    let mut best_dir = Direction::PRIORITY[0];
    let mut best_score = i32::MIN;

    for dir in Direction::PRIORITY {
        let cell = dir.apply(&head);
        let score = if map.in_bounds(&cell) {
            let area = flood_fill_area(&map, cell, config.fallback.flood_fill_depth) as i32;
            map.weight(&cell).saturating_add(area.min(area_cap))
        } else {
            i32::MIN
        };

        log::debug!("fallback {}: {}", dir.as_str(), score);
        if score > best_score {
            best_dir = dir;
            best_score = score;
        }
    }

    best_dir
}
