// Library exports for the Battlesnake decision engine
// This allows the replay tool and integration tests to use the core logic

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod eval;
pub mod fallback;
pub mod replay;
pub mod safety;
pub mod search;
pub mod sim;
pub mod types;
