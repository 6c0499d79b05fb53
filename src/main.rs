#[macro_use]
extern crate rocket;

use log::info;
use std::env;

mod bot;
mod config;
mod debug_logger;
mod eval;
mod fallback;
mod handler;
mod replay;
mod safety;
mod search;
mod sim;
mod types;

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    // Hosting services usually hand us the port via `PORT`, but Rocket reads
    // `ROCKET_PORT`; bridge the two when needed.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // Default to 'info' level logging unless RUST_LOG says otherwise
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Battlesnake server...");

    // Configuration and decision logger are created once at startup and
    // injected into the Bot
    let config = config::Config::load_or_default();
    let logger =
        debug_logger::DecisionLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let bot = bot::Bot::new(config, logger);

    let _ = rocket::build()
        .manage(bot)
        .mount(
            "/",
            routes![handler::index, handler::start, handler::get_move, handler::end],
        )
        .launch()
        .await?;

    Ok(())
}
