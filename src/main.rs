mod app;
mod cat;
mod catalog;
mod config;
mod ecs;
mod feedback;
mod render;
mod scene;
mod ui;

fn main() {
    env_logger::init();
    log::info!("Spinning Cats starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
