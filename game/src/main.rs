//! Headless planetoid sandbox
//!
//! Usage: `planetoid_game [scene.json]`

mod sandbox;
mod scene;

use sandbox::Sandbox;
use scene::{SceneConfig, SceneError};
use tracing::info;

fn main() -> Result<(), SceneError> {
    // Initialize logging
    planetoid_engine::init_logging();
    info!("Starting planetoid sandbox");

    let scene = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(path)?,
        None => {
            info!("No scene file given, using the built-in planetoid");
            SceneConfig::default()
        }
    };

    let mut sandbox = Sandbox::new(scene);
    let summary = sandbox.run();
    info!(
        "Final position {:?}, {} jumps over {} steps",
        summary.final_position, summary.jumps, summary.steps
    );
    Ok(())
}
