//! Marble Toss (headless)
//!
//! Scripted session for smoke-testing terrain, collision and scoring without
//! a browser: drops one marble over the hole, throws a few more at different
//! charges, and prints where each one settled.
//!
//! Usage: `marble-toss [config.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use condor_marble_engine::game::{DemoControls, MarbleConfig, MarbleGame};

/// Simulated frame length for the script (seconds)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_DT: f32 = 1.0 / 60.0;

/// Charge hold times for the scripted throws (seconds)
#[cfg(not(target_arch = "wasm32"))]
const CHARGE_TIMES: [f32; 3] = [0.6, 0.8, 1.0];

#[cfg(not(target_arch = "wasm32"))]
fn run() -> condor_marble_engine::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {path}");
            MarbleConfig::load(path)?
        }
        None => MarbleConfig::default(),
    };
    let max_frames = ((config.max_roll_time + 5.0) / FRAME_DT) as usize;
    let mut game = MarbleGame::with_log(config)?;

    println!("===========================================");
    println!("   Marble Toss - headless session");
    println!("===========================================");
    println!(
        "terrain {}x{} vertices, {} features, collision {}",
        game.mesh().grid().cols,
        game.mesh().grid().rows,
        game.placement().features.len(),
        if game.colliders().degraded { "DEGRADED (plane only)" } else { "ok" }
    );

    let zone = game.config().target_zone();
    game.drop_marble(glam::Vec3::new(0.0, zone.center_hole_depth + 0.3, 0.0));

    for (i, hold) in CHARGE_TIMES.iter().enumerate() {
        if i % 2 == 1 {
            game.move_left();
        } else {
            game.move_right();
        }
        game.start_charging();
        let mut held = 0.0;
        while held < *hold {
            game.tick(FRAME_DT);
            held += FRAME_DT;
        }
        game.throw_marble();
    }

    let mut frames = 0;
    while !game.all_settled() && frames < max_frames {
        game.tick(FRAME_DT);
        frames += 1;
    }

    println!();
    for marble in game.marbles() {
        match marble.outcome {
            Some(outcome) => {
                let stats = marble.stats.unwrap_or_default();
                println!(
                    "marble {}: {:?} at {:.3} m, {} pts, {:.1} s{}, {} impacts ({} on obstacles)",
                    marble.id,
                    outcome.band,
                    outcome.distance,
                    outcome.score,
                    outcome.roll_time,
                    if outcome.timed_out { " (timeout)" } else { "" },
                    stats.impacts,
                    stats.obstacle_hits,
                );
            }
            None => println!("marble {}: still rolling", marble.id),
        }
    }
    println!("total score: {}", game.total_score());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("marble toss failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
