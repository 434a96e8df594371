//! Condor Flight (headless)
//!
//! Flies the condor for a scripted minute: straight toward the peak, a long
//! banked turn, then a climb. Prints a position trace and how often the
//! clearance floor had to catch the bird.
//!
//! Usage: `condor-flight [config.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use condor_marble_engine::LogTelemetry;
#[cfg(not(target_arch = "wasm32"))]
use condor_marble_engine::game::{CondorConfig, CondorSketch};
#[cfg(not(target_arch = "wasm32"))]
use condor_marble_engine::physics::GliderControls;

#[cfg(not(target_arch = "wasm32"))]
const FRAME_DT: f32 = 1.0 / 60.0;

/// (seconds, bank, climb) segments of the script
#[cfg(not(target_arch = "wasm32"))]
const SCRIPT: [(f32, f32, f32); 4] = [(15.0, 0.0, 0.0), (20.0, 0.6, 0.0), (15.0, -0.3, 0.5), (10.0, 0.0, -0.3)];

#[cfg(not(target_arch = "wasm32"))]
fn run() -> condor_marble_engine::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {path}");
            CondorConfig::load(path)?
        }
        None => CondorConfig::default(),
    };
    let mut sketch = CondorSketch::new(config, &mut LogTelemetry)?;

    println!("===========================================");
    println!("   Condor Flight - headless session");
    println!("===========================================");
    println!(
        "terrain {:.0} m across, summit {:.1} m",
        sketch.config().grid.size,
        sketch.heightfield().max_height()
    );

    let mut next_report = 0.0;
    for (seconds, bank, climb) in SCRIPT {
        sketch.set_controls(GliderControls { bank, climb });
        let end = sketch.elapsed() + seconds;
        while sketch.elapsed() < end {
            sketch.tick(FRAME_DT);
            if sketch.elapsed() >= next_report {
                let p = sketch.position();
                let glider = sketch.glider();
                println!(
                    "t={:5.1}s pos=({:7.1}, {:6.1}, {:7.1}) agl={:5.1} speed={:4.1} updraft={:4.2}",
                    sketch.elapsed(),
                    p.x,
                    p.y,
                    p.z,
                    glider.clearance(sketch.heightfield()),
                    glider.velocity.length(),
                    glider.updraft
                );
                next_report += 5.0;
            }
        }
    }

    println!();
    println!(
        "skimmed the terrain for {} steps, lowest clearance {:.2} m",
        sketch.skim_steps(),
        sketch.min_clearance_seen()
    );
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("condor flight failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
