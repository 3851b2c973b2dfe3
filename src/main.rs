//! Headless demo entry point
//!
//! Runs a seeded session on autopilot and logs progress:
//!
//! ```text
//! platformer-without-platforms [seed] [tuning.json]
//! ```
//!
//! Set `RUST_LOG=debug` to see generator detail.

use std::error::Error;
use std::path::Path;

use platformer_without_platforms::consts::TICK_HZ;
use platformer_without_platforms::sim::{Autopilot, CollisionOutcome};
use platformer_without_platforms::{GamePhase, Session, Tuning};

/// Ten simulated minutes
const MAX_TICKS: u64 = 10 * 60 * TICK_HZ as u64;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => 0x5EED,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(Path::new(&path))?,
        None => Tuning::default(),
    };

    log::info!("Platformer Without Platforms (headless) starting...");
    let mut session = Session::with_tuning(seed, tuning);
    let mut bot = Autopilot::new();
    let mut last_level = session.current_level();
    let mut deaths = 0u32;
    let mut steps = 0u64;

    while steps < MAX_TICKS {
        steps += 1;
        if session.phase() == GamePhase::Upgrading {
            // Take the first offer on the list
            if let Some(offer) = session.available_upgrades().first().copied() {
                log::info!("Autopilot picks {}: {}", offer.name, offer.description);
                session.choose_upgrade(offer.path)?;
            }
            continue;
        }

        let keys = bot.next_input(&session);
        if session.tick(&keys) == CollisionOutcome::ObstacleHit {
            deaths += 1;
        }

        if session.current_level() != last_level {
            log::info!(
                "Level {} cleared at tick {} ({} deaths so far)",
                last_level,
                session.ticks(),
                deaths
            );
            last_level = session.current_level();
        }
        if session.is_game_won() {
            break;
        }
    }

    let snapshot = session.snapshot();
    log::info!(
        "Finished at level {} after {} ticks, {} deaths, phase {:?}",
        snapshot.level,
        snapshot.ticks,
        deaths,
        snapshot.phase
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
