//! Headless simulation driver
//!
//! Runs a scripted session for a fixed number of frames and prints the final
//! metrics record as JSON. Useful for soak-testing the simulation and for
//! comparing runs across seeds: `cryptbound [seed] [frames]`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use cryptbound::sim::{start_session, tick, SessionConfig, SessionEvent};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let frames: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600);

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut state = start_session(&SessionConfig::default(), &mut rng);
    log::info!("running seed {seed} for up to {frames} frames");

    for _ in 0..frames {
        match tick(&mut state, &mut rng) {
            Some(SessionEvent::Victory) => {
                log::info!("victory at frame {}", state.frame);
                break;
            }
            Some(SessionEvent::Defeat) => {
                log::info!("defeat at frame {}", state.frame);
                break;
            }
            None => {}
        }
    }

    match serde_json::to_string_pretty(&state.metrics()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("failed to serialize metrics: {err}"),
    }
}
