//! Star Skirmish entry point
//!
//! Native builds run a headless session on autopilot and report the result.
//! The browser build is driven through `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;
    use star_skirmish::Settings;
    use star_skirmish::consts::TICKS_PER_SECOND;
    use star_skirmish::sim::{GameEvent, GameState, TickInput, tick};

    const PROGRESS_INTERVAL: u64 = 600;

    #[derive(Parser, Debug)]
    #[command(name = "star-skirmish")]
    #[command(about = "Run a headless Star Skirmish session on autopilot")]
    pub struct Args {
        /// Settings JSON file (defaults are used when absent)
        pub settings: Option<PathBuf>,

        /// Stop after this many ticks (36000 is ten minutes of play)
        #[arg(long, default_value_t = 36_000)]
        pub ticks: u64,
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn run(args: Args) {
        let settings = match &args.settings {
            Some(path) => Settings::load_from(path),
            None => Settings::default(),
        };
        let seed = settings.seed.unwrap_or_else(clock_seed);
        let mut state = GameState::new(seed, settings.session_config());

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut kills = 0u64;
        let mut missiles_fired = 0u64;
        while !state.is_over() && state.frame < args.ticks {
            tick(&mut state, &input);

            for event in &state.events {
                match event {
                    GameEvent::EnemyDestroyed { .. } => kills += 1,
                    GameEvent::MissileFired { .. } => missiles_fired += 1,
                    _ => {}
                }
            }

            if state.frame % PROGRESS_INTERVAL == 0 {
                log::info!(
                    "t={}s score={} hp={} enemies={} particles={}",
                    state.frame / TICKS_PER_SECOND as u64,
                    state.score,
                    state.player.hp,
                    state.enemies.len(),
                    state.particles.len()
                );
            }
        }

        let outcome = if state.is_over() {
            "destroyed"
        } else {
            "survived"
        };
        println!(
            "seed {seed}: {outcome} after {} ticks, score {}, {kills} kills, {missiles_fired} missiles",
            state.frame, state.score
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_args_defaults() {
            let args = Args::try_parse_from(["star-skirmish"]).unwrap();
            assert!(args.settings.is_none());
            assert_eq!(args.ticks, 36_000);
        }

        #[test]
        fn test_args_settings_and_ticks() {
            let args =
                Args::try_parse_from(["star-skirmish", "cfg.json", "--ticks", "120"]).unwrap();
            assert_eq!(args.settings, Some(PathBuf::from("cfg.json")));
            assert_eq!(args.ticks, 120);
        }

        #[test]
        fn test_args_reject_unknown_flag() {
            assert!(Args::try_parse_from(["star-skirmish", "--tick", "5"]).is_err());
            assert!(Args::try_parse_from(["star-skirmish", "--ticks", "many"]).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = headless::Args::parse();
    env_logger::init();
    log::info!("Star Skirmish (native) starting...");
    headless::run(args);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
