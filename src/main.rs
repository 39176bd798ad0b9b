//! Blast Maze headless runner
//!
//! Drives the simulation with a scripted input loop, routes audio cues to a
//! logging backend and records draw calls, so a whole session can be
//! exercised without a window. Usage: `blast-maze [seconds]`.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use blast_maze::assets::BuiltinAssets;
use blast_maze::audio::{AudioManager, LogBackend};
use blast_maze::consts::SIM_DT_MS;
use blast_maze::renderer::{DrawList, render};
use blast_maze::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use blast_maze::{HighScores, Settings, Tuning};

const SETTINGS_PATH: &str = "settings.json";
const TUNING_PATH: &str = "tuning.json";
const HIGHSCORES_PATH: &str = "highscores.json";

/// One step of the demo script: hold `input` for `ms`
struct Step {
    ms: u64,
    input: TickInput,
}

impl Step {
    fn new(ms: u64, input: TickInput) -> Self {
        Self { ms, input }
    }
}

/// Plant at the spawn cell, duck into the side passage, wait out the blast,
/// come back
fn demo_script() -> Vec<Step> {
    let idle = TickInput::default();
    vec![
        Step::new(
            SIM_DT_MS,
            TickInput {
                plant_bomb: true,
                ..idle
            },
        ),
        Step::new(
            400,
            TickInput {
                left: true,
                ..idle
            },
        ),
        Step::new(
            400,
            TickInput {
                up: true,
                ..idle
            },
        ),
        Step::new(3000, idle),
        Step::new(
            400,
            TickInput {
                down: true,
                ..idle
            },
        ),
        Step::new(
            400,
            TickInput {
                right: true,
                ..idle
            },
        ),
    ]
}

fn run_seed(settings: &Settings) -> u64 {
    settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    })
}

fn main() {
    env_logger::init();

    let seconds: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(120);

    let settings = Settings::load_from(Path::new(SETTINGS_PATH));
    let tuning = Tuning::load_from(Path::new(TUNING_PATH));
    let seed = run_seed(&settings);
    log::info!("Blast Maze (headless) starting, seed {}, {}s", seed, seconds);

    let mut state = GameState::with_config(seed, tuning, &BuiltinAssets);
    state.high_scores = HighScores::load_from(Path::new(HIGHSCORES_PATH));
    let mut audio = AudioManager::new(LogBackend, &settings);
    let mut frame = DrawList::new();

    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, SIM_DT_MS);

    let script = demo_script();
    let end_ms = seconds * 1000;
    let mut step = 0;
    let mut step_ends = state.time_ms + script[0].ms;
    let mut draw_calls = 0usize;

    while state.time_ms < end_ms && state.phase != GamePhase::GameOver {
        let input = if state.is_playing() {
            if state.time_ms >= step_ends {
                step = (step + 1) % script.len();
                step_ends = state.time_ms + script[step].ms;
            }
            script[step].input
        } else {
            TickInput::default()
        };
        tick(&mut state, &input, SIM_DT_MS);

        let events = state.drain_events();
        for event in &events {
            match event {
                GameEvent::StageStarted { stage } => log::info!("Stage {} begins", stage),
                GameEvent::GameOver { score, rank } => {
                    log::info!("Final score {} (rank {:?})", score, rank)
                }
                _ => {}
            }
        }
        audio.dispatch(&events);

        frame.clear();
        render(&state, &mut frame);
        draw_calls += frame.len();
    }

    log::info!(
        "Stopped at {}ms on stage {}: score {}, lives {}, {} draw calls",
        state.time_ms,
        state.stage,
        state.player.score,
        state.player.lives,
        draw_calls
    );

    if let Err(e) = state.high_scores.save_to(Path::new(HIGHSCORES_PATH)) {
        log::warn!("Could not save high scores: {}", e);
    }
}
