#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Snake experience.

mod clock;
mod config;
mod projection;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::info;
use snake_core::{Difficulty, ScoreStore, SCORE_TIMESTAMP_FORMAT, WELCOME_BANNER};
use snake_rendering::{BoardPresentation, FrameControl, Presentation, RenderingBackend, Scene};
use snake_rendering_macroquad::MacroquadBackend;
use snake_score_log::FileScoreLog;
use snake_system_food_placement as food_placement;
use snake_system_session::{self as session, Control, Session};

use crate::{
    clock::TickClock,
    config::{FileConfig, Settings},
    projection::CLEAR_COLOR,
};

const WINDOW_TITLE: &str = "Snake";

/// Command-line arguments; every value falls back to the config file, then to defaults.
#[derive(Debug, Parser)]
#[command(name = "snake", version, about = "Toroidal Snake with a persistent score log")]
struct Args {
    /// TOML file supplying default settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Score log location.
    #[arg(long, value_name = "FILE")]
    scores: Option<PathBuf>,
    /// Seed for food placement, making rounds reproducible.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Side length of a cell in pixels.
    #[arg(long, value_name = "PX")]
    cell_size: Option<f32>,
    /// Difficulty preselected in the menu (easy, medium or hard).
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
    /// Print the last N recorded scores and exit.
    #[arg(long, value_name = "N")]
    print_scores: Option<usize>,
}

impl Args {
    fn overrides(&self) -> FileConfig {
        let vsync = match (self.vsync, self.no_vsync) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        FileConfig {
            columns: self.columns,
            rows: self.rows,
            cell_size: self.cell_size,
            difficulty: self.difficulty,
            scores: self.scores.clone(),
            seed: self.seed,
            vsync,
            show_fps: self.show_fps.then_some(true),
        }
    }
}

/// Entry point for the Snake command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let file = args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()
        .context("failed to load configuration")?;
    let settings =
        Settings::resolve(args.overrides(), file).context("invalid configuration")?;

    info!("{WELCOME_BANNER}");
    let store = FileScoreLog::new(&settings.scores_path);

    if let Some(count) = args.print_scores {
        return print_scores(&store, count);
    }

    run(settings, store)
}

fn print_scores(store: &FileScoreLog, count: usize) -> Result<()> {
    let entries = store
        .load_recent(count)
        .context("failed to read score log")?;
    if entries.is_empty() {
        println!("No high scores yet.");
    }
    for entry in entries {
        println!(
            "{} - {} - {}",
            entry.player(),
            entry.score(),
            entry.recorded_at().format(SCORE_TIMESTAMP_FORMAT)
        );
    }
    Ok(())
}

fn run(settings: Settings, store: FileScoreLog) -> Result<()> {
    let food = settings
        .seed
        .map_or_else(food_placement::Config::from_entropy, food_placement::Config::new);
    info!(
        "food placement seed {}, scores in {}",
        food.rng_seed(),
        settings.scores_path.display()
    );

    let mut session = Session::new(
        session::Config::new(settings.grid, settings.difficulty, food),
        store,
    );
    let board = BoardPresentation::new(
        settings.grid.columns(),
        settings.grid.rows(),
        settings.cell_size,
    )
    .context("invalid board presentation")?;
    let mut scene = Scene::new(board);
    projection::project(&session.snapshot(), &mut scene);

    let backend = MacroquadBackend::new()
        .with_vsync(settings.vsync)
        .with_show_fps(settings.show_fps);
    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);
    let mut clock = TickClock::default();

    backend
        .run(presentation, move |frame_dt, input, scene| {
            let ticks = clock.advance(frame_dt, session.tick_interval());
            let now = Local::now().naive_local();
            if session.step(&input.intents, ticks, now) == Control::Quit {
                return FrameControl::Exit;
            }

            projection::project(&session.snapshot(), scene);
            FrameControl::Continue
        })
        .context("rendering backend failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_leave_file_values_alone() {
        let args = Args::parse_from(["snake"]);

        assert_eq!(args.overrides(), FileConfig::default());
    }

    #[test]
    fn flags_become_overrides() {
        let args = Args::parse_from([
            "snake",
            "--columns",
            "12",
            "--difficulty",
            "hard",
            "--no-vsync",
            "--show-fps",
            "--seed",
            "4",
        ]);

        let overrides = args.overrides();

        assert_eq!(overrides.columns, Some(12));
        assert_eq!(overrides.rows, None);
        assert_eq!(overrides.difficulty, Some(Difficulty::Hard));
        assert_eq!(overrides.vsync, Some(false));
        assert_eq!(overrides.show_fps, Some(true));
        assert_eq!(overrides.seed, Some(4));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(Args::try_parse_from(["snake", "--difficulty", "insane"]).is_err());
    }
}
