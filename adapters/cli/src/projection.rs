//! Projects session snapshots into renderable scenes.

use snake_core::SCORE_TIMESTAMP_FORMAT;
use snake_rendering::{CellPresentation, Color, InputMode, Overlay, Scene, TextLine};
use snake_system_session::{MenuItem, Outcome, Phase, SessionSnapshot};

pub(crate) const CLEAR_COLOR: Color = Color::BLACK;

const SNAKE_COLOR: Color = Color::from_rgb_u8(0, 255, 0);
const FOOD_COLOR: Color = Color::from_rgb_u8(255, 0, 0);
const HIGHLIGHT_COLOR: Color = Color::from_rgb_u8(255, 255, 0);
const SELECTED_COLOR: Color = Color::from_rgb_u8(0, 255, 0);
const TEXT_COLOR: Color = Color::WHITE;
const WARNING_COLOR: Color = Color::from_rgb_u8(255, 96, 96);
const HEAD_LIGHTEN: f32 = 0.5;
const BACKDROP_ALPHA: f32 = 0.6;

/// Rewrites `scene` so it reflects `snapshot`. The board descriptor is kept.
pub(crate) fn project(snapshot: &SessionSnapshot, scene: &mut Scene) {
    scene.snake.clear();
    scene.food = None;
    scene.hud = None;
    scene.overlay = None;
    scene.input_mode = InputMode::Navigation;

    match snapshot.phase {
        Phase::Menu => scene.overlay = Some(menu_overlay(snapshot)),
        Phase::Playing => populate_board(snapshot, scene),
        Phase::Paused => {
            populate_board(snapshot, scene);
            scene.overlay = Some(
                Overlay::new(vec![TextLine::new(
                    "Paused. Press P to resume.",
                    HIGHLIGHT_COLOR,
                )])
                .with_backdrop(CLEAR_COLOR.with_alpha(BACKDROP_ALPHA)),
            );
        }
        Phase::GameOver => {
            populate_board(snapshot, scene);
            scene.overlay = Some(game_over_overlay(snapshot));
            scene.input_mode = InputMode::TextEntry;
        }
    }
}

fn populate_board(snapshot: &SessionSnapshot, scene: &mut Scene) {
    scene.food = snapshot
        .food
        .map(|cell| CellPresentation::new(cell, FOOD_COLOR));

    let head_index = snapshot.snake.len().saturating_sub(1);
    scene.snake = snapshot
        .snake
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let color = if index == head_index {
                SNAKE_COLOR.lighten(HEAD_LIGHTEN)
            } else {
                SNAKE_COLOR
            };
            CellPresentation::new(*cell, color)
        })
        .collect();

    scene.hud = Some(TextLine::new(
        format!("Score: {}", snapshot.score),
        HIGHLIGHT_COLOR,
    ));
}

fn menu_overlay(snapshot: &SessionSnapshot) -> Overlay {
    let mut lines = vec![TextLine::new("SNAKE GAME MENU", HIGHLIGHT_COLOR)];

    for item in MenuItem::ALL {
        let selected = item == snapshot.selected_item;
        let color = if selected { SELECTED_COLOR } else { TEXT_COLOR };
        let text = match item {
            MenuItem::Difficulty if selected => {
                format!("{} < {} >", item.label(), snapshot.difficulty)
            }
            MenuItem::Difficulty => format!("{} {}", item.label(), snapshot.difficulty),
            _ => item.label().to_owned(),
        };
        lines.push(TextLine::new(text, color));
    }

    if snapshot.selected_item == MenuItem::HighScores {
        lines.push(TextLine::new("HIGH SCORES:", HIGHLIGHT_COLOR));
        if snapshot.recent_scores.is_empty() {
            lines.push(TextLine::new("No high scores yet.", TEXT_COLOR));
        }
        lines.extend(snapshot.recent_scores.iter().map(|entry| {
            TextLine::new(
                format!(
                    "{} - {} - {}",
                    entry.player(),
                    entry.score(),
                    entry.recorded_at().format(SCORE_TIMESTAMP_FORMAT)
                ),
                TEXT_COLOR,
            )
        }));
    }

    if let Some(notice) = snapshot.notice {
        lines.push(TextLine::new(notice.message(), WARNING_COLOR));
    }

    Overlay::new(lines)
}

fn game_over_overlay(snapshot: &SessionSnapshot) -> Overlay {
    let headline = match snapshot.outcome {
        Some(Outcome::BoardFull) => TextLine::new("BOARD CLEARED!", SELECTED_COLOR),
        _ => TextLine::new("GAME OVER!", FOOD_COLOR),
    };

    Overlay::new(vec![
        headline,
        TextLine::new(format!("Score: {}", snapshot.score), TEXT_COLOR),
        TextLine::new(
            format!("Enter your name: {}", snapshot.name_buffer),
            HIGHLIGHT_COLOR,
        ),
        TextLine::new("Press Enter to continue", TEXT_COLOR),
    ])
    .with_backdrop(CLEAR_COLOR.with_alpha(BACKDROP_ALPHA))
}
