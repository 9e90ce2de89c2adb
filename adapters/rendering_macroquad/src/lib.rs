#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Snake.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature. The game plays no sound.

use anyhow::Result;
use glam::Vec2;
use log::info;
use macroquad::input::{get_char_pressed, get_last_key_pressed, is_key_pressed, KeyCode};
use snake_core::{Direction, Intent};
use snake_rendering::{
    CellPresentation, FrameControl, FrameInput, InputMode, Overlay, Presentation,
    RenderingBackend, Scene, TextLine,
};
use std::time::Duration;

const MIN_WINDOW_EXTENT: f32 = 400.0;
const BASE_FONT_SIZE: f32 = 24.0;
const HUD_MARGIN: f32 = 10.0;
const LINE_SPACING: f32 = 1.4;
const BORDER_THICKNESS: f32 = 2.0;

/// Physical keys the adapter reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// `W`.
    W,
    /// `A`.
    A,
    /// `S`.
    S,
    /// `D`.
    D,
    /// `P`.
    P,
    /// `Q`.
    Q,
    /// Return or keypad enter.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// `[`.
    LeftBracket,
    /// `]`.
    RightBracket,
    /// Backspace.
    Backspace,
}

impl Key {
    const TRACKED: [(KeyCode, Key); 17] = [
        (KeyCode::Up, Key::Up),
        (KeyCode::Down, Key::Down),
        (KeyCode::Left, Key::Left),
        (KeyCode::Right, Key::Right),
        (KeyCode::W, Key::W),
        (KeyCode::A, Key::A),
        (KeyCode::S, Key::S),
        (KeyCode::D, Key::D),
        (KeyCode::P, Key::P),
        (KeyCode::Q, Key::Q),
        (KeyCode::Enter, Key::Enter),
        (KeyCode::KpEnter, Key::Enter),
        (KeyCode::Space, Key::Space),
        (KeyCode::Escape, Key::Escape),
        (KeyCode::LeftBracket, Key::LeftBracket),
        (KeyCode::RightBracket, Key::RightBracket),
        (KeyCode::Backspace, Key::Backspace),
    ];
}

/// Keys and characters observed during a single frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardObservations {
    /// Keys pressed since the previous frame.
    ///
    /// Macroquad only reports the most recent press, so that key comes last and
    /// the others follow the tracked key table.
    pub keys: Vec<Key>,
    /// Characters typed since the previous frame, in order.
    pub characters: Vec<char>,
}

impl KeyboardObservations {
    fn poll() -> Self {
        let keys = Key::TRACKED
            .iter()
            .filter(|(code, _)| is_key_pressed(*code))
            .map(|(_, key)| *key)
            .collect();
        let keys = with_latest_last(keys, get_last_key_pressed().and_then(tracked_key));

        let mut characters = Vec::new();
        while let Some(character) = get_char_pressed() {
            characters.push(character);
        }

        Self { keys, characters }
    }
}

fn tracked_key(code: KeyCode) -> Option<Key> {
    Key::TRACKED
        .iter()
        .find(|(tracked, _)| *tracked == code)
        .map(|(_, key)| *key)
}

/// Moves the most recently pressed key to the end so its intent is applied last.
fn with_latest_last(mut keys: Vec<Key>, latest: Option<Key>) -> Vec<Key> {
    if let Some(latest) = latest {
        if let Some(index) = keys.iter().position(|key| *key == latest) {
            let key = keys.remove(index);
            keys.push(key);
        }
    }
    keys
}

/// Translates raw keyboard observations into intents for the provided input mode.
///
/// In navigation mode typed characters are ignored and every key maps to a
/// command. In text entry mode only Enter, Backspace and Escape act as keys;
/// printable characters are forwarded as text.
#[must_use]
pub fn decode_intents(mode: InputMode, observations: &KeyboardObservations) -> Vec<Intent> {
    match mode {
        InputMode::Navigation => observations
            .keys
            .iter()
            .filter_map(|key| navigation_intent(*key))
            .collect(),
        InputMode::TextEntry => {
            let mut intents: Vec<Intent> = observations
                .characters
                .iter()
                .filter(|character| !character.is_control())
                .map(|character| Intent::TextInput(*character))
                .collect();
            intents.extend(observations.keys.iter().filter_map(|key| match key {
                Key::Backspace => Some(Intent::Backspace),
                Key::Enter => Some(Intent::Confirm),
                Key::Escape => Some(Intent::Quit),
                _ => None,
            }));
            intents
        }
    }
}

fn navigation_intent(key: Key) -> Option<Intent> {
    let intent = match key {
        Key::Up | Key::W => Intent::Move(Direction::Up),
        Key::Down | Key::S => Intent::Move(Direction::Down),
        Key::Left | Key::A => Intent::Move(Direction::Left),
        Key::Right | Key::D => Intent::Move(Direction::Right),
        Key::P => Intent::TogglePause,
        Key::Enter | Key::Space => Intent::Confirm,
        Key::Escape | Key::Q => Intent::Quit,
        Key::LeftBracket => Intent::CycleDifficultyLeft,
        Key::RightBracket => Intent::CycleDifficultyRight,
        Key::Backspace => return None,
    };
    Some(intent)
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average rate once a second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.board.width().max(MIN_WINDOW_EXTENT).round() as i32,
            window_height: scene.board.height().max(MIN_WINDOW_EXTENT).round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let observations = KeyboardObservations::poll();
                let frame_input = FrameInput {
                    intents: decode_intents(scene.input_mode, &observations),
                };

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                if update_scene(frame_dt, frame_input, &mut scene) == FrameControl::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_board_border(&metrics);
                if let Some(food) = scene.food {
                    draw_cell(food, &metrics);
                }
                for cell in &scene.snake {
                    draw_cell(*cell, &metrics);
                }
                if let Some(hud) = &scene.hud {
                    draw_hud(hud, &metrics);
                }
                if let Some(overlay) = &scene.overlay {
                    draw_overlay(overlay, &metrics);
                }

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        info!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen-space placement of the board, scaled to fit the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    origin: Vec2,
    board_size: Vec2,
    cell_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let board = scene.board;
        let width = board.width().max(f32::EPSILON);
        let height = board.height().max(f32::EPSILON);
        let scale = (screen_width / width).min(screen_height / height).max(0.0);
        let board_size = Vec2::new(width, height) * scale;
        let origin = (Vec2::new(screen_width, screen_height) - board_size) * 0.5;

        Self {
            scale,
            origin,
            board_size,
            cell_step: board.cell_length * scale,
        }
    }

    fn font_size(&self) -> f32 {
        (BASE_FONT_SIZE * self.scale).max(12.0)
    }
}

fn draw_board_border(metrics: &SceneMetrics) {
    macroquad::shapes::draw_rectangle_lines(
        metrics.origin.x,
        metrics.origin.y,
        metrics.board_size.x,
        metrics.board_size.y,
        BORDER_THICKNESS,
        macroquad::color::Color::new(0.25, 0.25, 0.25, 1.0),
    );
}

fn draw_cell(cell: CellPresentation, metrics: &SceneMetrics) {
    let position = metrics.origin
        + Vec2::new(cell.cell.column() as f32, cell.cell.row() as f32) * metrics.cell_step;
    macroquad::shapes::draw_rectangle(
        position.x,
        position.y,
        metrics.cell_step,
        metrics.cell_step,
        to_macroquad_color(cell.color),
    );
}

fn draw_hud(line: &TextLine, metrics: &SceneMetrics) {
    let font_size = metrics.font_size();
    draw_text_line(
        line,
        metrics.origin + Vec2::new(HUD_MARGIN, HUD_MARGIN + font_size),
        font_size,
    );
}

fn draw_overlay(overlay: &Overlay, metrics: &SceneMetrics) {
    if let Some(backdrop) = overlay.backdrop {
        macroquad::shapes::draw_rectangle(
            metrics.origin.x,
            metrics.origin.y,
            metrics.board_size.x,
            metrics.board_size.y,
            to_macroquad_color(backdrop),
        );
    }

    let font_size = metrics.font_size();
    for (line, baseline) in overlay
        .lines
        .iter()
        .zip(overlay_baselines(overlay.lines.len(), metrics, font_size))
    {
        let dimensions = macroquad::text::measure_text(&line.text, None, font_size as u16, 1.0);
        let x = metrics.origin.x + (metrics.board_size.x - dimensions.width) * 0.5;
        draw_text_line(line, Vec2::new(x, baseline), font_size);
    }
}

fn overlay_baselines(count: usize, metrics: &SceneMetrics, font_size: f32) -> Vec<f32> {
    let step = font_size * LINE_SPACING;
    let block_height = step * count as f32;
    let top = metrics.origin.y + (metrics.board_size.y - block_height) * 0.5;
    (0..count)
        .map(|index| top + step * index as f32 + font_size)
        .collect()
}

fn draw_text_line(line: &TextLine, position: Vec2, font_size: f32) {
    let _ = macroquad::text::draw_text(
        &line.text,
        position.x,
        position.y,
        font_size,
        to_macroquad_color(line.color),
    );
}

fn to_macroquad_color(color: snake_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_rendering::BoardPresentation;

    fn scene(columns: u32, rows: u32, cell_length: f32) -> Scene {
        Scene::new(BoardPresentation::new(columns, rows, cell_length).expect("valid board"))
    }

    #[test]
    fn metrics_center_board_and_preserve_aspect_ratio() {
        let metrics = SceneMetrics::from_scene(&scene(25, 25, 20.0), 800.0, 500.0);

        assert_eq!(metrics.scale, 1.0);
        assert_eq!(metrics.origin, Vec2::new(150.0, 0.0));
        assert_eq!(metrics.board_size, Vec2::new(500.0, 500.0));
        assert_eq!(metrics.cell_step, 20.0);
    }

    #[test]
    fn metrics_scale_up_small_boards() {
        let metrics = SceneMetrics::from_scene(&scene(10, 5, 10.0), 400.0, 400.0);

        assert_eq!(metrics.scale, 4.0);
        assert_eq!(metrics.cell_step, 40.0);
        assert_eq!(metrics.origin, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn overlay_lines_are_vertically_centred() {
        let metrics = SceneMetrics::from_scene(&scene(10, 10, 10.0), 100.0, 100.0);

        let baselines = overlay_baselines(2, &metrics, 10.0);

        assert_eq!(baselines.len(), 2);
        assert!((baselines[0] - 46.0).abs() < 1e-4);
        assert!((baselines[1] - 60.0).abs() < 1e-4);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();

        for _ in 0..59 {
            assert!(counter
                .record_frame(Duration::from_secs_f32(1.0 / 60.0))
                .is_none());
        }
        let rate = counter
            .record_frame(Duration::from_millis(20))
            .expect("a second has elapsed");
        assert!(rate > 55.0 && rate < 65.0);
    }

    #[test]
    fn latest_press_is_decoded_last() {
        let keys = with_latest_last(
            vec![Key::Up, Key::Left, Key::P],
            tracked_key(KeyCode::Up),
        );

        assert_eq!(keys, vec![Key::Left, Key::P, Key::Up]);
        assert_eq!(
            decode_intents(
                InputMode::Navigation,
                &KeyboardObservations {
                    keys,
                    characters: Vec::new(),
                },
            ),
            vec![
                Intent::Move(Direction::Left),
                Intent::TogglePause,
                Intent::Move(Direction::Up),
            ]
        );
    }

    #[test]
    fn unknown_latest_press_keeps_table_order() {
        let keys = vec![Key::Down, Key::Right];

        assert_eq!(with_latest_last(keys.clone(), None), keys);
        assert_eq!(with_latest_last(keys.clone(), Some(Key::Escape)), keys);
        assert_eq!(tracked_key(KeyCode::F1), None);
    }

    #[test]
    fn navigation_mode_ignores_typed_characters() {
        let observations = KeyboardObservations {
            keys: vec![Key::W, Key::P],
            characters: vec!['w', 'p'],
        };

        assert_eq!(
            decode_intents(InputMode::Navigation, &observations),
            vec![Intent::Move(Direction::Up), Intent::TogglePause]
        );
    }
}
