#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Snake adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use snake_core::{CellCoord, Intent};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb_u8(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb_u8(255, 255, 255);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// How the backend should interpret key presses on the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Keys map to movement, menu and pause intents.
    #[default]
    Navigation,
    /// Printable characters are forwarded as text.
    TextEntry,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Intents decoded from the keys pressed since the previous frame, in order.
    pub intents: Vec<Intent>,
}

/// Instruction returned by the scene update telling the backend whether to continue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present the frame and keep running.
    Continue,
    /// Close the window and return from [`RenderingBackend::run`].
    Exit,
}

/// Describes the cell board rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardPresentation {
    /// Number of columns contained in the board.
    pub columns: u32,
    /// Number of rows contained in the board.
    pub rows: u32,
    /// Side length of a single cell in pixels.
    pub cell_length: f32,
}

impl BoardPresentation {
    /// Creates a new board descriptor.
    ///
    /// Returns an error when either dimension is zero or the cell length is not
    /// a positive finite number.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::InvalidDimensions { columns, rows });
        }
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// Width of the board in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Height of the board in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Top-left pixel position of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_length
    }

    /// Pixel position of the board centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width(), self.height()) * 0.5
    }
}

/// Single coloured cell drawn on the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Cell location.
    pub cell: CellCoord,
    /// Fill color.
    pub color: Color,
}

impl CellPresentation {
    /// Creates a new cell descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, color: Color) -> Self {
        Self { cell, color }
    }
}

/// Line of text drawn by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Text content.
    pub text: String,
    /// Text color.
    pub color: Color,
}

impl TextLine {
    /// Creates a new text line.
    #[must_use]
    pub fn new<T>(text: T, color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Block of centred text drawn above the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    /// Lines drawn top to bottom.
    pub lines: Vec<TextLine>,
    /// Translucent color filled over the board before the text, if any.
    pub backdrop: Option<Color>,
}

impl Overlay {
    /// Creates an overlay without a backdrop.
    #[must_use]
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self {
            lines,
            backdrop: None,
        }
    }

    /// Fills the board with the provided color before drawing the text.
    #[must_use]
    pub fn with_backdrop(mut self, backdrop: Color) -> Self {
        self.backdrop = Some(backdrop);
        self
    }
}

/// Scene description combining the board, its inhabitants and text.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board that composes the play area.
    pub board: BoardPresentation,
    /// Snake cells ordered tail first; the last entry is the head.
    pub snake: Vec<CellPresentation>,
    /// Food cell, if one is visible.
    pub food: Option<CellPresentation>,
    /// Status line drawn in the top-left corner.
    pub hud: Option<TextLine>,
    /// Centred text block such as a menu or pause message.
    pub overlay: Option<Overlay>,
    /// How key presses should be decoded on the next frame.
    pub input_mode: InputMode,
}

impl Scene {
    /// Creates an empty scene for the provided board.
    #[must_use]
    pub fn new(board: BoardPresentation) -> Self {
        Self {
            board,
            snake: Vec::new(),
            food: None,
            hud: None,
            overlay: None,
            input_mode: InputMode::Navigation,
        }
    }

    /// Cell drawn as the snake's head, if any.
    #[must_use]
    pub fn head(&self) -> Option<&CellPresentation> {
        self.snake.last()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Snake scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the window closes or `update_scene`
    /// returns [`FrameControl::Exit`].
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// the intents decoded on this frame, and may mutate the scene before it
    /// is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Both board dimensions must be positive.
    InvalidDimensions {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Cells must have a positive finite side length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { columns, rows } => {
                write!(
                    f,
                    "board dimensions must be positive (received {columns}x{rows})"
                )
            }
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_creation_accepts_positive_dimensions() {
        let board = BoardPresentation::new(25, 20, 16.0).expect("valid board");

        assert_eq!(board.width(), 400.0);
        assert_eq!(board.height(), 320.0);
        assert_eq!(board.center(), Vec2::new(200.0, 160.0));
    }

    #[test]
    fn board_creation_rejects_zero_dimensions_without_panicking() {
        let error = BoardPresentation::new(0, 5, 16.0).expect_err("zero columns must be rejected");

        assert_eq!(
            error,
            RenderingError::InvalidDimensions {
                columns: 0,
                rows: 5
            }
        );
    }

    #[test]
    fn board_creation_rejects_degenerate_cell_lengths() {
        for cell_length in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            let error = BoardPresentation::new(4, 4, cell_length)
                .expect_err("degenerate cell length must be rejected");

            assert!(matches!(error, RenderingError::InvalidCellLength { .. }));
        }
    }

    #[test]
    fn cell_origin_scales_by_cell_length() {
        let board = BoardPresentation::new(10, 10, 20.0).expect("valid board");

        assert_eq!(
            board.cell_origin(CellCoord::new(3, 7)),
            Vec2::new(60.0, 140.0)
        );
    }

    #[test]
    fn new_scene_is_empty_navigation_scene() {
        let board = BoardPresentation::new(5, 5, 10.0).expect("valid board");
        let scene = Scene::new(board);

        assert_eq!(scene.board, board);
        assert!(scene.snake.is_empty());
        assert!(scene.head().is_none());
        assert!(scene.food.is_none());
        assert!(scene.hud.is_none());
        assert!(scene.overlay.is_none());
        assert_eq!(scene.input_mode, InputMode::Navigation);
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 128, 255).lighten(0.5);

        assert!((color.red - 0.5).abs() < 1e-6);
        assert!(color.green > 128.0 / 255.0);
        assert!((color.blue - 1.0).abs() < 1e-6);
        assert_eq!(Color::WHITE.with_alpha(0.25).alpha, 0.25);
    }
}
