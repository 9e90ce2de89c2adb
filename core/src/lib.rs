#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative round state, and pure systems. Adapters decode raw device
//! input into [`Intent`] values, the session translates intents into
//! [`Command`] values, the world executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values for the session and
//! systems to react to deterministically.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Snake.";

/// Maximum number of characters accepted in a player name.
pub const MAX_NAME_LENGTH: usize = 10;

/// `chrono` format string used for score timestamps.
pub const SCORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Fixed-size toroidal coordinate space.
///
/// Every coordinate produced by [`Grid::wrap`] or [`Grid::neighbor`] lies
/// inside the grid, so moving off one edge re-enters on the opposite edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    columns: u32,
    rows: u32,
}

impl Grid {
    /// Number of columns used when no explicit configuration is supplied.
    pub const DEFAULT_COLUMNS: u32 = 25;

    /// Number of rows used when no explicit configuration is supplied.
    pub const DEFAULT_ROWS: u32 = 25;

    /// Creates a grid with the provided dimensions.
    ///
    /// Returns an error when either dimension is zero.
    pub fn new(columns: u32, rows: u32) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::Empty { columns, rows });
        }

        Ok(Self { columns, rows })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Cell located at the centre of the grid, rounding towards the origin.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, self.rows / 2)
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reduces both axes modulo the grid dimensions.
    ///
    /// Negative values wrap to the far edge, so `wrap(-1, 0)` yields the last
    /// column of the first row.
    #[must_use]
    pub fn wrap(&self, column: i64, row: i64) -> CellCoord {
        CellCoord::new(wrap_axis(column, self.columns), wrap_axis(row, self.rows))
    }

    /// Cell reached by moving a single step from `cell` in `direction`.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> CellCoord {
        let (delta_column, delta_row) = direction.delta();
        self.wrap(
            i64::from(cell.column()) + i64::from(delta_column),
            i64::from(cell.row()) + i64::from(delta_row),
        )
    }

    /// Dense row-major index of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| {
            (0..columns).map(move |column| CellCoord::new(column, row))
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            columns: Self::DEFAULT_COLUMNS,
            rows: Self::DEFAULT_ROWS,
        }
    }
}

fn wrap_axis(value: i64, extent: u32) -> u32 {
    let wrapped = value.rem_euclid(i64::from(extent.max(1)));
    u32::try_from(wrapped).unwrap_or(0)
}

/// Errors raised when configuring a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// At least one dimension was zero.
    #[error("grid dimensions must be positive (received {columns}x{rows})")]
    Empty {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
}

/// Cardinal movement directions available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Unit delta vector expressed as `(column, row)` offsets.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether `other` points exactly the opposite way.
    #[must_use]
    pub fn is_opposite(self, other: Self) -> bool {
        self.opposite() == other
    }
}

/// Discrete speed settings offered in the menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Five simulation ticks per second.
    Easy,
    /// Ten simulation ticks per second.
    #[default]
    Medium,
    /// Fifteen simulation ticks per second.
    Hard,
}

impl Difficulty {
    /// Every difficulty in menu order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Simulation steps performed per second of play.
    #[must_use]
    pub const fn ticks_per_second(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Medium => 10,
            Self::Hard => 15,
        }
    }

    /// Wall-clock time between two simulation steps.
    #[must_use]
    pub fn tick_interval(self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second()
    }

    /// Next difficulty in menu order, wrapping after the last entry.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }

    /// Previous difficulty in menu order, wrapping before the first entry.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Easy => Self::Hard,
            Self::Medium => Self::Easy,
            Self::Hard => Self::Medium,
        }
    }

    /// Human readable label shown in menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseDifficultyError(value.to_owned()))
    }
}

/// Error returned when a difficulty name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

/// Input intents decoded by adapters; the core never sees raw key codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Steer the snake or move the menu cursor.
    Move(Direction),
    /// Pause or resume an active round.
    TogglePause,
    /// Activate the highlighted menu item or submit the player name.
    Confirm,
    /// Leave the game from any state.
    Quit,
    /// Select the previous difficulty.
    CycleDifficultyLeft,
    /// Select the next difficulty.
    CycleDifficultyRight,
    /// Character typed while entering a player name.
    TextInput(char),
    /// Remove the last character of the player name.
    Backspace,
}

/// Commands that express all permissible round mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the snake travel in a new direction from the next step on.
    Steer {
        /// Requested direction of travel.
        direction: Direction,
    },
    /// Advances the snake by exactly one cell.
    Step,
    /// Places the food at the provided cell.
    PlaceFood {
        /// Cell that should hold the food.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a steering request will apply to the next step.
    HeadingQueued {
        /// Direction that will be used by the next step.
        direction: Direction,
    },
    /// Confirms that the snake moved its head into a new cell.
    SnakeAdvanced {
        /// Cell occupied by the new head.
        head: CellCoord,
        /// Tail cell released by the move, absent when the snake grew.
        vacated: Option<CellCoord>,
    },
    /// Reports that the snake consumed the food and grew.
    FoodEaten {
        /// Cell where the food was consumed.
        cell: CellCoord,
        /// Round score after consuming the food.
        score: u32,
    },
    /// Reports that the snake ran into its own body, ending the round.
    SnakeCollided {
        /// Body cell the head attempted to enter.
        cell: CellCoord,
    },
    /// Confirms that food was placed.
    FoodPlaced {
        /// Cell holding the food.
        cell: CellCoord,
    },
    /// Reports that a food placement request was rejected.
    FoodRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: FoodRejection,
    },
}

/// Reasons a food placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodRejection {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is covered by the snake.
    Occupied,
}

/// Validated player name recorded alongside a score.
///
/// Names are trimmed, contain between one and [`MAX_NAME_LENGTH`] printable
/// characters, and never contain the score log field separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// Validates and trims the provided name.
    pub fn new(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        let length = trimmed.chars().count();
        if length > MAX_NAME_LENGTH {
            return Err(NameError::TooLong { length });
        }

        if let Some(character) = trimmed.chars().find(|c| !is_name_character(*c)) {
            return Err(NameError::InvalidCharacter { character });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Borrowed view of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlayerName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PlayerName> for String {
    fn from(value: PlayerName) -> Self {
        value.0
    }
}

/// Reports whether `character` may appear in a player name.
///
/// Names are limited to visible characters and the plain space. Commas are
/// reserved for the score log line format.
#[must_use]
pub fn is_name_character(character: char) -> bool {
    if character == ' ' {
        return true;
    }
    !character.is_control()
        && !character.is_whitespace()
        && !is_format_character(character)
        && character != ','
}

/// Invisible formatting characters (Unicode category `Cf`).
const fn is_format_character(character: char) -> bool {
    matches!(
        character,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    )
}

/// Reasons a player name is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name was empty after trimming whitespace.
    #[error("player name must not be empty")]
    Empty,
    /// The name exceeded [`MAX_NAME_LENGTH`] characters.
    #[error("player name has {length} characters (at most {max} allowed)", max = MAX_NAME_LENGTH)]
    TooLong {
        /// Number of characters in the trimmed name.
        length: usize,
    },
    /// The name contained an invisible character or a comma.
    #[error("player name contains unsupported character {character:?}")]
    InvalidCharacter {
        /// First offending character.
        character: char,
    },
}

/// Immutable record describing the outcome of a finished round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    player: PlayerName,
    recorded_at: NaiveDateTime,
    score: u32,
}

impl ScoreEntry {
    /// Creates a new score entry.
    ///
    /// The timestamp is truncated to whole seconds to match the persisted
    /// representation.
    #[must_use]
    pub fn new(player: PlayerName, recorded_at: NaiveDateTime, score: u32) -> Self {
        Self {
            player,
            recorded_at: recorded_at.with_nanosecond(0).unwrap_or(recorded_at),
            score,
        }
    }

    /// Name of the player who achieved the score.
    #[must_use]
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    /// Local time at which the round ended.
    #[must_use]
    pub const fn recorded_at(&self) -> NaiveDateTime {
        self.recorded_at
    }

    /// Points collected during the round.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }
}

/// Durable, append-only storage for score entries.
pub trait ScoreStore {
    /// Appends a single entry without touching previously stored entries.
    fn append(&mut self, entry: &ScoreEntry) -> Result<(), PersistenceError>;

    /// Loads every readable entry in insertion order.
    fn load_all(&self) -> Result<Vec<ScoreEntry>, PersistenceError>;

    /// Loads the last `count` entries in insertion order.
    fn load_recent(&self, count: usize) -> Result<Vec<ScoreEntry>, PersistenceError> {
        let mut entries = self.load_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}

/// Failures raised while reading or writing the score log.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The score log could not be read.
    #[error("failed to read score log {}", .path.display())]
    Read {
        /// Location of the score log.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The score log could not be appended to.
    #[error("failed to append to score log {}", .path.display())]
    Write {
        /// Location of the score log.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
