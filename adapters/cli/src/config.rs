//! Layered runtime configuration: defaults, then an optional TOML file, then
//! command-line overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use snake_core::{Difficulty, Grid, GridError};
use snake_score_log::DEFAULT_FILE_NAME;
use thiserror::Error;

pub(crate) const DEFAULT_CELL_SIZE: f32 = 20.0;

/// Settings that may appear in the TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct FileConfig {
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) cell_size: Option<f32>,
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) scores: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) vsync: Option<bool>,
    pub(crate) show_fps: Option<bool>,
}

impl FileConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills every unset value from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            columns: self.columns.or(fallback.columns),
            rows: self.rows.or(fallback.rows),
            cell_size: self.cell_size.or(fallback.cell_size),
            difficulty: self.difficulty.or(fallback.difficulty),
            scores: self.scores.or(fallback.scores),
            seed: self.seed.or(fallback.seed),
            vsync: self.vsync.or(fallback.vsync),
            show_fps: self.show_fps.or(fallback.show_fps),
        }
    }
}

/// Fully resolved settings used to launch the game.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) grid: Grid,
    pub(crate) cell_size: f32,
    pub(crate) difficulty: Difficulty,
    pub(crate) scores_path: PathBuf,
    pub(crate) seed: Option<u64>,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
}

impl Settings {
    /// Resolves settings, preferring `overrides` over `file` over defaults.
    pub(crate) fn resolve(
        overrides: FileConfig,
        file: Option<FileConfig>,
    ) -> Result<Self, ConfigError> {
        let merged = overrides.or(file.unwrap_or_default());

        let grid = Grid::new(
            merged.columns.unwrap_or(Grid::DEFAULT_COLUMNS),
            merged.rows.unwrap_or(Grid::DEFAULT_ROWS),
        )?;
        let cell_size = merged.cell_size.unwrap_or(DEFAULT_CELL_SIZE);
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            grid,
            cell_size,
            difficulty: merged.difficulty.unwrap_or_default(),
            scores_path: merged
                .scores
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME)),
            seed: merged.seed,
            vsync: merged.vsync.unwrap_or(true),
            show_fps: merged.show_fps.unwrap_or(false),
        })
    }
}

/// Failures raised while assembling the runtime configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML or contains unknown keys.
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// The grid dimensions are unusable.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The cell size is not a positive number of pixels.
    #[error("cell size must be a positive number of pixels (received {cell_size})")]
    InvalidCellSize { cell_size: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<FileConfig, ConfigError> {
        FileConfig::parse(contents, Path::new("snake.toml"))
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::resolve(FileConfig::default(), None).expect("valid defaults");

        assert_eq!(settings.grid, Grid::default());
        assert_eq!(settings.cell_size, 20.0);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.scores_path, PathBuf::from("highscores.log"));
        assert_eq!(settings.seed, None);
        assert!(settings.vsync);
        assert!(!settings.show_fps);
    }

    #[test]
    fn file_values_are_parsed() {
        let file = parse(
            r#"
            columns = 30
            rows = 18
            cell-size = 16.0
            difficulty = "hard"
            scores = "data/scores.log"
            seed = 9
            vsync = false
            show-fps = true
            "#,
        )
        .expect("valid config");

        let settings = Settings::resolve(FileConfig::default(), Some(file)).expect("valid");

        assert_eq!(settings.grid, Grid::new(30, 18).expect("valid grid"));
        assert_eq!(settings.cell_size, 16.0);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.scores_path, PathBuf::from("data/scores.log"));
        assert_eq!(settings.seed, Some(9));
        assert!(!settings.vsync);
        assert!(settings.show_fps);
    }

    #[test]
    fn command_line_overrides_file() {
        let file = parse("columns = 30\ndifficulty = \"easy\"\nvsync = false").expect("valid");
        let overrides = FileConfig {
            columns: Some(12),
            vsync: Some(true),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(overrides, Some(file)).expect("valid");

        assert_eq!(settings.grid.columns(), 12);
        assert_eq!(settings.grid.rows(), Grid::DEFAULT_ROWS);
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert!(settings.vsync);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(parse("speed = 3"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn degenerate_values_are_rejected() {
        let zero_rows = FileConfig {
            rows: Some(0),
            ..FileConfig::default()
        };
        assert!(matches!(
            Settings::resolve(zero_rows, None),
            Err(ConfigError::Grid(GridError::Empty { .. }))
        ));

        let tiny_cells = FileConfig {
            cell_size: Some(0.0),
            ..FileConfig::default()
        };
        assert!(matches!(
            Settings::resolve(tiny_cells, None),
            Err(ConfigError::InvalidCellSize { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join(format!(
            "snake-missing-config-{}.toml",
            std::process::id()
        ));

        let error = FileConfig::load(&path).expect_err("file does not exist");

        assert!(error.to_string().contains("snake-missing-config"));
    }
}
