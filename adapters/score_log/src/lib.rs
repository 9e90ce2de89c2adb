#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Append-only plain text score log.
//!
//! Each record occupies one line of the form `name,timestamp,score`, where the
//! timestamp uses [`SCORE_TIMESTAMP_FORMAT`] in local time. Lines that do not
//! follow this shape are skipped when loading so that a damaged file never
//! prevents the game from starting.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use log::{info, warn};
use snake_core::{PersistenceError, PlayerName, ScoreEntry, ScoreStore, SCORE_TIMESTAMP_FORMAT};

/// File name used when no explicit score log location is configured.
pub const DEFAULT_FILE_NAME: &str = "highscores.log";

const FIELD_SEPARATOR: char = ',';

/// Score store backed by a plain text file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileScoreLog {
    path: PathBuf,
}

impl FileScoreLog {
    /// Creates a score log stored at the provided path.
    ///
    /// The file is not touched until the first read or append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileScoreLog {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

impl ScoreStore for FileScoreLog {
    fn append(&mut self, entry: &ScoreEntry) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;

        let mut line = format_line(entry);
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|source| self.write_error(source))?;
        file.sync_data().map_err(|source| self.write_error(source))?;

        info!(
            "recorded score {} for {} in {}",
            entry.score(),
            entry.player(),
            self.path.display()
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ScoreEntry>, PersistenceError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let entries = contents
            .split(|byte| *byte == b'\n')
            .enumerate()
            .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
            .filter_map(|(index, line)| {
                let entry = std::str::from_utf8(line)
                    .ok()
                    .map(|line| line.strip_suffix('\r').unwrap_or(line))
                    .and_then(parse_line);
                if entry.is_none() {
                    warn!(
                        "skipping malformed score line {} in {}",
                        index + 1,
                        self.path.display()
                    );
                }
                entry
            })
            .collect();
        Ok(entries)
    }
}

/// Formats an entry as a single score log line without the trailing newline.
#[must_use]
pub fn format_line(entry: &ScoreEntry) -> String {
    format!(
        "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
        entry.player(),
        entry.recorded_at().format(SCORE_TIMESTAMP_FORMAT),
        entry.score()
    )
}

/// Parses a single score log line.
///
/// Returns `None` for lines with the wrong number of fields, an invalid name,
/// an unparsable timestamp or a score that is not a non-negative integer.
#[must_use]
pub fn parse_line(line: &str) -> Option<ScoreEntry> {
    let mut fields = line.trim_end_matches('\r').split(FIELD_SEPARATOR);
    let name = fields.next()?;
    let timestamp = fields.next()?;
    let score = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let player = PlayerName::new(name).ok()?;
    let recorded_at =
        NaiveDateTime::parse_from_str(timestamp.trim(), SCORE_TIMESTAMP_FORMAT).ok()?;
    let score = score.trim().parse::<u32>().ok()?;
    Some(ScoreEntry::new(player, recorded_at, score))
}
