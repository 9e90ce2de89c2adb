#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game state machine that drives menus, rounds, pausing and name entry.
//!
//! Adapters feed decoded [`Intent`] values and a count of elapsed simulation
//! ticks into [`Session::step`] once per frame and render the
//! [`SessionSnapshot`] it exposes. The session never touches a clock or a
//! display directly.

use std::{mem, time::Duration};

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use snake_core::{
    is_name_character, CellCoord, Command, Difficulty, Direction, Event, Grid, Intent, PlayerName,
    ScoreEntry, ScoreStore, MAX_NAME_LENGTH,
};
use snake_system_food_placement::{self as food_placement, FoodPlacement, FoodPlacementError};
use snake_world::{self as world, query, World};

/// Number of score entries listed on the menu.
pub const RECENT_SCORES_SHOWN: usize = 5;

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    grid: Grid,
    difficulty: Difficulty,
    food: food_placement::Config,
}

impl Config {
    /// Creates a configuration for the provided grid and initial difficulty.
    #[must_use]
    pub const fn new(grid: Grid, difficulty: Difficulty, food: food_placement::Config) -> Self {
        Self {
            grid,
            difficulty,
            food,
        }
    }
}

/// Result of a session step telling the adapter whether to keep running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Keep presenting frames.
    Continue,
    /// The player asked to leave the game.
    Quit,
}

/// Coarse state of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The main menu is shown.
    Menu,
    /// A round is running.
    Playing,
    /// A round is suspended.
    Paused,
    /// A round has ended and the player name is being collected.
    GameOver,
}

/// Entries of the main menu in display order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Difficulty selector.
    #[default]
    Difficulty,
    /// Starts a new round.
    StartGame,
    /// Lists the most recent scores.
    HighScores,
    /// Leaves the game.
    Quit,
}

impl MenuItem {
    /// Every menu item in display order.
    pub const ALL: [MenuItem; 4] = [
        Self::Difficulty,
        Self::StartGame,
        Self::HighScores,
        Self::Quit,
    ];

    const fn next(self) -> Self {
        match self {
            Self::Difficulty => Self::StartGame,
            Self::StartGame => Self::HighScores,
            Self::HighScores => Self::Quit,
            Self::Quit => Self::Difficulty,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Difficulty => Self::Quit,
            Self::StartGame => Self::Difficulty,
            Self::HighScores => Self::StartGame,
            Self::Quit => Self::HighScores,
        }
    }

    /// Text shown for the item, without the selected difficulty.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Difficulty => "Difficulty:",
            Self::StartGame => "Start Game",
            Self::HighScores => "High Scores",
            Self::Quit => "Quit",
        }
    }
}

/// Reason a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The snake ran into its own body.
    Collided,
    /// The snake covers every cell, so no food can be placed.
    BoardFull,
}

/// Non-fatal problems reported to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Appending to the score log failed.
    ScoresNotSaved,
    /// Reading the score log failed.
    ScoresUnavailable,
}

impl Notice {
    /// Message shown to the player.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ScoresNotSaved => "Scores not saved.",
            Self::ScoresUnavailable => "High scores unavailable.",
        }
    }
}

/// Read-only projection of the session consumed by renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current coarse state.
    pub phase: Phase,
    /// Grid of the current or next round.
    pub grid: Grid,
    /// Difficulty selected in the menu, or used by the current round.
    pub difficulty: Difficulty,
    /// Highlighted menu item.
    pub selected_item: MenuItem,
    /// Most recent scores, oldest first.
    pub recent_scores: Vec<ScoreEntry>,
    /// Snake cells ordered tail first; empty outside a round.
    pub snake: Vec<CellCoord>,
    /// Cell holding the food, if any.
    pub food: Option<CellCoord>,
    /// Score of the current or last round.
    pub score: u32,
    /// Player name typed so far.
    pub name_buffer: String,
    /// Reason the last round ended, while its name is being collected.
    pub outcome: Option<Outcome>,
    /// Pending problem report.
    pub notice: Option<Notice>,
}

impl SessionSnapshot {
    /// Reports whether the round is suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    /// Cell occupied by the snake's head, if a round is shown.
    #[must_use]
    pub fn head(&self) -> Option<CellCoord> {
        self.snake.last().copied()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct MenuState {
    selected: MenuItem,
}

#[derive(Debug)]
struct Round {
    world: World,
    paused: bool,
}

#[derive(Debug)]
struct Finished {
    world: World,
    outcome: Outcome,
    name: String,
}

#[derive(Debug)]
enum State {
    Menu(MenuState),
    Round(Round),
    GameOver(Finished),
}

/// Drives the game through its menu, round and name entry states.
#[derive(Debug)]
pub struct Session<S> {
    grid: Grid,
    difficulty: Difficulty,
    placement: FoodPlacement,
    store: S,
    state: State,
    recent_scores: Vec<ScoreEntry>,
    notice: Option<Notice>,
}

impl<S: ScoreStore> Session<S> {
    /// Creates a session showing the main menu.
    pub fn new(config: Config, store: S) -> Self {
        let mut session = Self {
            grid: config.grid,
            difficulty: config.difficulty,
            placement: FoodPlacement::new(config.food),
            store,
            state: State::Menu(MenuState::default()),
            recent_scores: Vec::new(),
            notice: None,
        };
        session.reload_scores();
        session
    }

    /// Processes the frame's intents in order, then runs up to
    /// `elapsed_ticks` simulation steps if a round is still running.
    ///
    /// `now` stamps any score recorded during this call.
    pub fn step(&mut self, intents: &[Intent], elapsed_ticks: u32, now: NaiveDateTime) -> Control {
        for intent in intents {
            if self.handle_intent(*intent, now) == Control::Quit {
                info!("quit requested");
                return Control::Quit;
            }
        }

        for _ in 0..elapsed_ticks {
            if !self.tick() {
                break;
            }
        }

        Control::Continue
    }

    /// Coarse state of the session.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Menu(_) => Phase::Menu,
            State::Round(round) if round.paused => Phase::Paused,
            State::Round(_) => Phase::Playing,
            State::GameOver(_) => Phase::GameOver,
        }
    }

    /// Time between two simulation steps while a round is running.
    ///
    /// Returns `None` whenever ticks would be discarded, which tells the
    /// adapter to reset its tick clock.
    #[must_use]
    pub fn tick_interval(&self) -> Option<Duration> {
        match &self.state {
            State::Round(round) if !round.paused => {
                Some(query::difficulty(&round.world).tick_interval())
            }
            _ => None,
        }
    }

    /// Read-only access to the score store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Captures the state needed to render the current frame.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot {
            phase: self.phase(),
            grid: self.grid,
            difficulty: self.difficulty,
            selected_item: MenuItem::default(),
            recent_scores: self.recent_scores.clone(),
            snake: Vec::new(),
            food: None,
            score: 0,
            name_buffer: String::new(),
            outcome: None,
            notice: self.notice,
        };

        let world = match &self.state {
            State::Menu(menu) => {
                snapshot.selected_item = menu.selected;
                None
            }
            State::Round(round) => Some(&round.world),
            State::GameOver(finished) => {
                snapshot.name_buffer.clone_from(&finished.name);
                snapshot.outcome = Some(finished.outcome);
                Some(&finished.world)
            }
        };

        if let Some(world) = world {
            snapshot.grid = query::grid(world);
            snapshot.difficulty = query::difficulty(world);
            snapshot.snake = query::snake_cells(world);
            snapshot.food = query::food(world);
            snapshot.score = query::score(world);
        }

        snapshot
    }

    fn handle_intent(&mut self, intent: Intent, now: NaiveDateTime) -> Control {
        if intent == Intent::Quit {
            return Control::Quit;
        }

        match &mut self.state {
            State::Menu(menu) => match intent {
                Intent::Move(Direction::Up) => menu.selected = menu.selected.previous(),
                Intent::Move(Direction::Down) => menu.selected = menu.selected.next(),
                Intent::Move(Direction::Left) if menu.selected == MenuItem::Difficulty => {
                    self.difficulty = self.difficulty.previous();
                }
                Intent::Move(Direction::Right) if menu.selected == MenuItem::Difficulty => {
                    self.difficulty = self.difficulty.next();
                }
                Intent::CycleDifficultyLeft => self.difficulty = self.difficulty.previous(),
                Intent::CycleDifficultyRight => self.difficulty = self.difficulty.next(),
                Intent::Confirm => {
                    let selected = menu.selected;
                    match selected {
                        MenuItem::StartGame => self.start_round(),
                        MenuItem::HighScores => self.reload_scores(),
                        MenuItem::Quit => return Control::Quit,
                        MenuItem::Difficulty => {}
                    }
                }
                _ => {}
            },
            State::Round(round) => match intent {
                Intent::TogglePause => {
                    round.paused = !round.paused;
                    debug!("round {}", if round.paused { "paused" } else { "resumed" });
                }
                Intent::Move(direction) if !round.paused => steer(&mut round.world, direction),
                _ => {}
            },
            State::GameOver(finished) => match intent {
                Intent::TextInput(character) => {
                    if is_name_character(character)
                        && finished.name.chars().count() < MAX_NAME_LENGTH
                    {
                        finished.name.push(character);
                    }
                }
                Intent::Backspace => {
                    let _ = finished.name.pop();
                }
                Intent::Confirm => self.submit_name(now),
                _ => {}
            },
        }

        Control::Continue
    }

    fn start_round(&mut self) {
        info!(
            "starting round on {}x{} grid at {} difficulty",
            self.grid.columns(),
            self.grid.rows(),
            self.difficulty
        );
        self.notice = None;
        self.state = State::Round(Round {
            world: World::new(self.grid, self.difficulty),
            paused: false,
        });

        if let Err(FoodPlacementError::BoardFull) = self.place_food() {
            self.finish_round(Outcome::BoardFull);
        }
    }

    /// Advances the running round by one step. Returns `false` once no
    /// further ticks can be consumed this frame.
    fn tick(&mut self) -> bool {
        let State::Round(round) = &mut self.state else {
            return false;
        };
        if round.paused {
            return false;
        }

        let mut events = Vec::new();
        world::apply(&mut round.world, Command::Step, &mut events);

        for event in events {
            match event {
                Event::SnakeCollided { cell } => {
                    debug!("snake collided at {cell}");
                    self.finish_round(Outcome::Collided);
                    return false;
                }
                Event::FoodEaten { score, .. } => {
                    debug!("food eaten, score {score}");
                    if let Err(FoodPlacementError::BoardFull) = self.place_food() {
                        self.finish_round(Outcome::BoardFull);
                        return false;
                    }
                }
                _ => {}
            }
        }

        true
    }

    fn place_food(&mut self) -> Result<(), FoodPlacementError> {
        let State::Round(round) = &mut self.state else {
            return Ok(());
        };

        let grid = query::grid(&round.world);
        let occupancy = query::occupancy_view(&round.world);
        let cell = self.placement.place(
            &grid,
            |cell| occupancy.is_occupied(cell),
            occupancy.occupied_count(),
        )?;

        let mut events = Vec::new();
        world::apply(&mut round.world, Command::PlaceFood { cell }, &mut events);
        for event in events {
            if let Event::FoodRejected { cell, reason } = event {
                warn!("food placement at {cell} rejected: {reason:?}");
            }
        }
        Ok(())
    }

    fn finish_round(&mut self, outcome: Outcome) {
        let previous = mem::replace(&mut self.state, State::Menu(MenuState::default()));
        self.state = match previous {
            State::Round(round) => {
                info!(
                    "round over ({outcome:?}) with score {}",
                    query::score(&round.world)
                );
                State::GameOver(Finished {
                    world: round.world,
                    outcome,
                    name: String::new(),
                })
            }
            other => other,
        };
    }

    fn submit_name(&mut self, now: NaiveDateTime) {
        let State::GameOver(finished) = &self.state else {
            return;
        };
        let Ok(player) = PlayerName::new(&finished.name) else {
            return;
        };

        let entry = ScoreEntry::new(player, now, query::score(&finished.world));
        if let Err(error) = self.store.append(&entry) {
            warn!("failed to record score: {error}");
            self.notice = Some(Notice::ScoresNotSaved);
        }

        self.state = State::Menu(MenuState::default());
        self.reload_scores();
    }

    fn reload_scores(&mut self) {
        match self.store.load_recent(RECENT_SCORES_SHOWN) {
            Ok(entries) => self.recent_scores = entries,
            Err(error) => {
                warn!("failed to load scores: {error}");
                if self.notice.is_none() {
                    self.notice = Some(Notice::ScoresUnavailable);
                }
            }
        }
    }
}

fn steer(world: &mut World, direction: Direction) {
    let mut events = Vec::new();
    world::apply(world, Command::Steer { direction }, &mut events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use snake_core::PersistenceError;

    #[derive(Debug, Default)]
    struct MemoryStore {
        entries: Vec<ScoreEntry>,
    }

    impl ScoreStore for MemoryStore {
        fn append(&mut self, entry: &ScoreEntry) -> Result<(), PersistenceError> {
            self.entries.push(entry.clone());
            Ok(())
        }

        fn load_all(&self) -> Result<Vec<ScoreEntry>, PersistenceError> {
            Ok(self.entries.clone())
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    fn new_session() -> Session<MemoryStore> {
        let config = Config::new(
            Grid::default(),
            Difficulty::Medium,
            food_placement::Config::new(11),
        );
        Session::new(config, MemoryStore::default())
    }

    #[test]
    fn menu_selection_wraps_in_both_directions() {
        let mut session = new_session();

        let _ = session.step(&[Intent::Move(Direction::Up)], 0, now());
        assert_eq!(session.snapshot().selected_item, MenuItem::Quit);

        let _ = session.step(&[Intent::Move(Direction::Down)], 0, now());
        assert_eq!(session.snapshot().selected_item, MenuItem::Difficulty);
    }

    #[test]
    fn horizontal_moves_only_cycle_difficulty_on_its_item() {
        let mut session = new_session();

        let _ = session.step(&[Intent::Move(Direction::Right)], 0, now());
        assert_eq!(session.snapshot().difficulty, Difficulty::Hard);

        let _ = session.step(
            &[Intent::Move(Direction::Down), Intent::Move(Direction::Left)],
            0,
            now(),
        );
        assert_eq!(session.snapshot().difficulty, Difficulty::Hard);

        let _ = session.step(&[Intent::CycleDifficultyRight], 0, now());
        assert_eq!(session.snapshot().difficulty, Difficulty::Easy);
    }

    #[test]
    fn quit_is_accepted_in_every_phase() {
        let mut session = new_session();
        assert_eq!(session.step(&[Intent::Quit], 0, now()), Control::Quit);

        let mut session = new_session();
        let _ = session.step(&[Intent::Move(Direction::Down), Intent::Confirm], 0, now());
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.step(&[Intent::Quit], 0, now()), Control::Quit);

        let mut session = new_session();
        let _ = session.step(
            &[
                Intent::Move(Direction::Down),
                Intent::Confirm,
                Intent::TogglePause,
            ],
            0,
            now(),
        );
        assert_eq!(session.phase(), Phase::Paused);
        assert_eq!(session.step(&[Intent::Quit], 0, now()), Control::Quit);
    }

    #[test]
    fn ticks_are_ignored_outside_a_running_round() {
        let mut session = new_session();
        let before = session.snapshot();

        let _ = session.step(&[], 10, now());

        assert_eq!(session.snapshot(), before);
        assert_eq!(session.tick_interval(), None);
    }

    #[test]
    fn name_buffer_enforces_length_and_character_rules() {
        let mut session = new_session();
        session.state = State::GameOver(Finished {
            world: World::new(Grid::default(), Difficulty::Easy),
            outcome: Outcome::Collided,
            name: String::new(),
        });

        let typed: Vec<Intent> = "a,b\u{7}cdefghijklm".chars().map(Intent::TextInput).collect();
        let _ = session.step(&typed, 0, now());
        assert_eq!(session.snapshot().name_buffer, "abcdefghij");

        let _ = session.step(&[Intent::Backspace, Intent::Backspace], 0, now());
        assert_eq!(session.snapshot().name_buffer, "abcdefgh");
    }
}
