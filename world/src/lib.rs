#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Snake.

use std::collections::VecDeque;

use snake_core::{CellCoord, Command, Difficulty, Direction, Event, FoodRejection, Grid};
use thiserror::Error;

const SPAWN_HEADING: Direction = Direction::Up;

/// Outcome of advancing the snake by a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepResult {
    /// The head advanced and the tail followed, keeping the length constant.
    Moved,
    /// The head entered the food cell and the snake grew by one.
    Ate,
    /// The head would have entered a body cell; the body is unchanged.
    Collided,
}

/// Ordered snake body together with its heading.
///
/// The tail is the first element and the head the last. Every cell is
/// distinct, which is mirrored in a dense occupancy grid so that collision
/// checks do not scan the body.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<CellCoord>,
    head: CellCoord,
    heading: Direction,
    queued: Direction,
    occupancy: OccupancyGrid,
}

impl Snake {
    /// Creates a single-cell snake at `head` travelling in `heading`.
    ///
    /// A head outside the grid is wrapped back inside.
    #[must_use]
    pub fn new(grid: &Grid, head: CellCoord, heading: Direction) -> Self {
        let head = grid.wrap(i64::from(head.column()), i64::from(head.row()));
        let mut occupancy = OccupancyGrid::new(*grid);
        occupancy.occupy(head);

        Self {
            body: VecDeque::from([head]),
            head,
            heading,
            queued: heading,
            occupancy,
        }
    }

    /// Creates a snake from cells ordered tail first.
    pub fn from_cells<I>(grid: &Grid, cells: I, heading: Direction) -> Result<Self, BodyError>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut occupancy = OccupancyGrid::new(*grid);
        let mut body = VecDeque::new();
        for cell in cells {
            if !grid.contains(cell) {
                return Err(BodyError::OutOfBounds { cell });
            }
            if occupancy.is_occupied(cell) {
                return Err(BodyError::Overlapping { cell });
            }
            occupancy.occupy(cell);
            body.push_back(cell);
        }

        let head = body.back().copied().ok_or(BodyError::Empty)?;
        Ok(Self {
            body,
            head,
            heading,
            queued: heading,
            occupancy,
        })
    }

    /// Queues a change of direction for the next step.
    ///
    /// Requests that point exactly opposite to the direction of the last step
    /// are ignored, so any number of requests between two steps can never
    /// reverse the snake onto itself. Returns whether the request was kept.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        if requested.is_opposite(self.heading) {
            return false;
        }

        self.queued = requested;
        true
    }

    /// Advances the snake by exactly one cell.
    ///
    /// The new head is compared against the whole current body, tail
    /// included, before anything is appended or removed.
    pub fn step(&mut self, grid: &Grid, food: Option<CellCoord>) -> StepResult {
        let heading = self.queued;
        let next = grid.neighbor(self.head, heading);
        if self.occupancy.is_occupied(next) {
            return StepResult::Collided;
        }

        self.heading = heading;
        self.body.push_back(next);
        self.occupancy.occupy(next);
        self.head = next;

        if food == Some(next) {
            return StepResult::Ate;
        }

        if let Some(tail) = self.body.pop_front() {
            self.occupancy.vacate(tail);
        }
        StepResult::Moved
    }

    /// Cell occupied by the head.
    #[must_use]
    pub const fn head(&self) -> CellCoord {
        self.head
    }

    /// Cell occupied by the tail.
    #[must_use]
    pub fn tail(&self) -> CellCoord {
        self.body.front().copied().unwrap_or(self.head)
    }

    /// Direction used by the most recent step.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Direction the next step will use.
    #[must_use]
    pub const fn queued_heading(&self) -> Direction {
        self.queued
    }

    /// Number of cells covered by the snake.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always `false`; a snake covers at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Reports whether the snake covers the provided cell.
    #[must_use]
    pub fn occupies(&self, cell: CellCoord) -> bool {
        self.occupancy.is_occupied(cell)
    }

    /// Iterator over the body cells, tail first.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.body.iter().copied()
    }
}

/// Errors raised when constructing a snake from explicit cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BodyError {
    /// No cells were supplied.
    #[error("snake body must contain at least one cell")]
    Empty,
    /// A cell lies outside the grid.
    #[error("snake cell {cell} lies outside the grid")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// A cell appears more than once.
    #[error("snake cell {cell} appears more than once")]
    Overlapping {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Represents the authoritative state of a single round.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    difficulty: Difficulty,
    snake: Snake,
    food: Option<CellCoord>,
    score: u32,
    steps: u64,
    finished: bool,
}

impl World {
    /// Creates a round with a single-cell snake in the centre of the grid,
    /// travelling up. Food is placed separately via [`Command::PlaceFood`].
    #[must_use]
    pub fn new(grid: Grid, difficulty: Difficulty) -> Self {
        let snake = Snake::new(&grid, grid.center(), SPAWN_HEADING);
        Self::with_snake(grid, difficulty, snake)
    }

    /// Creates a round around an explicitly constructed snake.
    #[must_use]
    pub fn with_snake(grid: Grid, difficulty: Difficulty, snake: Snake) -> Self {
        Self {
            grid,
            difficulty,
            snake,
            food: None,
            score: 0,
            steps: 0,
            finished: false,
        }
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        if self.finished {
            return;
        }

        let tail = self.snake.tail();
        let food = self.food;
        match self.snake.step(&self.grid, food) {
            StepResult::Moved => {
                self.steps = self.steps.saturating_add(1);
                out_events.push(Event::SnakeAdvanced {
                    head: self.snake.head(),
                    vacated: Some(tail),
                });
            }
            StepResult::Ate => {
                self.steps = self.steps.saturating_add(1);
                self.score = self.score.saturating_add(1);
                self.food = None;
                let head = self.snake.head();
                out_events.push(Event::SnakeAdvanced {
                    head,
                    vacated: None,
                });
                out_events.push(Event::FoodEaten {
                    cell: head,
                    score: self.score,
                });
            }
            StepResult::Collided => {
                self.finished = true;
                out_events.push(Event::SnakeCollided {
                    cell: self
                        .grid
                        .neighbor(self.snake.head(), self.snake.queued_heading()),
                });
            }
        }
    }

    fn place_food(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let rejection = if !self.grid.contains(cell) {
            Some(FoodRejection::OutOfBounds)
        } else if self.snake.occupies(cell) {
            Some(FoodRejection::Occupied)
        } else {
            None
        };

        match rejection {
            Some(reason) => out_events.push(Event::FoodRejected { cell, reason }),
            None => {
                self.food = Some(cell);
                out_events.push(Event::FoodPlaced { cell });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Steer { direction } => {
            if world.finished {
                return;
            }
            if world.snake.set_direction(direction) {
                out_events.push(Event::HeadingQueued { direction });
            }
        }
        Command::Step => world.step(out_events),
        Command::PlaceFood { cell } => world.place_food(cell, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use snake_core::{CellCoord, Difficulty, Direction, Grid};

    use super::{OccupancyGrid, Snake, World};

    /// Provides the grid the round is played on.
    #[must_use]
    pub fn grid(world: &World) -> Grid {
        world.grid
    }

    /// Difficulty selected when the round started.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Read-only access to the snake.
    #[must_use]
    pub fn snake(world: &World) -> &Snake {
        &world.snake
    }

    /// Snake body cells ordered tail first.
    #[must_use]
    pub fn snake_cells(world: &World) -> Vec<CellCoord> {
        world.snake.cells().collect()
    }

    /// Cell occupied by the snake's head.
    #[must_use]
    pub fn head(world: &World) -> CellCoord {
        world.snake.head()
    }

    /// Direction used by the most recent step.
    #[must_use]
    pub fn heading(world: &World) -> Direction {
        world.snake.heading()
    }

    /// Cell currently holding food, if any has been placed.
    #[must_use]
    pub fn food(world: &World) -> Option<CellCoord> {
        world.food
    }

    /// Points collected so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of successful steps taken during the round.
    #[must_use]
    pub fn steps(world: &World) -> u64 {
        world.steps
    }

    /// Reports whether the snake collided with itself.
    #[must_use]
    pub fn is_finished(world: &World) -> bool {
        world.finished
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            grid: &world.snake.occupancy,
        }
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: &'a OccupancyGrid,
    }

    impl OccupancyView<'_> {
        /// Reports whether the snake covers the cell.
        #[must_use]
        pub fn is_occupied(&self, cell: CellCoord) -> bool {
            self.grid.is_occupied(cell)
        }

        /// Number of cells covered by the snake.
        #[must_use]
        pub fn occupied_count(&self) -> usize {
            self.grid.occupied
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    grid: Grid,
    cells: Vec<bool>,
    occupied: usize,
}

impl OccupancyGrid {
    fn new(grid: Grid) -> Self {
        Self {
            grid,
            cells: vec![false; grid.cell_count()],
            occupied: 0,
        }
    }

    fn is_occupied(&self, cell: CellCoord) -> bool {
        self.grid
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    fn occupy(&mut self, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            if !*slot {
                *slot = true;
                self.occupied += 1;
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            if *slot {
                *slot = false;
                self.occupied -= 1;
            }
        }
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut bool> {
        let index = self.grid.index(cell)?;
        self.cells.get_mut(index)
    }
}
