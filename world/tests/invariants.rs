use std::collections::HashSet;

use proptest::prelude::*;
use snake_core::{CellCoord, Command, Difficulty, Direction, Grid};
use snake_world::{self as world, query, World};

const COLUMNS: u32 = 6;
const ROWS: u32 = 5;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        1 => direction().prop_map(|direction| Command::Steer { direction }),
        3 => Just(Command::Step),
        1 => (0..COLUMNS + 1, 0..ROWS + 1).prop_map(|(column, row)| Command::PlaceFood {
            cell: CellCoord::new(column, row),
        }),
    ]
}

proptest! {
    #[test]
    fn round_state_stays_consistent(commands in prop::collection::vec(command(), 0..200)) {
        let grid = Grid::new(COLUMNS, ROWS).expect("valid grid");
        let mut world = World::new(grid, Difficulty::Medium);

        for command in commands {
            let before = query::snake(&world).len();
            let mut events = Vec::new();
            world::apply(&mut world, command, &mut events);

            let cells = query::snake_cells(&world);
            let distinct: HashSet<CellCoord> = cells.iter().copied().collect();
            prop_assert_eq!(distinct.len(), cells.len());
            prop_assert!(cells.iter().all(|cell| grid.contains(*cell)));
            prop_assert_eq!(cells.len(), query::score(&world) as usize + 1);
            prop_assert_eq!(query::occupancy_view(&world).occupied_count(), cells.len());
            prop_assert!(cells.len() == before || cells.len() == before + 1);

            if let Some(food) = query::food(&world) {
                prop_assert!(grid.contains(food));
                prop_assert!(!distinct.contains(&food));
            }
        }
    }
}
