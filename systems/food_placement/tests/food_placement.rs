use proptest::prelude::*;
use snake_core::{CellCoord, Command, Difficulty, Direction, Event, Grid};
use snake_system_food_placement::{Config, FoodPlacement, FoodPlacementError};
use snake_world::{self as world, query, Snake, World};

fn place_food(
    world: &mut World,
    placement: &mut FoodPlacement,
) -> Result<Vec<Event>, FoodPlacementError> {
    let grid = query::grid(world);
    let occupancy = query::occupancy_view(world);
    let cell = placement.place(
        &grid,
        |cell| occupancy.is_occupied(cell),
        occupancy.occupied_count(),
    )?;

    let mut events = Vec::new();
    world::apply(world, Command::PlaceFood { cell }, &mut events);
    Ok(events)
}

#[test]
fn placed_food_is_accepted_by_the_world() {
    let mut world = World::new(Grid::default(), Difficulty::Medium);
    let mut placement = FoodPlacement::new(Config::new(42));

    let events = place_food(&mut world, &mut placement).expect("free cells remain");

    assert!(matches!(events.as_slice(), [Event::FoodPlaced { .. }]));
    assert!(query::food(&world).is_some());
}

#[test]
fn nearly_full_board_receives_food_in_the_last_gap() {
    let grid = Grid::new(3, 3).expect("valid grid");
    let body = [
        CellCoord::new(0, 0),
        CellCoord::new(1, 0),
        CellCoord::new(2, 0),
        CellCoord::new(2, 1),
        CellCoord::new(1, 1),
        CellCoord::new(0, 1),
        CellCoord::new(0, 2),
        CellCoord::new(1, 2),
    ];
    let snake = Snake::from_cells(&grid, body, Direction::Right).expect("valid body");
    let mut world = World::with_snake(grid, Difficulty::Easy, snake);
    let mut placement = FoodPlacement::new(Config::new(5));

    let _ = place_food(&mut world, &mut placement).expect("one cell remains");

    assert_eq!(query::food(&world), Some(CellCoord::new(2, 2)));
}

#[test]
fn board_covered_by_snake_reports_board_full() {
    let grid = Grid::new(2, 1).expect("valid grid");
    let snake = Snake::from_cells(
        &grid,
        [CellCoord::new(0, 0), CellCoord::new(1, 0)],
        Direction::Right,
    )
    .expect("valid body");
    let mut world = World::with_snake(grid, Difficulty::Easy, snake);
    let mut placement = FoodPlacement::new(Config::new(5));

    assert_eq!(
        place_food(&mut world, &mut placement),
        Err(FoodPlacementError::BoardFull)
    );
}

proptest! {
    #[test]
    fn food_never_lands_on_the_snake(
        seed in any::<u64>(),
        turns in prop::collection::vec(0u8..4, 1..120),
    ) {
        let grid = Grid::new(6, 6).expect("valid grid");
        let mut world = World::new(grid, Difficulty::Medium);
        let mut placement = FoodPlacement::new(Config::new(seed));
        let _ = place_food(&mut world, &mut placement);

        for turn in turns {
            let direction = match turn {
                0 => Direction::Up,
                1 => Direction::Down,
                2 => Direction::Left,
                _ => Direction::Right,
            };
            let mut events = Vec::new();
            world::apply(&mut world, Command::Steer { direction }, &mut events);
            world::apply(&mut world, Command::Step, &mut events);
            if query::is_finished(&world) {
                break;
            }
            if query::food(&world).is_none() && place_food(&mut world, &mut placement).is_err() {
                break;
            }

            let food = query::food(&world).expect("food placed");
            prop_assert!(!query::snake(&world).occupies(food));
        }
    }
}
