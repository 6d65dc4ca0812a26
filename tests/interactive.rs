use std::time::Duration;

use intcode_vm::compose::arcade::{count_blocks, play};
use intcode_vm::compose::droid::{explore_program, Cell};
use intcode_vm::compose::grid::Point;
use intcode_vm::compose::painter::{paint, Color};
use intcode_vm::compose::ComposeError;

const QUIET: Duration = Duration::from_millis(250);

/// Robot that ignores the camera and replays a fixed list of (colour, turn) pairs
fn scripted_robot(pairs: &[(i64, i64)]) -> Vec<i64> {
    let mut image = Vec::new();
    for &(color, turn) in pairs {
        image.extend([3, 100, 104, color, 104, turn]);
    }
    image.push(99);
    image
}

#[tokio::test]
async fn test_painter_scripted_robot() {
    let image = scripted_robot(&[(1, 0), (0, 0), (1, 0), (1, 0), (0, 1), (1, 0), (1, 0)]);
    let hull = paint(image, Color::Black, QUIET).await.unwrap();

    assert_eq!(hull.painted(), 6);
    assert_eq!(hull.white_panels(), 4);
    assert_eq!(hull.color_at(Point::ORIGIN), Color::Black);
}

#[tokio::test]
async fn test_painter_rejects_bad_turn() {
    let image = scripted_robot(&[(1, 7)]);
    let err = paint(image, Color::Black, QUIET).await.unwrap_err();
    assert!(matches!(
        err,
        ComposeError::UnexpectedOutput { what: "turn", value: 7 }
    ));
}

#[tokio::test]
async fn test_painter_stops_on_quiet_machine() {
    // Paints once, then spins forever without asking for input
    let image = vec![3, 100, 104, 1, 104, 1, 1105, 1, 6];
    let hull = paint(image, Color::Black, Duration::from_millis(100)).await.unwrap();
    assert_eq!(hull.painted(), 1);
}

/// Draws a paddle, a block and the ball, reads one joystick move, then
/// clears the block and reports a score of 100 times the move
const ARCADE: [i64; 41] = [
    1, 0, 0, 50, // overwritten by the coin
    104, 1, 104, 5, 104, 3, // paddle at x = 1
    104, 2, 104, 0, 104, 2, // block
    104, 3, 104, 4, 104, 4, // ball at x = 3
    3, 51, // joystick
    102, 100, 51, 52, //
    104, 2, 104, 0, 104, 0, // block cleared
    104, -1, 104, 0, 4, 52, // score
    99,
];

#[tokio::test]
async fn test_arcade_play() {
    let game = play(ARCADE.to_vec(), QUIET).await.unwrap();
    assert_eq!(game.score, 100);
    assert_eq!(game.blocks_remaining, 0);
    assert_eq!(game.moves, 1);
}

#[tokio::test]
async fn test_arcade_count_blocks_without_coin() {
    // Two blocks and a wall
    let image = vec![104, 2, 104, 0, 104, 2, 104, 3, 104, 0, 104, 2, 104, 1, 104, 1, 104, 1, 99];
    assert_eq!(count_blocks(image).await.unwrap(), 2);
}

/// Droid firmware for a one-cell maze: the only open neighbour of the start
/// is the oxygen system to the east
const DROID: [i64; 53] = [
    3, 100, // command
    1008, 100, 4, 102, 1006, 102, 25, // not east -> 25
    1008, 101, 0, 102, 1006, 102, 48, // already east -> wall
    1101, 1, 0, 101, 104, 2, 1105, 1, 0, // step east onto oxygen
    1008, 100, 3, 102, 1006, 102, 48, // not west -> wall
    1008, 101, 1, 102, 1006, 102, 48, // at start -> wall
    1101, 0, 0, 101, 104, 1, 1105, 1, 0, // step back west
    104, 0, 1105, 1, 0, // wall
];

#[tokio::test]
async fn test_droid_explores_machine_maze() {
    let map = explore_program(DROID.to_vec(), QUIET).await.unwrap();

    assert_eq!(map.oxygen(), Some(Point::new(1, 0)));
    assert_eq!(map.get(Point::new(-1, 0)), Some(Cell::Wall));
    assert_eq!(map.get(Point::new(2, 0)), Some(Cell::Wall));
    assert_eq!(map.open_cells(), 2);
    assert_eq!(map.shortest_path(), Some(1));
    assert_eq!(map.fill_time(), Some(1));
}
