//! Planar coordinates shared by the robot scenarios. `y` grows upward.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn neighbors(self) -> [Point; 4] {
        [
            self.offset(0, 1),
            self.offset(0, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }
}

/// Facing of a turtle-style robot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    pub fn turn_left(self) -> Self {
        match self {
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
            Heading::Right => Heading::Up,
        }
    }

    pub fn turn_right(self) -> Self {
        match self {
            Heading::Up => Heading::Right,
            Heading::Right => Heading::Down,
            Heading::Down => Heading::Left,
            Heading::Left => Heading::Up,
        }
    }

    pub fn advance(self, from: Point) -> Point {
        match self {
            Heading::Up => from.offset(0, 1),
            Heading::Right => from.offset(1, 0),
            Heading::Down => from.offset(0, -1),
            Heading::Left => from.offset(-1, 0),
        }
    }
}

/// Draw the bounding box of `points`, top row first, one char per cell
pub fn render<I, F>(points: I, cell: F) -> String
where
    I: IntoIterator<Item = Point>,
    F: Fn(Point) -> char,
{
    let points: Vec<Point> = points.into_iter().collect();
    if points.is_empty() {
        return String::new();
    }

    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0);

    (min_y..=max_y)
        .rev()
        .map(|y| (min_x..=max_x).map(|x| cell(Point::new(x, y))).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
