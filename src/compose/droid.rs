//! Maze-exploring repair droid
//!
//! The droid accepts movement commands (1 north, 2 south, 3 west, 4 east) and
//! answers each with a status: 0 hit a wall, 1 moved, 2 moved onto the oxygen
//! system. `explore` maps the whole reachable area with a depth-first walk,
//! backtracking along its own path when a cell has nothing left to try.
//!
//! Exploration only talks to the `Droid` trait; `MachineDroid` is the
//! implementation backed by a running machine.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;

use crate::compose::grid::{render, Point};
use crate::compose::{next_output, ComposeError};
use crate::vm::{spawn, Channel, MachineHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    North,
    South,
    West,
    East,
}

impl Movement {
    /// Tried in reverse order, so east goes first
    pub const ALL: [Movement; 4] = [
        Movement::North,
        Movement::South,
        Movement::West,
        Movement::East,
    ];

    pub fn code(self) -> i64 {
        match self {
            Movement::North => 1,
            Movement::South => 2,
            Movement::West => 3,
            Movement::East => 4,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Movement::North => Movement::South,
            Movement::South => Movement::North,
            Movement::West => Movement::East,
            Movement::East => Movement::West,
        }
    }

    pub fn apply(self, from: Point) -> Point {
        match self {
            Movement::North => from.offset(0, 1),
            Movement::South => from.offset(0, -1),
            Movement::West => from.offset(-1, 0),
            Movement::East => from.offset(1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Wall,
    Moved,
    Oxygen,
}

impl Status {
    pub fn from_code(code: i64) -> Result<Self, ComposeError> {
        match code {
            0 => Ok(Status::Wall),
            1 => Ok(Status::Moved),
            2 => Ok(Status::Oxygen),
            value => Err(ComposeError::UnexpectedOutput {
                what: "droid status",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cell {
    Wall,
    Open,
    Oxygen,
}

/// Something that can be steered one cell at a time
#[async_trait]
pub trait Droid: Send {
    async fn command(&mut self, movement: Movement) -> Result<Status, ComposeError>;
}

/// A droid whose firmware runs on a machine
pub struct MachineDroid {
    input: Channel,
    output: Channel,
    handle: MachineHandle,
    quiet: Duration,
}

impl MachineDroid {
    pub fn spawn(image: Vec<i64>, quiet: Duration) -> Self {
        let input = Channel::new();
        let output = Channel::new();
        let handle = spawn(image, input.clone(), output.clone());
        Self {
            input,
            output,
            handle,
            quiet,
        }
    }

    /// Stop the firmware, which is normally parked waiting for a command
    pub async fn shutdown(self) -> Result<(), ComposeError> {
        self.handle.force_halt();
        self.handle.wait().await?;
        Ok(())
    }
}

#[async_trait]
impl Droid for MachineDroid {
    async fn command(&mut self, movement: Movement) -> Result<Status, ComposeError> {
        self.input.push(movement.code());
        let code = next_output(&self.output, &self.handle, self.quiet)
            .await
            .ok_or(ComposeError::NoOutput)?;
        Status::from_code(code)
    }
}

/// Cells discovered by exploration; the origin is always open
#[derive(Debug, Clone)]
pub struct ShipMap {
    cells: HashMap<Point, Cell>,
}

impl Default for ShipMap {
    fn default() -> Self {
        Self {
            cells: HashMap::from([(Point::ORIGIN, Cell::Open)]),
        }
    }
}

impl ShipMap {
    pub fn get(&self, point: Point) -> Option<Cell> {
        self.cells.get(&point).copied()
    }

    pub fn oxygen(&self) -> Option<Point> {
        self.cells
            .iter()
            .find(|(_, &cell)| cell == Cell::Oxygen)
            .map(|(&point, _)| point)
    }

    pub fn open_cells(&self) -> usize {
        self.cells.values().filter(|&&c| c != Cell::Wall).count()
    }

    /// Fewest moves from the origin to the oxygen system
    pub fn shortest_path(&self) -> Option<usize> {
        let oxygen = self.oxygen()?;
        self.distances_from(Point::ORIGIN).get(&oxygen).copied()
    }

    /// Minutes for oxygen to reach every open cell, spreading one cell a minute
    pub fn fill_time(&self) -> Option<usize> {
        let oxygen = self.oxygen()?;
        self.distances_from(oxygen).values().max().copied()
    }

    fn distances_from(&self, start: Point) -> HashMap<Point, usize> {
        let mut distances = HashMap::from([(start, 0)]);
        let mut queue = VecDeque::from([start]);

        while let Some(point) = queue.pop_front() {
            let distance = distances[&point];
            for next in point.neighbors() {
                let passable = matches!(self.get(next), Some(Cell::Open | Cell::Oxygen));
                if passable && !distances.contains_key(&next) {
                    distances.insert(next, distance + 1);
                    queue.push_back(next);
                }
            }
        }
        distances
    }

    /// `#` wall, `.` open, `O` oxygen, `D` origin, space unknown
    pub fn render(&self) -> String {
        render(self.cells.keys().copied(), |point| {
            if point == Point::ORIGIN {
                return 'D';
            }
            match self.get(point) {
                Some(Cell::Wall) => '#',
                Some(Cell::Open) => '.',
                Some(Cell::Oxygen) => 'O',
                None => ' ',
            }
        })
    }
}

/// Map everything reachable from the droid's starting cell
pub async fn explore<D>(droid: &mut D) -> Result<ShipMap, ComposeError>
where
    D: Droid + ?Sized,
{
    let mut map = ShipMap::default();
    let mut position = Point::ORIGIN;
    let mut path: Vec<Movement> = Vec::new();
    let mut untried: HashMap<Point, Vec<Movement>> = HashMap::new();

    loop {
        let options = untried
            .entry(position)
            .or_insert_with(|| Movement::ALL.to_vec());

        let mut next = None;
        while let Some(movement) = options.pop() {
            if map.get(movement.apply(position)).is_none() {
                next = Some(movement);
                break;
            }
        }

        match next {
            Some(movement) => {
                let target = movement.apply(position);
                match droid.command(movement).await? {
                    Status::Wall => {
                        map.cells.insert(target, Cell::Wall);
                    }
                    status => {
                        let cell = if status == Status::Oxygen {
                            Cell::Oxygen
                        } else {
                            Cell::Open
                        };
                        map.cells.insert(target, cell);
                        position = target;
                        path.push(movement);
                    }
                }
            }
            None => {
                let Some(movement) = path.pop() else {
                    break;
                };
                let back = movement.reverse();
                if droid.command(back).await? == Status::Wall {
                    return Err(ComposeError::Stalled(format!(
                        "droid could not retrace its path at {:?}",
                        position
                    )));
                }
                position = back.apply(position);
            }
        }
    }

    debug!("explored {} cells", map.cells.len());
    Ok(map)
}

/// Spawn the droid firmware, map the area, and shut the firmware down
pub async fn explore_program(image: Vec<i64>, quiet: Duration) -> Result<ShipMap, ComposeError> {
    let mut droid = MachineDroid::spawn(image, quiet);
    let explored = explore(&mut droid).await;
    droid.shutdown().await?;

    let map = explored?;
    if let Some(oxygen) = map.oxygen() {
        info!("oxygen system found at ({}, {})", oxygen.x, oxygen.y);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maze from ASCII art: `#` wall, `.` open, `O` oxygen, `D` start
    struct GridDroid {
        cells: HashMap<Point, char>,
        position: Point,
        commands: usize,
    }

    impl GridDroid {
        fn new(rows: &[&str]) -> Self {
            let mut cells = HashMap::new();
            let mut start = Point::ORIGIN;
            for (r, row) in rows.iter().enumerate() {
                for (c, ch) in row.chars().enumerate() {
                    let point = Point::new(c as i64, -(r as i64));
                    if ch == 'D' {
                        start = point;
                    }
                    cells.insert(point, ch);
                }
            }

            // Shift so the start sits on the origin
            let cells = cells
                .into_iter()
                .map(|(p, ch)| (p.offset(-start.x, -start.y), ch))
                .collect();
            Self {
                cells,
                position: Point::ORIGIN,
                commands: 0,
            }
        }
    }

    #[async_trait]
    impl Droid for GridDroid {
        async fn command(&mut self, movement: Movement) -> Result<Status, ComposeError> {
            self.commands += 1;
            let target = movement.apply(self.position);
            match self.cells.get(&target).copied().unwrap_or('#') {
                '#' => Ok(Status::Wall),
                'O' => {
                    self.position = target;
                    Ok(Status::Oxygen)
                }
                _ => {
                    self.position = target;
                    Ok(Status::Moved)
                }
            }
        }
    }

    const MAZE: [&str; 4] = ["#####", "#D..#", "#.#O#", "#####"];

    #[tokio::test]
    async fn test_explore_grid() {
        let mut droid = GridDroid::new(&MAZE);
        let map = explore(&mut droid).await.unwrap();

        assert_eq!(map.oxygen(), Some(Point::new(2, -1)));
        assert_eq!(map.open_cells(), 5);
        assert_eq!(map.shortest_path(), Some(3));
        assert_eq!(map.fill_time(), Some(4));
        // Exploration ends back where it started
        assert_eq!(droid.position, Point::ORIGIN);
    }

    #[tokio::test]
    async fn test_render_explored_map() {
        let mut droid = GridDroid::new(&MAZE);
        let map = explore(&mut droid).await.unwrap();
        assert_eq!(map.render(), " ### \n#D..#\n#.#O#\n # # ");
    }

    #[tokio::test]
    async fn test_no_oxygen() {
        let mut droid = GridDroid::new(&["###", "#D#", "###"]);
        let map = explore(&mut droid).await.unwrap();
        assert_eq!(map.open_cells(), 1);
        assert_eq!(map.shortest_path(), None);
        assert_eq!(droid.commands, 4);
    }

    #[test]
    fn test_movement_reverse() {
        for movement in Movement::ALL {
            assert_eq!(movement.reverse().reverse(), movement);
            assert_eq!(
                movement.reverse().apply(movement.apply(Point::ORIGIN)),
                Point::ORIGIN
            );
        }
    }
}
