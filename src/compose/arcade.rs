//! Arcade cabinet
//!
//! The game program draws with output triples `(x, y, tile)`; the special
//! position `(-1, 0)` carries the score instead of a tile. In play mode the
//! controller answers every ball update with a joystick position that moves
//! the paddle toward the ball, and stops the machine once the screen has no
//! blocks left and output has gone quiet.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::compose::grid::Point;
use crate::compose::{next_output, ComposeError};
use crate::vm::{spawn, Channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tile {
    Empty,
    Wall,
    Block,
    Paddle,
    Ball,
}

impl Tile {
    fn from_code(code: i64) -> Result<Self, ComposeError> {
        match code {
            0 => Ok(Tile::Empty),
            1 => Ok(Tile::Wall),
            2 => Ok(Tile::Block),
            3 => Ok(Tile::Paddle),
            4 => Ok(Tile::Ball),
            value => Err(ComposeError::UnexpectedOutput { what: "tile", value }),
        }
    }
}

/// What the cabinet has drawn so far
#[derive(Debug, Clone, Default)]
pub struct Screen {
    tiles: HashMap<Point, Tile>,
    score: i64,
}

impl Screen {
    /// Apply one output triple, returning the tile drawn (if any)
    pub fn apply(&mut self, x: i64, y: i64, value: i64) -> Result<Option<Tile>, ComposeError> {
        if x == -1 && y == 0 {
            self.score = value;
            return Ok(None);
        }

        let tile = Tile::from_code(value)?;
        self.tiles.insert(Point::new(x, y), tile);
        Ok(Some(tile))
    }

    pub fn blocks(&self) -> usize {
        self.tiles.values().filter(|&&t| t == Tile::Block).count()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn is_blank(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Result of a played game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    pub score: i64,
    pub blocks_remaining: usize,
    pub moves: usize,
}

/// Run the program without input and count the blocks on the final screen
pub async fn count_blocks(image: Vec<i64>) -> Result<usize, ComposeError> {
    let output = Channel::new();
    let handle = spawn(image, Channel::new(), output.clone());
    handle.wait().await?;

    let values = output.drain();
    let mut screen = Screen::default();
    for triple in values.chunks_exact(3) {
        screen.apply(triple[0], triple[1], triple[2])?;
    }
    if values.len() % 3 != 0 {
        warn!("ignoring {} trailing output values", values.len() % 3);
    }

    Ok(screen.blocks())
}

/// Insert a coin (position 0 set to 2) and play until no blocks remain
pub async fn play(mut image: Vec<i64>, quiet: Duration) -> Result<Game, ComposeError> {
    if image.is_empty() {
        return Err(ComposeError::InvalidSetup("empty game program".to_string()));
    }
    image[0] = 2;

    let input = Channel::new();
    let output = Channel::new();
    let handle = spawn(image, input.clone(), output.clone());

    let mut screen = Screen::default();
    let mut pending = Vec::with_capacity(3);
    let mut paddle_x = 0;
    let mut moves = 0;

    let outcome = loop {
        let Some(value) = next_output(&output, &handle, quiet).await else {
            if handle.status().is_stopped() {
                break Ok(());
            }
            if !screen.is_blank() && screen.blocks() == 0 {
                debug!("no blocks left, stopping the cabinet");
                break Ok(());
            }
            break Err(ComposeError::Stalled(format!(
                "{} blocks left but the game went quiet",
                screen.blocks()
            )));
        };

        pending.push(value);
        if pending.len() < 3 {
            continue;
        }

        let drawn = screen.apply(pending[0], pending[1], pending[2]);
        let x = pending[0];
        pending.clear();

        match drawn {
            Ok(Some(Tile::Paddle)) => paddle_x = x,
            Ok(Some(Tile::Ball)) => {
                input.push((x - paddle_x).signum());
                moves += 1;
            }
            Ok(_) => {}
            Err(err) => break Err(err),
        }
    };

    handle.force_halt();
    handle.wait().await?;
    outcome?;

    if !pending.is_empty() {
        warn!("ignoring {} trailing output values", pending.len());
    }

    let game = Game {
        score: screen.score(),
        blocks_remaining: screen.blocks(),
        moves,
    };
    info!("game over: score {} after {} moves", game.score, game.moves);
    Ok(game)
}
