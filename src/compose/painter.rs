//! Hull-painting robot
//!
//! The controller feeds the machine the colour of the panel under the robot
//! (0 black, 1 white) and reads back pairs of outputs: the colour to paint and
//! the direction to turn (0 left, 1 right). After turning, the robot moves one
//! panel forward. The run ends when the machine halts or goes quiet.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use crate::compose::grid::{render, Heading, Point};
use crate::compose::{next_output, ComposeError};
use crate::vm::{spawn, Channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn code(self) -> i64 {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    fn from_code(code: i64) -> Result<Self, ComposeError> {
        match code {
            0 => Ok(Color::Black),
            1 => Ok(Color::White),
            value => Err(ComposeError::UnexpectedOutput {
                what: "colour",
                value,
            }),
        }
    }
}

/// Panels seen by the robot; unlisted panels are black
#[derive(Debug, Clone, Default)]
pub struct Hull {
    colors: HashMap<Point, Color>,
    painted: HashSet<Point>,
}

impl Hull {
    pub fn color_at(&self, point: Point) -> Color {
        self.colors.get(&point).copied().unwrap_or(Color::Black)
    }

    pub fn paint(&mut self, point: Point, color: Color) {
        self.colors.insert(point, color);
        self.painted.insert(point);
    }

    /// Number of panels painted at least once
    pub fn painted(&self) -> usize {
        self.painted.len()
    }

    pub fn white_panels(&self) -> usize {
        self.colors.values().filter(|&&c| c == Color::White).count()
    }

    /// Draw white panels as `#` and everything else as a space
    pub fn render(&self) -> String {
        let whites = self
            .colors
            .iter()
            .filter(|(_, &color)| color == Color::White)
            .map(|(&point, _)| point);

        render(whites, |point| match self.color_at(point) {
            Color::White => '#',
            Color::Black => ' ',
        })
    }
}

/// Run the robot program starting on a panel of colour `start`
pub async fn paint(image: Vec<i64>, start: Color, quiet: Duration) -> Result<Hull, ComposeError> {
    let input = Channel::new();
    let output = Channel::new();
    let handle = spawn(image, input.clone(), output.clone());

    let mut hull = Hull::default();
    if start == Color::White {
        hull.colors.insert(Point::ORIGIN, Color::White);
    }

    let mut position = Point::ORIGIN;
    let mut heading = Heading::Up;

    let outcome = loop {
        input.push(hull.color_at(position).code());

        let Some(color) = next_output(&output, &handle, quiet).await else {
            break Ok(());
        };
        let Some(turn) = next_output(&output, &handle, quiet).await else {
            warn!("robot painted without turning, stopping");
            break Ok(());
        };

        let color = match Color::from_code(color) {
            Ok(color) => color,
            Err(err) => break Err(err),
        };
        hull.paint(position, color);

        heading = match turn {
            0 => heading.turn_left(),
            1 => heading.turn_right(),
            value => {
                break Err(ComposeError::UnexpectedOutput {
                    what: "turn",
                    value,
                })
            }
        };
        position = heading.advance(position);
    };

    // The machine may still be parked on the colour request we just pushed
    handle.force_halt();
    handle.wait().await?;
    outcome?;

    debug!("robot painted {} panels", hull.painted());
    Ok(hull)
}
