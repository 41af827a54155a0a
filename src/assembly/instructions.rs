//! Worker instructions for a resolved route.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::collapse_directions_keeping;
use crate::models::{Direction, Position};

/// One line of a worker's route description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    /// The worker starts at `at`.
    Start { at: Position },
    /// A straight move of `steps` cells.
    Move {
        from: Position,
        to: Position,
        direction: Direction,
        steps: u32,
    },
    /// Pick up the item on the shelf at `item`.
    PickUp { item: Position },
    /// The worker reaches the end of the route.
    Finish { at: Position, total_steps: u32 },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start { at } => write!(f, "Start at position {at}."),
            Self::Move {
                from,
                to,
                direction,
                steps,
            } => {
                let unit = if *steps == 1 { "step" } else { "steps" };
                write!(
                    f,
                    "From {from}, move {} {steps} {unit} to {to}.",
                    direction.movement_word()
                )
            }
            Self::PickUp { item } => write!(f, "Pick up item at {item}."),
            Self::Finish { at, total_steps } => {
                write!(f, "Arrive at end position {at}. Total steps: {total_steps}.")
            }
        }
    }
}

/// Turns a resolved route into worker instructions.
///
/// Colinear runs are merged, except at waypoints where a target is picked.
/// Each target shelf is picked once, at the first waypoint next to it.
/// Returns no instructions for an empty route.
///
/// # Examples
///
/// ```
/// use u_picking::assembly::to_instructions;
/// use u_picking::models::Position;
///
/// let route: Vec<Position> = [(0, 0), (2, 0), (0, 0)].into_iter().map(Position::from).collect();
/// let lines: Vec<String> = to_instructions(&route, &[Position::new(2, 1)])
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(
///     lines,
///     [
///         "Start at position (0, 0).",
///         "From (0, 0), move right 2 steps to (2, 0).",
///         "Pick up item at (2, 1).",
///         "From (2, 0), move left 2 steps to (0, 0).",
///         "Arrive at end position (0, 0). Total steps: 4.",
///     ]
/// );
/// ```
pub fn to_instructions(positions: &[Position], targets: &[Position]) -> Vec<Instruction> {
    let Some(&first) = positions.first() else {
        return Vec::new();
    };

    let mut picked = vec![false; targets.len()];
    let mut pick_points = HashSet::new();
    for &p in positions {
        for (i, &t) in targets.iter().enumerate() {
            if !picked[i] && t.is_adjacent(p) {
                picked[i] = true;
                pick_points.insert(p);
            }
        }
    }
    let waypoints = collapse_directions_keeping(positions, |p| pick_points.contains(&p));

    let mut picked = vec![false; targets.len()];
    let mut out = vec![Instruction::Start { at: first }];
    let mut total_steps = 0;
    pick_up_at(first, targets, &mut picked, &mut out);

    for pair in waypoints.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let corner = Position::new(to.x, from.y);
        for (a, b) in [(from, corner), (corner, to)] {
            if let Some(direction) = a.direction_to(b) {
                let steps = a.manhattan(b);
                total_steps += steps;
                out.push(Instruction::Move {
                    from: a,
                    to: b,
                    direction,
                    steps,
                });
            }
        }
        pick_up_at(to, targets, &mut picked, &mut out);
    }

    let last = waypoints.last().copied().unwrap_or(first);
    out.push(Instruction::Finish {
        at: last,
        total_steps,
    });
    out
}

fn pick_up_at(at: Position, targets: &[Position], picked: &mut [bool], out: &mut Vec<Instruction>) {
    for (i, &t) in targets.iter().enumerate() {
        if !picked[i] && t.is_adjacent(at) {
            picked[i] = true;
            out.push(Instruction::PickUp { item: t });
        }
    }
}
