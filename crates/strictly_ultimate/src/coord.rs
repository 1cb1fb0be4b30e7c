//! Row/column coordinates inside a 3x3 grid.
//!
//! The same type addresses a small board within the meta-board and a cell
//! within a small board. Coordinates are validated at construction and on
//! deserialization, so a `Coord` is always in range.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A position in a 3x3 grid, `(row, col)` with both in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Coord {
    row: u8,
    col: u8,
}

/// A coordinate outside the 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Coordinate ({}, {}) is outside the 3x3 grid", row, col)]
pub struct CoordOutOfRange {
    /// Offending row.
    pub row: u8,
    /// Offending column.
    pub col: u8,
}

impl Coord {
    /// Top-left corner.
    pub const TOP_LEFT: Coord = Coord { row: 0, col: 0 };
    /// Middle of the grid.
    pub const CENTER: Coord = Coord { row: 1, col: 1 };

    /// All nine coordinates in row-major order.
    pub const ALL: [Coord; 9] = [
        Coord { row: 0, col: 0 },
        Coord { row: 0, col: 1 },
        Coord { row: 0, col: 2 },
        Coord { row: 1, col: 0 },
        Coord { row: 1, col: 1 },
        Coord { row: 1, col: 2 },
        Coord { row: 2, col: 0 },
        Coord { row: 2, col: 1 },
        Coord { row: 2, col: 2 },
    ];

    /// Creates a coordinate, rejecting anything outside the grid.
    pub fn new(row: u8, col: u8) -> Result<Self, CoordOutOfRange> {
        if row < 3 && col < 3 {
            Ok(Self { row, col })
        } else {
            Err(CoordOutOfRange { row, col })
        }
    }

    /// Row, `0..3`.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column, `0..3`.
    pub fn col(self) -> u8 {
        self.col
    }

    /// Row-major index, `0..9`.
    pub fn index(self) -> usize {
        usize::from(self.row) * 3 + usize::from(self.col)
    }

    /// Creates a coordinate from a row-major index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable name of the position.
    pub fn label(self) -> &'static str {
        match (self.row, self.col) {
            (0, 0) => "Top-left",
            (0, 1) => "Top-center",
            (0, 2) => "Top-right",
            (1, 0) => "Middle-left",
            (1, 1) => "Center",
            (1, 2) => "Middle-right",
            (2, 0) => "Bottom-left",
            (2, 1) => "Bottom-center",
            _ => "Bottom-right",
        }
    }

    /// Parses a 1-9 number (reading order, as on a phone keypad) or a label.
    #[instrument]
    pub fn from_label_or_number(s: &str) -> Option<Coord> {
        let s = s.trim();
        if let Ok(num) = s.parse::<usize>() {
            return num.checked_sub(1).and_then(Self::from_index);
        }

        let s_lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|coord| coord.label().to_lowercase() == s_lower)
    }
}

impl TryFrom<(u8, u8)> for Coord {
    type Error = CoordOutOfRange;

    fn try_from((row, col): (u8, u8)) -> Result<Self, Self::Error> {
        Self::new(row, col)
    }
}

impl From<Coord> for (u8, u8) {
    fn from(coord: Coord) -> Self {
        (coord.row, coord.col)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
