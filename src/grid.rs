use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

use crate::cell::CellState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The rows do not form an `expected x expected` square. `cols` is the length of the first
    /// row that does not match, or `expected` if only the row count is off.
    #[error("Invalid grid shape: expected {expected}x{expected}, got {rows} rows (row length {cols})")]
    InvalidGridShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unexpected character {0:?} in pattern, expected '.' or 'O'")]
    InvalidPatternChar(char),
}

/// One generation of the automaton: a square matrix of cells, stored row-major.
///
/// The dimensions never change once a grid is built. Stepping produces a new grid (see
/// [`rules::step`](crate::rules::step)) so anyone still holding the previous generation is
/// unaffected.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Vec<CellState>>")]
pub struct Grid {
    side: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// An all dead `side x side` grid
    pub fn dead(side: usize) -> Self {
        Self {
            side,
            cells: vec![CellState::Dead; side * side],
        }
    }

    /// Seed a `side x side` grid where each cell is independently alive with probability
    /// `density`.
    pub fn random(side: usize, density: f64, rng: &mut fastrand::Rng) -> Self {
        let cells = (0..side * side)
            .map(|_| CellState::from(rng.f64() < density))
            .collect();

        Self { side, cells }
    }

    /// Build a grid from rows, checking that they form a square.
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Result<Self, GridError> {
        let side = rows.len();

        if let Some(bad) = rows.iter().find(|row| row.len() != side) {
            return Err(GridError::InvalidGridShape {
                expected: side,
                rows: side,
                cols: bad.len(),
            });
        }

        Ok(Self {
            side,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Fails with [`GridError::InvalidGridShape`] unless this grid is `side x side`.
    pub fn expect_side(&self, side: usize) -> Result<(), GridError> {
        if self.side != side {
            return Err(GridError::InvalidGridShape {
                expected: side,
                rows: self.side,
                cols: self.side,
            });
        }

        Ok(())
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn get(&self, row: usize, col: usize) -> CellState {
        self.cells[self.at(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, state: CellState) {
        let i = self.at(row, col);
        self.cells[i] = state;
    }

    /// Iterate over the rows, top to bottom
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[CellState]> {
        // `chunks` panics on 0, and an empty grid has no rows anyway
        self.cells.chunks(self.side.max(1))
    }

    /// Positions `(row, col)` of every alive cell
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_alive())
            .map(|(i, _)| (i / self.side, i % self.side))
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    fn at(&self, row: usize, col: usize) -> usize {
        assert!(row < self.side, "row is out of bounds");
        assert!(col < self.side, "col is out of bounds");

        row * self.side + col
    }
}

impl TryFrom<Vec<Vec<CellState>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<CellState>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// Plaintext pattern, one line per row. `O` is alive, `.` is dead.
///
/// See: https://conwaylife.com/wiki/Plaintext
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(|c| match c {
                        'O' => Ok(CellState::Alive),
                        '.' => Ok(CellState::Dead),
                        c => Err(GridError::InvalidPatternChar(c)),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_rows(rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                let c = if cell.is_alive() { 'O' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.side, self.side)?;
        fmt::Display::fmt(self, f)
    }
}
