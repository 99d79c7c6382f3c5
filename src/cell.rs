use serde::Deserialize;
use serde::Serialize;

/// State of a single cell of the [`Grid`](crate::grid::Grid).
///
/// On the wire a cell is the integer `0` (dead) or `1` (alive). Anything else fails to
/// deserialize.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CellState {
    #[default]
    Dead,
    Alive,
}

impl CellState {
    pub const fn is_alive(self) -> bool {
        matches!(self, CellState::Alive)
    }

    /// Contribution of this cell to a neighbor count
    pub const fn weight(self) -> u8 {
        match self {
            CellState::Dead => 0,
            CellState::Alive => 1,
        }
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

impl From<CellState> for u8 {
    fn from(cell: CellState) -> Self {
        cell.weight()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Cell state must be 0 or 1, got {0}")]
pub struct InvalidCellState(pub u8);

impl TryFrom<u8> for CellState {
    type Error = InvalidCellState;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CellState::Dead),
            1 => Ok(CellState::Alive),
            n => Err(InvalidCellState(n)),
        }
    }
}
