use crate::cell::CellState;
use crate::grid::Grid;

/// Births of Conway's Game of Life, `b3`. Bit `i` set means a dead cell with `i` live neighbors
/// is born.
const BIRTHS: u16 = 0b0_0000_1000;

/// Survivals of Conway's Game of Life, `s23`. Bit `i` set means a live cell with `i` live
/// neighbors survives.
const SURVIVALS: u16 = 0b0_0000_1100;

/// Offsets of the eight neighbors of a cell
const NEIGHBORHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Apply the B3/S23 rule to a single cell given its live neighbor count.
pub fn next_state(cell: CellState, neighbors: u8) -> CellState {
    let mask = 1u16 << neighbors;

    let set = match cell {
        CellState::Dead => BIRTHS,
        CellState::Alive => SURVIVALS,
    };

    CellState::from(set & mask == mask)
}

/// Count the live neighbors of `(row, col)`.
///
/// The boundary is fixed: positions off the grid count as dead, so edge cells have five
/// neighbors and corner cells three.
pub fn live_neighbors(grid: &Grid, row: usize, col: usize) -> u8 {
    let side = grid.side() as isize;
    let (row, col) = (row as isize, col as isize);

    NEIGHBORHOOD
        .iter()
        .map(|&(dr, dc)| (row + dr, col + dc))
        .filter(|&(r, c)| (0..side).contains(&r) && (0..side).contains(&c))
        .map(|(r, c)| grid.get(r as usize, c as usize).weight())
        .sum()
}

/// Compute the next generation.
///
/// Every cell is computed from `grid` alone, never from partially updated cells, and the input
/// is left untouched.
pub fn step(grid: &Grid) -> Grid {
    let side = grid.side();
    let mut next = Grid::dead(side);

    for row in 0..side {
        for col in 0..side {
            let state = next_state(grid.get(row, col), live_neighbors(grid, row, col));

            if state.is_alive() {
                next.set(row, col, state);
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::live_neighbors;
    use super::next_state;
    use super::step;
    use crate::cell::CellState;
    use crate::grid::Grid;

    fn grid(s: &str) -> Grid {
        s.parse().unwrap()
    }

    #[test]
    fn rule_table() {
        use CellState::Alive;
        use CellState::Dead;

        for n in 0..=8 {
            let survives = matches!(n, 2 | 3);
            let born = n == 3;

            assert_eq!(next_state(Alive, n), CellState::from(survives), "alive, {n}");
            assert_eq!(next_state(Dead, n), CellState::from(born), "dead, {n}");
        }
    }

    #[test]
    fn lone_cell_dies() {
        let g = grid(
            "...
             .O.
             ...",
        );

        assert_eq!(step(&g), Grid::dead(3));
    }

    #[test]
    fn corners_see_at_most_three_neighbors() {
        let full = grid(
            "OOO
             OOO
             OOO",
        );

        for (r, c) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
            assert_eq!(live_neighbors(&full, r, c), 3);
        }
        assert_eq!(live_neighbors(&full, 0, 1), 5);
        assert_eq!(live_neighbors(&full, 1, 1), 8);
    }

    #[test]
    fn boundary_does_not_wrap() {
        // On a torus the bottom row would feed the top one
        let g = grid(
            ".....
             .....
             .....
             .....
             OOO..",
        );

        assert_eq!(live_neighbors(&g, 0, 1), 0);
        assert_eq!(
            step(&g),
            grid(
                ".....
                 .....
                 .....
                 .O...
                 .O..."
            )
        );
    }

    #[test]
    fn block_is_still_life() {
        let g = grid(
            "....
             .OO.
             .OO.
             ....",
        );

        assert_eq!(step(&g), g);
    }

    #[test]
    fn blinker_has_period_two() {
        let horizontal = grid(
            ".....
             .....
             .OOO.
             .....
             .....",
        );
        let vertical = grid(
            ".....
             ..O..
             ..O..
             ..O..
             .....",
        );

        assert_eq!(step(&horizontal), vertical);
        assert_eq!(step(&step(&horizontal)), horizontal);
    }

    #[test]
    fn glider_moves_diagonally() {
        let g = grid(
            ".O....
             ..O...
             OOO...
             ......
             ......
             ......",
        );

        let moved = (0..4).fold(g, |g, _| step(&g));

        assert_eq!(
            moved,
            grid(
                "......
                 ..O...
                 ...O..
                 .OOO..
                 ......
                 ......"
            )
        );
    }

    #[test]
    fn empty_grid() {
        assert_eq!(step(&Grid::dead(0)), Grid::dead(0));
    }

    proptest! {
        #[test]
        fn step_keeps_dimensions_and_input(side in 0usize..24, density in 0.0f64..=1.0, seed: u64) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let g = Grid::random(side, density, &mut rng);
            let before = g.clone();

            let next = step(&g);

            prop_assert_eq!(next.side(), side);
            prop_assert_eq!(g, before);
        }
    }
}
