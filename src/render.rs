use crate::grid::Grid;
use crate::viewport::Point;
use crate::viewport::Viewport;

/// Something frames can be drawn onto. All positions and sizes are in real (screen) units.
pub trait Canvas {
    /// Drawable area, width then height
    fn size(&self) -> (f64, f64);

    fn clear_frame(&mut self);

    /// Fill the frame with the background tiling. Grid lines sit at multiples of `spacing`
    /// in virtual space; `offset` and `scale` are the viewport's.
    fn draw_tiled_background(&mut self, offset: Point, scale: f64, spacing: f64);

    /// Draw a square sprite with its top left corner at `at`
    fn draw_sprite(&mut self, at: Point, size: f64);
}

/// Sizes used when laying out a grid, both in virtual units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Virtual size of one live cell sprite
    pub cell_size: f64,

    /// Virtual spacing of the background tiles
    pub grid_spacing: f64,
}

/// Draw one frame: the background, then a sprite for each live cell of `grid`.
///
/// Cell `(row, col)` lives at virtual `(col * cell_size, row * cell_size)`.
pub fn draw_frame<C: Canvas + ?Sized>(canvas: &mut C, viewport: &Viewport, grid: &Grid, layout: Layout) {
    let scale = viewport.scale();

    canvas.clear_frame();
    canvas.draw_tiled_background(viewport.offset(), scale, layout.grid_spacing);

    let size = layout.cell_size / scale;

    for (row, col) in grid.live_cells() {
        let at = viewport.to_real((col as f64 * layout.cell_size, row as f64 * layout.cell_size));
        canvas.draw_sprite(at, size);
    }
}
