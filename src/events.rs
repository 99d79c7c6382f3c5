use crate::viewport::Direction;
use crate::viewport::Point;
use crate::viewport::Zoom;

pub enum Event {
    ViewEvent(ViewEvent),
    AppEvent(AppEvent),
}

/// Local input that only affects how the current grid is shown. Handling one of these must
/// never advance the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    Pan(Direction),

    /// Zoom by the configured fixed factor
    Zoom(Zoom),

    /// Zoom keeping the point under the pointer in place. `at` is in real units.
    ZoomAt { at: Point, zoom: Zoom },

    /// The terminal changed size, in cells
    Resize { cols: u16, rows: u16 },

    ResetView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Connect again after losing the server
    Reconnect,

    /// Exit the application
    Exit,
}
