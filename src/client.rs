use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::config::ViewConfig;
use crate::events::ViewEvent;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::protocol::ClientMsg;
use crate::protocol::ProtocolError;
use crate::protocol::ServerMsg;
use crate::render;
use crate::render::Canvas;
use crate::render::Layout;
use crate::viewport::Viewport;
use crate::viewport::ViewportError;
use crate::viewport::Zoom;

/// Where the viewer stands in the lockstep exchange.
///
/// ```notrust
/// Disconnected --connect--> AwaitingGrid --grid--> Rendering --drawn--> HasGrid
///                                                      ^                   |
///                                                      +-------grid--------+
/// ```
///
/// Losing the connection leads back to `Disconnected` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,

    /// Connected, the server has not pushed its first grid yet
    AwaitingGrid,

    /// Showing a grid and waiting for the next generation
    HasGrid,

    /// Drawing a freshly received grid
    Rendering,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Received a grid while {0:?}")]
    UnexpectedGrid(ClientState),
}

/// The viewer side of the protocol.
///
/// It keeps the latest grid the server sent, read only, and the viewport. Only a new grid
/// produces an acknowledgment: redraws caused by local input have no way to send anything.
pub struct RenderClient {
    state: ClientState,
    grid: Option<Arc<Grid>>,
    viewport: Viewport,

    /// Grids received over the lifetime of the client
    generations: u64,

    grid_size: usize,
    layout: Layout,
    pan_speed: f64,
    zoom_in_factor: f64,
    zoom_out_factor: f64,
    zoom_speed: f64,
}

impl RenderClient {
    /// A disconnected client whose screen is `screen` real units large
    pub fn new(config: &ViewConfig, screen: (f64, f64)) -> Self {
        Self {
            state: ClientState::Disconnected,
            grid: None,
            viewport: Viewport::new(screen.0, screen.1),
            generations: 0,
            grid_size: config.grid_size,
            layout: config.layout(),
            pan_speed: config.pan_speed,
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
            zoom_speed: config.zoom_speed,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_deref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn generations(&self) -> u64 {
        self.generations
    }

    /// A connection was established. The server speaks first.
    pub fn on_connect(&mut self) {
        self.state = ClientState::AwaitingGrid;
    }

    /// The connection is gone. The last grid stays on screen.
    pub fn on_disconnect(&mut self) {
        self.state = ClientState::Disconnected;
    }

    /// Handle a text frame from the server.
    ///
    /// A valid grid replaces the stored one, is drawn onto `canvas`, and the returned
    /// acknowledgment must be sent back. Garbage is dropped and yields `None`. A grid with the
    /// wrong dimensions is an error.
    pub fn on_server_text<C>(
        &mut self,
        text: &str,
        canvas: &mut C,
    ) -> Result<Option<ClientMsg>, ClientError>
    where
        C: Canvas + ?Sized,
    {
        let matrix = match ServerMsg::decode_expecting(text, self.grid_size) {
            Ok(ServerMsg::Grid { matrix }) => matrix,
            Err(ProtocolError::Malformed(e)) => {
                warn!("Ignoring malformed server message: {e}");
                return Ok(None);
            }
            Err(ProtocolError::Grid(e)) => return Err(e.into()),
        };

        match self.state {
            ClientState::AwaitingGrid | ClientState::HasGrid => {}
            state => return Err(ClientError::UnexpectedGrid(state)),
        }

        self.grid = Some(matrix);
        self.generations += 1;

        self.state = ClientState::Rendering;
        self.redraw(canvas);
        self.state = ClientState::HasGrid;

        debug!(generations = self.generations, "drew grid");

        Ok(Some(ClientMsg::DrawingFinished))
    }

    /// Apply local input and redraw the stored grid.
    ///
    /// Rejected viewport changes leave the view as it was and skip the redraw. A `Resize`
    /// takes its dimensions from `canvas`, which must already have the new size.
    pub fn on_view_event<C>(&mut self, event: ViewEvent, canvas: &mut C) -> Result<(), ViewportError>
    where
        C: Canvas + ?Sized,
    {
        let vp = &mut self.viewport;

        match event {
            ViewEvent::Pan(direction) => vp.pan(direction, self.pan_speed)?,
            ViewEvent::Zoom(Zoom::In) => vp.zoom_by(self.zoom_in_factor)?,
            ViewEvent::Zoom(Zoom::Out) => vp.zoom_by(self.zoom_out_factor)?,
            ViewEvent::ZoomAt { at, zoom } => vp.zoom_at(at, zoom, self.zoom_speed)?,
            ViewEvent::Resize { .. } => {
                let (w, h) = canvas.size();
                vp.resize(w, h)?;
            }
            ViewEvent::ResetView => vp.reset(),
        }

        self.redraw(canvas);

        Ok(())
    }

    /// One line summary of the client
    pub fn status(&self) -> String {
        let state = match self.state {
            ClientState::Disconnected => "disconnected (r: reconnect)",
            ClientState::AwaitingGrid => "waiting for server",
            ClientState::HasGrid | ClientState::Rendering => "connected",
        };

        let population = self.grid().map_or(0, Grid::population);

        format!(
            "{state} | generation {} | alive {population} | scale {:.3} | view {:.0}x{:.0}",
            self.generations,
            self.viewport.scale(),
            self.viewport.virtual_width(),
            self.viewport.virtual_height(),
        )
    }

    fn redraw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let empty = Grid::dead(0);
        let grid = self.grid.as_deref().unwrap_or(&empty);

        render::draw_frame(canvas, &self.viewport, grid, self.layout);
    }
}
