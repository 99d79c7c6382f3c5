use std::fmt::Display;
use std::pin::pin;

use futures::Sink;
use futures::SinkExt;
use futures::Stream;
use futures::StreamExt;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::protocol::ClientMsg;
use crate::protocol::ProtocolError;
use crate::protocol::ServerMsg;
use crate::world::WorldError;
use crate::world::WorldHandle;

/// Where a connection stands in the lockstep exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Just connected, nothing sent yet
    Connected,

    /// A grid is on its way to the client, or was just delivered
    Sending,

    /// The client has a grid and we wait for it to report that it drew it
    AwaitingStepRequest,

    Closed,
}

/// What the connection loop must do in response to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Send the world's current grid, without stepping
    SendCurrent,

    /// Advance the world once and send the result
    StepAndSend,

    /// Nothing to do
    Ignore,
}

/// Per connection state machine of the simulation server.
///
/// ```notrust
/// Connected --connect--> Sending --sent--> AwaitingStepRequest
///                           ^                      |
///                           +---DrawingFinished----+
/// ```
///
/// Everything else (garbage, acks that arrive out of turn) maps to [`Action::Ignore`] and
/// leaves the state alone.
#[derive(Debug)]
pub struct Session {
    id: u64,
    state: SessionState,
    grids_sent: u64,
    steps: u64,
}

impl Session {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: SessionState::Connected,
            grids_sent: 0,
            steps: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Grids sent, the initial one included
    pub fn grids_sent(&self) -> u64 {
        self.grids_sent
    }

    /// Steps this session asked of the world
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The connection is established; the client gets the current grid unasked.
    pub fn on_connect(&mut self) -> Action {
        match self.state {
            SessionState::Connected => {
                self.state = SessionState::Sending;
                Action::SendCurrent
            }
            _ => Action::Ignore,
        }
    }

    /// A text frame arrived from the client.
    pub fn on_text(&mut self, text: &str) -> Action {
        match (self.state, ClientMsg::decode(text)) {
            (SessionState::AwaitingStepRequest, Ok(ClientMsg::DrawingFinished)) => {
                self.state = SessionState::Sending;
                self.steps += 1;
                Action::StepAndSend
            }
            (state, Ok(ClientMsg::DrawingFinished)) => {
                warn!(id = self.id, ?state, "DrawingFinished out of turn, ignoring");
                Action::Ignore
            }
            (_, Err(e)) => {
                warn!(id = self.id, "Ignoring message: {e}");
                Action::Ignore
            }
        }
    }

    /// The grid requested by the last action has been handed to the transport.
    pub fn on_sent(&mut self) {
        if self.state == SessionState::Sending {
            self.grids_sent += 1;
            self.state = SessionState::AwaitingStepRequest;
        }
    }

    pub fn on_close(&mut self) {
        self.state = SessionState::Closed;
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Drive one connection until the client goes away.
///
/// `inbound` yields the text frames of the client in order and ends when the connection closes;
/// `outbound` takes encoded server messages. Messages are handled strictly one at a time: the
/// grid answering an acknowledgment is sent before the next frame is read.
///
/// Losing the connection is not an error, the world simply keeps its grid for the next client.
pub async fn run<R, W>(
    id: u64,
    inbound: R,
    outbound: W,
    world: WorldHandle,
) -> Result<Session, SessionError>
where
    R: Stream<Item = String>,
    W: Sink<String>,
    W::Error: Display,
{
    let mut inbound = pin!(inbound);
    let mut outbound = pin!(outbound);

    let mut session = Session::new(id);
    let mut action = session.on_connect();

    loop {
        let grid = match action {
            Action::SendCurrent => Some(world.snapshot().await?),
            Action::StepAndSend => Some(world.step().await?),
            Action::Ignore => None,
        };

        if let Some(grid) = grid {
            let text = ServerMsg::grid(grid).encode()?;

            if let Err(e) = outbound.send(text).await {
                debug!(id, "Send failed, closing session: {e}");
                break;
            }

            session.on_sent();
        }

        let Some(text) = inbound.next().await else {
            break;
        };

        action = session.on_text(&text);
    }

    session.on_close();

    info!(
        id,
        grids_sent = session.grids_sent(),
        steps = session.steps(),
        "session closed"
    );

    Ok(session)
}
