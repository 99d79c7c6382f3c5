//! Messages exchanged between the simulation server and a render client.
//!
//! Every message is a JSON text frame. The server only ever sends grids:
//!
//! ```notrust
//! {"matrix": [[0, 1, ...], ...]}
//! ```
//!
//! and the client only ever acknowledges them:
//!
//! ```notrust
//! {"message": "DrawingFinished"}
//! ```
//!
//! Both directions are decoded here, before anything reaches a state machine.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::cell::CellState;
use crate::grid::Grid;
use crate::grid::GridError;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not JSON, or JSON of the wrong shape. Receivers drop these.
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A well formed grid that doesn't have the agreed dimensions
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerMsg {
    /// A full generation, replacing whatever the client had
    Grid { matrix: Arc<Grid> },
}

/// What a grid message looks like before its shape is checked
#[derive(Deserialize)]
struct RawGrid {
    matrix: Vec<Vec<CellState>>,
}

impl ServerMsg {
    pub fn grid(matrix: Arc<Grid>) -> Self {
        ServerMsg::Grid { matrix }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a server message whose grid must be `side x side`.
    pub fn decode_expecting(text: &str, side: usize) -> Result<Self, ProtocolError> {
        let RawGrid { matrix } = serde_json::from_str(text)?;

        let grid = Grid::from_rows(matrix)?;
        grid.expect_side(side)?;

        Ok(ServerMsg::grid(Arc::new(grid)))
    }
}

/// Client to server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum ClientMsg {
    /// The last grid received has been drawn. The server answers with exactly one new
    /// generation.
    DrawingFinished,
}

impl ClientMsg {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ClientMsg;
    use super::ProtocolError;
    use super::ServerMsg;
    use crate::grid::Grid;
    use crate::grid::GridError;

    #[test]
    fn client_wire_format() {
        let text = ClientMsg::DrawingFinished.encode().unwrap();

        assert_eq!(text, r#"{"message":"DrawingFinished"}"#);
        assert_eq!(ClientMsg::decode(&text).unwrap(), ClientMsg::DrawingFinished);
    }

    #[test]
    fn unknown_client_messages_are_malformed() {
        for text in [
            r#"{"message":"SomethingElse"}"#,
            r#"{"requestNextMatrix":true}"#,
            r#"{"message":"#,
            "DrawingFinished",
            "",
        ] {
            assert!(
                matches!(ClientMsg::decode(text), Err(ProtocolError::Malformed(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn server_wire_format() {
        let grid: Grid = "O.\n.O".parse().unwrap();

        let text = ServerMsg::grid(Arc::new(grid.clone())).encode().unwrap();

        assert_eq!(text, r#"{"matrix":[[1,0],[0,1]]}"#);

        let ServerMsg::Grid { matrix } = ServerMsg::decode_expecting(&text, 2).unwrap();
        assert_eq!(*matrix, grid);
    }

    #[test]
    fn wrong_dimensions_are_shape_errors() {
        let text = r#"{"matrix":[[1,0],[0,1]]}"#;

        assert!(matches!(
            ServerMsg::decode_expecting(text, 64),
            Err(ProtocolError::Grid(GridError::InvalidGridShape { expected: 64, .. }))
        ));

        assert!(matches!(
            ServerMsg::decode_expecting(r#"{"matrix":[[1,0],[0]]}"#, 2),
            Err(ProtocolError::Grid(GridError::InvalidGridShape { .. }))
        ));
    }

    #[test]
    fn garbage_grids_are_malformed() {
        for text in [
            r#"{"matrix":[[2]]}"#,
            r#"{"matrix":"nope"}"#,
            r#"{"grid":[[1]]}"#,
            "[[1]]",
        ] {
            assert!(
                matches!(
                    ServerMsg::decode_expecting(text, 1),
                    Err(ProtocolError::Malformed(_))
                ),
                "{text}"
            );
        }
    }
}
