// Failures surfaced by recording, replay and log parsing. Messages reach JS verbatim as the
// rejection value of the wasm wrappers.

use thiserror::Error;

/// Recorder/replayer error types.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Direct mouse dispatch synthesizes offsets from client coordinates, which only agree when
    /// the surface has no border.
    #[error(
        "Surface must have a 0px border for direct mouse dispatch \
         (client {client_width}x{client_height}, offset {offset_width}x{offset_height})"
    )]
    BorderedSurface {
        client_width: f64,
        client_height: f64,
        offset_width: f64,
        offset_height: f64,
    },

    #[error("Dispatch of {event_type} failed: {message}")]
    Dispatch { event_type: String, message: String },

    #[error("Malformed recording entry: {0}")]
    MalformedEntry(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for InputError {
    fn from(err: serde_json::Error) -> Self {
        InputError::Serialization(err.to_string())
    }
}
