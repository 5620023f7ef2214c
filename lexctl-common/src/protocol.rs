//! Notification channel wire protocol
//!
//! The channel speaks plain text frames. A client announces itself with a
//! single registration frame immediately after connecting; everything the
//! server pushes back is either the reserved keepalive sentinel or an
//! opaque status line.

use crate::session::SessionId;

/// Reserved liveness frame. Carries no status and is never surfaced.
pub const KEEPALIVE_SENTINEL: &str = "WS_KEEPALIVE";

/// Prefix of the registration frame sent once per channel lifetime.
pub const CLIENT_ID_PREFIX: &str = "CLIENT_ID: ";

/// Build the registration frame announcing `session` to the server.
pub fn registration_frame(session: &SessionId) -> String {
    format!("{}{}", CLIENT_ID_PREFIX, session)
}

/// An inbound text frame, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Liveness signal only; discard silently.
    Keepalive,
    /// Opaque status text, surfaced verbatim.
    Status(String),
}

impl Frame {
    /// Classify a raw inbound frame. Keepalive matching is exact equality
    /// against the sentinel; anything else is status text, untouched.
    pub fn classify(raw: &str) -> Frame {
        if raw == KEEPALIVE_SENTINEL {
            Frame::Keepalive
        } else {
            Frame::Status(raw.to_string())
        }
    }
}
