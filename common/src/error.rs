//! Error types shared by the transport, the worker and the command queue.
//!
//! Single-query failures never leave the worker: they only bump the failure
//! counter. The user sees `connected=false` plus a short text, produced by
//! [`LinkError::user_message`].

use core::fmt;

/// Failures reported by a transport implementation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The session to the adapter could not be opened.
    Open,
    /// Writing the request failed.
    Write,
    /// No `>` prompt within the timeout.
    Timeout,
    /// The session is not open.
    Closed,
}

/// Failures seen by the telemetry worker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Opening the transport failed. Fatal at cold start.
    TransportOpen,
    /// The adapter rejected or ignored an initialisation command.
    Handshake,
    /// A query got no prompt within the response timeout.
    ProtocolTimeout,
    /// The request could not be written or the session was closed.
    Transport,
    /// The response was missing, truncated or malformed.
    Parse,
    /// Too many consecutive query failures; the link is torn down.
    ThresholdExceeded,
}

impl LinkError {
    /// Short text for the `last_error` field shown on screen.
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::TransportOpen | Self::Handshake => "Connection failed",
            Self::ThresholdExceeded => "Connection lost (timeout)",
            Self::ProtocolTimeout => "Adapter timeout",
            Self::Transport => "Adapter write failed",
            Self::Parse => "Bad adapter response",
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Self::TransportOpen => "transport open failed",
            Self::Handshake => "adapter handshake failed",
            Self::ProtocolTimeout => "protocol timeout",
            Self::Transport => "transport failure",
            Self::Parse => "parse error",
            Self::ThresholdExceeded => "failure threshold exceeded",
        };
        f.write_str(text)
    }
}

impl From<TransportError> for LinkError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Open => Self::TransportOpen,
            TransportError::Timeout => Self::ProtocolTimeout,
            TransportError::Write | TransportError::Closed => Self::Transport,
        }
    }
}

/// Failures when requesting a DTC command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Both queue slots hold different pending commands.
    QueueFull,
}

impl fmt::Display for CommandError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::QueueFull => f.write_str("command queue full"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_message() {
        assert_eq!(LinkError::ThresholdExceeded.user_message(), "Connection lost (timeout)");
    }

    #[test]
    fn test_cold_start_message() {
        assert_eq!(LinkError::TransportOpen.user_message(), "Connection failed");
        assert_eq!(LinkError::Handshake.user_message(), "Connection failed");
    }

    #[test]
    fn test_transport_error_conversion() {
        assert_eq!(LinkError::from(TransportError::Timeout), LinkError::ProtocolTimeout);
        assert_eq!(LinkError::from(TransportError::Open), LinkError::TransportOpen);
        assert_eq!(LinkError::from(TransportError::Closed), LinkError::Transport);
    }

    #[test]
    fn test_display() {
        assert_eq!(std::format!("{}", LinkError::Parse), "parse error");
        assert_eq!(std::format!("{}", CommandError::QueueFull), "command queue full");
    }
}
