use thiserror::Error;

use crate::command::{Reply, Request};

/// An error produced by the command channel.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TransportError {
    /// No reply arrived within the transport's deadline.
    #[error("no reply from the WIB within the timeout")]
    Timeout,
    /// The firmware flagged the request as failed.
    #[error("request refused by the WIB: {0}")]
    Refused(String),
    /// A reply arrived but not the shape the request calls for.
    #[error("malformed reply: expected {expected}, got {got}")]
    UnexpectedReply {
        expected: &'static str,
        got: &'static str,
    },
    /// The channel is not open.
    #[error("transport is closed")]
    Closed,
    /// Anything the underlying socket layer reports.
    #[error("{0}")]
    Io(String),
}

/// A blocking request/reply channel to one WIB.
///
/// Implementations own the socket and its reconnect policy; callers must
/// serialize all use of one WIB through a single `Transport` value, since
/// interleaving requests from two paths would interleave register writes on
/// the hardware side.
pub trait Transport: Send {
    /// Sends one request and blocks until its reply or a transport error.
    fn send(&mut self, request: &Request) -> Result<Reply, TransportError>;

    /// Checks whether the channel is usable.
    #[must_use]
    fn is_open(&self) -> bool;

    /// Closes the channel.
    fn close(&mut self) -> Result<(), TransportError>;
}

impl Transport for Box<dyn Transport> {
    fn send(&mut self, request: &Request) -> Result<Reply, TransportError> {
        self.as_mut().send(request)
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.as_mut().close()
    }
}
