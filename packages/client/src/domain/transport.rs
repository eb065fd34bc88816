//! Input seam: how the driver obtains a feed connection.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::error::TransportError;

/// One item read from an open feed connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFrame {
    /// A text payload (binary payloads arrive here after UTF-8 decoding)
    Text(String),
    /// The peer closed the connection
    Closed { reason: String },
}

/// An open connection, read side only. Dropping it closes the connection.
pub type FeedStream = BoxStream<'static, Result<FeedFrame, TransportError>>;

#[async_trait]
pub trait FeedConnector: Send + Sync {
    /// Open a connection to `url`. Resolves once the connection is usable.
    async fn connect(&self, url: &str) -> Result<FeedStream, TransportError>;
}
