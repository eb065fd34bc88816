//! Domain layer: status synchronization logic with no I/O.

pub mod connection;
pub mod duration;
pub mod error;
pub mod group;
pub mod message;
pub mod presentation;
pub mod reconciler;
pub mod sink;
pub mod snapshot;
pub mod ticker;
pub mod transport;

pub use connection::{
    ConnectionAction, ConnectionManager, ConnectionState, ReconnectPolicy, SessionId,
    TransportEvent,
};
pub use duration::{DurationMode, format_duration, format_seconds};
pub use error::{GroupError, MessageError, TransportError};
pub use group::{GroupDefinition, ServerGroup, default_groups};
pub use message::{
    FullUpdate, MaintenanceUpdate, PlayerCountUpdate, PlayerMove, PlayerRef, ServerCountUpdate,
    StatusMessage,
};
pub use presentation::{ColorClass, ConnectionPhase, Presentation, Summary, UptimeKind};
pub use reconciler::{Applied, StateReconciler};
pub use sink::RenderSink;
pub use snapshot::{
    CurrentServer, MaintenanceStart, PlayerEntry, ServerId, ServerRecord, Snapshot,
};
pub use ticker::{UptimeReading, UptimeTicker};
pub use transport::{FeedConnector, FeedFrame, FeedStream};
