//! Async driver for a [`StatusMonitor`].
//!
//! A single task owns the monitor and every timer. Each loop iteration waits
//! for whichever comes first (connect result, feed frame, connect timeout,
//! reconnect delay, uptime tick), turns it into one monitor call, and then
//! carries out the directives the monitor returns. Nothing runs in parallel,
//! so events reach the monitor strictly in arrival order.

use std::future::{Future, pending};
use std::pin::Pin;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};

use crate::domain::{
    FeedConnector, FeedFrame, FeedStream, RenderSink, SessionId, TransportError, TransportEvent,
};
use crate::monitor::{Directive, StatusMonitor};

const TICK_PERIOD: Duration = Duration::from_secs(1);

type ConnectFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FeedStream, TransportError>> + Send + 'a>>;

/// What woke the driver up
enum Wake {
    Connected {
        session: SessionId,
        result: Result<FeedStream, TransportError>,
    },
    Frame {
        session: SessionId,
        item: Option<Result<FeedFrame, TransportError>>,
    },
    ConnectTimeout {
        session: SessionId,
    },
    ReconnectDue,
    Tick {
        generation: u64,
    },
}

/// Timers and sockets owned by the driver
struct Resources<'a> {
    connecting: Option<(SessionId, ConnectFuture<'a>)>,
    feed: Option<(SessionId, FeedStream)>,
    connect_deadline: Option<(SessionId, Instant)>,
    reconnect_at: Option<Instant>,
    ticker: Option<(u64, Interval)>,
}

impl Resources<'_> {
    fn new() -> Self {
        Self {
            connecting: None,
            feed: None,
            connect_deadline: None,
            reconnect_at: None,
            ticker: None,
        }
    }
}

/// Run the monitor until the connection is given up for good.
///
/// # Arguments
///
/// * `monitor` - The monitor to drive; `start()` is called here
/// * `connector` - Opens feed connections
/// * `url` - The feed endpoint
///
/// # Returns
///
/// The number of retries made before giving up
pub async fn run_monitor_session<S, C>(
    monitor: &mut StatusMonitor<S>,
    connector: &C,
    url: &str,
) -> u32
where
    S: RenderSink,
    C: FeedConnector + ?Sized,
{
    let mut resources = Resources::new();
    let mut directives = monitor.start();

    loop {
        if let Some(attempts) = apply_directives(directives, &mut resources, connector, url) {
            return attempts;
        }

        let wake = tokio::select! {
            (session, result) = next_connection(&mut resources.connecting) => {
                Wake::Connected { session, result }
            }
            (session, item) = next_frame(&mut resources.feed) => Wake::Frame { session, item },
            session = deadline(&resources.connect_deadline) => Wake::ConnectTimeout { session },
            () = reconnect_due(resources.reconnect_at) => Wake::ReconnectDue,
            generation = next_tick(&mut resources.ticker) => Wake::Tick { generation },
        };

        directives = match wake {
            Wake::Connected { session, result } => {
                resources.connecting = None;
                match result {
                    Ok(stream) => {
                        resources.feed = Some((session, stream));
                        monitor.handle_transport_event(TransportEvent::Opened { session })
                    }
                    Err(e) => monitor.handle_transport_event(TransportEvent::Errored {
                        session,
                        message: e.to_string(),
                    }),
                }
            }
            Wake::Frame { session, item } => match item {
                Some(Ok(FeedFrame::Text(text))) => {
                    monitor.handle_transport_event(TransportEvent::Frame { session, text })
                }
                Some(Ok(FeedFrame::Closed { reason })) => {
                    resources.feed = None;
                    monitor.handle_transport_event(TransportEvent::Closed { session, reason })
                }
                Some(Err(TransportError::InvalidUtf8)) => {
                    tracing::warn!("Dropping binary frame that is not valid UTF-8");
                    Vec::new()
                }
                Some(Err(e)) => {
                    resources.feed = None;
                    monitor.handle_transport_event(TransportEvent::Errored {
                        session,
                        message: e.to_string(),
                    })
                }
                None => {
                    resources.feed = None;
                    monitor.handle_transport_event(TransportEvent::Closed {
                        session,
                        reason: "stream ended".to_string(),
                    })
                }
            },
            Wake::ConnectTimeout { session } => {
                resources.connect_deadline = None;
                monitor.handle_transport_event(TransportEvent::ConnectTimeoutElapsed { session })
            }
            Wake::ReconnectDue => {
                resources.reconnect_at = None;
                monitor.start()
            }
            Wake::Tick { generation } => {
                monitor.tick(generation);
                Vec::new()
            }
        };
    }
}

/// Carry out directives; `Some(attempts)` once the monitor gave up.
fn apply_directives<'a, C>(
    directives: Vec<Directive>,
    resources: &mut Resources<'a>,
    connector: &'a C,
    url: &'a str,
) -> Option<u32>
where
    C: FeedConnector + ?Sized,
{
    let mut gave_up = None;
    for directive in directives {
        match directive {
            Directive::Connect { session } => {
                resources.feed = None;
                resources.connecting = Some((session, connector.connect(url)));
            }
            Directive::ArmConnectTimeout { session, after } => {
                resources.connect_deadline = Some((session, Instant::now() + after));
            }
            Directive::CancelConnectTimeout => {
                resources.connect_deadline = None;
            }
            Directive::CloseTransport { session } => {
                if resources
                    .connecting
                    .as_ref()
                    .is_some_and(|(s, _)| *s == session)
                {
                    resources.connecting = None;
                }
                if resources.feed.as_ref().is_some_and(|(s, _)| *s == session) {
                    resources.feed = None;
                }
            }
            Directive::ScheduleReconnect { after } => {
                resources.reconnect_at = Some(Instant::now() + after);
            }
            Directive::RestartTicker { generation } => {
                let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                resources.ticker = Some((generation, interval));
            }
            Directive::StopTicker => {
                resources.ticker = None;
            }
            Directive::GiveUp { attempts } => {
                resources.connecting = None;
                resources.feed = None;
                resources.connect_deadline = None;
                resources.reconnect_at = None;
                resources.ticker = None;
                gave_up = Some(attempts);
            }
        }
    }
    gave_up
}

async fn next_connection(
    connecting: &mut Option<(SessionId, ConnectFuture<'_>)>,
) -> (SessionId, Result<FeedStream, TransportError>) {
    match connecting {
        Some((session, future)) => (*session, future.as_mut().await),
        None => pending().await,
    }
}

async fn next_frame(
    feed: &mut Option<(SessionId, FeedStream)>,
) -> (SessionId, Option<Result<FeedFrame, TransportError>>) {
    match feed {
        Some((session, stream)) => (*session, stream.next().await),
        None => pending().await,
    }
}

async fn deadline(connect_deadline: &Option<(SessionId, Instant)>) -> SessionId {
    match connect_deadline {
        Some((session, at)) => {
            sleep_until(*at).await;
            *session
        }
        None => pending().await,
    }
}

async fn reconnect_due(reconnect_at: Option<Instant>) {
    match reconnect_at {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

async fn next_tick(ticker: &mut Option<(u64, Interval)>) -> u64 {
    match ticker {
        Some((generation, interval)) => {
            interval.tick().await;
            *generation
        }
        None => pending().await,
    }
}
