// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};

use crate::config::AppState;
use crate::handler;
use crate::http::{self, HttpResponse};
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
    );
}

/// Requests in flight on one connection and when the last one finished
#[derive(Debug)]
struct Activity {
    in_flight: AtomicUsize,
    last_done: Mutex<Instant>,
}

/// Marks one request as in flight until dropped
struct InFlight(Arc<Activity>);

impl Activity {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            last_done: Mutex::new(Instant::now()),
        }
    }

    fn begin(self: &Arc<Self>) -> InFlight {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }

    /// Time left before the connection counts as idle for `limit`
    fn idle_remaining(&self, limit: Duration) -> Duration {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return limit;
        }
        let last_done = self
            .last_done
            .lock()
            .map_or_else(|poisoned| *poisoned.into_inner(), |guard| *guard);
        limit.saturating_sub(last_done.elapsed())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut last_done) = self.0.last_done.lock() {
            *last_done = Instant::now();
        }
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run the handler, answering 503 if it has not produced a response by `deadline`
async fn respond_within(
    deadline: Duration,
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: std::net::SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let path = req.uri().path().to_string();
    if let Ok(result) =
        tokio::time::timeout(deadline, handler::handle_request(req, state, peer_addr)).await
    {
        return result;
    }
    logger::log_warning(&format!(
        "Request {path} from {peer_addr} exceeded {}s",
        deadline.as_secs()
    ));
    Ok(http::error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Request timed out",
        None,
    ))
}

/// Handle a single connection in a spawned task.
///
/// Clients get `read_timeout` to send each request head and every request
/// is answered within `write_timeout`. With keep-alive on, a connection
/// with no request in flight for `keep_alive_timeout` is shut down
/// gracefully. The slot in `conn_counter` is released at the end.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let keep_alive = performance.keep_alive_timeout > 0;
        let idle_limit = Duration::from_secs(performance.keep_alive_timeout);
        let deadline = Duration::from_secs(performance.write_timeout);

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(performance.read_timeout))
            .keep_alive(keep_alive);

        let activity = Arc::new(Activity::new());
        let service_state = Arc::clone(&state);
        let service_activity = Arc::clone(&activity);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req: Request<Incoming>| {
                let state = Arc::clone(&service_state);
                let in_flight = service_activity.begin();
                async move {
                    let result = respond_within(deadline, req, state, peer_addr).await;
                    drop(in_flight);
                    result
                }
            }),
        );
        tokio::pin!(conn);

        let mut closing = !keep_alive;
        let result = loop {
            tokio::select! {
                result = &mut conn => break result,
                () = tokio::time::sleep(activity.idle_remaining(idle_limit)), if !closing => {
                    if activity.idle_remaining(idle_limit).is_zero() {
                        logger::log_connection_idle(&peer_addr, idle_limit.as_secs());
                        conn.as_mut().graceful_shutdown();
                        closing = true;
                    }
                }
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
