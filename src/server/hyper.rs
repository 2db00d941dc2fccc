use crate::dispatch::Dispatcher;
use crate::lifecycle::Lifecycle;
use crate::request::Request;
use http_body_util::Full;
use hyper::body::{Body, Bytes, Frame, Incoming, SizeHint};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use log::debug;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::net::TcpListener;

/// How long in-flight connections get to finish once the server has been stopped.
const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// The actual HTTP server answering incoming requests through the dispatcher.
///
/// Each connection is served on its own task. The loop exits when `lifecycle` is stopped:
/// the listener is dropped right away, so new connection attempts fail, while the
/// connections already accepted get to write their responses out.
pub(super) async fn run_server(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    lifecycle: Arc<Lifecycle>,
) {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        debug!("Failed to accept a connection: {}", e);
                        continue;
                    }
                };

                let dispatcher = dispatcher.clone();
                let lifecycle = lifecycle.clone();
                let service = service_fn(move |request| {
                    handle_request(request, dispatcher.clone(), lifecycle.clone())
                });
                let connection = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .serve_connection(TokioIo::new(stream), service);
                let connection = graceful.watch(connection);

                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        debug!("Connection from {} failed: {}", remote, e);
                    }
                });
            }
            _ = lifecycle.stopped() => {
                debug!("Stopped accepting connections");
                break;
            }
        }
    }

    drop(listener);

    tokio::select! {
        _ = graceful.shutdown() => {
            debug!("All connections closed");
        }
        _ = tokio::time::sleep(GRACE_PERIOD) => {
            debug!("Gave up waiting for connections to close after {:?}", GRACE_PERIOD);
        }
    }
}

async fn handle_request(
    request: hyper::Request<Incoming>,
    dispatcher: Arc<Dispatcher>,
    lifecycle: Arc<Lifecycle>,
) -> Result<hyper::Response<ResponseBody>, hyper::Error> {
    let request = Request::from_hyper(request).await.map_err(|e| {
        debug!("Failed to read the request body: {}", e);
        e
    })?;

    let dispatch = dispatcher.dispatch(&request);
    let stop = dispatch.stop.then_some(lifecycle);
    Ok(dispatch
        .response
        .into_hyper()
        .map(|body| ResponseBody { body, stop }))
}

/// A response body that stops the server once hyper is done with it.
///
/// hyper drops the body after its last frame has been handed to the connection, so the
/// lifecycle flips only after the response has been written out. The graceful shutdown then
/// lets the connection flush before closing it.
pub(super) struct ResponseBody {
    body: Full<Bytes>,
    stop: Option<Arc<Lifecycle>>,
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        Pin::new(&mut self.get_mut().body).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.body.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.body.size_hint()
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        if let Some(lifecycle) = self.stop.take() {
            lifecycle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn the_server_stops_only_once_the_body_is_released() {
        let lifecycle = Arc::new(Lifecycle::new());
        let mut body = ResponseBody {
            body: Full::new(Bytes::from_static(b"{}")),
            stop: Some(lifecycle.clone()),
        };

        let frame = body.frame().await.unwrap().unwrap();
        assert_eq!(frame.into_data().unwrap(), Bytes::from_static(b"{}"));
        assert!(!lifecycle.is_stopped());

        drop(body);
        assert!(lifecycle.is_stopped());
    }

    #[tokio::test]
    async fn ordinary_bodies_leave_the_server_running() {
        let lifecycle = Arc::new(Lifecycle::new());
        let body = ResponseBody {
            body: Full::new(Bytes::from_static(b"{}")),
            stop: None,
        };

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from_static(b"{}"));
        assert!(!lifecycle.is_stopped());
    }
}
