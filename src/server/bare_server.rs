use crate::dispatch::Dispatcher;
use crate::lifecycle::Lifecycle;
use crate::server::hyper::run_server;
use log::{debug, error};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tokio::sync::oneshot;

/// The stub API server running in the background.
///
/// The server lives on its own thread, with its own tokio runtime, so it can be driven from
/// any async runtime or from plain synchronous code.
///
/// It runs until it receives `GET /STOP`, until [`MockApiServer::stop`] is called, or until
/// the handle is dropped.
pub struct MockApiServer {
    uri: String,
    address: SocketAddr,
    lifecycle: Arc<Lifecycle>,
    finished: Option<oneshot::Receiver<()>>,
}

impl MockApiServer {
    pub(super) fn start(
        listener: TcpListener,
        uri: String,
        dispatcher: Dispatcher,
    ) -> std::io::Result<Self> {
        let address = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let lifecycle = Arc::new(Lifecycle::new());
        let (finished_trigger, finished) = oneshot::channel();

        let server_lifecycle = lifecycle.clone();
        std::thread::Builder::new()
            .name(format!("apistub-{}", address))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Cannot build the server runtime: {}", e);
                        server_lifecycle.stop();
                        return;
                    }
                };

                runtime.block_on(async move {
                    match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => {
                            run_server(listener, Arc::new(dispatcher), server_lifecycle).await
                        }
                        Err(e) => {
                            error!("Cannot register the listener with the runtime: {}", e);
                            server_lifecycle.stop();
                        }
                    }
                });
                debug!("Server on {} is down", address);
                // Nobody may be waiting anymore.
                let _ = finished_trigger.send(());
            })?;

        Ok(Self {
            uri,
            address,
            lifecycle,
            finished: Some(finished),
        })
    }

    /// The advertised base URL of this server, e.g. `http://127.0.0.1:8000`.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The socket address the server is bound to.
    pub fn address(&self) -> &SocketAddr {
        &self.address
    }

    /// Stop accepting connections. Returns `false` if the server was already stopped.
    pub fn stop(&self) -> bool {
        self.lifecycle.stop()
    }

    pub fn is_stopped(&self) -> bool {
        self.lifecycle.is_stopped()
    }

    /// Wait until the server has stopped and its listener is closed.
    pub async fn wait(&mut self) {
        if let Some(finished) = self.finished.as_mut() {
            // An error means the server thread is gone, which is what we were waiting for.
            let _ = finished.await;
            self.finished = None;
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.lifecycle.stop();
    }
}
