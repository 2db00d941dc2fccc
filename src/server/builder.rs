use crate::config::{ApiScope, ServerUrl};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::fixtures::Fixtures;
use crate::log_stream::LogStream;
use crate::routes::RouteTable;
use crate::server::MockApiServer;
use std::net::TcpListener;
use std::path::PathBuf;

/// A builder providing a fluent API to assemble a [`MockApiServer`] step-by-step.
/// Use [`MockApiServer::builder`] to get started.
pub struct MockApiServerBuilder {
    url: Option<ServerUrl>,
    listener: Option<TcpListener>,
    fixtures: Fixtures,
    scope: ApiScope,
    log: Option<LogStream>,
}

impl MockApiServerBuilder {
    pub(super) fn new() -> Self {
        Self {
            url: None,
            listener: None,
            fixtures: Fixtures::default(),
            scope: ApiScope::default(),
            log: None,
        }
    }

    /// The base URL the server advertises and, unless a [`listener`](Self::listener) is
    /// supplied, binds to. Defaults to `http://127.0.0.1:8000`.
    pub fn url(mut self, url: ServerUrl) -> Self {
        self.url = Some(url);
        self
    }

    /// Serve on a listener you have already bound, e.g. on port 0 to get a free port.
    ///
    /// Without an explicit [`url`](Self::url) the advertised URL is derived from the
    /// listener's address.
    ///
    /// ### Example:
    /// ```rust,no_run
    /// use apistub::MockApiServer;
    ///
    /// let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    /// let expected_address = listener.local_addr().unwrap();
    ///
    /// let server = MockApiServer::builder().listener(listener).start().unwrap();
    ///
    /// assert_eq!(&expected_address, server.address());
    /// assert_eq!(server.uri(), format!("http://{}", expected_address));
    /// ```
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Directory the JSON fixtures are read from. Defaults to `assets`, relative to the
    /// working directory.
    pub fn fixtures(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures = Fixtures::new(dir);
        self
    }

    /// The organization, project and release baked into the route table.
    pub fn scope(mut self, scope: ApiScope) -> Self {
        self.scope = scope;
        self
    }

    /// Where the request log goes. Defaults to standard output.
    pub fn log_stream(mut self, log: LogStream) -> Self {
        self.log = Some(log);
        self
    }

    /// Finalise the builder and launch the [`MockApiServer`] instance!
    pub fn start(self) -> Result<MockApiServer> {
        let (listener, url) = match (self.listener, self.url) {
            (Some(listener), Some(url)) => (listener, url),
            (Some(listener), None) => {
                let url = ServerUrl::parse(&format!("http://{}", listener.local_addr()?))?;
                (listener, url)
            }
            (None, url) => {
                let url = url.unwrap_or_default();
                let listener = TcpListener::bind(url.bind_address())?;
                (listener, url)
            }
        };
        let log = self.log.unwrap_or_default();

        log.line(format_args!("HTTP server listening on {}", url));
        log.line(format_args!(
            "To stop the server, execute a GET request to {}/STOP",
            url
        ));
        log.flush();

        let uri = url.as_str().to_string();
        let dispatcher = Dispatcher::new(RouteTable::for_scope(&self.scope), self.fixtures, url, log);
        Ok(MockApiServer::start(listener, uri, dispatcher)?)
    }
}
