use crate::config::ServerUrl;
use crate::error::{Error, Result};
use crate::fixtures::Fixtures;
use crate::generators;
use crate::log_stream::LogStream;
use crate::request::{BodyText, Request};
use crate::response::Response;
use crate::routes::{Action, RouteTable};
use http::StatusCode;
use log::{debug, error, warn};

/// The outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub response: Response,
    /// The server must stop once `response` has been written.
    pub stop: bool,
}

impl From<Response> for Dispatch {
    fn from(response: Response) -> Self {
        Self {
            response,
            stop: false,
        }
    }
}

/// Maps each request to exactly one response.
///
/// Holds nothing mutable besides the shared log stream: the route table, the fixture location
/// and the base URL are fixed when the server starts.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: RouteTable,
    fixtures: Fixtures,
    base_url: ServerUrl,
    log: LogStream,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, fixtures: Fixtures, base_url: ServerUrl, log: LogStream) -> Self {
        Self {
            routes,
            fixtures,
            base_url,
            log,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn log(&self) -> &LogStream {
        &self.log
    }

    /// Log `request`, pick its response and flush the log, whatever the outcome.
    ///
    /// Errors never escape: they become an error response plus a log line.
    pub fn dispatch(&self, request: &Request) -> Dispatch {
        self.log.line(request);
        let dispatch = self
            .respond(request)
            .unwrap_or_else(|e| self.report(request, e).into());
        self.log.flush();
        dispatch
    }

    fn respond(&self, request: &Request) -> Result<Dispatch> {
        let route = self
            .routes
            .find(&request.method, &request.path)
            .ok_or_else(|| Error::NoRouteMatched {
                method: request.method.to_string(),
                path: request.path.clone(),
            })?;
        debug!("{} {} matched `{}`", request.method, request.path, route.pattern);

        let response = match route.action {
            Action::Alive => Response::alive(),
            Action::Stop => {
                self.log.line("HTTP server stopping!");
                return Ok(Dispatch {
                    response: Response::new(StatusCode::OK),
                    stop: true,
                });
            }
            Action::Json(body) => Response::json(body),
            Action::Fixture(name) => Response::json(self.fixtures.load(name)?),
            Action::ChunkUploadConfig => {
                Response::json(generators::chunk_upload_config(&self.base_url, request)?)
            }
            Action::DifsAssemble => Response::json(generators::difs_assemble(request, &self.log)?),
            Action::Envelope => {
                self.log_envelope(request);
                Response::json("{}")
            }
        };
        Ok(response.into())
    }

    fn log_envelope(&self, request: &Request) {
        let body = request.body_text();
        if let BodyText::Hex(_) = body {
            debug!("Envelope body is not valid UTF-8, logging it as hex");
        }
        self.log.block(|sink| {
            writeln!(sink, "     envelope start")?;
            write!(sink, "{}", body.as_str())?;
            writeln!(sink, "\n     envelope end")
        });
    }

    fn report(&self, request: &Request, error: Error) -> Response {
        let status = match &error {
            Error::NoRouteMatched { .. } => {
                warn!("{}", error);
                StatusCode::NOT_IMPLEMENTED
            }
            Error::MalformedBody(_) => {
                warn!("{} {}: {}", request.method, request.path, error);
                StatusCode::BAD_REQUEST
            }
            _ => {
                error!("{} {}: {}", request.method, request.path, error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = error.to_string();
        self.log.line(&message);
        Response::new(status).set_body_string(message)
    }
}
