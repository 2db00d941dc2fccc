//! All bits and pieces concerning the HTTP server.
//!
//! `bare_server::MockApiServer` is the handle to drive the `hyper` HTTP server running in the
//! background, defined in the `hyper` sub-module. `builder::MockApiServerBuilder` wires the
//! dispatcher together before the server starts.
mod bare_server;
mod builder;
mod hyper;

pub use bare_server::MockApiServer;
pub use builder::MockApiServerBuilder;

impl MockApiServer {
    /// Use `MockApiServer::builder` to configure the listener, base URL, fixture directory
    /// and request log of a new server.
    pub fn builder() -> MockApiServerBuilder {
        MockApiServerBuilder::new()
    }
}
