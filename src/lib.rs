//! `apistub` is a stand-in for a remote HTTP API, used to run a command-line client
//! end-to-end in integration tests without a real backend.
//!
//! It answers a fixed table of endpoints with canned responses: static JSON fixtures, literal
//! JSON strings, or small payloads generated from the request.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Routing](#routing)
//! 3. [The request log](#the-request-log)
//! 4. [Stopping the server](#stopping-the-server)
//!
//! ## Getting started
//! ```rust,no_run
//! use apistub::MockApiServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Serve on a free local port, reading fixtures from `./assets`.
//!     let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
//!     let mut server = MockApiServer::builder()
//!         .listener(listener)
//!         .fixtures("assets")
//!         .start()
//!         .unwrap();
//!
//!     let status = reqwest::get(format!("{}/api/0/", server.uri()))
//!         .await
//!         .unwrap()
//!         .status();
//!     assert_eq!(status.as_u16(), 200);
//!
//!     // Anything the route table does not know about is a 501.
//!     let status = reqwest::get(format!("{}/missing", server.uri()))
//!         .await
//!         .unwrap()
//!         .status();
//!     assert_eq!(status.as_u16(), 501);
//!
//!     reqwest::get(format!("{}/STOP", server.uri())).await.unwrap();
//!     server.wait().await;
//! }
//! ```
//!
//! ## Routing
//!
//! A route is a `(method, path)` pair. Paths are compared literally once leading and trailing
//! `/` are stripped from both sides; there are no wildcards and query strings are not parsed.
//! See [`RouteTable::for_scope`] for the endpoints the stub knows about.
//!
//! ## The request log
//!
//! Every request is written as one line to a [`LogStream`] (standard output by default), along
//! with diagnostic lines from the generators. The stream is flushed after every request so a
//! harness reading it never waits on a buffer.
//!
//! Internal diagnostics go through the [`log`] facade instead.
//!
//! ## Stopping the server
//!
//! `GET /STOP` answers `200` and then stops the server: the listener is closed, in-flight
//! responses are written out. [`MockApiServer::stop`] and dropping the handle do the same.
//!
//! [`log`]: https://docs.rs/log/
mod config;
mod dispatch;
mod error;
mod fixtures;
mod generators;
mod lifecycle;
mod log_stream;
mod request;
mod response;
mod routes;
mod server;

pub use config::{ApiScope, ServerUrl, DEFAULT_URL};
pub use dispatch::{Dispatch, Dispatcher};
pub use error::{Error, Result};
pub use fixtures::{Fixtures, DEFAULT_FIXTURE_DIR};
pub use generators::{chunk_upload_config, difs_assemble};
pub use lifecycle::Lifecycle;
pub use log_stream::{LogBuffer, LogStream};
pub use request::{BodyText, Request};
pub use response::{Response, ALIVE_STATUS};
pub use routes::{Action, Route, RouteTable};
pub use server::{MockApiServer, MockApiServerBuilder};
