//! An HTTP routing and middleware dispatch engine.
//!
//! Middlewares are registered on a [`Router`] against an HTTP method and a path schema
//! (`/users/:id`), or globally. Once registration is over, the router is sealed into a
//! [`Dispatcher`] which serves requests: it selects the routes applicable to each request,
//! runs their middlewares in registration order, and routes errors to the error middlewares.
//!
//! The transport is not part of this crate; a server hands every parsed request to
//! [`Dispatcher::handle`] or [`Dispatcher::serve`].
//!
//! # Example
//!
//! ```
//! use futures::FutureExt;
//! use http::{Method, StatusCode};
//! use micro_router::builtin::RequestLogger;
//! use micro_router::{Dispatcher, Request, Response, Router, terminal_fn};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let mut router = Router::new();
//! router.use_middleware([RequestLogger::middleware()])?;
//! router.get(
//!     "/users/:id",
//!     [terminal_fn(|req, res| {
//!         let id = req.param("id").unwrap_or_default().to_string();
//!         async move { Ok(res.text(format!("user {id}"))?) }.boxed()
//!     })],
//! )?;
//!
//! let dispatcher = Dispatcher::builder().router(router).build()?;
//!
//! let mut req = Request::new(Method::GET, "/users/42");
//! let mut res = Response::new();
//! dispatcher.handle(&mut req, &mut res).await?;
//! assert_eq!(res.body().as_ref(), b"user 42");
//!
//! let mut req = Request::new(Method::GET, "/nowhere");
//! let mut res = Response::new();
//! dispatcher.handle(&mut req, &mut res).await?;
//! assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
//! # Ok(())
//! # }
//! ```

mod app;
mod method;
mod request;
mod response;
mod route;

pub mod builtin;
pub mod chain;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod logging;
pub mod middleware;
pub mod pattern;
pub mod registry;
pub mod view;

pub use app::AppContext;
pub use chain::MiddlewareChain;
pub use chain::Next;
pub use config::Settings;
pub use dispatcher::Dispatcher;
pub use dispatcher::UrlOptions;
pub use error::BoxError;
pub use error::HandlerResult;
pub use error::RouteError;
pub use method::RouteMethod;
pub use method::UnknownMethod;
pub use middleware::Middleware;
pub use middleware::error_fn;
pub use middleware::middleware_fn;
pub use middleware::terminal_fn;
pub use registry::RouteRef;
pub use registry::Router;
pub use registry::UseItem;
pub use request::PathParams;
pub use request::Request;
pub use response::Response;
pub use route::Route;
pub use view::JinjaEngine;
pub use view::ViewEngine;
