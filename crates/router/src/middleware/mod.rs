//! Middleware definitions.
//!
//! A middleware is one of three shapes, told apart by how many inputs it takes:
//!
//! | kind       | inputs                     | trait                |
//! |------------|----------------------------|----------------------|
//! | terminal   | `(req, res)`               | [`TerminalHandler`]  |
//! | standard   | `(req, res, next)`         | [`StandardHandler`]  |
//! | error      | `(err, req, res, next)`    | [`ErrorHandler`]     |
//!
//! The shape is fixed when the middleware is constructed and cached in the [`Middleware`]
//! tag, so dispatch never has to inspect a handler again.
//!
//! Closures are turned into middlewares with [`terminal_fn`], [`middleware_fn`] and
//! [`error_fn`]; types implementing one of the traits are wrapped with the matching
//! `Middleware::*` constructor.
//!
//! ```
//! use futures::FutureExt;
//! use micro_router::middleware::{error_fn, middleware_fn};
//!
//! let auth = middleware_fn(|req, res, next| {
//!     async move {
//!         if req.header("authorization").is_none() {
//!             return next.fail("missing credentials", req, res).await;
//!         }
//!         next.run(req, res).await
//!     }
//!     .boxed()
//! });
//! assert_eq!(auth.arity(), 3);
//!
//! let recover = error_fn(|err, _req, res, _next| {
//!     async move {
//!         res.status(http::StatusCode::UNAUTHORIZED).text(err.to_string())?;
//!         Ok(())
//!     }
//!     .boxed()
//! });
//! assert!(recover.is_error());
//! ```

mod classify;

pub use classify::{check_homogeneous, is_error_middleware, is_valid_middleware, number_of_parameters};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::chain::Next;
use crate::error::{HandlerResult, RouteError};
use crate::request::Request;
use crate::response::Response;

/// A middleware taking `(req, res)`; it cannot continue the chain.
#[async_trait]
pub trait TerminalHandler: Send + Sync {
    async fn call(&self, req: &mut Request, res: &mut Response) -> HandlerResult;
}

/// A middleware taking `(req, res, next)`.
#[async_trait]
pub trait StandardHandler: Send + Sync {
    async fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult;
}

/// A middleware taking `(err, req, res, next)`, only run while an error is being handled.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn call(&self, err: RouteError, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult;
}

/// Whether a middleware handles regular traffic or errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MiddlewareKind {
    Standard,
    Error,
}

impl fmt::Display for MiddlewareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareKind::Standard => f.write_str("standard"),
            MiddlewareKind::Error => f.write_str("error"),
        }
    }
}

/// A registered middleware, tagged with its shape.
#[derive(Clone)]
pub enum Middleware {
    Terminal(Arc<dyn TerminalHandler>),
    Standard(Arc<dyn StandardHandler>),
    Error(Arc<dyn ErrorHandler>),
}

impl Middleware {
    pub fn terminal<H: TerminalHandler + 'static>(handler: H) -> Self {
        Middleware::Terminal(Arc::new(handler))
    }

    pub fn standard<H: StandardHandler + 'static>(handler: H) -> Self {
        Middleware::Standard(Arc::new(handler))
    }

    pub fn error<H: ErrorHandler + 'static>(handler: H) -> Self {
        Middleware::Error(Arc::new(handler))
    }

    /// the number of inputs the middleware declares: 2, 3 or 4
    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            Middleware::Terminal(_) => 2,
            Middleware::Standard(_) => 3,
            Middleware::Error(_) => 4,
        }
    }

    #[inline]
    pub fn kind(&self) -> MiddlewareKind {
        match self {
            Middleware::Error(_) => MiddlewareKind::Error,
            Middleware::Terminal(_) | Middleware::Standard(_) => MiddlewareKind::Standard,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind() == MiddlewareKind::Error
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").field("kind", &self.kind()).field("arity", &self.arity()).finish()
    }
}

/// a closure holder which represents a `(req, res)` middleware
pub struct FnTerminal<F>(F);

/// a closure holder which represents a `(req, res, next)` middleware
pub struct FnStandard<F>(F);

/// a closure holder which represents a `(err, req, res, next)` middleware
pub struct FnError<F>(F);

/// Creates a terminal middleware from a closure returning a boxed future.
pub fn terminal_fn<F>(f: F) -> Middleware
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Middleware::terminal(FnTerminal(f))
}

/// Creates a standard middleware from a closure returning a boxed future.
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Middleware::standard(FnStandard(f))
}

/// Creates an error middleware from a closure returning a boxed future.
pub fn error_fn<F>(f: F) -> Middleware
where
    F: for<'a> Fn(RouteError, &'a mut Request, &'a mut Response, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    Middleware::error(FnError(f))
}

#[async_trait]
impl<F> TerminalHandler for FnTerminal<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    async fn call(&self, req: &mut Request, res: &mut Response) -> HandlerResult {
        (self.0)(req, res).await
    }
}

#[async_trait]
impl<F> StandardHandler for FnStandard<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    async fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        (self.0)(req, res, next).await
    }
}

#[async_trait]
impl<F> ErrorHandler for FnError<F>
where
    F: for<'a> Fn(RouteError, &'a mut Request, &'a mut Response, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
{
    async fn call(&self, err: RouteError, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        (self.0)(err, req, res, next).await
    }
}
