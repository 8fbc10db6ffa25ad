//! Chain execution.
//!
//! A [`MiddlewareChain`] is an ordered list of middlewares. Running it creates a fresh
//! cursor, so the same chain can serve any number of requests. Each middleware receives a
//! [`Next`] continuation which resumes the chain from the following middleware.
//!
//! There are two ways for an error to leave a chain:
//! - a middleware forwards it with [`Next::fail`]; the rest of the chain is skipped and
//!   the error chain takes over, the original chain is never resumed
//! - a middleware returns `Err`; the fault climbs back to the run boundary which hands it
//!   to the error chain, unless it was raised inside the error chain itself
//!
//! Without an error chain, a forwarded error is handed to the next error middleware of the
//! current chain, and a fault is returned to the caller.

mod builder;

pub use builder::{ChainSet, build_chains};

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{trace, warn};

use crate::error::{BoxError, HandlerResult, RouteError};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// An ordered, reusable list of middlewares.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareChain {
    handlers: Arc<Vec<Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: Middleware) -> &mut Self {
        Arc::make_mut(&mut self.handlers).push(middleware);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Middleware] {
        &self.handlers
    }

    /// Runs the chain from its first middleware.
    ///
    /// `initial_error` is handed to every error middleware which is not given another error
    /// by its predecessor. `error_chain` receives forwarded errors and faults; when it is
    /// `None` faults are returned to the caller.
    pub fn run<'r>(
        &self,
        initial_error: Option<RouteError>,
        req: &'r mut Request,
        res: &'r mut Response,
        error_chain: Option<&MiddlewareChain>,
    ) -> BoxFuture<'r, Result<(), RouteError>> {
        let mut run = ChainRun {
            handlers: Arc::clone(&self.handlers),
            cursor: 0,
            initial_error,
            error_chain: error_chain.cloned(),
        };

        async move {
            let fault = match run.advance(None, req, res).await {
                Ok(()) => return Ok(()),
                Err(fault) => match fault.downcast::<ErrorChainFault>() {
                    Ok(escaped) => return Err(escaped.0),
                    Err(fault) => RouteError::fault(fault),
                },
            };

            match run.error_chain.take() {
                Some(error_chain) => {
                    warn!(cause = %fault, "middleware failed, running the error chain");
                    error_chain.run(Some(fault), req, res, None).await
                }
                None => Err(fault),
            }
        }
        .boxed()
    }
}

impl From<Vec<Middleware>> for MiddlewareChain {
    fn from(handlers: Vec<Middleware>) -> Self {
        Self { handlers: Arc::new(handlers) }
    }
}

impl FromIterator<Middleware> for MiddlewareChain {
    fn from_iter<T: IntoIterator<Item = Middleware>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// The state of one execution of a chain.
struct ChainRun {
    handlers: Arc<Vec<Middleware>>,
    cursor: usize,
    initial_error: Option<RouteError>,
    error_chain: Option<MiddlewareChain>,
}

/// A fault raised inside the error chain a middleware delegated to.
///
/// It climbs back through the middlewares of the original chain like any other error, and
/// is recognised at the run boundary so it is not handed to the error chain a second time.
#[derive(Debug)]
struct ErrorChainFault(RouteError);

impl fmt::Display for ErrorChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for ErrorChainFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl ChainRun {
    fn advance<'r>(
        &'r mut self,
        error: Option<RouteError>,
        req: &'r mut Request,
        res: &'r mut Response,
    ) -> BoxFuture<'r, HandlerResult> {
        async move {
            if let Some(err) = &error {
                if let Some(error_chain) = self.error_chain.clone() {
                    return error_chain
                        .run(Some(err.clone()), req, res, None)
                        .await
                        .map_err(|fault| BoxError::from(ErrorChainFault(fault)));
                }
            }

            loop {
                let Some(handler) = self.handlers.get(self.cursor).cloned() else {
                    return Ok(());
                };
                self.cursor += 1;

                let forwarded = error.clone().or_else(|| self.initial_error.clone());
                match (forwarded, handler) {
                    (Some(err), Middleware::Error(handler)) => {
                        return handler.call(err, req, res, Next { run: &mut *self }).await;
                    }
                    (None, Middleware::Standard(handler)) => {
                        return handler.call(req, res, Next { run: &mut *self }).await;
                    }
                    (None, Middleware::Terminal(handler)) => return handler.call(req, res).await,
                    (forwarded, handler) => {
                        trace!(
                            position = self.cursor - 1,
                            kind = %handler.kind(),
                            forwarding = forwarded.is_some(),
                            "middleware skipped"
                        );
                    }
                }
            }
        }
        .boxed()
    }
}

/// The continuation handed to standard and error middlewares.
///
/// Consuming it is the only way to resume the chain, so a middleware continues at most once.
/// Dropping it ends the request there.
pub struct Next<'a> {
    run: &'a mut ChainRun,
}

impl<'a> Next<'a> {
    /// Continues with the following middleware.
    pub fn run<'r>(self, req: &'r mut Request, res: &'r mut Response) -> BoxFuture<'r, HandlerResult>
    where
        'a: 'r,
    {
        let Next { run } = self;
        run.advance(None, req, res)
    }

    /// Abandons the chain and hands `err` to the error chain.
    pub fn fail<'r>(self, err: impl Into<BoxError>, req: &'r mut Request, res: &'r mut Response) -> BoxFuture<'r, HandlerResult>
    where
        'a: 'r,
    {
        let Next { run } = self;
        run.advance(Some(RouteError::forwarded(err)), req, res)
    }
}
