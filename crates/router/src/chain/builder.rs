use crate::chain::MiddlewareChain;
use crate::middleware::Middleware;
use crate::route::Route;

/// The chains built for one request from its matched routes.
#[derive(Debug, Clone, Default)]
pub struct ChainSet {
    /// standard middlewares of global routes (no path, any method)
    pub pre: MiddlewareChain,
    /// standard middlewares of every other matched route
    pub route: MiddlewareChain,
    /// every error middleware
    pub error: MiddlewareChain,
    /// every middleware, in registration order; this is the chain a request runs through
    pub all: MiddlewareChain,
}

/// Partitions the middlewares of the matched routes, keeping registration order in each chain.
pub fn build_chains<'a>(routes: impl IntoIterator<Item = &'a Route>) -> ChainSet {
    let mut chains = ChainSet::default();

    for route in routes {
        for middleware in route.handlers() {
            match middleware {
                Middleware::Error(_) => chains.error.push(middleware.clone()),
                _ if route.is_global() => chains.pre.push(middleware.clone()),
                Middleware::Terminal(_) | Middleware::Standard(_) => chains.route.push(middleware.clone()),
            };
            chains.all.push(middleware.clone());
        }
    }

    chains
}
