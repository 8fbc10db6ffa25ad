use crate::RouteMethod;
use crate::middleware::Middleware;
use crate::pattern::join_paths;

/// One registered entry of a [`Router`](crate::Router).
#[derive(Debug, Clone)]
pub struct Route {
    method: RouteMethod,
    path: Option<String>,
    handlers: Vec<Middleware>,
    name: Option<String>,
}

impl Route {
    pub(crate) fn new(method: RouteMethod, path: Option<String>, handlers: Vec<Middleware>) -> Self {
        Self { method, path, handlers, name: None }
    }

    #[inline]
    pub fn method(&self) -> RouteMethod {
        self.method
    }

    /// the route schema, `None` for middlewares registered without path
    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[inline]
    pub fn handlers(&self) -> &[Middleware] {
        &self.handlers
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// A global route has no path and accepts any method; it runs for every request.
    #[inline]
    pub fn is_global(&self) -> bool {
        self.path.is_none() && self.method == RouteMethod::Any
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Moves the route under `prefix`. A route without path takes the prefix as its path.
    pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
        self.path = Some(match self.path.take() {
            Some(path) => join_paths(prefix, &path),
            None => prefix.to_string(),
        });
        self
    }
}
