//! The route registry.
//!
//! A [`Router`] collects routes in registration order, which is also the order they are
//! considered in at dispatch time. Routers can be mounted into each other: the routes of
//! the mounted router are copied, with the mount path prepended, and no link is kept.
//!
//! ```
//! use futures::FutureExt;
//! use micro_router::middleware::terminal_fn;
//! use micro_router::Router;
//!
//! let mut api = Router::new();
//! let widgets = api.get("/widgets", [terminal_fn(|_req, res| async move { Ok(res.text("widgets")?) }.boxed())])?;
//! api.name(widgets, "widgets")?;
//!
//! let mut app = Router::new();
//! app.mount(Some("/api"), api)?;
//! assert_eq!(app.url_to("widgets", &Default::default()).as_deref(), Some("/api/widgets"));
//! # Ok::<(), micro_router::error::RegistrationError>(())
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::RouteMethod;
use crate::error::RegistrationError;
use crate::middleware::{Middleware, check_homogeneous};
use crate::pattern::{fill_params, join_paths};
use crate::request::PathParams;
use crate::route::Route;

/// the default number of arguments accepted by [`Router::using`]
pub const DEFAULT_USE_LIMIT: usize = 10;

static NEXT_ROUTER_ID: AtomicU64 = AtomicU64::new(0);

fn next_router_id() -> u64 {
    NEXT_ROUTER_ID.fetch_add(1, Ordering::Relaxed)
}

/// A handle on a registered route, used to name it.
///
/// Only valid on the router which returned it: once that router is mounted elsewhere, or
/// cloned, its routes must be named through the new owner with [`Router::name_last`] or
/// before mounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRef {
    router: u64,
    index: usize,
}

/// One argument of [`Router::using`].
#[derive(Debug)]
pub enum UseItem {
    Path(String),
    Router(Router),
    Middleware(Middleware),
}

impl From<&str> for UseItem {
    fn from(path: &str) -> Self {
        UseItem::Path(path.to_string())
    }
}

impl From<String> for UseItem {
    fn from(path: String) -> Self {
        UseItem::Path(path)
    }
}

impl From<Router> for UseItem {
    fn from(router: Router) -> Self {
        UseItem::Router(router)
    }
}

impl From<Middleware> for UseItem {
    fn from(middleware: Middleware) -> Self {
        UseItem::Middleware(middleware)
    }
}

#[derive(Debug)]
pub struct Router {
    id: u64,
    base_path: String,
    routes: Vec<Route>,
    use_limit: usize,
}

impl Clone for Router {
    fn clone(&self) -> Self {
        Self { id: next_router_id(), base_path: self.base_path.clone(), routes: self.routes.clone(), use_limit: self.use_limit }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_route {
    ($name:ident, $method:ident) => {
        #[doc = concat!("Registers middlewares for `", stringify!($method), "` requests matching `path`.")]
        pub fn $name(&mut self, path: &str, handlers: impl IntoIterator<Item = Middleware>) -> Result<RouteRef, RegistrationError> {
            self.register(RouteMethod::$method, Some(path), handlers)
        }
    };
}

impl Router {
    pub fn new() -> Self {
        Self { id: next_router_id(), base_path: String::new(), routes: vec![], use_limit: DEFAULT_USE_LIMIT }
    }

    /// Prefixes every route registered from now on with `base_path`.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Sets the maximum number of arguments accepted by [`Router::using`].
    pub fn with_use_limit(mut self, use_limit: usize) -> Self {
        self.use_limit = use_limit;
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    /// Registers a route.
    ///
    /// `handlers` must be non-empty and all of one kind: either all error middlewares or
    /// none of them.
    pub fn register(
        &mut self,
        method: RouteMethod,
        path: Option<&str>,
        handlers: impl IntoIterator<Item = Middleware>,
    ) -> Result<RouteRef, RegistrationError> {
        let handlers: Vec<Middleware> = handlers.into_iter().collect();
        let kind = check_homogeneous(&handlers)?;

        let path = match path {
            Some(path) => Some(join_paths(&self.base_path, path)),
            None if self.base_path.is_empty() => None,
            None => Some(self.base_path.clone()),
        };

        debug!(%method, path = path.as_deref().unwrap_or("*"), %kind, count = handlers.len(), "route registered");
        self.routes.push(Route::new(method, path, handlers));
        Ok(RouteRef { router: self.id, index: self.routes.len() - 1 })
    }

    method_route!(get, Get);
    method_route!(post, Post);
    method_route!(put, Put);
    method_route!(patch, Patch);
    method_route!(head, Head);
    method_route!(options, Options);
    method_route!(delete, Delete);

    /// Registers middlewares for every method; without path they run for every request.
    pub fn any(&mut self, path: Option<&str>, handlers: impl IntoIterator<Item = Middleware>) -> Result<RouteRef, RegistrationError> {
        self.register(RouteMethod::Any, path, handlers)
    }

    /// Registers global middlewares.
    pub fn use_middleware(&mut self, handlers: impl IntoIterator<Item = Middleware>) -> Result<RouteRef, RegistrationError> {
        self.any(None, handlers)
    }

    /// Registers middlewares for every method on `path`.
    pub fn use_at(&mut self, path: &str, handlers: impl IntoIterator<Item = Middleware>) -> Result<RouteRef, RegistrationError> {
        self.any(Some(path), handlers)
    }

    /// Names a route so urls can be generated for it. Names are unique.
    pub fn name(&mut self, route: RouteRef, name: impl Into<String>) -> Result<&mut Self, RegistrationError> {
        if route.router != self.id {
            return Err(RegistrationError::ForeignRoute);
        }

        let name = name.into();
        let taken = self
            .routes
            .iter()
            .enumerate()
            .any(|(index, other)| index != route.index && other.name() == Some(name.as_str()));
        if taken {
            return Err(RegistrationError::duplicate_name(name));
        }

        let route = self.routes.get_mut(route.index).ok_or(RegistrationError::NoRouteToName)?;
        route.set_name(name);
        Ok(self)
    }

    /// Names the most recently registered route.
    pub fn name_last(&mut self, name: impl Into<String>) -> Result<&mut Self, RegistrationError> {
        let last = self.routes.len().checked_sub(1).ok_or(RegistrationError::NoRouteToName)?;
        self.name(RouteRef { router: self.id, index: last }, name)
    }

    /// Copies the routes of `router` into this one, prefixed with `path` when given.
    pub fn mount(&mut self, path: Option<&str>, router: Router) -> Result<&mut Self, RegistrationError> {
        if let Some(path) = path {
            if !path.starts_with('/') {
                return Err(RegistrationError::invalid_mount_path(path, "a mount path must start with '/'"));
            }
        }

        let mut names: HashSet<&str> = self.routes.iter().filter_map(Route::name).collect();
        for name in router.routes.iter().filter_map(Route::name) {
            if !names.insert(name) {
                return Err(RegistrationError::duplicate_name(name));
            }
        }

        debug!(path = path.unwrap_or("/"), count = router.len(), "router mounted");
        let routes = router.into_routes().into_iter().map(|route| match path {
            Some(path) => route.prefixed(path),
            None => route,
        });
        self.routes.extend(routes);
        Ok(self)
    }

    /// Registers routers or middlewares, with an optional leading path.
    ///
    /// The arguments are resolved in this order:
    /// 1. a router, optionally preceded by a path, is mounted
    /// 2. middlewares, optionally preceded by a path, are registered together for every method
    /// 3. otherwise the first router or middleware found after the optional path is used
    pub fn using<I>(&mut self, items: impl IntoIterator<Item = I>) -> Result<&mut Self, RegistrationError>
    where
        I: Into<UseItem>,
    {
        let mut items: Vec<UseItem> = items.into_iter().map(Into::into).collect();

        if items.is_empty() {
            return Err(RegistrationError::NoArguments);
        }
        if items.len() > self.use_limit {
            return Err(RegistrationError::TooManyArguments { count: items.len(), limit: self.use_limit });
        }

        let path = match items.first() {
            Some(UseItem::Path(_)) => match items.remove(0) {
                UseItem::Path(path) => Some(path),
                _ => None,
            },
            _ => None,
        };

        if matches!(items.as_slice(), [UseItem::Router(_)]) {
            if let Some(UseItem::Router(router)) = items.pop() {
                return self.mount(path.as_deref(), router);
            }
        }

        if !items.is_empty() && items.iter().all(|item| matches!(item, UseItem::Middleware(_))) {
            let handlers = items.into_iter().filter_map(|item| match item {
                UseItem::Middleware(middleware) => Some(middleware),
                _ => None,
            });
            self.any(path.as_deref(), handlers)?;
            return Ok(self);
        }

        for item in items {
            match item {
                UseItem::Router(router) => return self.mount(path.as_deref(), router),
                UseItem::Middleware(middleware) => {
                    self.any(path.as_deref(), [middleware])?;
                    return Ok(self);
                }
                UseItem::Path(_) => continue,
            }
        }

        Err(RegistrationError::InvalidHandlerType)
    }

    /// Builds the url of a named route, or `None` if no route has this name.
    pub fn url_to(&self, name: &str, params: &PathParams) -> Option<String> {
        url_for(&self.routes, name, params)
    }
}

pub(crate) fn url_for(routes: &[Route], name: &str, params: &PathParams) -> Option<String> {
    let route = routes.iter().find(|route| route.name() == Some(name))?;
    route.path().map(|schema| fill_params(schema, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{MiddlewareKind, error_fn, middleware_fn};

    fn standard() -> Middleware {
        middleware_fn(|req, res, next| next.run(req, res))
    }

    fn error() -> Middleware {
        error_fn(|_err, req, res, next| next.run(req, res))
    }

    fn paths(router: &Router) -> Vec<Option<&str>> {
        router.routes().iter().map(Route::path).collect()
    }

    #[test]
    fn test_register_keeps_order() {
        let mut router = Router::new();
        router.get("/users/:id", [standard()]).unwrap();
        router.post("/users", [standard(), standard()]).unwrap();
        router.use_middleware([standard()]).unwrap();
        router.delete("/users/:id", [standard()]).unwrap();

        assert_eq!(paths(&router), vec![Some("/users/:id"), Some("/users"), None, Some("/users/:id")]);
        let methods: Vec<RouteMethod> = router.routes().iter().map(Route::method).collect();
        assert_eq!(methods, vec![RouteMethod::Get, RouteMethod::Post, RouteMethod::Any, RouteMethod::Delete]);
        assert!(router.routes()[2].is_global());
    }

    #[test]
    fn test_register_rejects_invalid_lists() {
        let mut router = Router::new();
        assert_eq!(router.get("/", []), Err(RegistrationError::EmptyHandlers));
        assert_eq!(
            router.get("/", [standard(), error()]),
            Err(RegistrationError::MixedHandlers {
                expected: MiddlewareKind::Standard,
                found: MiddlewareKind::Error,
                index: 1
            })
        );
        assert!(matches!(router.use_middleware([error(), standard()]), Err(RegistrationError::MixedHandlers { .. })));
        assert!(router.is_empty());
    }

    #[test]
    fn test_base_path() {
        let mut router = Router::new().with_base_path("/admin");
        router.get("/users", [standard()]).unwrap();
        router.use_middleware([standard()]).unwrap();

        assert_eq!(paths(&router), vec![Some("/admin/users"), Some("/admin")]);
    }

    #[test]
    fn test_naming() {
        let mut router = Router::new();
        assert_eq!(router.name_last("nothing").err(), Some(RegistrationError::NoRouteToName));

        let user = router.get("/users/:id", [standard()]).unwrap();
        router.post("/users", [standard()]).unwrap();
        router.name_last("create_user").unwrap();
        router.name(user, "user").unwrap();

        assert_eq!(router.routes()[0].name(), Some("user"));
        assert_eq!(router.routes()[1].name(), Some("create_user"));
        assert_eq!(router.name(user, "create_user").err(), Some(RegistrationError::duplicate_name("create_user")));
    }

    #[test]
    fn test_renaming_to_the_same_name() {
        let mut router = Router::new();
        let user = router.get("/users/:id", [standard()]).unwrap();
        router.name(user, "user").unwrap();
        router.name(user, "user").unwrap();

        assert_eq!(router.routes()[0].name(), Some("user"));
    }

    #[test]
    fn test_naming_rejects_routes_of_other_routers() {
        let mut api = Router::new();
        let widgets = api.get("/widgets", [standard()]).unwrap();

        let mut app = Router::new();
        app.get("/", [standard()]).unwrap();
        assert_eq!(app.name(widgets, "widgets").err(), Some(RegistrationError::ForeignRoute));

        app.mount(Some("/api"), api).unwrap();
        assert_eq!(app.name(widgets, "widgets").err(), Some(RegistrationError::ForeignRoute));
        assert!(app.routes().iter().all(|route| route.name().is_none()));

        let mut copy = app.clone();
        let root = app.get("/about", [standard()]).unwrap();
        assert_eq!(copy.name(root, "about").err(), Some(RegistrationError::ForeignRoute));
    }

    #[test]
    fn test_url_to() {
        let mut router = Router::new();
        router.get("/users/:id/posts/:slug", [standard()]).unwrap();
        router.name_last("post").unwrap();

        let params: PathParams = [("id", "7"), ("slug", "hello")].into_iter().collect();
        assert_eq!(router.url_to("post", &params).as_deref(), Some("/users/7/posts/hello"));
        assert_eq!(router.url_to("missing", &params), None);
    }

    #[test]
    fn test_mount_prefixes_paths() {
        let mut api = Router::new();
        api.get("/widgets", [standard()]).unwrap();
        api.name_last("widgets").unwrap();
        api.use_middleware([standard()]).unwrap();

        let mut app = Router::new();
        app.use_middleware([standard()]).unwrap();
        app.mount(Some("/api"), api.clone()).unwrap();
        app.mount(None, Router::new()).unwrap();

        assert_eq!(paths(&app), vec![None, Some("/api/widgets"), Some("/api")]);
        assert_eq!(app.routes()[1].name(), Some("widgets"));
        assert_eq!(app.routes()[1].method(), RouteMethod::Get);

        // the mounted router is copied, not linked
        api.get("/gadgets", [standard()]).unwrap();
        assert_eq!(app.len(), 3);
    }

    #[test]
    fn test_mount_without_path_keeps_routes() {
        let mut child = Router::new();
        child.use_middleware([standard()]).unwrap();
        child.get("/health", [standard()]).unwrap();

        let mut app = Router::new();
        app.mount(None, child).unwrap();
        assert_eq!(paths(&app), vec![None, Some("/health")]);
        assert!(app.routes()[0].is_global());
    }

    #[test]
    fn test_mount_rejects_invalid_input() {
        let mut app = Router::new();
        assert!(matches!(app.mount(Some("api"), Router::new()), Err(RegistrationError::InvalidMountPath { .. })));

        app.get("/", [standard()]).unwrap();
        app.name_last("home").unwrap();

        let mut child = Router::new();
        child.get("/", [standard()]).unwrap();
        child.name_last("home").unwrap();
        assert_eq!(app.mount(Some("/child"), child).err(), Some(RegistrationError::duplicate_name("home")));
        assert_eq!(app.len(), 1);
    }

    #[test]
    fn test_using_router() {
        let mut api = Router::new();
        api.get("/widgets", [standard()]).unwrap();

        let mut app = Router::new();
        app.using([UseItem::from("/api"), UseItem::from(api.clone())]).unwrap();
        app.using([api]).unwrap();
        assert_eq!(paths(&app), vec![Some("/api/widgets"), Some("/widgets")]);
    }

    #[test]
    fn test_using_middlewares() {
        let mut app = Router::new();
        app.using([standard(), standard()]).unwrap();
        app.using([UseItem::from("/admin"), standard().into()]).unwrap();

        assert_eq!(paths(&app), vec![None, Some("/admin")]);
        assert_eq!(app.routes()[0].handlers().len(), 2);
        assert!(app.routes().iter().all(|route| route.method() == RouteMethod::Any));

        assert!(matches!(app.using([standard(), error()]), Err(RegistrationError::MixedHandlers { .. })));
    }

    #[test]
    fn test_using_falls_back_to_first_usable_item() {
        let mut api = Router::new();
        api.get("/widgets", [standard()]).unwrap();

        let mut app = Router::new();
        app.using([UseItem::from("/v1"), UseItem::from("/ignored"), standard().into(), api.clone().into()]).unwrap();
        app.using([UseItem::from(api), standard().into()]).unwrap();

        assert_eq!(paths(&app), vec![Some("/v1"), Some("/widgets")]);
        assert_eq!(app.routes()[0].handlers().len(), 1);
    }

    #[test]
    fn test_using_rejects_invalid_arguments() {
        let mut app = Router::new().with_use_limit(2);
        assert_eq!(app.using(Vec::<UseItem>::new()).err(), Some(RegistrationError::NoArguments));
        assert_eq!(
            app.using([standard(), standard(), standard()]).err(),
            Some(RegistrationError::TooManyArguments { count: 3, limit: 2 })
        );
        assert_eq!(app.using(["/only/a/path"]).err(), Some(RegistrationError::InvalidHandlerType));
        assert!(app.is_empty());
    }

    #[test]
    fn test_default_use_limit() {
        let mut app = Router::new();
        assert!(app.using((0..DEFAULT_USE_LIMIT).map(|_| standard())).is_ok());
        assert!(app.using((0..=DEFAULT_USE_LIMIT).map(|_| standard())).is_err());
    }
}
