//! Route filtering.
//!
//! The dispatcher narrows the registry down to the routes applicable to a request with
//! composable filters:
//! - by HTTP method ([`MethodFilter`], a route registered for `ANY` always passes)
//! - by path ([`PathFilter`], matching the route schema against the request path)
//! - global routes ([`GlobalFilter`], no path and any method)
//!
//! Filters combine with [`AllFilter`] (AND) and [`AnyFilter`] (OR).
//!
//! ```
//! use http::Method;
//! use micro_router::filter::{all_filter, any_filter, GlobalFilter, MethodFilter, PathFilter};
//!
//! let mut path = any_filter();
//! path.or(GlobalFilter).or(PathFilter::new("/users/42", false));
//!
//! let mut filter = all_filter();
//! filter.and(MethodFilter::new(Method::GET)).and(path);
//! ```

use http::Method;

use crate::pattern::is_url_matched;
use crate::route::Route;

/// Decides whether a registered route applies.
pub trait RouteFilter: Send + Sync {
    fn matches(&self, route: &Route) -> bool;
}

struct FnFilter<F: Fn(&Route) -> bool>(F);

impl<F: Fn(&Route) -> bool + Send + Sync> RouteFilter for FnFilter<F> {
    fn matches(&self, route: &Route) -> bool {
        (self.0)(route)
    }
}

/// Creates a filter from a closure.
pub fn fn_filter<F>(f: F) -> impl RouteFilter
where
    F: Fn(&Route) -> bool + Send + Sync,
{
    FnFilter(f)
}

/// Keeps routes registered for the request method or for any method.
pub struct MethodFilter(Method);

impl MethodFilter {
    pub fn new(method: Method) -> Self {
        Self(method)
    }
}

impl RouteFilter for MethodFilter {
    #[inline]
    fn matches(&self, route: &Route) -> bool {
        route.method().matches(&self.0)
    }
}

/// Keeps routes whose schema matches the request path. Routes without path never match.
pub struct PathFilter {
    path: String,
    case_sensitive: bool,
}

impl PathFilter {
    pub fn new(path: impl Into<String>, case_sensitive: bool) -> Self {
        Self { path: path.into(), case_sensitive }
    }
}

impl RouteFilter for PathFilter {
    fn matches(&self, route: &Route) -> bool {
        route.path().is_some_and(|schema| is_url_matched(schema, &self.path, self.case_sensitive))
    }
}

/// Keeps global routes: no path and any method.
pub struct GlobalFilter;

impl RouteFilter for GlobalFilter {
    #[inline]
    fn matches(&self, route: &Route) -> bool {
        route.is_global()
    }
}

/// Creates a new OR-composed filter chain.
pub fn any_filter() -> AnyFilter {
    AnyFilter::new()
}

/// Compose filters with OR logic. An empty chain matches everything.
pub struct AnyFilter {
    filters: Vec<Box<dyn RouteFilter>>,
}

impl AnyFilter {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    pub fn or<F: RouteFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl RouteFilter for AnyFilter {
    fn matches(&self, route: &Route) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|filter| filter.matches(route))
    }
}

/// Creates a new AND-composed filter chain.
pub fn all_filter() -> AllFilter {
    AllFilter::new()
}

/// Compose filters with AND logic. An empty chain matches everything.
pub struct AllFilter {
    filters: Vec<Box<dyn RouteFilter>>,
}

impl AllFilter {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    pub fn and<F: RouteFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl RouteFilter for AllFilter {
    fn matches(&self, route: &Route) -> bool {
        self.filters.iter().all(|filter| filter.matches(route))
    }
}

/// Keeps the routes registered for `method`, preserving their order.
pub fn filter_with_method<'a>(routes: &'a [Route], method: &Method) -> Vec<&'a Route> {
    let filter = MethodFilter::new(method.clone());
    routes.iter().filter(|route| filter.matches(route)).collect()
}

/// Keeps the routes matching `path`, and every global route.
pub fn filter_with_path<'a>(routes: &[&'a Route], path: &str, case_sensitive: bool) -> Vec<&'a Route> {
    let mut filter = any_filter();
    filter.or(GlobalFilter).or(PathFilter::new(path, case_sensitive));
    routes.iter().copied().filter(|route| filter.matches(route)).collect()
}

/// The schema of the first route carrying a path, used to extract the request params.
pub fn first_route_path<'a>(routes: &[&'a Route]) -> Option<&'a str> {
    routes.iter().find_map(|route| route.path())
}
