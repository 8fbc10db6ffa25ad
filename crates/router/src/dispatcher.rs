//! Per-request dispatch.
//!
//! A [`Dispatcher`] is built once from a [`Router`] and then serves every request. Building
//! it seals the registry: the routes are frozen and no registration API remains.
//!
//! For each request the dispatcher:
//! 1. keeps the routes registered for the request method (or for any method)
//! 2. keeps, among those, the routes matching the request path and every global route
//! 3. extracts the path params with the schema of the first matched route carrying a path
//! 4. builds the chains from the matched routes
//! 5. appends [`NotFound`] to the main chain and [`UnhandledError`] to the error chain
//! 6. runs the main chain, with the error chain as fallback

use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::{Instrument, debug, error, info_span};

use crate::app::AppContext;
use crate::builtin::{NotFound, UnhandledError};
use crate::chain::{ChainSet, build_chains};
use crate::config::Settings;
use crate::error::{BuildError, DispatchError, UrlError};
use crate::filter::{filter_with_method, filter_with_path, first_route_path};
use crate::pattern::extract_params;
use crate::registry::{Router, url_for};
use crate::request::{PathParams, Request};
use crate::response::Response;
use crate::route::Route;
use crate::view::ViewEngine;

pub struct DispatcherBuilder {
    router: Option<Router>,
    settings: Settings,
    view_engine: Option<Arc<dyn ViewEngine>>,
    locals: Map<String, Value>,
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self { router: None, settings: Settings::default(), view_engine: None, locals: Map::new() }
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn view_engine(mut self, view_engine: impl ViewEngine + 'static) -> Self {
        self.view_engine = Some(Arc::new(view_engine));
        self
    }

    /// Sets the variables exposed to every view under the `app` key.
    pub fn locals(mut self, locals: Map<String, Value>) -> Self {
        self.locals = locals;
        self
    }

    pub fn local(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let router = self.router.ok_or(BuildError::MissingRouter)?;
        let routes: Arc<[Route]> = router.into_routes().into();
        debug!(routes = routes.len(), "dispatcher sealed");

        let app = AppContext::new(self.settings, self.view_engine, self.locals);
        Ok(Dispatcher { routes, app: Arc::new(app) })
    }
}

/// Options of [`Dispatcher::url_to`].
#[derive(Debug, Clone, Default)]
pub struct UrlOptions {
    query: Vec<(String, String)>,
    absolute: bool,
}

impl UrlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Prefixes the url with the `baseUrl` setting.
    pub fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }
}

/// A sealed registry, ready to serve requests.
///
/// Cheap to clone; clones share the routes and the application context.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<[Route]>,
    app: Arc<AppContext>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    pub fn settings(&self) -> &Settings {
        self.app.settings()
    }

    /// Dispatches one request.
    ///
    /// Fails only when a fault escapes every error chain; the response is then left as
    /// the middlewares wrote it.
    pub async fn handle(&self, req: &mut Request, res: &mut Response) -> Result<(), DispatchError> {
        let span = info_span!("dispatch", method = %req.method(), path = %req.path());
        self.dispatch(req, res).instrument(span).await
    }

    async fn dispatch(&self, req: &mut Request, res: &mut Response) -> Result<(), DispatchError> {
        req.set_app(Arc::clone(&self.app));
        res.set_app(Arc::clone(&self.app));

        let case_sensitive = self.app.settings().case_sensitive_routing();
        let by_method = filter_with_method(&self.routes, req.method());
        let matched = filter_with_path(&by_method, req.path(), case_sensitive);

        let params = first_route_path(&matched)
            .map(|schema| extract_params(req.original_url(), schema))
            .unwrap_or_default();
        debug!(matched = matched.len(), params = params.len(), "routes matched");
        req.set_params(params);

        let ChainSet { mut all, mut error, .. } = build_chains(matched);
        all.push(NotFound::middleware());
        error.push(UnhandledError::middleware());

        match all.run(None, req, res, Some(&error)).await {
            Ok(()) => Ok(()),
            Err(source) => {
                error!(cause = %source, "fault escaped the error chain");
                Err(DispatchError::Unrecovered { method: req.method().to_string(), path: req.path().to_string(), source })
            }
        }
    }

    /// Dispatches an `http::Request` and returns the response to write back.
    pub async fn serve(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>, DispatchError> {
        let mut req = Request::from_http(request);
        let mut res = Response::new();
        self.handle(&mut req, &mut res).await?;
        Ok(res.into_http())
    }

    /// Builds the url of a named route.
    ///
    /// Returns `Ok(None)` when no route has this name.
    pub fn url_to(&self, name: &str, params: &PathParams, options: &UrlOptions) -> Result<Option<String>, UrlError> {
        let Some(mut url) = url_for(&self.routes, name, params) else {
            return Ok(None);
        };

        if !options.query.is_empty() {
            url.push('?');
            url.push_str(&serde_urlencoded::to_string(&options.query)?);
        }

        if options.absolute {
            let base_url = self.app.settings().base_url().ok_or(UrlError::MissingBaseUrl)?;
            url = format!("{}{}", base_url.trim_end_matches('/'), url);
        }

        Ok(Some(url))
    }
}
