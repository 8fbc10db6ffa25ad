use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::middleware::MiddlewareKind;

/// the error type every handler may fail with
pub type BoxError = Box<dyn Error + Send + Sync>;

/// what a handler returns: `Err` is a fault which the chain redirects into its error chain
pub type HandlerResult = Result<(), BoxError>;

/// Errors raised synchronously while building a [`Router`](crate::Router).
///
/// None of these are deferred to dispatch time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("at least one middleware must be provided")]
    EmptyHandlers,

    #[error("middlewares registered together must share one kind: expected {expected}, found {found} at position {index}")]
    MixedHandlers { expected: MiddlewareKind, found: MiddlewareKind, index: usize },

    #[error("a route must be added before it can be named")]
    NoRouteToName,

    #[error("the route to name was registered on another router")]
    ForeignRoute,

    #[error("route name '{name}' is already taken")]
    DuplicateName { name: String },

    #[error("invalid mount path '{path}': {reason}")]
    InvalidMountPath { path: String, reason: String },

    #[error("use() needs at least one argument")]
    NoArguments,

    #[error("use() accepts at most {limit} arguments, got {count}; group routes with a router instead")]
    TooManyArguments { count: usize, limit: usize },

    #[error("invalid middleware type")]
    InvalidHandlerType,
}

impl RegistrationError {
    pub fn invalid_mount_path<S: ToString, R: ToString>(path: S, reason: R) -> Self {
        Self::InvalidMountPath { path: path.to_string(), reason: reason.to_string() }
    }

    pub fn duplicate_name<S: ToString>(name: S) -> Self {
        Self::DuplicateName { name: name.to_string() }
    }
}

/// How an error entered the error chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// a handler passed the error to its continuation with `next.fail(..)`
    Forwarded,
    /// a handler returned `Err`
    Fault,
}

/// The payload handed to error middlewares.
///
/// Cheap to clone: the same error is threaded through every handler of an error chain.
#[derive(Clone)]
pub struct RouteError {
    inner: Arc<dyn Error + Send + Sync>,
    origin: ErrorOrigin,
}

impl RouteError {
    /// wrap an error passed explicitly to the continuation
    pub fn forwarded(err: impl Into<BoxError>) -> Self {
        Self::from_boxed(err.into(), ErrorOrigin::Forwarded)
    }

    /// wrap an error returned by a handler
    pub fn fault(err: impl Into<BoxError>) -> Self {
        Self::from_boxed(err.into(), ErrorOrigin::Fault)
    }

    fn from_boxed(err: BoxError, origin: ErrorOrigin) -> Self {
        // an error chain handler may hand the error it received back to `next`
        match err.downcast::<RouteError>() {
            Ok(route_error) => *route_error,
            Err(other) => Self { inner: Arc::from(other), origin },
        }
    }

    pub fn origin(&self) -> ErrorOrigin {
        self.origin
    }

    pub fn is_fault(&self) -> bool {
        self.origin == ErrorOrigin::Fault
    }

    /// the error the handler produced
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Attempts to downcast the wrapped error to a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Debug for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteError").field("origin", &self.origin).field("inner", &self.inner).finish()
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("response has already been sent")]
    AlreadySent,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("json error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("render error: {source}")]
    Render {
        #[from]
        source: RenderError,
    },
}

impl ResponseError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("view engine is not set")]
    NoEngine,

    #[error("template error: {source}")]
    Template {
        #[from]
        source: minijinja::Error,
    },

    #[error("render failed: {reason}")]
    Other { reason: String },
}

impl RenderError {
    pub fn other<S: ToString>(str: S) -> Self {
        Self::Other { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("the setting '{key}' is not a boolean or does not exist")]
    NotBoolean { key: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("unable to read the json configuration: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("unable to read the yaml configuration: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub fn not_boolean<S: ToString>(key: S) -> Self {
        Self::NotBoolean { key: key.to_string() }
    }
}

/// A fault escaped every error chain; the request could not be recovered.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unrecovered fault while dispatching {method} {path}: {source}")]
    Unrecovered { method: String, path: String, source: RouteError },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("router must be set")]
    MissingRouter,
}

#[derive(Error, Debug)]
pub enum UrlError {
    #[error("the baseUrl setting is required to build absolute urls")]
    MissingBaseUrl,

    #[error("unable to encode query: {source}")]
    Query {
        #[from]
        source: serde_urlencoded::ser::Error,
    },
}
