use std::fmt;
use std::str::FromStr;

use http::Method;

/// The HTTP method a route is registered against.
///
/// [`RouteMethod::Any`] matches every request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Options,
    Delete,
    Any,
}

impl RouteMethod {
    /// Returns true if a request with `method` may be served by a route registered with `self`.
    pub fn matches(self, method: &Method) -> bool {
        match self {
            RouteMethod::Any => true,
            RouteMethod::Get => *method == Method::GET,
            RouteMethod::Post => *method == Method::POST,
            RouteMethod::Put => *method == Method::PUT,
            RouteMethod::Patch => *method == Method::PATCH,
            RouteMethod::Head => *method == Method::HEAD,
            RouteMethod::Options => *method == Method::OPTIONS,
            RouteMethod::Delete => *method == Method::DELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Head => "HEAD",
            RouteMethod::Options => "OPTIONS",
            RouteMethod::Delete => "DELETE",
            RouteMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown route method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for RouteMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RouteMethod::Get),
            "POST" => Ok(RouteMethod::Post),
            "PUT" => Ok(RouteMethod::Put),
            "PATCH" => Ok(RouteMethod::Patch),
            "HEAD" => Ok(RouteMethod::Head),
            "OPTIONS" => Ok(RouteMethod::Options),
            "DELETE" => Ok(RouteMethod::Delete),
            "ANY" => Ok(RouteMethod::Any),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}
