use crate::error::RegistrationError;
use crate::middleware::{Middleware, MiddlewareKind};

/// Returns the declared number of inputs of a middleware.
#[inline]
pub fn number_of_parameters(middleware: &Middleware) -> usize {
    middleware.arity()
}

/// A middleware is valid when it declares 2, 3 or 4 inputs.
#[inline]
pub fn is_valid_middleware(middleware: &Middleware) -> bool {
    matches!(number_of_parameters(middleware), 2..=4)
}

/// Error middlewares are the valid ones declaring 4 inputs.
#[inline]
pub fn is_error_middleware(middleware: &Middleware) -> bool {
    is_valid_middleware(middleware) && number_of_parameters(middleware) == 4
}

/// Checks that a list of middlewares registered together is non-empty and of one kind.
///
/// Returns the shared kind.
pub fn check_homogeneous(middlewares: &[Middleware]) -> Result<MiddlewareKind, RegistrationError> {
    let first = middlewares.first().ok_or(RegistrationError::EmptyHandlers)?;
    let expected = first.kind();

    match middlewares.iter().enumerate().find(|(_, middleware)| middleware.kind() != expected) {
        Some((index, middleware)) => Err(RegistrationError::MixedHandlers { expected, found: middleware.kind(), index }),
        None => Ok(expected),
    }
}
