//! Middlewares shipped with the router.
//!
//! [`NotFound`] and [`UnhandledError`] are appended to every dispatch by the
//! [`Dispatcher`](crate::Dispatcher); the others are opt-in.

mod body_parser;
mod cors;
mod error_pages;
mod logger;

pub use body_parser::BodyParser;
pub use cors::Cors;
pub use error_pages::{NotFound, UnhandledError};
pub use logger::RequestLogger;
