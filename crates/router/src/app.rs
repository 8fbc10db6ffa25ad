use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::Settings;
use crate::error::RenderError;
use crate::view::ViewEngine;

/// Application wide state shared by every request of a [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Default)]
pub struct AppContext {
    settings: Settings,
    view_engine: Option<Arc<dyn ViewEngine>>,
    locals: Map<String, Value>,
}

impl AppContext {
    pub fn new(settings: Settings, view_engine: Option<Arc<dyn ViewEngine>>, locals: Map<String, Value>) -> Self {
        Self { settings, view_engine, locals }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// variables available to every template under the `app` key
    pub fn locals(&self) -> &Map<String, Value> {
        &self.locals
    }

    /// Renders a view with the configured engine.
    ///
    /// `locals` should be an object; any other value is exposed as `value`.
    pub fn render(&self, view: &str, locals: Value, options: &Value) -> Result<String, RenderError> {
        let engine = self.view_engine.as_ref().ok_or(RenderError::NoEngine)?;

        let mut locals = match locals {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_string(), other)]),
        };
        locals.insert("app".to_string(), Value::Object(self.locals.clone()));

        engine.render(view, &Value::Object(locals), options)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("settings", &self.settings)
            .field("view_engine", &self.view_engine.is_some())
            .field("locals", &self.locals)
            .finish()
    }
}
