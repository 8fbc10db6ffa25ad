//! View rendering.
//!
//! The router only needs `render(view, locals, options) -> String`; any template engine can
//! plug in by implementing [`ViewEngine`]. [`JinjaEngine`] is the bundled implementation.

use std::fmt;
use std::path::Path;

use minijinja::Environment;
use serde_json::Value;

use crate::config::Settings;
use crate::error::RenderError;

#[cfg_attr(test, mockall::automock)]
pub trait ViewEngine: Send + Sync {
    fn render(&self, view: &str, locals: &Value, options: &Value) -> Result<String, RenderError>;
}

/// A [`ViewEngine`] backed by minijinja, loading templates from a views directory.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    pub fn new(views_dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(views_dir.as_ref().to_path_buf()));
        Self { env }
    }

    /// Creates an engine rooted at the `views` setting.
    pub fn from_settings(settings: &Settings) -> Result<Self, RenderError> {
        let views = settings.views().ok_or_else(|| RenderError::other("the views setting is not set"))?;
        Ok(Self::new(views))
    }

    /// Creates an engine without loader, holding in-memory templates only.
    pub fn in_memory() -> Self {
        Self { env: Environment::new() }
    }

    pub fn add_template(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<&mut Self, RenderError> {
        self.env.add_template_owned(name.into(), source.into())?;
        Ok(self)
    }
}

impl fmt::Debug for JinjaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JinjaEngine").finish_non_exhaustive()
    }
}

impl ViewEngine for JinjaEngine {
    fn render(&self, view: &str, locals: &Value, _options: &Value) -> Result<String, RenderError> {
        let template = self.env.get_template(view)?;
        Ok(template.render(locals)?)
    }
}
