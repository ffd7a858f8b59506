//! The engine facade.
//!
//! An [`Engine`] owns everything that is shared between renders: the syntax,
//! the path resolver, the escaper and the template cache. It is built once,
//! is `Send + Sync`, and hands out templates and sessions.
//!
//! ```rust
//! use quill::{Engine, SourceRegistry};
//! use serde_json::json;
//!
//! let mut registry = SourceRegistry::new();
//! registry.add_inline("page.html", "<h1>~%title%</h1>~%%include:foot%");
//! registry.add_inline("foot.html", "<footer>~%%begin:links%~%label% ~%%end:links%</footer>");
//!
//! let engine = Engine::builder().resolver(registry).build().unwrap();
//! let html = engine
//!     .render_serialized("page", &json!({
//!         "title": "Home & Away",
//!         "foot": {"links": [{"label": "a"}, {"label": "b"}]},
//!     }))
//!     .unwrap();
//!
//! assert_eq!(html, "<h1>Home &amp; Away</h1><footer>a b </footer>");
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cache::TemplateCache;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::escape::{Escaper, StandardEscaper};
use crate::parser::Parser;
use crate::part::EscapeType;
use crate::resolver::{NoResolver, PathResolver, SourceRegistry};
use crate::session::RenderSession;
use crate::syntax::{Syntax, SyntaxConfig};
use crate::template::Template;

/// Parses, caches and renders templates.
pub struct Engine {
    syntax: Syntax,
    resolver: Arc<dyn PathResolver>,
    escaper: Arc<dyn Escaper>,
    cache: TemplateCache,
    default_escape: EscapeType,
}

impl Engine {
    /// Starts building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Builds an engine from a configuration, searching its template
    /// directories.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        EngineBuilder::default().config(config).build()
    }

    fn parser(&self) -> Parser<'_> {
        Parser::new(&self.syntax)
            .with_resolver(self.resolver.as_ref())
            .with_cache(&self.cache)
    }

    /// Parses a template from a string.
    ///
    /// The template itself is anonymous and not cached; its includes are.
    pub fn parse_str(&self, source: &str) -> Result<Arc<Template>> {
        self.parser().parse_str(source).map(Arc::new)
    }

    /// Returns the template at `path`, parsing it on first use.
    pub fn load(&self, path: &str) -> Result<Arc<Template>> {
        self.parser().load(path)
    }

    /// Starts a render session for `template`.
    pub fn session(&self, template: &Arc<Template>) -> RenderSession {
        RenderSession::new(Arc::clone(template))
            .with_escaper(Arc::clone(&self.escaper))
            .with_default_escape(self.default_escape)
    }

    /// Loads `path`, seeds it from `data` and renders it.
    pub fn render_serialized<T: Serialize + ?Sized>(&self, path: &str, data: &T) -> Result<String> {
        let template = self.load(path)?;
        let mut session = self.session(&template);
        session.seed_serialized(data)?;
        session.render()
    }

    /// Drops the cached template for `path`. Returns `true` if one was cached.
    pub fn invalidate(&self, path: &str) -> Result<bool> {
        Ok(match self.resolver.locate(path)? {
            Some(id) => self.cache.invalidate(&id),
            None => false,
        })
    }

    /// The template cache.
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// The syntax in use.
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Escape type for values set without one.
    pub fn default_escape(&self) -> EscapeType {
        self.default_escape
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("syntax", &self.syntax)
            .field("cache", &self.cache)
            .field("default_escape", &self.default_escape)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    resolver: Option<Arc<dyn PathResolver>>,
    escaper: Option<Arc<dyn Escaper>>,
}

impl EngineBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the syntax tokens.
    pub fn syntax(mut self, syntax: SyntaxConfig) -> Self {
        self.config.syntax = syntax;
        self
    }

    /// Sets the cache capacity; `0` disables caching.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Sets the escape type for values set without one.
    pub fn default_escape(mut self, escape: EscapeType) -> Self {
        self.config.default_escape = escape;
        self
    }

    /// Adds a template directory. Ignored when a resolver is set.
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dirs.push(dir.into());
        self
    }

    /// Resolves template paths through `resolver`.
    pub fn resolver(mut self, resolver: impl PathResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Escapes values with `escaper`.
    pub fn escaper(mut self, escaper: impl Escaper + 'static) -> Self {
        self.escaper = Some(Arc::new(escaper));
        self
    }

    /// Validates the configuration and builds the engine.
    ///
    /// Without an explicit resolver, the configured template directories are
    /// searched; with neither, includes and loads fail.
    ///
    /// # Errors
    ///
    /// Invalid syntax tokens, or a template directory that does not exist.
    pub fn build(self) -> Result<Engine> {
        let EngineConfig {
            syntax,
            cache_capacity,
            default_escape,
            template_dirs,
        } = self.config;

        let syntax = Syntax::new(syntax)?;
        let resolver: Arc<dyn PathResolver> = match self.resolver {
            Some(resolver) => resolver,
            None if template_dirs.is_empty() => Arc::new(NoResolver),
            None => {
                let mut registry = SourceRegistry::new();
                for dir in &template_dirs {
                    registry.add_dir(dir)?;
                }
                Arc::new(registry)
            }
        };

        debug!(cache_capacity, %default_escape, "engine built");
        Ok(Engine {
            syntax,
            resolver,
            escaper: self.escaper.unwrap_or_else(|| Arc::new(StandardEscaper)),
            cache: TemplateCache::new(cache_capacity),
            default_escape,
        })
    }
}
