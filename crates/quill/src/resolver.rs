//! Path resolution for included and file-based templates.
//!
//! The engine never touches the filesystem directly. It asks a
//! [`PathResolver`] to turn a path into a [`SourceId`] and the id into bytes.
//! The id doubles as the cache key, so two includes of the same file share
//! one parsed template.
//!
//! [`SourceRegistry`] is the stock resolver: inline sources first, then
//! template directories in registration order.
//!
//! # Supported Extensions
//!
//! Paths may omit the extension. Files are tried in this order:
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.html` |
//! | 2 | `.htm` |
//! | 3 | `.xml` |
//! | 4 | `.txt` |
//! | 5 (lowest) | `.tpl` |

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::error::ResolveError;

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".htm", ".xml", ".txt", ".tpl"];

const INLINE_ORIGIN: &str = "inline";
const FILE_ORIGIN: &str = "file";

/// Identity of a resolved source: which resolver store it lives in and where.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId {
    origin: Arc<str>,
    path: String,
}

impl SourceId {
    /// Creates an identifier.
    pub fn new(origin: impl Into<Arc<str>>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }

    /// The resolver store, e.g. `inline` or `file`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The resolved path within the store.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin, self.path)
    }
}

/// Turns template paths into source bytes.
pub trait PathResolver: Send + Sync {
    /// Finds the source for `path`; `Ok(None)` if there is none.
    fn locate(&self, path: &str) -> Result<Option<SourceId>, ResolveError>;

    /// Reads a source previously located by this resolver.
    fn read(&self, id: &SourceId) -> Result<Vec<u8>, ResolveError>;

    /// Locates and reads in one step.
    fn resolve(&self, path: &str) -> Result<Option<(SourceId, Vec<u8>)>, ResolveError> {
        match self.locate(path)? {
            Some(id) => {
                let bytes = self.read(&id)?;
                Ok(Some((id, bytes)))
            }
            None => Ok(None),
        }
    }
}

impl<R: PathResolver + ?Sized> PathResolver for Arc<R> {
    fn locate(&self, path: &str) -> Result<Option<SourceId>, ResolveError> {
        (**self).locate(path)
    }

    fn read(&self, id: &SourceId) -> Result<Vec<u8>, ResolveError> {
        (**self).read(id)
    }
}

/// Resolver that knows no paths. Includes fail with `InvalidIncludePath`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl PathResolver for NoResolver {
    fn locate(&self, _path: &str) -> Result<Option<SourceId>, ResolveError> {
        Ok(None)
    }

    fn read(&self, id: &SourceId) -> Result<Vec<u8>, ResolveError> {
        Err(ResolveError::NotAvailable {
            origin: id.to_string(),
        })
    }
}

/// Strips a recognized template extension from a name.
pub fn strip_extension<'a>(name: &'a str, extensions: &[&str]) -> &'a str {
    extensions
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// Default nested template name for an include path: the base name without
/// its extension (`partials/row.html` → `row`).
pub fn base_name(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

/// Registry of template sources from inline strings and directories.
///
/// # Resolution Order
///
/// 1. Inline sources, by exact name or by name without extension
/// 2. Directories in registration order (first directory wins), trying the
///    exact path and then the path plus each of [`TEMPLATE_EXTENSIONS`]
///
/// Paths that are absolute or climb out of a directory with `..` never
/// resolve to a file.
///
/// # Example
///
/// ```rust
/// use quill::{PathResolver, SourceRegistry};
///
/// let mut registry = SourceRegistry::new();
/// registry.add_inline("footer.html", "<footer>~%year%</footer>");
///
/// let id = registry.locate("footer").unwrap().unwrap();
/// assert_eq!(id.to_string(), "inline:footer.html");
/// ```
#[derive(Debug, Default, Clone)]
pub struct SourceRegistry {
    inline: HashMap<String, String>,
    aliases: HashMap<String, String>,
    dirs: Vec<PathBuf>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an inline source. Inline sources shadow files of the same name.
    ///
    /// A name with a recognized extension is also reachable without it.
    pub fn add_inline(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        let base = strip_extension(&name, TEMPLATE_EXTENSIONS);
        if base != name {
            let base = base.to_string();
            let keep_existing = self
                .aliases
                .get(&base)
                .is_some_and(|existing| extension_priority(existing) < extension_priority(&name));
            if !keep_existing {
                self.aliases.insert(base, name.clone());
            }
        }
        self.inline.insert(name, source.into());
    }

    /// Adds embedded `(name_with_ext, source)` entries, e.g. from `include_str!`.
    pub fn add_embedded(&mut self, entries: &[(&str, &str)]) {
        for (name, source) in entries {
            self.add_inline(*name, *source);
        }
    }

    /// Adds a template directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a readable directory.
    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ResolveError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(ResolveError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }
        self.dirs.push(path.to_path_buf());
        Ok(())
    }

    /// Registered directories, in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Names of inline sources.
    pub fn inline_names(&self) -> impl Iterator<Item = &str> {
        self.inline.keys().map(String::as_str)
    }

    fn locate_inline(&self, path: &str) -> Option<SourceId> {
        if self.inline.contains_key(path) {
            return Some(SourceId::new(INLINE_ORIGIN, path));
        }
        self.aliases
            .get(path)
            .map(|name| SourceId::new(INLINE_ORIGIN, name.clone()))
    }

    fn locate_file(&self, path: &str) -> Option<SourceId> {
        let relative = Path::new(path);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return None;
        }

        for dir in &self.dirs {
            let exact = dir.join(relative);
            if exact.is_file() {
                return Some(SourceId::new(FILE_ORIGIN, exact.to_string_lossy()));
            }
            for ext in TEMPLATE_EXTENSIONS {
                let candidate = dir.join(format!("{}{}", path, ext));
                if candidate.is_file() {
                    return Some(SourceId::new(FILE_ORIGIN, candidate.to_string_lossy()));
                }
            }
        }
        None
    }
}

fn extension_priority(name: &str) -> usize {
    TEMPLATE_EXTENSIONS
        .iter()
        .position(|ext| name.ends_with(ext))
        .unwrap_or(usize::MAX)
}

impl PathResolver for SourceRegistry {
    fn locate(&self, path: &str) -> Result<Option<SourceId>, ResolveError> {
        let found = self.locate_inline(path).or_else(|| self.locate_file(path));
        trace!(path, found = ?found, "locate template");
        Ok(found)
    }

    fn read(&self, id: &SourceId) -> Result<Vec<u8>, ResolveError> {
        match id.origin() {
            INLINE_ORIGIN => self
                .inline
                .get(id.path())
                .map(|source| source.clone().into_bytes())
                .ok_or_else(|| ResolveError::NotAvailable {
                    origin: id.to_string(),
                }),
            FILE_ORIGIN => std::fs::read(id.path()).map_err(|source| ResolveError::Io {
                path: PathBuf::from(id.path()),
                source,
            }),
            _ => Err(ResolveError::NotAvailable {
                origin: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn base_names() {
        assert_eq!(base_name("row.html"), "row");
        assert_eq!(base_name("partials/row.html"), "row");
        assert_eq!(base_name("partials\\row.tpl"), "row");
        assert_eq!(base_name("footer"), "footer");
        assert_eq!(base_name(".hidden"), ".hidden");
        assert_eq!(base_name("a.b.html"), "a.b");
    }

    #[test]
    fn strip_known_extension() {
        assert_eq!(strip_extension("page.html", TEMPLATE_EXTENSIONS), "page");
        assert_eq!(strip_extension("page.md", TEMPLATE_EXTENSIONS), "page.md");
    }

    #[test]
    fn inline_by_name_and_base_name() {
        let mut registry = SourceRegistry::new();
        registry.add_inline("head.html", "<head>");

        let exact = registry.locate("head.html").unwrap().unwrap();
        let base = registry.locate("head").unwrap().unwrap();
        assert_eq!(exact, base);
        assert_eq!(registry.read(&exact).unwrap(), b"<head>");
        assert!(registry.locate("body").unwrap().is_none());
    }

    #[test]
    fn inline_alias_prefers_higher_priority_extension() {
        let mut registry = SourceRegistry::new();
        registry.add_inline("page.txt", "text");
        registry.add_inline("page.html", "html");
        registry.add_inline("page.tpl", "tpl");

        let (_, bytes) = registry.resolve("page").unwrap().unwrap();
        assert_eq!(bytes, b"html");
    }

    #[test]
    fn files_in_registration_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("a.html"), "first a").unwrap();
        fs::write(second.path().join("a.html"), "second a").unwrap();
        fs::write(second.path().join("b.txt"), "second b").unwrap();

        let mut registry = SourceRegistry::new();
        registry.add_dir(first.path()).unwrap();
        registry.add_dir(second.path()).unwrap();

        let (_, a) = registry.resolve("a").unwrap().unwrap();
        let (_, b) = registry.resolve("b.txt").unwrap().unwrap();
        assert_eq!(a, b"first a");
        assert_eq!(b, b"second b");
    }

    #[test]
    fn nested_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("partials/row.html"), "row").unwrap();

        let mut registry = SourceRegistry::new();
        registry.add_dir(dir.path()).unwrap();

        let id = registry.locate("partials/row").unwrap().unwrap();
        assert_eq!(id.origin(), "file");
        assert!(id.path().ends_with("row.html"));
    }

    #[test]
    fn inline_shadows_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), "file").unwrap();

        let mut registry = SourceRegistry::new();
        registry.add_dir(dir.path()).unwrap();
        registry.add_inline("a.html", "inline");

        let (_, bytes) = registry.resolve("a.html").unwrap().unwrap();
        assert_eq!(bytes, b"inline");
    }

    #[test]
    fn escaping_paths_do_not_resolve() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("root")).unwrap();
        fs::write(dir.path().join("secret.html"), "secret").unwrap();

        let mut registry = SourceRegistry::new();
        registry.add_dir(dir.path().join("root")).unwrap();

        assert!(registry.locate("../secret.html").unwrap().is_none());
    }

    #[test]
    fn add_dir_rejects_missing_directory() {
        let mut registry = SourceRegistry::new();
        let err = registry.add_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ResolveError::Io { .. }));
    }

    #[test]
    fn read_of_removed_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.html");
        fs::write(&path, "x").unwrap();

        let mut registry = SourceRegistry::new();
        registry.add_dir(dir.path()).unwrap();
        let id = registry.locate("gone").unwrap().unwrap();
        fs::remove_file(&path).unwrap();

        assert!(matches!(registry.read(&id), Err(ResolveError::Io { .. })));
    }

    #[test]
    fn no_resolver_knows_nothing() {
        assert!(NoResolver.locate("x").unwrap().is_none());
    }
}
