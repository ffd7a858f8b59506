//! Binding values to a template.
//!
//! A [`RenderSession`] is created for one render of one [`Template`]. The
//! caller resolves every name of the template, at every level, and then calls
//! [`RenderSession::render`], which consumes the session.
//!
//! # State
//!
//! Each template level has a [`RenderState`]: one slot per part (filled at
//! variable positions with escaped text), the child states bound to each
//! nested template, and the set of names resolved so far. A nested template
//! populated with three items has three child states.
//!
//! # Filling a session
//!
//! Values are set directly ([`RenderSession::set_variable`]) or pulled from
//! caller data through an [`Accessor`]
//! ([`RenderSession::populate_nested_template`], [`RenderSession::seed`]).
//! Accessor-driven filling maps values onto names as follows:
//!
//! | Value | Variable | Nested template |
//! |-------|----------|-----------------|
//! | text, number, fragments | set | type mismatch |
//! | `Bool(true)` | `true` | one repetition over the parent item |
//! | `Bool(false)` | `false` | no repetitions |
//! | `Null` | empty | no repetitions |
//! | `Items` | type mismatch | one repetition per item |
//! | `None` | left unresolved | left unresolved |
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use quill::{parse, EscapeType, RenderSession};
//! use quill::access::Value;
//!
//! fn row<'a>(text: &'a str, name: &str) -> Value<'a, str> {
//!     match name {
//!         "text" => Value::text(text),
//!         _ => Value::None,
//!     }
//! }
//!
//! let template = parse("<h1>~%title%</h1>~%%begin:rows%<p>~%text%</p>~%%end:rows%").unwrap();
//! let rows: Vec<&str> = vec!["a < b", "c"];
//!
//! let mut session = RenderSession::new(Arc::new(template));
//! session.set_variable("title", ["Notes"], EscapeType::Html).unwrap();
//! session
//!     .populate_nested_template("rows", &rows, &row, EscapeType::Html, None)
//!     .unwrap();
//!
//! assert_eq!(session.render().unwrap(), "<h1>Notes</h1><p>a &lt; b</p><p>c</p>");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, trace};

use quill_access::{AccessError, Accessor, JsonAccessor, Value};

use crate::error::{Result, SessionError};
use crate::escape::{Escaper, StandardEscaper};
use crate::part::EscapeType;
use crate::renderer;
use crate::template::{Template, TemplateId};

/// Binding state of one template level.
#[derive(Debug, Clone)]
pub struct RenderState {
    template: Arc<Template>,
    slots: Vec<Option<String>>,
    children: HashMap<String, Vec<RenderState>>,
    resolved: HashSet<String>,
    repetitions: HashMap<TemplateId, usize>,
}

impl RenderState {
    /// Creates an empty state for `template`.
    pub fn new(template: Arc<Template>) -> Self {
        let slots = vec![None; template.parts().len()];
        Self {
            template,
            slots,
            children: HashMap::new(),
            resolved: HashSet::new(),
            repetitions: HashMap::new(),
        }
    }

    /// The template this state binds.
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Escaped value at part `index`, if that variable is set.
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Child states bound to a nested template; empty if not populated.
    pub fn children(&self, name: &str) -> &[RenderState] {
        self.children.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `name` has been resolved at this level.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    /// Returns `true` if every name at this level and below is resolved.
    pub fn is_complete(&self) -> bool {
        self.first_unresolved("").is_none()
    }

    /// Dotted paths of all unresolved names, e.g. `rows[1].title`.
    pub fn unresolved(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_unresolved("", &mut out);
        out
    }

    fn first_unresolved(&self, prefix: &str) -> Option<String> {
        for name in self.template.names() {
            if !self.resolved.contains(name) {
                return Some(format!("{}{}", prefix, name));
            }
            for (i, child) in self.children(name).iter().enumerate() {
                if let Some(path) = child.first_unresolved(&format!("{}{}[{}].", prefix, name, i)) {
                    return Some(path);
                }
            }
        }
        None
    }

    fn collect_unresolved(&self, prefix: &str, out: &mut Vec<String>) {
        for name in self.template.names() {
            if !self.resolved.contains(name) {
                out.push(format!("{}{}", prefix, name));
                continue;
            }
            for (i, child) in self.children(name).iter().enumerate() {
                child.collect_unresolved(&format!("{}{}[{}].", prefix, name, i), out);
            }
        }
    }
}

/// Mutable view of one [`RenderState`] together with the escaping setup.
///
/// [`RenderSession`] hands out scopes for its root and, through
/// [`Scope::nested_mut`], for bound child states.
pub struct Scope<'s> {
    state: &'s mut RenderState,
    escaper: &'s dyn Escaper,
    default_escape: EscapeType,
}

impl<'s> Scope<'s> {
    /// The state this scope edits.
    pub fn state(&self) -> &RenderState {
        self.state
    }

    /// Sets a variable from text fragments.
    ///
    /// The escape type of each occurrence is its own if the template names
    /// one, `escape` otherwise. Every fragment is escaped on its own and the
    /// results are concatenated; no fragments yield the empty string.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, `AlreadySet`, `EscapeTypeRequired`, or the
    /// escaper's error. Nothing is written on error.
    pub fn set_variable<I>(&mut self, name: &str, values: I, escape: EscapeType) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let template = Arc::clone(&self.state.template);
        let positions =
            template
                .variable_positions(name)
                .ok_or_else(|| SessionError::UnknownVariable {
                    name: name.to_string(),
                })?;
        if self.state.resolved.contains(name) {
            return Err(SessionError::AlreadySet {
                name: name.to_string(),
            }
            .into());
        }

        let fragments: Vec<I::Item> = values.into_iter().collect();
        let mut escaped: Vec<(EscapeType, String)> = Vec::new();
        let mut filled = Vec::with_capacity(positions.len());
        for &index in positions {
            let own = template
                .part(index)
                .and_then(|part| part.as_variable())
                .map_or(EscapeType::Unspecified, |var| var.escape());
            let kind = own.or(escape);
            if !kind.is_specified() {
                return Err(SessionError::EscapeTypeRequired {
                    name: name.to_string(),
                }
                .into());
            }
            let text = match escaped.iter().find(|(k, _)| *k == kind) {
                Some((_, text)) => text.clone(),
                None => {
                    let mut text = String::new();
                    for fragment in &fragments {
                        text.push_str(&self.escaper.escape(fragment.as_ref(), kind)?);
                    }
                    escaped.push((kind, text.clone()));
                    text
                }
            };
            filled.push((index, text));
        }

        for (index, text) in filled {
            self.state.slots[index] = Some(text);
        }
        self.state.resolved.insert(name.to_string());
        trace!(name, "variable set");
        Ok(())
    }

    /// Sets a variable to one value with the session's default escape type.
    pub fn set(&mut self, name: &str, value: impl AsRef<str>) -> Result<()> {
        self.set_variable(name, [value], self.default_escape)
    }

    /// Binds a nested template to `items`, one repetition per item.
    ///
    /// Each repetition is seeded from its item through `accessor`, over
    /// `names` or, when `None`, over every name of the nested template.
    /// Names the accessor reports absent stay unresolved and can be set
    /// later through [`Scope::nested_mut`].
    ///
    /// # Errors
    ///
    /// `UnknownTemplate`, `AlreadyPopulated`, `RepetitionMismatch`,
    /// `UnknownName`, and any error from seeding the repetitions. Nothing is
    /// bound on error.
    pub fn populate_nested_template<S, A>(
        &mut self,
        name: &str,
        items: &[&S],
        accessor: &A,
        escape: EscapeType,
        names: Option<&[&str]>,
    ) -> Result<()>
    where
        S: ?Sized,
        A: Accessor<S> + ?Sized,
    {
        let nested = self
            .state
            .template
            .nested(name)
            .ok_or_else(|| SessionError::UnknownTemplate {
                name: name.to_string(),
            })?;
        let template = Arc::clone(nested.template());
        if self.state.resolved.contains(name) {
            return Err(SessionError::AlreadyPopulated {
                name: name.to_string(),
            }
            .into());
        }
        if let Some(&expected) = self.state.repetitions.get(template.id()) {
            if expected != items.len() {
                return Err(SessionError::RepetitionMismatch {
                    name: name.to_string(),
                    expected,
                    actual: items.len(),
                }
                .into());
            }
        }
        if let Some(names) = names {
            if let Some(unknown) = names.iter().find(|n| !template.names().iter().any(|t| t == *n)) {
                return Err(SessionError::UnknownName {
                    name: unknown.to_string(),
                }
                .into());
            }
        }

        let mut states = Vec::with_capacity(items.len());
        for item in items {
            let mut state = RenderState::new(Arc::clone(&template));
            Scope {
                state: &mut state,
                escaper: self.escaper,
                default_escape: self.default_escape,
            }
            .seed(*item, accessor, escape, names)?;
            states.push(state);
        }

        self.state.repetitions.insert(template.id().clone(), items.len());
        self.state.children.insert(name.to_string(), states);
        self.state.resolved.insert(name.to_string());
        trace!(name, repetitions = items.len(), "nested template populated");
        Ok(())
    }

    /// Resolves this level's names from one source item.
    ///
    /// Seeds `names`, or every name of the template when `None`. Names that
    /// are already resolved are skipped.
    pub fn seed<S, A>(
        &mut self,
        item: &S,
        accessor: &A,
        escape: EscapeType,
        names: Option<&[&str]>,
    ) -> Result<()>
    where
        S: ?Sized,
        A: Accessor<S> + ?Sized,
    {
        let template = Arc::clone(&self.state.template);
        let selected: Vec<&str> = match names {
            Some(names) => names.to_vec(),
            None => template.names().iter().map(String::as_str).collect(),
        };

        for name in selected {
            if self.state.resolved.contains(name) {
                continue;
            }
            let value = accessor.access(item, name)?;
            if template.has_variable(name) {
                let fragments = match value {
                    Value::None => continue,
                    Value::Items(_) => {
                        return Err(AccessError::mismatch(name, "scalar", "items").into())
                    }
                    other => other.into_fragments().unwrap_or_default(),
                };
                self.set_variable(name, fragments, escape)?;
            } else if template.has_nested(name) {
                let items: Vec<&S> = match value {
                    Value::Items(items) => items,
                    Value::Bool(true) => vec![item],
                    Value::Bool(false) | Value::Null => Vec::new(),
                    Value::None => continue,
                    other => return Err(AccessError::mismatch(name, "items", other.kind()).into()),
                };
                self.populate_nested_template(name, &items, accessor, escape, None)?;
            } else {
                return Err(SessionError::UnknownName {
                    name: name.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Scopes over the child states bound to a nested template.
    ///
    /// Empty until the nested template is populated.
    pub fn nested_mut(&mut self, name: &str) -> Result<Vec<Scope<'_>>> {
        Scope {
            state: &mut *self.state,
            escaper: self.escaper,
            default_escape: self.default_escape,
        }
        .nested_into(name)
    }

    /// Like [`Scope::nested_mut`], but the scopes keep the full lifetime.
    fn nested_into(self, name: &str) -> Result<Vec<Scope<'s>>> {
        if !self.state.template.has_nested(name) {
            return Err(SessionError::UnknownTemplate {
                name: name.to_string(),
            }
            .into());
        }
        let Scope {
            state,
            escaper,
            default_escape,
        } = self;
        Ok(state
            .children
            .get_mut(name)
            .map(|states| {
                states
                    .iter_mut()
                    .map(|state| Scope {
                        state,
                        escaper,
                        default_escape,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// One render of one template.
///
/// All mutation goes through `&mut self` and [`RenderSession::render`] takes
/// the session by value, so a session has a single writer and is used once.
pub struct RenderSession {
    state: RenderState,
    escaper: Arc<dyn Escaper>,
    default_escape: EscapeType,
}

impl RenderSession {
    /// Creates a session with the standard escaper and HTML as default
    /// escape type.
    pub fn new(template: Arc<Template>) -> Self {
        Self {
            state: RenderState::new(template),
            escaper: Arc::new(StandardEscaper),
            default_escape: EscapeType::Html,
        }
    }

    /// Uses `escaper` for all values.
    pub fn with_escaper(mut self, escaper: Arc<dyn Escaper>) -> Self {
        self.escaper = escaper;
        self
    }

    /// Escape type used by [`RenderSession::set`] and the serde helpers.
    pub fn with_default_escape(mut self, escape: EscapeType) -> Self {
        self.default_escape = escape;
        self
    }

    /// The template being rendered.
    pub fn template(&self) -> &Arc<Template> {
        self.state.template()
    }

    /// The root state.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// The default escape type.
    pub fn default_escape(&self) -> EscapeType {
        self.default_escape
    }

    /// Scope over the root state.
    pub fn root(&mut self) -> Scope<'_> {
        Scope {
            state: &mut self.state,
            escaper: self.escaper.as_ref(),
            default_escape: self.default_escape,
        }
    }

    /// See [`Scope::set_variable`].
    pub fn set_variable<I>(&mut self, name: &str, values: I, escape: EscapeType) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.root().set_variable(name, values, escape)
    }

    /// See [`Scope::set`].
    pub fn set(&mut self, name: &str, value: impl AsRef<str>) -> Result<()> {
        self.root().set(name, value)
    }

    /// See [`Scope::populate_nested_template`].
    pub fn populate_nested_template<S, A>(
        &mut self,
        name: &str,
        items: &[&S],
        accessor: &A,
        escape: EscapeType,
        names: Option<&[&str]>,
    ) -> Result<()>
    where
        S: ?Sized,
        A: Accessor<S> + ?Sized,
    {
        self.root()
            .populate_nested_template(name, items, accessor, escape, names)
    }

    /// See [`Scope::seed`].
    pub fn seed<S, A>(
        &mut self,
        item: &S,
        accessor: &A,
        escape: EscapeType,
        names: Option<&[&str]>,
    ) -> Result<()>
    where
        S: ?Sized,
        A: Accessor<S> + ?Sized,
    {
        self.root().seed(item, accessor, escape, names)
    }

    /// Seeds the root level from any serializable value, through its JSON
    /// form and the default escape type.
    pub fn seed_serialized<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<()> {
        let json = to_json("<root>", data)?;
        let escape = self.default_escape;
        self.root().seed(&json, &JsonAccessor, escape, None)
    }

    /// Populates a nested template with serializable items.
    pub fn populate_serialized<T: Serialize>(&mut self, name: &str, items: &[T]) -> Result<()> {
        let json = items
            .iter()
            .map(|item| to_json(name, item))
            .collect::<Result<Vec<Json>>>()?;
        let refs: Vec<&Json> = json.iter().collect();
        let escape = self.default_escape;
        self.root()
            .populate_nested_template(name, &refs, &JsonAccessor, escape, None)
    }

    /// See [`Scope::nested_mut`].
    pub fn nested_mut(&mut self, name: &str) -> Result<Vec<Scope<'_>>> {
        let escaper = self.escaper.as_ref();
        let default_escape = self.default_escape;
        Scope {
            state: &mut self.state,
            escaper,
            default_escape,
        }
        .nested_into(name)
    }

    /// Returns `true` if every name at every level is resolved.
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Dotted paths of all unresolved names.
    pub fn unresolved(&self) -> Vec<String> {
        self.state.unresolved()
    }

    /// Renders the template and ends the session.
    ///
    /// # Errors
    ///
    /// `IncompleteSession` naming the first unresolved name.
    pub fn render(self) -> Result<String> {
        if let Some(path) = self.state.first_unresolved("") {
            return Err(SessionError::IncompleteSession { path }.into());
        }
        let out = renderer::render(&self.state);
        debug!(origin = %self.state.template.id().origin(), len = out.len(), "rendered template");
        Ok(out)
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("state", &self.state)
            .field("default_escape", &self.default_escape)
            .finish()
    }
}

fn to_json<T: Serialize + ?Sized>(name: &str, data: &T) -> Result<Json> {
    serde_json::to_value(data).map_err(|err| AccessError::failed(name, err.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, EscapeError};
    use crate::parser::parse;
    use serde_json::json;

    fn session(source: &str) -> RenderSession {
        RenderSession::new(Arc::new(parse(source).unwrap()))
    }

    fn session_err(result: Result<()>) -> SessionError {
        match result.unwrap_err() {
            Error::Session(err) => err,
            other => panic!("expected session error, got {other:?}"),
        }
    }

    fn row<'a>(text: &'a str, name: &str) -> Value<'a, str> {
        match name {
            "text" => Value::text(text),
            _ => Value::None,
        }
    }

    #[test]
    fn set_order_does_not_matter() {
        let mut s = session("~%var1%~%var2%");
        s.set_variable("var2", ["Bar"], EscapeType::None).unwrap();
        s.set_variable("var1", ["Foo"], EscapeType::None).unwrap();
        assert_eq!(s.render().unwrap(), "FooBar");
    }

    #[test]
    fn set_twice_fails() {
        let mut s = session("~%a%");
        s.set("a", "1").unwrap();
        assert_eq!(
            session_err(s.set("a", "2")),
            SessionError::AlreadySet { name: "a".into() }
        );
    }

    #[test]
    fn unknown_variable() {
        let mut s = session("~%a%");
        assert_eq!(
            session_err(s.set("b", "x")),
            SessionError::UnknownVariable { name: "b".into() }
        );
    }

    #[test]
    fn escape_type_required() {
        let mut s = session("~%a%");
        assert_eq!(
            session_err(s.set_variable("a", ["x"], EscapeType::Unspecified)),
            SessionError::EscapeTypeRequired { name: "a".into() }
        );
        assert!(!s.state().is_resolved("a"));
    }

    #[test]
    fn part_escape_wins_over_caller() {
        let mut s = session("~%text:a% ~%html:a% ~%a%");
        s.set_variable("a", ["<&>"], EscapeType::Js).unwrap();
        assert_eq!(s.render().unwrap(), "<&> &lt;&amp;&gt; \\u003c\\u0026\\u003e");
    }

    #[test]
    fn fragments_escape_individually() {
        let upper = |raw: &str, _kind: EscapeType| Ok::<_, EscapeError>(format!("[{}]", raw));
        let mut s = session("~%a%").with_escaper(Arc::new(upper));
        s.set_variable("a", ["x", "y"], EscapeType::Html).unwrap();
        assert_eq!(s.render().unwrap(), "[x][y]");
    }

    #[test]
    fn no_fragments_render_empty() {
        let mut s = session("(~%a%)");
        s.set_variable("a", Vec::<String>::new(), EscapeType::Html)
            .unwrap();
        assert_eq!(s.render().unwrap(), "()");
    }

    #[test]
    fn nested_repeats_in_order() {
        let mut s = session("<~%%begin:rows%~%text%,~%%end:rows%>");
        let items: Vec<&str> = vec!["a", "b", "c"];
        s.populate_nested_template("rows", &items, &row, EscapeType::None, None)
            .unwrap();
        assert_eq!(s.render().unwrap(), "<a,b,c,>");
    }

    #[test]
    fn nested_with_no_items_renders_nothing() {
        let mut s = session("<~%%begin:rows%~%text%~%%end:rows%>");
        s.populate_nested_template::<str, _>("rows", &[], &row, EscapeType::None, None)
            .unwrap();
        assert_eq!(s.render().unwrap(), "<>");
    }

    #[test]
    fn populate_twice_fails() {
        let mut s = session("~%%begin:rows%~%%end:rows%");
        s.populate_nested_template::<str, _>("rows", &[], &row, EscapeType::None, None)
            .unwrap();
        assert_eq!(
            session_err(s.populate_nested_template::<str, _>(
                "rows",
                &[],
                &row,
                EscapeType::None,
                None
            )),
            SessionError::AlreadyPopulated { name: "rows".into() }
        );
    }

    #[test]
    fn unknown_template() {
        let mut s = session("~%a%");
        assert_eq!(
            session_err(s.populate_nested_template::<str, _>(
                "a",
                &[],
                &row,
                EscapeType::None,
                None
            )),
            SessionError::UnknownTemplate { name: "a".into() }
        );
    }

    #[test]
    fn scoped_populate_rejects_unknown_names() {
        let mut s = session("~%%begin:rows%~%text%~%%end:rows%");
        let items: Vec<&str> = vec!["a"];
        assert_eq!(
            session_err(s.populate_nested_template(
                "rows",
                &items,
                &row,
                EscapeType::None,
                Some(&["nope"])
            )),
            SessionError::UnknownName { name: "nope".into() }
        );
        assert!(!s.state().is_resolved("rows"));
    }

    #[test]
    fn incomplete_session_names_path() {
        let mut s = session("~%%begin:rows%~%text%~%id%~%%end:rows%");
        let items: Vec<&str> = vec!["a", "b"];
        s.populate_nested_template("rows", &items, &row, EscapeType::None, None)
            .unwrap();

        assert!(!s.is_complete());
        assert_eq!(s.unresolved(), ["rows[0].id", "rows[1].id"]);
        assert_eq!(
            session_err(s.render().map(drop)),
            SessionError::IncompleteSession {
                path: "rows[0].id".into()
            }
        );
    }

    #[test]
    fn nested_mut_resolves_left_out_names() {
        let mut s = session("~%%begin:rows%~%text%=~%id%;~%%end:rows%");
        let items: Vec<&str> = vec!["a", "b"];
        s.populate_nested_template("rows", &items, &row, EscapeType::None, Some(&["text"]))
            .unwrap();

        for (i, mut child) in s.nested_mut("rows").unwrap().into_iter().enumerate() {
            child.set("id", i.to_string()).unwrap();
        }
        assert_eq!(s.render().unwrap(), "a=0;b=1;");
    }

    #[test]
    fn shared_include_needs_equal_repetitions() {
        use crate::resolver::SourceRegistry;
        use crate::syntax::Syntax;
        use crate::Parser;

        let mut registry = SourceRegistry::new();
        registry.add_inline("cell.html", "~%text%");
        let syntax = Syntax::standard();
        let cache = crate::cache::TemplateCache::new(4);
        let template = Parser::new(&syntax)
            .with_resolver(&registry)
            .with_cache(&cache)
            .parse_str("~%%include:left:cell%|~%%include:right:cell%")
            .unwrap();

        let mut s = RenderSession::new(Arc::new(template));
        let two: Vec<&str> = vec!["a", "b"];
        let one: Vec<&str> = vec!["c"];
        s.populate_nested_template("left", &two, &row, EscapeType::None, None)
            .unwrap();
        assert_eq!(
            session_err(s.populate_nested_template("right", &one, &row, EscapeType::None, None)),
            SessionError::RepetitionMismatch {
                name: "right".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn seed_from_json() {
        let mut s = session(
            "<h1>~%title%</h1>~%%begin:tags%[~%name%]~%%end:tags%~%%begin:admin%!~%%end:admin%",
        );
        s.seed_serialized(&json!({
            "title": "Tom & Jerry",
            "tags": [{"name": "cat"}, {"name": "mouse"}],
            "admin": false,
        }))
        .unwrap();
        assert_eq!(
            s.render().unwrap(),
            "<h1>Tom &amp; Jerry</h1>[cat][mouse]"
        );
    }

    #[test]
    fn seed_bool_true_repeats_once_over_parent() {
        let mut s = session("~%%begin:signed_in%Hi ~%user%~%%end:signed_in%");
        s.seed_serialized(&json!({"signed_in": true, "user": "ada"}))
            .unwrap();
        assert_eq!(s.render().unwrap(), "Hi ada");
    }

    #[test]
    fn seed_type_mismatch() {
        let mut s = session("~%title%");
        let err = s.seed_serialized(&json!({"title": [1, 2]})).unwrap_err();
        assert!(matches!(
            err,
            Error::Access(AccessError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn seed_null_is_empty() {
        let mut s = session("(~%a%)");
        s.seed_serialized(&json!({"a": null})).unwrap();
        assert_eq!(s.render().unwrap(), "()");
    }

    #[test]
    fn populate_serialized_structs() {
        #[derive(Serialize)]
        struct Link {
            href: &'static str,
            label: &'static str,
        }

        let mut s = session("~%%begin:links%<a href=\"~%href%\">~%label%</a>~%%end:links%");
        s.populate_serialized(
            "links",
            &[Link {
                href: "/a?x=1&y=2",
                label: "<A>",
            }],
        )
        .unwrap();
        assert_eq!(
            s.render().unwrap(),
            "<a href=\"/a?x=1&amp;y=2\">&lt;A&gt;</a>"
        );
    }
}
