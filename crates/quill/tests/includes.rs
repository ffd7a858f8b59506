use quill::{Engine, EngineConfig, ParseErrorKind, SourceRegistry};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

#[test]
fn templates_load_from_directories() {
    let dir = TempDir::new().unwrap();
    write(&dir, "page.html", "<main>~%%include:partials/item.html%</main>");
    write(&dir, "partials/item.html", "<!-- ~%%begin:rows% --><b>~%name%</b><!-- ~%%end:rows% -->");

    let engine = Engine::builder().template_dir(dir.path()).build().unwrap();
    let html = engine
        .render_serialized("page", &json!({"item": {"rows": [{"name": "x"}, {"name": "y"}]}}))
        .unwrap();
    assert_eq!(html, "<main><b>x</b><b>y</b></main>");
}

#[test]
fn first_directory_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write(&first, "t.txt", "first");
    write(&second, "t.txt", "second");

    let engine = Engine::builder()
        .template_dir(first.path())
        .template_dir(second.path())
        .build()
        .unwrap();
    assert_eq!(engine.load("t").unwrap().source(), "first");
}

#[test]
fn config_file_drives_the_engine() {
    let dir = TempDir::new().unwrap();
    write(&dir, "views/hello.tpl", "{{name}}!");
    write(
        &dir,
        "quill.yaml",
        "cache_capacity: 0\ndefault_escape: text\ntemplate_dirs: [views]\nsyntax:\n  var_start: \"{{\"\n  var_end: \"}}\"\n",
    );

    let config = EngineConfig::from_file(dir.path().join("quill.yaml")).unwrap();
    let engine = Engine::from_config(config).unwrap();
    assert_eq!(
        engine.render_serialized("hello", &json!({"name": "<ada>"})).unwrap(),
        "<ada>!"
    );

    // Caching is off: every load parses again.
    let a = engine.load("hello").unwrap();
    let b = engine.load("hello").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn edited_file_is_seen_after_invalidate() {
    let dir = TempDir::new().unwrap();
    write(&dir, "t.html", "old");
    let engine = Engine::builder().template_dir(dir.path()).build().unwrap();

    assert_eq!(engine.load("t").unwrap().source(), "old");
    write(&dir, "t.html", "new");
    assert_eq!(engine.load("t").unwrap().source(), "old");

    assert!(engine.invalidate("t").unwrap());
    assert_eq!(engine.load("t").unwrap().source(), "new");
}

#[test]
fn missing_include_points_at_tag() {
    let mut registry = SourceRegistry::new();
    registry.add_inline("page.html", "line one\n  ~%%include:nowhere%");
    let engine = Engine::builder().resolver(registry).build().unwrap();

    let err = engine.load("page").unwrap_err();
    let quill::Error::Parse(err) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidIncludePath {
            path: "nowhere".into()
        }
    );
    assert_eq!((err.origin.as_str(), err.line, err.column), ("inline:page.html", 2, 3));
}

#[test]
fn self_include_is_a_cycle() {
    let mut registry = SourceRegistry::new();
    registry.add_inline("loop.html", "again: ~%%include:loop%");
    let engine = Engine::builder().resolver(registry).build().unwrap();

    let err = engine.load("loop").unwrap_err();
    assert!(matches!(
        err.parse_kind(),
        Some(ParseErrorKind::IncludeCycle { chain }) if chain.len() == 2
    ));
    assert!(engine.cache().is_empty());
}

#[test]
fn mutual_includes_fail_on_every_thread() {
    let mut registry = SourceRegistry::new();
    registry.add_inline("a.html", "a ~%%include:b%");
    registry.add_inline("b.html", "b ~%%include:a%");
    let engine = Arc::new(Engine::builder().resolver(registry).build().unwrap());

    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|path| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.load(path).unwrap_err())
        })
        .collect();

    for handle in handles {
        let err = handle.join().unwrap();
        assert!(matches!(
            err.parse_kind(),
            Some(ParseErrorKind::IncludeCycle { .. })
        ));
    }
    assert!(engine.cache().is_empty());
}

#[test]
fn invalid_utf8_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bin.html"), [0xff, 0xfe, 0x00]).unwrap();
    let engine = Engine::builder().template_dir(dir.path()).build().unwrap();

    let err = engine.load("bin").unwrap_err();
    assert!(matches!(
        err,
        quill::Error::Resolve(quill::ResolveError::InvalidUtf8 { .. })
    ));
}
