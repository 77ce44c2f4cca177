//! Reuse of imports between document generations.

use std::sync::Arc;

use msbuild::Symbol;
use msbuild::project::{ParseSession, RootDocument};

use crate::helpers::workspace::Workspace;

fn first_import(root: &RootDocument) -> Arc<msbuild::hir::Import> {
    root.document().imports().next().cloned().expect("an import")
}

fn graph() -> Workspace {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="a.props" /></Project>"#);
    ws.write(
        "a.props",
        r#"<Project><Import Project="b.props" /><PropertyGroup><A>1</A></PropertyGroup></Project>"#,
    );
    ws.write("b.props", "<Project><PropertyGroup><B>1</B></PropertyGroup></Project>");
    ws.touch("a.props", 1_000);
    ws.touch("b.props", 1_000);
    ws
}

#[test]
fn test_unchanged_import_is_reused() {
    let ws = graph();
    let session = ParseSession::default();
    let first = ws.load("app.proj", None, &session);
    let second = ws.load("app.proj", Some(&first), &session);

    assert!(Arc::ptr_eq(&first_import(&first), &first_import(&second)));
    assert!(second.contains(Symbol::Property("B")));
}

#[test]
fn test_edited_text_still_reuses_imports() {
    let ws = graph();
    let session = ParseSession::default();
    let first = ws.load("app.proj", None, &session);

    let edited = r#"<Project><Import Project="a.props" /><PropertyGroup><C>1</C></PropertyGroup></Project>"#;
    let second = RootDocument::parse(ws.path("app.proj"), edited, Some(&first), &session).unwrap();
    assert!(Arc::ptr_eq(&first_import(&first), &first_import(&second)));
    assert!(second.contains(Symbol::Property("C")));
}

#[test]
fn test_changed_time_stamp_rebuilds_import() {
    let ws = graph();
    let session = ParseSession::default();
    let first = ws.load("app.proj", None, &session);

    ws.write("a.props", "<Project><PropertyGroup><Changed>1</Changed></PropertyGroup></Project>");
    ws.touch("a.props", 2_000);
    let second = ws.load("app.proj", Some(&first), &session);

    assert!(!Arc::ptr_eq(&first_import(&first), &first_import(&second)));
    assert!(second.contains(Symbol::Property("Changed")));
    assert!(!second.contains(Symbol::Property("B")));
}

#[test]
fn test_changed_nested_import_rebuilds_its_importer() {
    let ws = graph();
    let session = ParseSession::default();
    let first = ws.load("app.proj", None, &session);

    ws.write("b.props", "<Project><PropertyGroup><NewB>1</NewB></PropertyGroup></Project>");
    ws.touch("b.props", 2_000);
    let second = ws.load("app.proj", Some(&first), &session);

    assert!(!Arc::ptr_eq(&first_import(&first), &first_import(&second)));
    assert!(second.contains(Symbol::Property("NewB")));
}

#[test]
fn test_reused_import_replays_property_values() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="tfm.props" /></Project>"#);
    ws.write(
        "tfm.props",
        "<Project><PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup></Project>",
    );
    let session = ParseSession::default();
    let first = ws.load("app.proj", None, &session);
    let second = ws.load("app.proj", Some(&first), &session);

    assert!(Arc::ptr_eq(&first_import(&first), &first_import(&second)));
    let values: Vec<&str> = second
        .property_values()
        .values("TargetFramework")
        .iter()
        .map(|v| v.as_str())
        .collect();
    assert_eq!(values, vec!["net8.0"]);
}
