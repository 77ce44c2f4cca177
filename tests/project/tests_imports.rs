//! Import graph tests.

use msbuild::Symbol;
use msbuild::hir::codes;
use msbuild::project::{ParseSession, SessionOptions};

use crate::helpers::workspace::{Workspace, document_names};

// =============================================================================
// GRAPH SHAPE
// =============================================================================

#[test]
fn test_nested_imports_resolve_relative_to_importer() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="build/common.props" /></Project>"#);
    ws.write(
        "build/common.props",
        r#"<Project><Import Project="inner.targets" /><PropertyGroup><Common>1</Common></PropertyGroup></Project>"#,
    );
    ws.write(
        "build/inner.targets",
        r#"<Project><Target Name="Inner" /><PropertyGroup><FromInner>1</FromInner></PropertyGroup></Project>"#,
    );

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj", "common.props", "inner.targets"]);
    assert!(root.errors().is_empty(), "{:?}", root.errors());

    assert!(root.get_targets().contains(&"Inner"));
    assert!(root.contains(Symbol::Property("frominner")));
    assert_eq!(
        root.files_seen_in(Symbol::Property("FromInner")),
        vec![ws.path("build/inner.targets")]
    );
}

#[test]
fn test_imported_names_are_aggregated_case_insensitively() {
    let ws = Workspace::new();
    ws.write(
        "app.proj",
        r#"<Project>
  <Import Project="a.props" />
  <PropertyGroup><Shared>root</Shared></PropertyGroup>
</Project>"#,
    );
    ws.write(
        "a.props",
        r#"<Project><PropertyGroup><SHARED>a</SHARED><OnlyA>1</OnlyA></PropertyGroup></Project>"#,
    );

    let root = ws.load("app.proj", None, &ParseSession::default());
    let properties = root.get_properties();
    let shared: Vec<_> = properties
        .iter()
        .filter(|p| p.eq_ignore_ascii_case("shared"))
        .collect();
    assert_eq!(shared.len(), 1);
    assert!(properties.contains(&"OnlyA"));
}

#[test]
fn test_cyclic_imports_terminate() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="a.props" /></Project>"#);
    ws.write("a.props", r#"<Project><Import Project="b.props" /></Project>"#);
    ws.write(
        "b.props",
        r#"<Project><Import Project="a.props" /><Import Project="app.proj" /></Project>"#,
    );

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj", "a.props", "b.props"]);
    assert!(root.errors().is_empty());
}

#[test]
fn test_repeated_import_is_parsed_once() {
    let ws = Workspace::new();
    ws.write(
        "app.proj",
        r#"<Project><Import Project="a.props" /><Import Project="./a.props" /></Project>"#,
    );
    ws.write("a.props", "<Project />");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj", "a.props"]);
    let parsed = root
        .document()
        .imports()
        .filter(|import| import.document().is_some())
        .count();
    assert_eq!(parsed, 1);
}

#[test]
fn test_malformed_import_does_not_stop_the_build() {
    let ws = Workspace::new();
    ws.write(
        "app.proj",
        r#"<Project>
  <Import Project="broken.props" />
  <Import Project="good.props" />
</Project>"#,
    );
    ws.write("broken.props", "<Project><PropertyGroup><A>");
    ws.write("good.props", "<Project><PropertyGroup><Good>1</Good></PropertyGroup></Project>");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert!(root.contains(Symbol::Property("Good")));
    // Errors inside an import stay with the import.
    assert!(root.errors().is_empty());
}

// =============================================================================
// UNRESOLVED
// =============================================================================

#[test]
fn test_missing_import_is_reported_on_the_root() {
    let ws = Workspace::new();
    let text = r#"<Project><Import Project="$(Nowhere)/missing.targets" /></Project>"#;
    ws.write("app.proj", text);

    let root = ws.load("app.proj", None, &ParseSession::default());
    let unresolved: Vec<_> = root
        .errors()
        .iter()
        .filter(|d| d.code == codes::UNRESOLVED_IMPORT)
        .collect();
    assert_eq!(unresolved.len(), 1);
    let range = unresolved[0].range;
    assert_eq!(
        &text[usize::from(range.start())..usize::from(range.end())],
        "$(Nowhere)/missing.targets"
    );
    assert!(!root.document().imports().any(|import| import.is_resolved()));
}

#[test]
fn test_import_modified_at_the_epoch_is_resolved() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="a.props" /></Project>"#);
    ws.write("a.props", "<Project><PropertyGroup><FromA>1</FromA></PropertyGroup></Project>");
    ws.touch("a.props", 0);

    let session = ParseSession::default();
    let first = ws.load("app.proj", None, &session);
    assert!(first.contains(Symbol::Property("FromA")));
    assert!(first.errors().is_empty(), "{:?}", first.errors());

    let second = ws.load("app.proj", Some(&first), &session);
    let reused = first.document().imports().next().zip(second.document().imports().next());
    assert!(reused.is_some_and(|(a, b)| std::sync::Arc::ptr_eq(a, b)));
}

#[test]
fn test_missing_import_in_nested_file_is_not_reported() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="a.props" /></Project>"#);
    ws.write("a.props", r#"<Project><Import Project="missing.props" /></Project>"#);

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert!(root.errors().is_empty());
}

// =============================================================================
// WILDCARDS
// =============================================================================

#[test]
fn test_wildcard_imports_matching_files_in_order() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="ext/*.targets" /></Project>"#);
    ws.write("ext/b.targets", "<Project />");
    ws.write("ext/a.targets", "<Project />");
    ws.write("ext/c.props", "<Project />");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj", "a.targets", "b.targets"]);
}

#[test]
fn test_wildcard_over_empty_directory_is_resolved() {
    let ws = Workspace::new();
    ws.mkdir("ext");
    ws.write(
        "app.proj",
        r#"<Project><Import Project="$(MSBuildThisFileDirectory)$(Ext)/*.targets" /></Project>"#,
    );

    let session = ParseSession::new(SessionOptions::default().with_property("Ext", "ext"));
    let root = ws.load("app.proj", None, &session);
    assert!(root.errors().is_empty(), "{:?}", root.errors());
    assert_eq!(document_names(&root), vec!["app.proj"]);
}

#[test]
fn test_wildcard_over_missing_directory_is_unresolved() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="nope/*.targets" /></Project>"#);

    let root = ws.load("app.proj", None, &ParseSession::default());
    let found: Vec<_> = root.errors().iter().map(|d| d.code).collect();
    assert_eq!(found, vec![codes::UNRESOLVED_IMPORT]);
}

#[test]
fn test_wildcard_with_empty_directory_part_is_not_expanded() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="$(Unset)/*.targets" /></Project>"#);
    ws.write("local.targets", "<Project />");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj"]);
    let found: Vec<_> = root.errors().iter().map(|d| d.code).collect();
    assert_eq!(found, vec![codes::UNRESOLVED_IMPORT]);
}

