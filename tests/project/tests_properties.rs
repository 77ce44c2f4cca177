//! Property values flowing into import paths.

use msbuild::Symbol;
use msbuild::project::{ParseSession, SessionOptions};

use crate::helpers::workspace::{Workspace, document_names};

#[test]
fn test_target_frameworks_import_every_framework() {
    let ws = Workspace::new();
    ws.write(
        "app.proj",
        r#"<Project>
  <PropertyGroup><TargetFrameworks>net6.0;net8.0</TargetFrameworks></PropertyGroup>
  <Import Project="tfm/$(TargetFramework).props" />
</Project>"#,
    );
    ws.write("tfm/net6.0.props", "<Project><PropertyGroup><Six>1</Six></PropertyGroup></Project>");
    ws.write("tfm/net8.0.props", "<Project><PropertyGroup><Eight>1</Eight></PropertyGroup></Project>");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert!(root.errors().is_empty(), "{:?}", root.errors());
    assert_eq!(document_names(&root), vec!["app.proj", "net6.0.props", "net8.0.props"]);
    assert!(root.contains(Symbol::Property("Six")));
    assert!(root.contains(Symbol::Property("Eight")));
}

#[test]
fn test_property_set_in_import_is_visible_to_later_imports() {
    let ws = Workspace::new();
    ws.write(
        "app.proj",
        r#"<Project>
  <Import Project="settings.props" />
  <Import Project="$(Configuration).props" />
</Project>"#,
    );
    ws.write(
        "settings.props",
        "<Project><PropertyGroup><Configuration>Release</Configuration></PropertyGroup></Project>",
    );
    ws.write("Release.props", "<Project />");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj", "settings.props", "Release.props"]);
    let values: Vec<&str> = root
        .property_values()
        .values("Configuration")
        .iter()
        .map(|v| v.as_str())
        .collect();
    assert_eq!(values, vec!["Release"]);
}

#[test]
fn test_session_property_drives_import_path() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="$(Flavor)/x.props" /></Project>"#);
    ws.write("blue/x.props", "<Project><Target Name=\"Blue\" /></Project>");
    ws.write("red/x.props", "<Project><Target Name=\"Red\" /></Project>");

    let session = ParseSession::new(SessionOptions::default().with_property("Flavor", "red"));
    let root = ws.load("app.proj", None, &session);
    assert!(root.contains(Symbol::Target("Red")));
    assert!(!root.contains(Symbol::Target("Blue")));
}

#[test]
fn test_reserved_file_properties_use_the_importing_file() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="build/a.props" /></Project>"#);
    ws.write(
        "build/a.props",
        r#"<Project><Import Project="$(MSBuildThisFileDirectory)b.props" /></Project>"#,
    );
    ws.write("build/b.props", "<Project />");
    ws.write("b.props", "<Project><PropertyGroup><Wrong>1</Wrong></PropertyGroup></Project>");

    let root = ws.load("app.proj", None, &ParseSession::default());
    assert_eq!(document_names(&root), vec!["app.proj", "a.props", "b.props"]);
    assert!(!root.contains(Symbol::Property("Wrong")));
}
