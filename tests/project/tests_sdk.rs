//! SDK imports.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use msbuild::Symbol;
use msbuild::hir::{SdkReference, codes};
use msbuild::project::{DirectorySdkResolver, ParseSession};
use rstest::rstest;

use crate::helpers::workspace::{Workspace, document_names};

/// A workspace with `sdks/My.Sdk/Sdk/Sdk.{props,targets}`.
fn with_sdk() -> Workspace {
    let ws = Workspace::new();
    ws.write(
        "sdks/My.Sdk/Sdk/Sdk.props",
        "<Project><PropertyGroup><FromProps>1</FromProps></PropertyGroup></Project>",
    );
    ws.write(
        "sdks/My.Sdk/Sdk/Sdk.targets",
        r#"<Project><Target Name="SdkBuild" /></Project>"#,
    );
    ws.write("body.props", "<Project />");
    ws
}

fn session(ws: &Workspace) -> ParseSession {
    ParseSession::default().with_sdk_resolver(DirectorySdkResolver::new([ws.path("sdks")]))
}

#[rstest]
#[case(r#"<Project Sdk="My.Sdk"><Import Project="body.props" /></Project>"#)]
#[case(r#"<Project Sdk=" My.Sdk/1.0.0 "><Import Project="body.props" /></Project>"#)]
#[case(r#"<Project><Sdk Name="My.Sdk" Version="1.0.0" /><Import Project="body.props" /></Project>"#)]
fn test_sdk_props_come_before_the_body_and_targets_after(#[case] text: &str) {
    let ws = with_sdk();
    ws.write("app.proj", text);

    let root = ws.load("app.proj", None, &session(&ws));
    assert!(root.errors().is_empty(), "{:?}", root.errors());
    assert_eq!(
        document_names(&root),
        vec!["app.proj", "Sdk.props", "body.props", "Sdk.targets"]
    );
    assert!(root.contains(Symbol::Property("FromProps")));
    assert!(root.contains(Symbol::Target("SdkBuild")));
    assert!(
        root.document()
            .imports()
            .filter(|import| import.filename().starts_with(ws.path("sdks")))
            .all(|import| import.sdk() == Some("My.Sdk"))
    );
}

#[test]
fn test_import_with_sdk_attribute() {
    let ws = with_sdk();
    ws.write(
        "app.proj",
        r#"<Project><Import Project="Sdk.targets" Sdk="My.Sdk" /></Project>"#,
    );

    let root = ws.load("app.proj", None, &session(&ws));
    assert_eq!(document_names(&root), vec!["app.proj", "Sdk.targets"]);
}

#[test]
fn test_unresolved_sdk_is_reported_once() {
    let ws = with_sdk();
    let text = r#"<Project Sdk="Missing.Sdk"><PropertyGroup><A>1</A></PropertyGroup></Project>"#;
    ws.write("app.proj", text);

    let root = ws.load("app.proj", None, &session(&ws));
    let unresolved: Vec<_> = root
        .errors()
        .iter()
        .filter(|d| d.code == codes::UNRESOLVED_SDK)
        .collect();
    assert_eq!(unresolved.len(), 1);
    let range = unresolved[0].range;
    assert_eq!(&text[usize::from(range.start())..usize::from(range.end())], "Missing.Sdk");
    assert!(root.contains(Symbol::Property("A")));
}

#[test]
fn test_sdk_resolver_sees_reference_and_project() {
    let ws = with_sdk();
    ws.write("app.proj", r#"<Project Sdk="My.Sdk/2.0" />"#);
    let seen: Arc<Mutex<Vec<(SdkReference, PathBuf)>>> = Arc::default();
    let recorder = {
        let seen = Arc::clone(&seen);
        let sdks = ws.path("sdks");
        move |sdk: &SdkReference, project: &Path| {
            seen.lock().unwrap().push((sdk.clone(), project.to_path_buf()));
            Some(sdks.join(sdk.name.as_str()).join("Sdk"))
        }
    };
    let session = ParseSession::default().with_sdk_resolver(recorder);

    let root = ws.load("app.proj", None, &session);
    assert_eq!(document_names(&root).len(), 3);
    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    for (sdk, project) in seen.iter() {
        assert_eq!(sdk.name, "My.Sdk");
        assert_eq!(sdk.version.as_deref(), Some("2.0"));
        assert_eq!(project, &ws.path("app.proj"));
    }
}
