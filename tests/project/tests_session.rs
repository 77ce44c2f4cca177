//! Session behaviour: cancellation, IO failures, task metadata.

use std::path::Path;

use msbuild::hir::TaskInfo;
use msbuild::project::{DocumentError, ParseSession, RootDocument};
use tokio_util::sync::CancellationToken;

use crate::helpers::workspace::Workspace;

#[test]
fn test_cancelled_session_fails_the_build() {
    let ws = Workspace::new();
    ws.write("app.proj", r#"<Project><Import Project="a.props" /></Project>"#);
    ws.write("a.props", "<Project />");

    let token = CancellationToken::new();
    token.cancel();
    let session = ParseSession::default().with_cancellation(token);
    let result = RootDocument::load(ws.path("app.proj"), None, &session);
    assert!(matches!(result, Err(DocumentError::Cancelled)));
}

#[test]
fn test_missing_root_file_is_an_io_error() {
    let ws = Workspace::new();
    let result = RootDocument::load(ws.path("absent.proj"), None, &ParseSession::default());
    match result {
        Err(DocumentError::Io { path, .. }) => assert_eq!(path, ws.path("absent.proj")),
        other => panic!("expected an IO error, got {other:?}"),
    }
}

#[test]
fn test_task_metadata_is_merged_into_the_root() {
    let ws = Workspace::new();
    ws.write(
        "app.proj",
        r#"<Project><Target Name="Pack"><Zip Files="a.txt" /></Target></Project>"#,
    );
    let provider = |name: &str, _project: &Path| {
        name.eq_ignore_ascii_case("Zip").then(|| TaskInfo {
            name: "Zip".into(),
            description: Some("Packs files into an archive".into()),
            parameters: Default::default(),
        })
    };
    let session = ParseSession::default().with_task_metadata(provider);

    let root = ws.load("app.proj", None, &session);
    let task = root.document().symbols().task("zip").expect("Zip task");
    assert_eq!(task.description.as_deref(), Some("Packs files into an archive"));
    assert!(root.get_task_parameters("Zip").contains(&"Files"));
}

#[test]
fn test_one_session_builds_several_documents() {
    let ws = Workspace::new();
    ws.write("a.proj", r#"<Project><Import Project="shared.props" /></Project>"#);
    ws.write("b.proj", r#"<Project><Import Project="shared.props" /></Project>"#);
    ws.write("shared.props", "<Project><PropertyGroup><Shared>1</Shared></PropertyGroup></Project>");
    let session = ParseSession::default();

    let (a, b) = std::thread::scope(|scope| {
        let a = scope.spawn(|| ws.load("a.proj", None, &session));
        let b = scope.spawn(|| ws.load("b.proj", None, &session));
        (a.join().unwrap(), b.join().unwrap())
    });
    assert!(a.contains(msbuild::Symbol::Property("Shared")));
    assert!(b.contains(msbuild::Symbol::Property("Shared")));
}
