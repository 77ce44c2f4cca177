#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use rstest::rstest;
use smol_str::SmolStr;

use super::*;
use crate::base::TextSize;
use crate::parser::{ExpressionOptions, parse};

fn eval(text: &str) -> Option<String> {
    let tree = parse(text, ExpressionOptions::empty(), TextSize::new(0));
    evaluate(&tree, |name| match name.to_ascii_lowercase().as_str() {
        "root" => Some(SmolStr::new("/repo")),
        "tfm" => Some(SmolStr::new("net8.0")),
        "padded" => Some(SmolStr::new("  MiXed  ")),
        _ => None,
    })
}

#[rstest]
#[case("plain", "plain")]
#[case("$(Root)/build", "/repo/build")]
#[case("$(Undefined)x", "x")]
#[case("$(TFM.ToUpper())", "NET8.0")]
#[case("$(Padded.Trim().ToLowerInvariant())", "mixed")]
#[case("$(TFM.Replace('net', 'v'))", "v8.0")]
#[case("$(TFM.Substring(3))", "8.0")]
#[case("$(TFM.Substring(0, 3))", "net")]
#[case("$(TFM.Length)", "6")]
#[case("$(TFM.StartsWith('net'))", "True")]
#[case("$(TFM[0])", "n")]
#[case("$([MSBuild]::ValueOrDefault('$(Undefined)', 'fallback'))", "fallback")]
#[case("a&amp;b&#59;c&#x41;", "a&b;cA")]
fn test_evaluates(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(eval(text).as_deref(), Some(expected));
}

#[rstest]
#[case("@(Compile)")]
#[case("$(Foo")]
#[case("$(TFM.NoSuchMethod())")]
#[case("$([Unknown]::Thing())")]
fn test_unevaluable(#[case] text: &str) {
    assert_eq!(eval(text), None);
}

#[test]
fn test_path_functions() {
    let combined = eval("$([System.IO.Path]::Combine('$(Root)', 'a', 'b.props'))").unwrap();
    assert_eq!(Path::new(&combined), Path::new("/repo").join("a").join("b.props"));
    let file = eval("$([System.IO.Path]::GetFileNameWithoutExtension('/x/y/z.targets'))").unwrap();
    assert_eq!(file, "z");
    let normalized = eval("$([MSBuild]::NormalizeDirectory('/a/b', '..', 'c'))").unwrap();
    assert_eq!(normalized, format!("{}{}", Path::new("/a/c").display(), std::path::MAIN_SEPARATOR));
}

#[test]
fn test_file_above() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("src").join("app");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(dir.path().join("Directory.Build.props"), "<Project />").unwrap();

    let text = format!(
        "$([MSBuild]::GetDirectoryNameOfFileAbove('{}', 'Directory.Build.props'))",
        nested.display()
    );
    assert_eq!(eval(&text), Some(dir.path().display().to_string()));

    let missing = format!("$([MSBuild]::GetPathOfFileAbove('nope.props', '{}'))", nested.display());
    assert_eq!(eval(&missing), Some(String::new()));
}

#[rstest]
#[case("MSBuildThisFile", "b.targets")]
#[case("MSBuildThisFileName", "b")]
#[case("msbuildthisfileextension", ".targets")]
#[case("MSBuildProjectFile", "b.targets")]
fn test_file_properties(#[case] name: &str, #[case] expected: &str) {
    let file = Path::new("/repo/build/b.targets");
    assert_eq!(file_property(name, file).as_deref(), Some(expected));
}

#[test]
fn test_directory_properties() {
    let file = Path::new("/repo/build/b.targets");
    let this_dir = file_property("MSBuildThisFileDirectory", file).unwrap();
    assert!(this_dir.ends_with(std::path::MAIN_SEPARATOR));
    let project_dir = file_property("MSBuildProjectDirectory", file).unwrap();
    assert_eq!(project_dir, "/repo/build");
    assert_eq!(file_property("MSBuildProject", file), None);
    assert_eq!(file_property("MSBuildProjectExtensionsPath", file), None);
}

#[test]
fn test_permutations() {
    let dims = vec![
        (SmolStr::new("A"), vec![SmolStr::new("1"), SmolStr::new("2")]),
        (SmolStr::new("Empty"), vec![]),
        (SmolStr::new("B"), vec![SmolStr::new("x"), SmolStr::new("y"), SmolStr::new("z")]),
    ];
    let all = permutations(&dims, 64);
    assert_eq!(all.len(), 6);
    assert_eq!(all[0], vec![(SmolStr::new("A"), SmolStr::new("1")), (SmolStr::new("B"), SmolStr::new("x"))]);

    assert_eq!(permutations(&dims, 4).len(), 4);
    assert_eq!(permutations(&[], 64), vec![Vec::new()]);
}
