#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use rstest::rstest;

use super::*;
use crate::base::{TextRange, TextSize};
use crate::hir::{Diagnostic, Symbol, codes};
use crate::project::{ParseSession, RootDocument};
use crate::schema::{ElementKind, ValueKind};

fn root(text: &str) -> RootDocument {
    RootDocument::parse("/work/app.proj", text, None, &ParseSession::default()).unwrap()
}

/// Offset `delta` bytes into the first occurrence of `needle`.
fn offset(text: &str, needle: &str, delta: usize) -> TextSize {
    let start = text.find(needle).expect("needle in text");
    TextSize::from((start + delta) as u32)
}

fn slice(text: &str, range: TextRange) -> &str {
    &text[usize::from(range.start())..usize::from(range.end())]
}

fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
    diagnostics.iter().filter(|d| d.code == code).collect()
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_validate_unknown_elements_and_targets() {
    let text = r#"<Project>
  <PropertyGroup><Foo>1</Foo></PropertyGroup>
  <Bogus />
  <Target Name="Build" DependsOnTargets="Prepare;Missing" />
  <Target Name="Prepare" />
</Project>"#;
    let diagnostics = validate(&root(text));

    let unknown = with_code(&diagnostics, codes::UNKNOWN_ELEMENT);
    assert_eq!(unknown.len(), 1);
    assert_eq!(slice(text, unknown[0].range), "Bogus");

    let targets = with_code(&diagnostics, codes::UNKNOWN_SYMBOL);
    assert_eq!(targets.len(), 1);
    assert_eq!(slice(text, targets[0].range), "Missing");
}

#[test]
fn test_validate_is_ordered_by_position() {
    let text = r#"<Project>
  <Target Name="A" DependsOnTargets="Nope" />
  <Bogus />
</Project>"#;
    let diagnostics = validate(&root(text));
    let found: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(found, vec![codes::UNKNOWN_SYMBOL, codes::UNKNOWN_ELEMENT]);
}

#[test]
fn test_validate_missing_required_attributes_and_parameters() {
    let text = r#"<Project>
  <Target>
    <Exec />
    <Message Text="hi" />
  </Target>
</Project>"#;
    let diagnostics = validate(&root(text));
    let missing = with_code(&diagnostics, codes::MISSING_REQUIRED);
    let messages: Vec<_> = missing.iter().map(|d| d.message.to_string()).collect();
    assert_eq!(missing.len(), 2, "{messages:?}");
    assert!(messages[0].contains("'Name'"));
    assert!(messages[1].contains("'Command'"));
    assert!(with_code(&diagnostics, codes::UNKNOWN_SYMBOL).is_empty());
}

#[rstest]
#[case("<Choose><Otherwise /><When Condition=\"'a'=='a'\" /></Choose>", codes::INVALID_CHILD_ORDER)]
#[case("<Choose><When Condition=\"'a'=='a'\" /><Otherwise /><Otherwise /></Choose>", codes::DUPLICATE_CHILD)]
#[case("<Choose><Otherwise /></Choose>", codes::MISSING_REQUIRED)]
#[case("<Target Name=\"T\"><OnError ExecuteTargets=\"T\" /><Message /></Target>", codes::INVALID_CHILD_ORDER)]
#[case("<UsingTask TaskName=\"T\" />", codes::INVALID_COMBINATION)]
#[case("<UsingTask TaskName=\"T\" AssemblyName=\"a\" AssemblyFile=\"b.dll\" />", codes::INVALID_COMBINATION)]
#[case(
    "<UsingTask TaskName=\"T\" AssemblyFile=\"t.dll\"><ParameterGroup /></UsingTask>",
    codes::INVALID_COMBINATION
)]
#[case(
    "<UsingTask TaskName=\"T\" AssemblyFile=\"t.dll\"><ParameterGroup /><ParameterGroup /><Task /></UsingTask>",
    codes::DUPLICATE_CHILD
)]
fn test_validate_structure(#[case] body: &str, #[case] code: &str) {
    let text = format!("<Project>{body}</Project>");
    let diagnostics = validate(&root(&text));
    assert_eq!(
        with_code(&diagnostics, code).len(),
        1,
        "expected one {code} in {diagnostics:?}"
    );
}

#[test]
fn test_validate_well_formed_using_task_is_clean() {
    let text = r#"<Project>
  <UsingTask TaskName="Zip" AssemblyFile="tasks.dll">
    <ParameterGroup><Files Required="true" /></ParameterGroup>
    <Task>code</Task>
  </UsingTask>
  <Target Name="Pack"><Zip Files="a" /></Target>
</Project>"#;
    assert_eq!(validate(&root(text)), Vec::new());
}

#[test]
fn test_validate_declared_task_parameters_are_required() {
    let text = r#"<Project>
  <UsingTask TaskName="Zip" AssemblyFile="tasks.dll">
    <ParameterGroup><Files Required="true" /></ParameterGroup>
    <Task>code</Task>
  </UsingTask>
  <Target Name="Pack"><zip /></Target>
</Project>"#;
    let diagnostics = validate(&root(text));
    let missing = with_code(&diagnostics, codes::MISSING_REQUIRED);
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("'Files'"));
}

#[test]
fn test_validate_unknown_task_is_a_warning() {
    let text = r#"<Project><Target Name="T"><Frobnicate /></Target></Project>"#;
    let diagnostics = validate(&root(text));
    let unknown = with_code(&diagnostics, codes::UNKNOWN_SYMBOL);
    assert_eq!(unknown.len(), 1);
    assert!(!unknown[0].is_error());
    assert_eq!(slice(text, unknown[0].range), "Frobnicate");
}

#[test]
fn test_validate_reserved_properties() {
    let text = r#"<Project>
  <PropertyGroup><MSBuildProjectDirectory>x</MSBuildProjectDirectory></PropertyGroup>
  <Target Name="T">
    <Exec Command="x"><Output TaskParameter="ExitCode" PropertyName="msbuildprojectdirectory" /></Exec>
  </Target>
</Project>"#;
    let diagnostics = validate(&root(text));
    assert_eq!(with_code(&diagnostics, codes::RESERVED_PROPERTY).len(), 2);
}

#[test]
fn test_validate_values() {
    let text = r#"<Project>
  <PropertyGroup><A>$(Foo</A></PropertyGroup>
  <Target Name="T" KeepDuplicateOutputs="maybe" />
</Project>"#;
    let diagnostics = validate(&root(text));
    assert_eq!(with_code(&diagnostics, codes::EXPRESSION_ERROR).len(), 1);
    let invalid = with_code(&diagnostics, codes::INVALID_VALUE);
    assert_eq!(invalid.len(), 1);
    assert_eq!(slice(text, invalid[0].range), "maybe");
}

#[test]
fn test_validate_reports_nested_expression_error_once() {
    let text = r#"<Project><PropertyGroup><A>$(A.Substring($(B</A></PropertyGroup></Project>"#;
    let diagnostics = validate(&root(text));
    let errors = with_code(&diagnostics, codes::EXPRESSION_ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(slice(text, errors[0].range), "$(A.Substring($(B");
}

#[test]
fn test_validate_includes_build_errors() {
    let text = r#"<Project><Import Project="missing.targets" /></Project>"#;
    let diagnostics = validate(&root(text));
    assert_eq!(with_code(&diagnostics, codes::UNRESOLVED_IMPORT).len(), 1);
}

// ============================================================================
// REFERENCES
// ============================================================================

const REFERENCES: &str = r#"<Project>
  <PropertyGroup>
    <Out>bin</Out>
    <Dir>$(Out)\x</Dir>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="a.cs"><Link>x</Link></Compile>
  </ItemGroup>
  <Target Name="Build" DependsOnTargets="Prep">
    <Message Text="%(Compile.Link) $(out)" />
  </Target>
  <Target Name="Prep" />
</Project>"#;

#[test]
fn test_property_references_ignore_case() {
    let references = find_references(&root(REFERENCES), Symbol::Property("OUT"));
    let usages: Vec<_> = references.iter().map(|r| r.usage).collect();
    assert_eq!(
        usages,
        vec![ReferenceUsage::Write, ReferenceUsage::Read, ReferenceUsage::Read]
    );
    for reference in &references {
        assert!(slice(REFERENCES, reference.range).eq_ignore_ascii_case("out"));
    }
}

#[test]
fn test_target_references() {
    let references = find_references(&root(REFERENCES), Symbol::Target("prep"));
    let usages: Vec<_> = references.iter().map(|r| r.usage).collect();
    assert_eq!(usages, vec![ReferenceUsage::Read, ReferenceUsage::Declaration]);
    assert!(references.iter().all(|r| slice(REFERENCES, r.range) == "Prep"));
}

#[test]
fn test_item_and_metadata_references() {
    let root = root(REFERENCES);
    let items = find_references(&root, Symbol::Item("Compile"));
    let usages: Vec<_> = items.iter().map(|r| r.usage).collect();
    assert_eq!(usages, vec![ReferenceUsage::Write, ReferenceUsage::Read]);

    let metadata = ReferenceCollector::new(Symbol::Metadata {
        item: Some("compile"),
        name: "link",
    })
    .run(&root);
    let usages: Vec<_> = metadata.iter().map(|r| r.usage).collect();
    assert_eq!(usages, vec![ReferenceUsage::Write, ReferenceUsage::Read]);
    assert!(metadata.iter().all(|r| slice(REFERENCES, r.range) == "Link"));

    let other = find_references(
        &root,
        Symbol::Metadata {
            item: Some("None"),
            name: "Link",
        },
    );
    assert!(other.is_empty());
}

#[test]
fn test_task_parameter_references() {
    let text = r#"<Project>
  <UsingTask TaskName="Zip" AssemblyFile="tasks.dll">
    <ParameterGroup><Archive Output="true" /></ParameterGroup>
    <Task>code</Task>
  </UsingTask>
  <Target Name="Pack">
    <Zip Archive="a.zip"><Output TaskParameter="Archive" PropertyName="Result" /></Zip>
  </Target>
</Project>"#;
    let references = find_references(
        &root(text),
        Symbol::TaskParameter {
            task: "zip",
            name: "archive",
        },
    );
    let usages: Vec<_> = references.iter().map(|r| r.usage).collect();
    assert_eq!(
        usages,
        vec![ReferenceUsage::Declaration, ReferenceUsage::Write, ReferenceUsage::Read]
    );
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[test]
fn test_navigation_targets_existing_paths_and_imports() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("common.props"), "<Project />").unwrap();
    fs::write(dir.path().join("readme.txt"), "").unwrap();
    let text = r#"<Project>
  <Import Project="common.props" />
  <ItemGroup><None Include="readme.txt;missing.txt" /></ItemGroup>
</Project>"#;
    let project = dir.path().join("app.proj");
    let root = RootDocument::parse(&project, text, None, &ParseSession::default()).unwrap();

    let targets = navigation_targets(&root);
    assert_eq!(targets.len(), 2, "{targets:?}");
    assert_eq!(slice(text, targets[0].range), "common.props");
    assert_eq!(targets[0].paths, vec![dir.path().join("common.props")]);
    assert_eq!(slice(text, targets[1].range), "readme.txt");
    assert_eq!(targets[1].paths, vec![dir.path().join("readme.txt")]);
}

#[test]
fn test_navigation_evaluates_file_properties() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("x.txt"), "").unwrap();
    let text = r#"<Project>
  <ItemGroup><None Include="$(MSBuildProjectDirectory)/sub/x.txt" /></ItemGroup>
</Project>"#;
    let project = dir.path().join("app.proj");
    let root = RootDocument::parse(&project, text, None, &ParseSession::default()).unwrap();

    let targets = navigation_targets(&root);
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].paths, vec![dir.path().join("sub").join("x.txt")]);
}

// ============================================================================
// RESOLVE AT OFFSET
// ============================================================================

const RESOLVE: &str = r#"<Project>
  <PropertyGroup>
    <Out>bin</Out>
    <Dir>$(Out)\x</Dir>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="a.cs"><Link>x</Link></Compile>
  </ItemGroup>
  <Target Name="Build" DependsOnTargets="Prep">
    <Message Text="%(Compile.Link) $([System.IO.Path]::Combine('a', 'b'))" />
    <Exec Command="x"><Output TaskParameter="ExitCode" PropertyName="Code" /></Exec>
  </Target>
  <Target Name="Prep" />
</Project>"#;

#[rstest]
#[case("<Dir>", 2, ReferenceKind::Property, "Dir")]
#[case("$(Out)", 3, ReferenceKind::Property, "Out")]
#[case("DependsOnTargets=\"Prep\"", 19, ReferenceKind::Target, "Prep")]
#[case("%(Compile.Link)", 4, ReferenceKind::Item, "Compile")]
#[case("%(Compile.Link)", 11, ReferenceKind::Metadata, "Link")]
#[case("[System.IO.Path]", 3, ReferenceKind::ClassName, "System.IO.Path")]
#[case("Combine(", 2, ReferenceKind::PropertyFunction, "Combine")]
#[case("<Exec", 2, ReferenceKind::Task, "Exec")]
#[case("TaskParameter=\"ExitCode\"", 17, ReferenceKind::TaskParameter, "ExitCode")]
#[case("PropertyName=\"Code\"", 15, ReferenceKind::Property, "Code")]
fn test_resolve_reference_at(
    #[case] needle: &str,
    #[case] delta: usize,
    #[case] kind: ReferenceKind,
    #[case] name: &str,
) {
    let root = root(RESOLVE);
    let result = resolve_at(&root, offset(RESOLVE, needle, delta)).unwrap();
    let reference = result.reference.expect("reference at offset");
    assert_eq!(reference.kind, kind);
    assert_eq!(reference.name, name);
}

#[test]
fn test_resolve_metadata_owner_and_symbol() {
    let root = root(RESOLVE);
    let result = resolve_at(&root, offset(RESOLVE, "%(Compile.Link)", 11)).unwrap();
    assert_eq!(result.element.kind(), ElementKind::Task);
    let reference = result.reference.unwrap();
    assert_eq!(reference.owner.as_deref(), Some("Compile"));
    assert_eq!(
        reference.symbol(),
        Some(Symbol::Metadata {
            item: Some("Compile"),
            name: "Link"
        })
    );

    let output = resolve_at(&root, offset(RESOLVE, "TaskParameter=\"ExitCode\"", 17)).unwrap();
    let reference = output.reference.unwrap();
    assert_eq!(reference.owner.as_deref(), Some("Exec"));
    assert_eq!(output.value_kind, Some(ValueKind::TaskOutputParameterName));
}

#[test]
fn test_resolve_attribute_without_reference() {
    let root = root(RESOLVE);
    let result = resolve_at(&root, offset(RESOLVE, "Include=", 2)).unwrap();
    assert_eq!(result.element.kind(), ElementKind::Item);
    assert!(result.attribute.is_some());
    assert!(result.reference.is_none());

    let function = resolve_at(&root, offset(RESOLVE, "Combine(", 2)).unwrap();
    assert_eq!(function.reference.unwrap().symbol(), None);
}

#[test]
fn test_resolve_outside_known_elements() {
    let text = "<Project><Bogus Name=\"x\" /></Project>";
    let root = root(text);
    assert!(resolve_at(&root, offset(text, "Bogus", 1)).is_none());
    assert!(resolve_at(&root, TextSize::from(text.len() as u32 + 5)).is_none());
}
