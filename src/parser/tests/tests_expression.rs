#![allow(clippy::unwrap_used, clippy::expect_used)]

use rstest::rstest;

use crate::base::{TextRange, TextSize};
use crate::parser::{ExprKind, ExpressionErrorKind, ExpressionOptions, ExpressionTree, NodeId, parse};

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(TextSize::new(start), TextSize::new(end))
}

fn parse0(text: &str, options: ExpressionOptions) -> ExpressionTree {
    parse(text, options, TextSize::new(0))
}

fn list_entries(tree: &ExpressionTree) -> Vec<NodeId> {
    match tree.kind(tree.root()) {
        ExprKind::List { entries } => entries.clone(),
        other => panic!("expected list, got {other:?}"),
    }
}

fn text_value(tree: &ExpressionTree, id: NodeId) -> &str {
    match tree.kind(id) {
        ExprKind::Text { value, .. } => value.as_str(),
        other => panic!("expected text, got {other:?}"),
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_simple_property_covers_whole_text() {
    let tree = parse0("$(Foo)", ExpressionOptions::empty());
    let root = tree.root();

    assert_eq!(tree.range(root), range(0, 6));
    let ExprKind::Property { body } = tree.kind(root) else {
        panic!("expected property, got {:?}", tree.kind(root));
    };
    assert_eq!(tree.kind(*body), &ExprKind::PropertyName { name: "Foo".into() });
    assert_eq!(tree.range(*body), range(2, 5));
    assert_eq!(tree.parent(*body), Some(root));
    assert!(!tree.has_errors());
}

#[test]
fn test_base_offset_shifts_every_range() {
    let tree = parse("$(Foo)", ExpressionOptions::empty(), TextSize::new(10));
    let root = tree.root();
    assert_eq!(tree.range(root), range(10, 16));
    let ExprKind::Property { body } = tree.kind(root) else {
        panic!("expected property");
    };
    assert_eq!(tree.range(*body), range(12, 15));
}

#[test]
fn test_unterminated_property_is_incomplete_at_eof() {
    let tree = parse0("$(Foo", ExpressionOptions::empty());
    let root = tree.root();

    let ExprKind::IncompleteError { kind, was_eof, node } = tree.kind(root) else {
        panic!("expected incomplete error, got {:?}", tree.kind(root));
    };
    assert_eq!(*kind, ExpressionErrorKind::ExpectingRightParenOrPeriod);
    assert!(*was_eof);
    assert_eq!(tree.range(root), range(0, 5));

    let ExprKind::Property { body } = tree.kind(*node) else {
        panic!("expected wrapped property");
    };
    assert_eq!(tree.property_name(*body).map(|n| n.as_str()), Some("Foo"));
}

#[test]
fn test_empty_property_has_empty_name() {
    let tree = parse0("$(", ExpressionOptions::empty());
    let ExprKind::IncompleteError { kind, node, .. } = tree.kind(tree.root()) else {
        panic!("expected incomplete error");
    };
    assert_eq!(*kind, ExpressionErrorKind::ExpectingPropertyName);
    assert_eq!(tree.property_name(*node).map(|n| n.as_str()), Some(""));
}

#[test]
fn test_property_function_with_arguments() {
    let tree = parse0("$(Foo.Substring(0, 3))", ExpressionOptions::empty());
    let ExprKind::Property { body } = tree.kind(tree.root()) else {
        panic!("expected property");
    };
    let ExprKind::PropertyFunction {
        target,
        method: Some(method),
        arguments: Some(arguments),
        is_indexer: false,
    } = tree.kind(*body)
    else {
        panic!("expected property function, got {:?}", tree.kind(*body));
    };
    assert_eq!(tree.kind(*target), &ExprKind::PropertyName { name: "Foo".into() });
    assert_eq!(tree.kind(*method), &ExprKind::FunctionName { name: "Substring".into() });
    let ExprKind::ArgumentList { arguments } = tree.kind(*arguments) else {
        panic!("expected argument list");
    };
    let values: Vec<_> = arguments.iter().map(|a| tree.kind(*a).clone()).collect();
    assert_eq!(values, vec![ExprKind::ArgumentInt(0), ExprKind::ArgumentInt(3)]);
}

#[test]
fn test_static_property_function() {
    let tree = parse0("$([System.IO.Path]::Combine($(Dir), 'file.txt'))", ExpressionOptions::empty());
    assert!(!tree.has_errors());
    let class = tree
        .nodes()
        .find_map(|id| match tree.kind(id) {
            ExprKind::ClassReference { name } => Some(name.clone()),
            _ => None,
        })
        .expect("class reference");
    assert_eq!(class, "System.IO.Path");

    let properties: Vec<_> = tree
        .nodes()
        .filter_map(|id| match tree.kind(id) {
            ExprKind::PropertyName { name } => Some(name.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(properties, vec!["Dir"]);
}

#[test]
fn test_registry_value() {
    let tree = parse0("$(registry:HKEY_LOCAL_MACHINE\\Software@Key)", ExpressionOptions::empty());
    let ExprKind::Property { body } = tree.kind(tree.root()) else {
        panic!("expected property");
    };
    assert!(matches!(
        tree.kind(*body),
        ExprKind::PropertyRegistryValue { key } if key == "HKEY_LOCAL_MACHINE\\Software@Key"
    ));
}

#[test]
fn test_float_argument() {
    let tree = parse0("$([MSBuild]::Add(1.5, -2))", ExpressionOptions::empty());
    let numbers: Vec<_> = tree
        .nodes()
        .filter(|&id| matches!(tree.kind(id), ExprKind::ArgumentFloat(_) | ExprKind::ArgumentInt(_)))
        .map(|id| tree.kind(id).clone())
        .collect();
    assert_eq!(numbers, vec![ExprKind::ArgumentFloat(1.5), ExprKind::ArgumentInt(-2)]);
}

#[test]
fn test_bad_number_is_an_error() {
    let tree = parse0("$(A.Substring(1x))", ExpressionOptions::empty());
    let errors: Vec<_> = tree.errors().map(|id| tree.kind(id).error_kind()).collect();
    assert!(errors.contains(&Some(ExpressionErrorKind::CouldNotParseNumber)));
}

// ============================================================================
// Items and metadata
// ============================================================================

#[test]
fn test_item_transform_with_unqualified_metadata() {
    let tree = parse0("@(X->'%(Y)')", ExpressionOptions::ITEMS);
    let ExprKind::Item { body } = tree.kind(tree.root()) else {
        panic!("expected item, got {:?}", tree.kind(tree.root()));
    };
    let ExprKind::ItemTransform {
        target,
        transform: Some(transform),
        separator: None,
    } = tree.kind(*body)
    else {
        panic!("expected transform, got {:?}", tree.kind(*body));
    };
    assert_eq!(tree.item_name(*target).map(|n| n.as_str()), Some("X"));

    let ExprKind::QuotedString { expression, .. } = tree.kind(*transform) else {
        panic!("expected quoted string");
    };
    let ExprKind::Metadata { item, name, .. } = tree.kind(*expression) else {
        panic!("expected metadata, got {:?}", tree.kind(*expression));
    };
    assert!(item.is_none());
    assert_eq!(name.name, "Y");
    assert_eq!(name.range, range(8, 9));
    assert!(!tree.has_errors());
}

#[test]
fn test_item_transform_with_separator() {
    let tree = parse0("@(Compile->'%(Filename)', ' ')", ExpressionOptions::ITEMS);
    let transform = tree
        .nodes()
        .find(|&id| matches!(tree.kind(id), ExprKind::ItemTransform { .. }))
        .unwrap();
    assert!(matches!(
        tree.kind(transform),
        ExprKind::ItemTransform {
            separator: Some(_),
            ..
        }
    ));
}

#[test]
fn test_item_function() {
    let tree = parse0("@(Compile->Count())", ExpressionOptions::ITEMS);
    let ExprKind::Item { body } = tree.kind(tree.root()) else {
        panic!("expected item");
    };
    let ExprKind::ItemFunction {
        method: Some(method),
        arguments: Some(_),
        ..
    } = tree.kind(*body)
    else {
        panic!("expected item function, got {:?}", tree.kind(*body));
    };
    assert_eq!(tree.kind(*method), &ExprKind::FunctionName { name: "Count".into() });
}

#[test]
fn test_items_disallowed_produce_error() {
    let tree = parse0("@(Foo)", ExpressionOptions::empty());
    assert_eq!(
        tree.kind(tree.root()),
        &ExprKind::Error {
            kind: ExpressionErrorKind::ItemsDisallowed
        }
    );
    assert_eq!(tree.range(tree.root()), range(0, 6));
}

#[test]
fn test_metadata_disallowed_keeps_parsing() {
    let tree = parse0("%(Foo)$(Bar)", ExpressionOptions::empty());
    let ExprKind::Concat { parts } = tree.kind(tree.root()) else {
        panic!("expected concat, got {:?}", tree.kind(tree.root()));
    };
    assert_eq!(parts.len(), 2);
    assert_eq!(
        tree.kind(parts[0]).error_kind(),
        Some(ExpressionErrorKind::MetadataDisallowed)
    );
    assert_eq!(tree.property_name(parts[1]).map(|n| n.as_str()), Some("Bar"));
}

#[rstest]
#[case("%(Foo.Bar)", Some("Foo"), "Bar", false)]
#[case("%(Foo->Bar)", Some("Foo"), "Bar", true)]
#[case("%(Bar)", None, "Bar", false)]
fn test_metadata_forms(
    #[case] text: &str,
    #[case] item: Option<&str>,
    #[case] name: &str,
    #[case] arrow: bool,
) {
    let tree = parse0(text, ExpressionOptions::METADATA);
    let ExprKind::Metadata {
        item: parsed_item,
        name: parsed_name,
        uses_arrow,
    } = tree.kind(tree.root())
    else {
        panic!("expected metadata, got {:?}", tree.kind(tree.root()));
    };
    assert_eq!(parsed_item.as_ref().map(|p| p.name.as_str()), item);
    assert_eq!(parsed_name.name, name);
    assert_eq!(*uses_arrow, arrow);
}

#[test]
fn test_incomplete_metadata_keeps_item_name() {
    let tree = parse0("%(Foo.", ExpressionOptions::METADATA);
    let ExprKind::IncompleteError { kind, node, was_eof } = tree.kind(tree.root()) else {
        panic!("expected incomplete error");
    };
    assert_eq!(*kind, ExpressionErrorKind::ExpectingMetadataName);
    assert!(*was_eof);
    let ExprKind::Metadata { item, name, .. } = tree.kind(*node) else {
        panic!("expected metadata");
    };
    assert_eq!(item.as_ref().map(|p| p.name.as_str()), Some("Foo"));
    assert!(name.is_empty());
}

// ============================================================================
// Lists and concatenation
// ============================================================================

#[test]
fn test_semicolon_list() {
    let tree = parse0("a;b;c", ExpressionOptions::LISTS);
    let entries = list_entries(&tree);
    let values: Vec<_> = entries.iter().map(|e| text_value(&tree, *e)).collect();
    assert_eq!(values, vec!["a", "b", "c"]);
    assert_eq!(tree.range(tree.root()), range(0, 5));
    for entry in entries {
        assert!(matches!(tree.kind(entry), ExprKind::Text { is_pure: true, .. }));
    }
}

#[rstest]
#[case(ExpressionOptions::COMMA_LISTS, true)]
#[case(ExpressionOptions::LISTS, false)]
fn test_comma_lists_only_split_when_enabled(
    #[case] options: ExpressionOptions,
    #[case] splits: bool,
) {
    let tree = parse0("a,b", options);
    let is_list = matches!(tree.kind(tree.root()), ExprKind::List { .. });
    assert_eq!(is_list, splits);
}

#[test]
fn test_empty_list_entry_is_an_error() {
    let tree = parse0("a;;b", ExpressionOptions::LISTS);
    let entries = list_entries(&tree);
    assert_eq!(entries.len(), 3);
    assert_eq!(text_value(&tree, entries[0]), "a");
    assert_eq!(
        tree.kind(entries[1]),
        &ExprKind::Error {
            kind: ExpressionErrorKind::EmptyListEntry
        }
    );
    assert_eq!(tree.range(entries[1]), range(2, 3));
    assert_eq!(text_value(&tree, entries[2]), "b");
}

#[test]
fn test_trailing_separator_is_not_an_entry() {
    let tree = parse0("a;b; ", ExpressionOptions::LISTS);
    assert_eq!(list_entries(&tree).len(), 2);
    assert!(!tree.has_errors());
}

#[test]
fn test_list_entries_are_trimmed() {
    let tree = parse0(" a ; b ", ExpressionOptions::LISTS);
    let entries = list_entries(&tree);
    assert_eq!(tree.range(entries[0]), range(1, 2));
    assert_eq!(tree.range(entries[1]), range(5, 6));
}

#[test]
fn test_concatenation_marks_text_impure() {
    let tree = parse0("bin\\$(Configuration)\\", ExpressionOptions::empty());
    let ExprKind::Concat { parts } = tree.kind(tree.root()) else {
        panic!("expected concat, got {:?}", tree.kind(tree.root()));
    };
    assert_eq!(parts.len(), 3);
    assert!(matches!(
        tree.kind(parts[0]),
        ExprKind::Text { value, is_pure: false } if value == "bin\\"
    ));
    assert!(matches!(tree.kind(parts[1]), ExprKind::Property { .. }));
    assert!(matches!(tree.kind(parts[2]), ExprKind::Text { is_pure: false, .. }));
}

#[test]
fn test_list_of_references() {
    let tree = parse0("$(A);@(B);c", ExpressionOptions::ITEMS_AND_LISTS);
    let entries = list_entries(&tree);
    assert!(matches!(tree.kind(entries[0]), ExprKind::Property { .. }));
    assert!(matches!(tree.kind(entries[1]), ExprKind::Item { .. }));
    assert_eq!(text_value(&tree, entries[2]), "c");
}

#[test]
fn test_entity_does_not_split_list() {
    let tree = parse0("a&#59;b", ExpressionOptions::LISTS);
    assert_eq!(text_value(&tree, tree.root()), "a&#59;b");
}

#[test]
fn test_empty_text_is_pure_empty_text() {
    let tree = parse0("", ExpressionOptions::ITEMS_METADATA_AND_LISTS);
    assert!(matches!(
        tree.kind(tree.root()),
        ExprKind::Text { value, is_pure: true } if value.is_empty()
    ));
}

#[test]
fn test_error_inside_list_stops_parsing() {
    let tree = parse0("a;$(B;c", ExpressionOptions::LISTS);
    let entries = list_entries(&tree);
    assert_eq!(entries.len(), 2);
    assert!(tree.kind(entries[1]).is_error());
}

#[rstest]
#[case("$(Foo)")]
#[case("@(Foo->'%(Bar)')")]
#[case("a;b;$(C)")]
#[case("$([System.String]::Concat('a', $(B)))")]
#[case("$(Foo")]
#[case("@(X->")]
fn test_children_nest_inside_parents(#[case] text: &str) {
    let tree = parse0(text, ExpressionOptions::ITEMS_METADATA_AND_LISTS);
    for id in tree.nodes() {
        if let Some(parent) = tree.parent(id) {
            assert!(
                tree.range(parent).contains_range(tree.range(id)),
                "{:?} escapes its parent in {text:?}",
                tree.kind(id)
            );
        }
    }
}
