//! Structural and value validation of a root document.

use rustc_hash::FxHashSet;

use crate::base::{SymbolName, TextRange, eq_ignore_case};
use crate::dom::{AttributeId, ElementId};
use crate::hir::{Diagnostic, DiagnosticCollector, codes};
use crate::parser::{ExprKind, ExpressionTree};
use crate::project::RootDocument;
use crate::schema::{ElementKind, ValueKind, builtin_property, builtin_task};
use crate::visitor::{
    DocumentVisitor, ResolvedElement, ValueSite, VisitContext, literal_entries, walk_document,
    walk_resolved_element,
};

/// All diagnostics for `root`: those recorded while building it plus
/// the validator's own, ordered by position.
pub fn validate(root: &RootDocument) -> Vec<Diagnostic> {
    let mut validator = Validator::new(root);
    let cx = VisitContext::new(root.xml(), root.text(), root.filename());
    walk_document(&mut validator, &cx);

    let mut diagnostics = validator.diagnostics;
    for diagnostic in root.errors() {
        diagnostics.add(diagnostic.clone());
    }
    diagnostics.finish()
}

struct Validator<'a> {
    root: &'a RootDocument,
    diagnostics: DiagnosticCollector,
    known_targets: FxHashSet<SymbolName>,
    known_tasks: FxHashSet<SymbolName>,
}

impl<'a> Validator<'a> {
    fn new(root: &'a RootDocument) -> Self {
        let mut known_targets = FxHashSet::default();
        let mut known_tasks = FxHashSet::default();

        // The root's own table also holds names it merely references, so
        // only its declaring elements count.
        let xml = root.xml();
        if let Some(project) = xml.root() {
            for &child in xml.children(project) {
                let element = xml.element(child);
                let (known, attribute) = if element.is_named("Target") {
                    (&mut known_targets, "Name")
                } else if element.is_named("UsingTask") {
                    (&mut known_tasks, "TaskName")
                } else {
                    continue;
                };
                if let Some(name) = element.attribute_value(attribute).map(str::trim).filter(|n| !n.is_empty()) {
                    known.insert(SymbolName::new(name));
                }
            }
        }
        for document in root.all_documents().into_iter().skip(1) {
            known_targets.extend(document.get_targets().map(SymbolName::new));
            known_tasks.extend(document.get_tasks().map(SymbolName::new));
        }
        if let Some(schema) = root.schema() {
            known_targets.extend(schema.targets.keys().cloned());
            known_tasks.extend(schema.tasks.keys().cloned());
        }

        Self {
            root,
            diagnostics: DiagnosticCollector::new(),
            known_targets,
            known_tasks,
        }
    }

    // ========================================================================
    // ELEMENT STRUCTURE
    // ========================================================================

    fn check_required_attributes(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let xml_element = cx.xml.element(element.id);
        for attribute in element.schema.attributes.iter().filter(|a| a.required) {
            if xml_element.attribute(attribute.name).is_none() {
                self.diagnostics
                    .missing_required(xml_element.name_range, &xml_element.name, attribute.name);
            }
        }
    }

    /// Kinds of the children of `element`, with their ids.
    fn child_kinds(cx: &VisitContext<'_>, element: &ResolvedElement) -> Vec<(ElementId, Option<ElementKind>)> {
        cx.xml
            .children(element.id)
            .iter()
            .map(|&child| (child, element.schema.child(&cx.xml.element(child).name)))
            .collect()
    }

    fn check_choose(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let children = Self::child_kinds(cx, element);
        let mut otherwise_seen = false;
        let mut has_when = false;
        for (child, kind) in children {
            let range = cx.xml.element(child).name_range;
            if otherwise_seen {
                let (code, message) = if kind == Some(ElementKind::Otherwise) {
                    (codes::DUPLICATE_CHILD, "'Choose' may only contain one 'Otherwise'")
                } else {
                    (codes::INVALID_CHILD_ORDER, "'Otherwise' must be the last child of 'Choose'")
                };
                self.diagnostics.add(Diagnostic::error(code, range, message));
            }
            match kind {
                Some(ElementKind::Otherwise) => otherwise_seen = true,
                Some(ElementKind::When) => has_when = true,
                _ => {}
            }
        }
        if !has_when {
            let range = cx.xml.element(element.id).name_range;
            self.diagnostics.add(Diagnostic::error(
                codes::MISSING_REQUIRED,
                range,
                "'Choose' must contain at least one 'When'",
            ));
        }
    }

    fn check_target(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let mut on_error_seen = false;
        for (child, kind) in Self::child_kinds(cx, element) {
            if kind == Some(ElementKind::OnError) {
                on_error_seen = true;
            } else if on_error_seen {
                self.diagnostics.add(Diagnostic::error(
                    codes::INVALID_CHILD_ORDER,
                    cx.xml.element(child).name_range,
                    "Only 'OnError' elements may follow an 'OnError' element",
                ));
            }
        }
    }

    fn check_using_task(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let xml_element = cx.xml.element(element.id);
        let range = xml_element.name_range;
        let has_name = xml_element.attribute("AssemblyName").is_some();
        let has_file = xml_element.attribute("AssemblyFile").is_some();
        if has_name == has_file {
            self.diagnostics.add(Diagnostic::error(
                codes::INVALID_COMBINATION,
                range,
                "'UsingTask' must have exactly one of 'AssemblyName' or 'AssemblyFile'",
            ));
        }

        let mut parameter_groups = 0;
        let mut bodies = 0;
        for (child, kind) in Self::child_kinds(cx, element) {
            let count = match kind {
                Some(ElementKind::ParameterGroup) => &mut parameter_groups,
                Some(ElementKind::TaskBody) => &mut bodies,
                _ => continue,
            };
            *count += 1;
            if *count > 1 {
                let name = &cx.xml.element(child).name;
                self.diagnostics.add(Diagnostic::error(
                    codes::DUPLICATE_CHILD,
                    cx.xml.element(child).name_range,
                    format!("'UsingTask' may only contain one '{name}'"),
                ));
            }
        }
        if (parameter_groups > 0) != (bodies > 0) {
            self.diagnostics.add(Diagnostic::error(
                codes::INVALID_COMBINATION,
                range,
                "'UsingTask' must have both or neither of 'ParameterGroup' and 'Task'",
            ));
        }
    }

    fn check_task(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let root = self.root;
        let xml_element = cx.xml.element(element.id);
        let name = xml_element.name.as_str();
        let range = xml_element.name_range;

        let mut required: Vec<&str> = Vec::new();
        match builtin_task(name) {
            Some(task) => required.extend(task.parameters.iter().filter(|p| p.required).map(|p| p.name)),
            None => {
                if !self.known_tasks.contains(&SymbolName::new(name)) {
                    self.diagnostics.add(Diagnostic::warning(
                        codes::UNKNOWN_SYMBOL,
                        range,
                        format!("Unknown task '{name}'"),
                    ));
                }
                for document in root.all_documents() {
                    if let Some(task) = document.symbols().task(name) {
                        required.extend(task.parameters.values().filter(|p| p.required).map(|p| p.name.as_str()));
                    }
                }
            }
        }
        let mut reported: Vec<&str> = Vec::new();
        for parameter in required {
            if xml_element.attribute(parameter).is_some() || reported.iter().any(|r| eq_ignore_case(r, parameter)) {
                continue;
            }
            reported.push(parameter);
            self.diagnostics.missing_required(range, name, parameter);
        }
    }

    fn check_reserved_property(&mut self, name: &str, range: TextRange) {
        if builtin_property(name).is_some_and(|p| p.reserved) {
            self.diagnostics.add(Diagnostic::warning(
                codes::RESERVED_PROPERTY,
                range,
                format!("'{name}' is a reserved property and cannot be assigned"),
            ));
        }
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    /// Check one literal entry against the site's declared kind.
    fn check_literal(&mut self, cx: &VisitContext<'_>, site: &ValueSite, value: &str, range: TextRange) {
        let kind = site.kind();
        if let Err(error) = kind.validate(value) {
            self.diagnostics.invalid_value(range, error);
            return;
        }
        match kind {
            ValueKind::TargetName if !Self::is_target_declaration(cx, site) => {
                if !self.known_targets.contains(&SymbolName::new(value)) {
                    self.diagnostics.add(Diagnostic::warning(
                        codes::UNKNOWN_SYMBOL,
                        range,
                        format!("Unknown target '{value}'"),
                    ));
                }
            }
            ValueKind::PropertyName if site.element().kind() == ElementKind::Output => {
                self.check_reserved_property(value, range);
            }
            _ => {}
        }
    }

    fn is_target_declaration(cx: &VisitContext<'_>, site: &ValueSite) -> bool {
        match site {
            ValueSite::Attribute(attribute) => {
                attribute.element.kind() == ElementKind::Target
                    && eq_ignore_case(&cx.xml.attribute(attribute.id).name, "Name")
            }
            ValueSite::Element(_) => false,
        }
    }
}

impl DocumentVisitor for Validator<'_> {
    fn visit_unknown_element(&mut self, cx: &VisitContext<'_>, element: ElementId) {
        let element = cx.xml.element(element);
        self.diagnostics.unknown_element(element.name_range, &element.name);
    }

    fn visit_unknown_attribute(&mut self, cx: &VisitContext<'_>, _element: &ResolvedElement, attribute: AttributeId) {
        let attribute = cx.xml.attribute(attribute);
        self.diagnostics.unknown_attribute(attribute.name_range, &attribute.name);
    }

    fn visit_resolved_element(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        self.check_required_attributes(cx, element);
        match element.kind() {
            ElementKind::Choose => self.check_choose(cx, element),
            ElementKind::Target => self.check_target(cx, element),
            ElementKind::UsingTask => self.check_using_task(cx, element),
            ElementKind::Task => self.check_task(cx, element),
            ElementKind::Property => {
                let xml_element = cx.xml.element(element.id);
                self.check_reserved_property(&xml_element.name, xml_element.name_range);
            }
            _ => {}
        }
        walk_resolved_element(self, cx, element);
    }

    fn visit_value_expression(&mut self, cx: &VisitContext<'_>, site: &ValueSite, tree: &ExpressionTree) {
        for id in tree.outermost_errors() {
            if let Some(kind) = tree.kind(id).error_kind() {
                self.diagnostics
                    .add(Diagnostic::error(codes::EXPRESSION_ERROR, tree.range(id), kind.message()));
            }
        }
        if site.kind() == ValueKind::Condition {
            return;
        }
        for id in tree.nodes() {
            if let ExprKind::Text { value, .. } = tree.kind(id) {
                if tree.is_whole_value(id) && !value.trim().is_empty() {
                    self.check_literal(cx, site, value.trim(), tree.range(id));
                }
            }
        }
    }

    fn visit_literal_value(&mut self, cx: &VisitContext<'_>, site: &ValueSite, value: &str, range: TextRange) {
        for (entry, entry_range) in literal_entries(site, value, range) {
            self.check_literal(cx, site, entry, entry_range);
        }
    }
}
