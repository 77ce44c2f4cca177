//! Populates an [`MSBuildDocument`] from a parsed file.
//!
//! The builder is a [`DocumentVisitor`]. Names enter the symbol table at
//! the point where they first occur in the text, whether that is an
//! element tag, a declaring attribute, or a `$()`, `@()` or `%()`
//! reference. Imports are handed to an [`ImportContext`], which owns
//! evaluation and the file system.

use std::path::Path;
use std::sync::Arc;

use smol_str::SmolStr;

use super::annotations::Annotation;
use super::diagnostics::{Diagnostic, DiagnosticCollector, codes};
use super::document::MSBuildDocument;
use super::import::{Import, SdkReference};
use super::symbols::{Symbol, TaskParameterInfo};
use crate::base::{TextRange, TextSize, eq_ignore_case};
use crate::dom::{AttributeId, XDocument, XNodeId};
use crate::parser::{ExprKind, ExpressionOptions, ExpressionTree, parse};
use crate::schema::{AttributeRole, ElementKind, ValueKind, builtin_metadata, builtin_property, builtin_task};
use crate::visitor::{
    DocumentVisitor, ResolvedAttribute, ResolvedElement, ValueSite, VisitContext, literal_entries,
    walk_document, walk_resolved_attribute, walk_resolved_element,
};

/// One `Import` (or implicit SDK import) to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    /// File containing the import.
    pub importer: &'a Path,
    /// The `Project` value as written.
    pub text: &'a str,
    pub expression: &'a ExpressionTree,
    /// Resolve `text` relative to this SDK instead of the importer.
    pub sdk: Option<&'a SdkReference>,
}

/// What the builder needs from the import resolution engine.
pub trait ImportContext {
    /// Resolve an import to zero or more imports. Unresolvable requests
    /// come back as stubs (see [`Import::unresolved`]).
    fn resolve_import(&mut self, request: &ImportRequest<'_>) -> Vec<Arc<Import>>;

    fn is_watched(&self, property: &str) -> bool;

    /// Evaluate and record an assignment to a watched property. Returns
    /// the values learned.
    fn collect_property(&mut self, importer: &Path, name: &str, value: &ExpressionTree) -> Vec<SmolStr>;
}

/// Build the document for `xml`.
///
/// Toplevel documents also get XML diagnostics, unresolved import
/// diagnostics and navigation annotations.
pub fn build_document(
    filename: &Path,
    text: &str,
    xml: &XDocument,
    is_toplevel: bool,
    context: &mut dyn ImportContext,
) -> MSBuildDocument {
    let mut document = MSBuildDocument::new(filename, is_toplevel);
    let mut diagnostics = DiagnosticCollector::new();
    if is_toplevel {
        for error in xml.errors() {
            diagnostics.add(Diagnostic::error(codes::XML_ERROR, error.range, error.message.clone()));
        }
    }

    let cx = VisitContext::new(xml, text, filename);
    let mut builder = SchemaBuilder {
        document: &mut document,
        diagnostics: &mut diagnostics,
        context,
    };
    walk_document(&mut builder, &cx);

    document.errors = diagnostics.finish();
    document
}

struct SchemaBuilder<'a> {
    document: &'a mut MSBuildDocument,
    diagnostics: &'a mut DiagnosticCollector,
    context: &'a mut dyn ImportContext,
}

impl SchemaBuilder<'_> {
    fn is_toplevel(&self) -> bool {
        self.document.is_toplevel()
    }

    // ========================================================================
    // SYMBOLS
    // ========================================================================

    // Built-in names are known without being declared and are never
    // synthesized into the table.

    fn add_property(&mut self, name: &str) {
        if name.is_empty() || builtin_property(name).is_some() {
            return;
        }
        self.document.symbols.add_property(name);
    }

    fn add_item(&mut self, name: &str) {
        if !name.is_empty() {
            self.document.symbols.add_item(name);
        }
    }

    fn add_metadata(&mut self, item: &str, name: &str) {
        if item.is_empty() || name.is_empty() || builtin_metadata(name).is_some() {
            return;
        }
        self.document.symbols.add_metadata(item, name);
    }

    fn add_target(&mut self, name: &str) {
        if !name.is_empty() {
            self.document.symbols.add_target(name);
        }
    }

    fn add_task(&mut self, name: &str) {
        if !name.is_empty() && builtin_task(name).is_none() {
            self.document.symbols.add_task(name);
        }
    }

    fn add_task_parameter(&mut self, task: &str, name: &str) -> Option<&mut TaskParameterInfo> {
        if task.is_empty() || name.is_empty() || builtin_task(task).is_some() {
            return None;
        }
        Some(self.document.symbols.add_task_parameter(task, name))
    }

    /// Insert a name that a literal value of `kind` spells out.
    fn add_literal(&mut self, cx: &VisitContext<'_>, site: &ValueSite, kind: ValueKind, name: &str) {
        let name = name.trim();
        match kind {
            ValueKind::ItemName => self.add_item(name),
            ValueKind::PropertyName => self.add_property(name),
            ValueKind::TargetName => self.add_target(name),
            ValueKind::TaskName => self.add_task(name),
            ValueKind::TaskOutputParameterName => {
                // Output/@TaskParameter names a parameter of the enclosing task.
                if let Some(task) = site.element().parent {
                    let task = cx.xml.element(task).name.clone();
                    if let Some(parameter) = self.add_task_parameter(&task, name) {
                        parameter.output = true;
                    }
                }
            }
            _ => {}
        }
    }

    /// The item an unqualified `%(Name)` belongs to, from the element the
    /// value sits on.
    fn implicit_item(cx: &VisitContext<'_>, element: &ResolvedElement) -> Option<SmolStr> {
        match element.kind() {
            ElementKind::Item | ElementKind::ItemDefinition => Some(cx.xml.element(element.id).name.clone()),
            ElementKind::Metadata => element.parent.map(|parent| cx.xml.element(parent).name.clone()),
            _ => None,
        }
    }

    // ========================================================================
    // IMPORTS
    // ========================================================================

    fn resolve(
        &mut self,
        cx: &VisitContext<'_>,
        text: &str,
        expression: &ExpressionTree,
        sdk: Option<&SdkReference>,
    ) -> Vec<Arc<Import>> {
        let request = ImportRequest {
            importer: cx.filename,
            text,
            expression,
            sdk,
        };
        self.context.resolve_import(&request)
    }

    /// Add `imports` to the document and, for the toplevel file, report
    /// the unresolved ones at `range` and annotate `node`.
    fn record_imports(
        &mut self,
        node: XNodeId,
        range: TextRange,
        text: &str,
        imports: Vec<Arc<Import>>,
        sdk: Option<&SdkReference>,
    ) {
        for import in &imports {
            if self.is_toplevel() && !import.is_resolved() {
                self.report_unresolved(range, text, sdk);
            }
            self.document.add_import(import.clone());
        }
        if !self.is_toplevel() {
            return;
        }
        let mut annotated = self.document.annotations.imports(node).to_vec();
        annotated.extend(imports);
        self.document.annotations.insert(node, Annotation::Imports(annotated));
    }

    fn report_unresolved(&mut self, range: TextRange, text: &str, sdk: Option<&SdkReference>) {
        let code = if sdk.is_some() {
            codes::UNRESOLVED_SDK
        } else {
            codes::UNRESOLVED_IMPORT
        };
        let already = self
            .diagnostics
            .diagnostics()
            .iter()
            .any(|d| d.code == code && d.range == range);
        if already {
            return;
        }
        match sdk {
            Some(sdk) => self.diagnostics.unresolved_sdk(range, &sdk.to_string()),
            None => self.diagnostics.unresolved_import(range, text),
        }
    }

    fn annotate_sdk(&mut self, node: XNodeId, reference: &SdkReference, imports_node: XNodeId) {
        if !self.is_toplevel() {
            return;
        }
        let path = self
            .document
            .annotations
            .imports(imports_node)
            .iter()
            .find(|import| import.is_resolved())
            .and_then(|import| import.filename().parent())
            .map(Path::to_path_buf);
        self.document.annotations.insert(
            node,
            Annotation::Sdk {
                reference: reference.clone(),
                path,
            },
        );
    }

    /// SDKs named by `Project/@Sdk` and by `<Sdk>` children, with the
    /// node each was written on.
    fn project_sdks(cx: &VisitContext<'_>, project: &ResolvedElement) -> Vec<(SdkReference, XNodeId, TextRange)> {
        let mut sdks = Vec::new();
        let element = cx.xml.element(project.id);
        if let Some(index) = element.attribute_index("Sdk") {
            let id = AttributeId {
                element: project.id,
                index: index as u32,
            };
            let attribute = cx.xml.attribute(id);
            for sdk in SdkReference::parse_list(&attribute.value) {
                sdks.push((sdk, XNodeId::Attribute(id), attribute.value_range));
            }
        }
        for &child in cx.xml.children(project.id) {
            let child_element = cx.xml.element(child);
            if !child_element.is_named("Sdk") {
                continue;
            }
            let Some(mut sdk) = child_element.attribute_value("Name").and_then(SdkReference::parse) else {
                continue;
            };
            if let Some(version) = child_element.attribute_value("Version") {
                sdk.version = Some(version.trim().into());
            }
            if let Some(minimum) = child_element.attribute_value("MinimumVersion") {
                sdk.minimum_version = Some(minimum.trim().into());
            }
            sdks.push((sdk, XNodeId::Element(child), child_element.name_range));
        }
        sdks
    }

    fn import_sdk_file(
        &mut self,
        cx: &VisitContext<'_>,
        sdk: &SdkReference,
        node: XNodeId,
        range: TextRange,
        file: &str,
    ) {
        let expression = parse(file, ExpressionOptions::empty(), TextSize::new(0));
        let imports = self.resolve(cx, file, &expression, Some(sdk));
        self.record_imports(node, range, file, imports, Some(sdk));
        self.annotate_sdk(node, sdk, node);
    }

    fn import_element(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let xml_element = cx.xml.element(element.id);
        let Some(index) = xml_element.attribute_index("Project") else {
            return;
        };
        let project_id = AttributeId {
            element: element.id,
            index: index as u32,
        };
        let Some(project) = crate::visitor::resolve_attribute_in(cx.xml, element, project_id) else {
            return;
        };
        let attribute = cx.xml.attribute(project_id);
        let expression = ValueSite::Attribute(project).parse(&attribute.value, attribute.value_range.start());

        let sdk_index = xml_element.attribute_index("Sdk");
        let sdk = sdk_index
            .and_then(|i| {
                let id = AttributeId {
                    element: element.id,
                    index: i as u32,
                };
                SdkReference::parse(&cx.xml.attribute(id).value)
            })
            .map(|mut sdk| {
                if let Some(version) = xml_element.attribute_value("Version") {
                    sdk.version = Some(version.trim().into());
                }
                if let Some(minimum) = xml_element.attribute_value("MinimumVersion") {
                    sdk.minimum_version = Some(minimum.trim().into());
                }
                sdk
            });

        let imports = self.resolve(cx, &attribute.value, &expression, sdk.as_ref());
        let node = XNodeId::Attribute(project_id);
        self.record_imports(node, attribute.value_range, &attribute.value, imports, sdk.as_ref());
        if let (Some(sdk), Some(i)) = (&sdk, sdk_index) {
            let sdk_node = XNodeId::Attribute(AttributeId {
                element: element.id,
                index: i as u32,
            });
            self.annotate_sdk(sdk_node, sdk, node);
        }
    }

    // ========================================================================
    // PROPERTY VALUES
    // ========================================================================

    fn collect_property(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        if element.in_target {
            return;
        }
        let name = cx.xml.element(element.id).name.clone();
        if !self.context.is_watched(&name) {
            return;
        }
        let Some(value) = &cx.xml.element(element.id).value else {
            return;
        };
        let tree = ValueSite::Element(*element).parse(&value.text, value.range.start());
        for learned in self.context.collect_property(cx.filename, &name, &tree) {
            self.document.record_value(&name, learned);
        }
    }

    // ========================================================================
    // USING TASK PARAMETERS
    // ========================================================================

    fn declare_parameter(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        // Parameter → ParameterGroup → UsingTask
        let Some(using_task) = element
            .parent
            .and_then(|group| cx.xml.element(group).parent)
        else {
            return;
        };
        let Some(task) = cx.xml.element(using_task).attribute_value("TaskName") else {
            return;
        };
        let task = task.trim();
        let xml_element = cx.xml.element(element.id);
        let name = xml_element.name.as_str();
        if task.is_empty() || self.document.contains(Symbol::TaskParameter { task, name }) {
            return;
        }
        let is_true = |attr: &str| {
            xml_element
                .attribute_value(attr)
                .is_some_and(|v| eq_ignore_case(v.trim(), "true"))
        };
        let required = is_true("Required");
        let output = is_true("Output");
        let parameter_type = xml_element.attribute_value("ParameterType").map(|t| SmolStr::from(t.trim()));
        let Some(info) = self.add_task_parameter(task, name) else {
            return;
        };
        info.required = required;
        info.output = output;
        info.parameter_type = parameter_type;
    }
}

impl DocumentVisitor for SchemaBuilder<'_> {
    fn visit_resolved_element(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let name = cx.xml.element(element.id).name.clone();
        match element.kind() {
            ElementKind::Project => {
                let sdks = Self::project_sdks(cx, element);
                for (sdk, node, range) in &sdks {
                    self.import_sdk_file(cx, sdk, *node, *range, "Sdk.props");
                }
                walk_resolved_element(self, cx, element);
                for (sdk, node, range) in &sdks {
                    self.import_sdk_file(cx, sdk, *node, *range, "Sdk.targets");
                }
                return;
            }
            ElementKind::Import => self.import_element(cx, element),
            ElementKind::Item | ElementKind::ItemDefinition => self.add_item(&name),
            ElementKind::Metadata => {
                if let Some(item) = Self::implicit_item(cx, element) {
                    self.add_metadata(&item, &name);
                }
            }
            ElementKind::Property => {
                self.add_property(&name);
                self.collect_property(cx, element);
            }
            ElementKind::Task => self.add_task(&name),
            ElementKind::Parameter => self.declare_parameter(cx, element),
            _ => {}
        }
        walk_resolved_element(self, cx, element);
    }

    fn visit_resolved_attribute(&mut self, cx: &VisitContext<'_>, attribute: &ResolvedAttribute) {
        let element_name = cx.xml.element(attribute.element.id).name.clone();
        let name = cx.xml.attribute(attribute.id).name.clone();
        match attribute.role() {
            AttributeRole::Metadata => self.add_metadata(&element_name, &name),
            AttributeRole::TaskParameter => {
                self.add_task_parameter(&element_name, &name);
            }
            AttributeRole::Declared => {}
        }
        walk_resolved_attribute(self, cx, attribute);
    }

    fn visit_value_expression(&mut self, cx: &VisitContext<'_>, site: &ValueSite, tree: &ExpressionTree) {
        let implicit_item = Self::implicit_item(cx, site.element());
        for id in tree.nodes() {
            match tree.kind(id) {
                ExprKind::PropertyName { name } => self.add_property(name),
                ExprKind::ItemName { name } => self.add_item(name),
                ExprKind::Metadata { item, name, .. } => {
                    let owner = item
                        .as_ref()
                        .filter(|item| !item.is_empty())
                        .map(|item| item.name.clone())
                        .or_else(|| tree.enclosing_item_name(id).cloned())
                        .or_else(|| implicit_item.clone());
                    if let Some(owner) = owner {
                        self.add_metadata(&owner, &name.name);
                    }
                }
                ExprKind::Text { value, .. } if tree.is_whole_value(id) => {
                    self.add_literal(cx, site, site.kind(), value);
                }
                _ => {}
            }
        }
    }

    fn visit_literal_value(&mut self, cx: &VisitContext<'_>, site: &ValueSite, value: &str, range: TextRange) {
        for (entry, _) in literal_entries(site, value, range) {
            self.add_literal(cx, site, site.kind(), entry);
        }
    }
}
