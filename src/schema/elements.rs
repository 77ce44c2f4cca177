//! The static element/attribute table.

use crate::base::eq_ignore_case;
use crate::parser::ExpressionOptions;

use super::value::{ValueFlags, ValueKind};

/// Classification of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Project,
    Choose,
    When,
    Otherwise,
    Import,
    ImportGroup,
    ItemDefinitionGroup,
    ItemDefinition,
    ItemGroup,
    Item,
    Metadata,
    ProjectExtensions,
    PropertyGroup,
    Property,
    Sdk,
    Target,
    Task,
    Output,
    OnError,
    UsingTask,
    ParameterGroup,
    Parameter,
    /// The inline `Task` body under `UsingTask`.
    TaskBody,
}

/// How an attribute is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeRole {
    /// A fixed attribute of the element.
    Declared,
    /// Metadata written as an attribute of an item.
    Metadata,
    /// A parameter of a task invocation.
    TaskParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaAttribute {
    /// Empty for the templates used by [`SchemaElement::attribute_type`].
    pub name: &'static str,
    pub kind: ValueKind,
    pub flags: ValueFlags,
    /// Reference forms allowed besides properties.
    pub allow: ExpressionOptions,
    pub required: bool,
    pub role: AttributeRole,
    pub description: &'static str,
}

impl SchemaAttribute {
    const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            flags: ValueFlags::empty(),
            allow: ExpressionOptions::empty(),
            required: false,
            role: AttributeRole::Declared,
            description: "",
        }
    }

    const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    const fn list(self) -> Self {
        Self {
            flags: self.flags.union(ValueFlags::LIST),
            ..self
        }
    }

    const fn literal(self) -> Self {
        Self {
            flags: self.flags.union(ValueFlags::LITERAL),
            ..self
        }
    }

    const fn items(self) -> Self {
        Self {
            allow: self.allow.union(ExpressionOptions::ITEMS_AND_METADATA),
            ..self
        }
    }

    const fn role(self, role: AttributeRole) -> Self {
        Self { role, ..self }
    }

    const fn doc(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Whether the value is parsed as an expression.
    pub fn allows_expressions(&self) -> bool {
        !self.flags.contains(ValueFlags::LITERAL)
            && !matches!(self.kind, ValueKind::Data | ValueKind::Nothing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaElement {
    pub kind: ElementKind,
    /// Empty for abstract kinds whose tag name is user-chosen
    /// (items, properties, metadata, tasks, parameters).
    pub name: &'static str,
    pub children: &'static [ElementKind],
    /// Kind given to any child not listed in `children`.
    pub child_type: Option<ElementKind>,
    pub attributes: &'static [SchemaAttribute],
    /// Template for attributes not listed in `attributes`.
    pub attribute_type: Option<SchemaAttribute>,
    /// Kind of the element's text content, if it may have any.
    pub value: Option<(ValueKind, ValueFlags)>,
    /// Content is opaque data; the walker does not descend.
    pub opaque: bool,
    pub description: &'static str,
}

impl SchemaElement {
    const fn new(kind: ElementKind, name: &'static str) -> Self {
        Self {
            kind,
            name,
            children: &[],
            child_type: None,
            attributes: &[],
            attribute_type: None,
            value: None,
            opaque: false,
            description: "",
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.name.is_empty()
    }

    /// Resolve a declared attribute by name, falling back to
    /// [`attribute_type`](Self::attribute_type).
    pub fn attribute(&self, name: &str) -> Option<&SchemaAttribute> {
        self.attributes
            .iter()
            .find(|a| eq_ignore_case(a.name, name))
            .or(self.attribute_type.as_ref())
    }

    pub fn declared_attribute(&self, name: &str) -> Option<&'static SchemaAttribute> {
        self.attributes.iter().find(|a| eq_ignore_case(a.name, name))
    }

    /// Kind of a child element named `name`.
    pub fn child(&self, name: &str) -> Option<ElementKind> {
        self.children
            .iter()
            .copied()
            .find(|&kind| eq_ignore_case(element(kind).name, name))
            .or(self.child_type)
    }
}

const CONDITION: SchemaAttribute = SchemaAttribute::new("Condition", ValueKind::Condition)
    .items()
    .doc("Optional condition; the element is ignored when it evaluates to false.");
const LABEL: SchemaAttribute = SchemaAttribute::new("Label", ValueKind::Label).literal();

const PROJECT: SchemaElement = SchemaElement {
    children: &[
        ElementKind::Choose,
        ElementKind::Import,
        ElementKind::ImportGroup,
        ElementKind::ItemDefinitionGroup,
        ElementKind::ItemGroup,
        ElementKind::ProjectExtensions,
        ElementKind::PropertyGroup,
        ElementKind::Sdk,
        ElementKind::Target,
        ElementKind::UsingTask,
    ],
    attributes: &[
        SchemaAttribute::new("DefaultTargets", ValueKind::TargetName).list(),
        SchemaAttribute::new("InitialTargets", ValueKind::TargetName).list(),
        SchemaAttribute::new("ToolsVersion", ValueKind::ToolsVersion).literal(),
        SchemaAttribute::new("TreatAsLocalProperty", ValueKind::PropertyName).list(),
        SchemaAttribute::new("xmlns", ValueKind::Xmlns).literal(),
        SchemaAttribute::new("Sdk", ValueKind::SdkWithVersion).list().literal(),
    ],
    description: "Root element of a build script.",
    ..SchemaElement::new(ElementKind::Project, "Project")
};

const CHOOSE: SchemaElement = SchemaElement {
    children: &[ElementKind::When, ElementKind::Otherwise],
    ..SchemaElement::new(ElementKind::Choose, "Choose")
};

const WHEN: SchemaElement = SchemaElement {
    children: &[ElementKind::Choose, ElementKind::ItemGroup, ElementKind::PropertyGroup],
    attributes: &[CONDITION.required()],
    ..SchemaElement::new(ElementKind::When, "When")
};

const OTHERWISE: SchemaElement = SchemaElement {
    children: &[ElementKind::Choose, ElementKind::ItemGroup, ElementKind::PropertyGroup],
    ..SchemaElement::new(ElementKind::Otherwise, "Otherwise")
};

const IMPORT: SchemaElement = SchemaElement {
    attributes: &[
        SchemaAttribute::new("Project", ValueKind::ProjectFile)
            .required()
            .doc("Path of the imported project. May contain wildcards."),
        CONDITION,
        LABEL,
        SchemaAttribute::new("Sdk", ValueKind::SdkWithVersion).literal(),
        SchemaAttribute::new("Version", ValueKind::SdkVersion).literal(),
        SchemaAttribute::new("MinimumVersion", ValueKind::SdkVersion).literal(),
    ],
    value: Some((ValueKind::Nothing, ValueFlags::empty())),
    description: "Imports the contents of another build script.",
    ..SchemaElement::new(ElementKind::Import, "Import")
};

const IMPORT_GROUP: SchemaElement = SchemaElement {
    children: &[ElementKind::Import],
    attributes: &[CONDITION, LABEL],
    ..SchemaElement::new(ElementKind::ImportGroup, "ImportGroup")
};

const ITEM_DEFINITION_GROUP: SchemaElement = SchemaElement {
    child_type: Some(ElementKind::ItemDefinition),
    attributes: &[CONDITION, LABEL],
    ..SchemaElement::new(ElementKind::ItemDefinitionGroup, "ItemDefinitionGroup")
};

const ITEM_DEFINITION: SchemaElement = SchemaElement {
    child_type: Some(ElementKind::Metadata),
    attributes: &[CONDITION, LABEL],
    attribute_type: Some(SchemaAttribute::new("", ValueKind::String).role(AttributeRole::Metadata)),
    ..SchemaElement::new(ElementKind::ItemDefinition, "")
};

const ITEM_GROUP: SchemaElement = SchemaElement {
    child_type: Some(ElementKind::Item),
    attributes: &[CONDITION, LABEL],
    ..SchemaElement::new(ElementKind::ItemGroup, "ItemGroup")
};

const ITEM: SchemaElement = SchemaElement {
    child_type: Some(ElementKind::Metadata),
    attributes: &[
        SchemaAttribute::new("Include", ValueKind::FileOrFolder).list().items(),
        SchemaAttribute::new("Exclude", ValueKind::FileOrFolder).list().items(),
        SchemaAttribute::new("Remove", ValueKind::FileOrFolder).list().items(),
        SchemaAttribute::new("Update", ValueKind::FileOrFolder).list().items(),
        CONDITION,
        LABEL,
        SchemaAttribute::new("KeepMetadata", ValueKind::MetadataName).list(),
        SchemaAttribute::new("RemoveMetadata", ValueKind::MetadataName).list(),
        SchemaAttribute::new("KeepDuplicates", ValueKind::Bool),
        SchemaAttribute::new("MatchOnMetadata", ValueKind::MetadataName).list(),
        SchemaAttribute::new("MatchOnMetadataOptions", ValueKind::String),
    ],
    attribute_type: Some(
        SchemaAttribute::new("", ValueKind::String)
            .items()
            .role(AttributeRole::Metadata),
    ),
    ..SchemaElement::new(ElementKind::Item, "")
};

const METADATA: SchemaElement = SchemaElement {
    attributes: &[CONDITION],
    value: Some((ValueKind::String, ValueFlags::empty())),
    ..SchemaElement::new(ElementKind::Metadata, "")
};

const PROJECT_EXTENSIONS: SchemaElement = SchemaElement {
    value: Some((ValueKind::Data, ValueFlags::empty())),
    opaque: true,
    ..SchemaElement::new(ElementKind::ProjectExtensions, "ProjectExtensions")
};

const PROPERTY_GROUP: SchemaElement = SchemaElement {
    child_type: Some(ElementKind::Property),
    attributes: &[CONDITION, LABEL],
    ..SchemaElement::new(ElementKind::PropertyGroup, "PropertyGroup")
};

const PROPERTY: SchemaElement = SchemaElement {
    attributes: &[CONDITION],
    value: Some((ValueKind::String, ValueFlags::empty())),
    ..SchemaElement::new(ElementKind::Property, "")
};

const SDK: SchemaElement = SchemaElement {
    attributes: &[
        SchemaAttribute::new("Name", ValueKind::Sdk).required().literal(),
        SchemaAttribute::new("Version", ValueKind::SdkVersion).literal(),
        SchemaAttribute::new("MinimumVersion", ValueKind::SdkVersion).literal(),
    ],
    value: Some((ValueKind::Nothing, ValueFlags::empty())),
    description: "References an SDK whose props and targets are imported implicitly.",
    ..SchemaElement::new(ElementKind::Sdk, "Sdk")
};

const TARGET: SchemaElement = SchemaElement {
    children: &[ElementKind::PropertyGroup, ElementKind::ItemGroup, ElementKind::OnError],
    child_type: Some(ElementKind::Task),
    attributes: &[
        SchemaAttribute::new("Name", ValueKind::TargetName).required().literal(),
        SchemaAttribute::new("DependsOnTargets", ValueKind::TargetName).list(),
        SchemaAttribute::new("Inputs", ValueKind::FileOrFolder).list().items(),
        SchemaAttribute::new("Outputs", ValueKind::FileOrFolder).list().items(),
        CONDITION,
        LABEL,
        SchemaAttribute::new("KeepDuplicateOutputs", ValueKind::Bool),
        SchemaAttribute::new("Returns", ValueKind::String).list().items(),
        SchemaAttribute::new("BeforeTargets", ValueKind::TargetName).list(),
        SchemaAttribute::new("AfterTargets", ValueKind::TargetName).list(),
    ],
    description: "A named sequence of tasks.",
    ..SchemaElement::new(ElementKind::Target, "Target")
};

const TASK: SchemaElement = SchemaElement {
    children: &[ElementKind::Output],
    attributes: &[
        CONDITION,
        SchemaAttribute::new("ContinueOnError", ValueKind::ContinueOnError),
        SchemaAttribute::new("MSBuildArchitecture", ValueKind::String).literal(),
        SchemaAttribute::new("MSBuildRuntime", ValueKind::String).literal(),
    ],
    attribute_type: Some(
        SchemaAttribute::new("", ValueKind::String)
            .items()
            .role(AttributeRole::TaskParameter),
    ),
    ..SchemaElement::new(ElementKind::Task, "")
};

const OUTPUT: SchemaElement = SchemaElement {
    attributes: &[
        SchemaAttribute::new("TaskParameter", ValueKind::TaskOutputParameterName)
            .required()
            .literal(),
        SchemaAttribute::new("PropertyName", ValueKind::PropertyName).literal(),
        SchemaAttribute::new("ItemName", ValueKind::ItemName).literal(),
        CONDITION,
    ],
    value: Some((ValueKind::Nothing, ValueFlags::empty())),
    ..SchemaElement::new(ElementKind::Output, "Output")
};

const ON_ERROR: SchemaElement = SchemaElement {
    attributes: &[
        SchemaAttribute::new("ExecuteTargets", ValueKind::TargetName)
            .list()
            .required(),
        CONDITION,
    ],
    value: Some((ValueKind::Nothing, ValueFlags::empty())),
    ..SchemaElement::new(ElementKind::OnError, "OnError")
};

const USING_TASK: SchemaElement = SchemaElement {
    children: &[ElementKind::ParameterGroup, ElementKind::TaskBody],
    attributes: &[
        SchemaAttribute::new("TaskName", ValueKind::TaskName).required().literal(),
        SchemaAttribute::new("AssemblyName", ValueKind::String),
        SchemaAttribute::new("AssemblyFile", ValueKind::File),
        SchemaAttribute::new("TaskFactory", ValueKind::String),
        CONDITION,
        SchemaAttribute::new("Architecture", ValueKind::String),
        SchemaAttribute::new("Runtime", ValueKind::String),
        SchemaAttribute::new("Override", ValueKind::Bool),
    ],
    description: "Registers a task implementation.",
    ..SchemaElement::new(ElementKind::UsingTask, "UsingTask")
};

const PARAMETER_GROUP: SchemaElement = SchemaElement {
    child_type: Some(ElementKind::Parameter),
    ..SchemaElement::new(ElementKind::ParameterGroup, "ParameterGroup")
};

const PARAMETER: SchemaElement = SchemaElement {
    attributes: &[
        SchemaAttribute::new("ParameterType", ValueKind::TaskParameterType).literal(),
        SchemaAttribute::new("Required", ValueKind::Bool).literal(),
        SchemaAttribute::new("Output", ValueKind::Bool).literal(),
    ],
    value: Some((ValueKind::Nothing, ValueFlags::empty())),
    ..SchemaElement::new(ElementKind::Parameter, "")
};

const TASK_BODY: SchemaElement = SchemaElement {
    attributes: &[SchemaAttribute::new("Evaluate", ValueKind::Bool).literal()],
    value: Some((ValueKind::Data, ValueFlags::empty())),
    opaque: true,
    ..SchemaElement::new(ElementKind::TaskBody, "Task")
};

/// The descriptor for `kind`.
pub fn element(kind: ElementKind) -> &'static SchemaElement {
    match kind {
        ElementKind::Project => &PROJECT,
        ElementKind::Choose => &CHOOSE,
        ElementKind::When => &WHEN,
        ElementKind::Otherwise => &OTHERWISE,
        ElementKind::Import => &IMPORT,
        ElementKind::ImportGroup => &IMPORT_GROUP,
        ElementKind::ItemDefinitionGroup => &ITEM_DEFINITION_GROUP,
        ElementKind::ItemDefinition => &ITEM_DEFINITION,
        ElementKind::ItemGroup => &ITEM_GROUP,
        ElementKind::Item => &ITEM,
        ElementKind::Metadata => &METADATA,
        ElementKind::ProjectExtensions => &PROJECT_EXTENSIONS,
        ElementKind::PropertyGroup => &PROPERTY_GROUP,
        ElementKind::Property => &PROPERTY,
        ElementKind::Sdk => &SDK,
        ElementKind::Target => &TARGET,
        ElementKind::Task => &TASK,
        ElementKind::Output => &OUTPUT,
        ElementKind::OnError => &ON_ERROR,
        ElementKind::UsingTask => &USING_TASK,
        ElementKind::ParameterGroup => &PARAMETER_GROUP,
        ElementKind::Parameter => &PARAMETER,
        ElementKind::TaskBody => &TASK_BODY,
    }
}

/// Resolve an element from its name and its parent's resolved kind.
/// A parentless element must be `Project`.
pub fn resolve_element(name: &str, parent: Option<ElementKind>) -> Option<&'static SchemaElement> {
    match parent {
        None => eq_ignore_case(PROJECT.name, name).then_some(&PROJECT),
        Some(parent) => element(parent).child(name).map(element),
    }
}
