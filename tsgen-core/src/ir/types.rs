//! Language-agnostic intermediate representation types.

use indexmap::IndexMap;

use crate::parse::{Method, path::PathSegment};

/// A resolved schema, ready for code generation.
#[derive(Clone, Debug, PartialEq)]
pub struct IrSchema {
    /// The declaration name. Top-level schemas and hoisted sub-schemas
    /// always have one; members of a composite share their parent's name.
    pub name: String,
    /// Whether this schema describes an array of its kind.
    pub repeated: bool,
    /// Whether this schema is required, when it's used as a property.
    pub required: bool,
    pub kind: IrSchemaKind,
}

impl IrSchema {
    pub fn new(name: impl Into<String>, kind: IrSchemaKind) -> Self {
        Self {
            name: name.into(),
            repeated: false,
            required: false,
            kind,
        }
    }

    /// Returns the inline sub-schemas that this schema hoisted out of its
    /// children, to be declared in a namespace scoped under its name.
    pub fn hoisted(&self) -> &[IrSchema] {
        match &self.kind {
            IrSchemaKind::Intersection(composite) | IrSchemaKind::Union(composite) => {
                &composite.schemas
            }
            IrSchemaKind::Object(object) => &object.schemas,
            _ => &[],
        }
    }

    /// Returns `true` if this schema needs its own declaration when it's
    /// used as a property, instead of being written inline.
    pub fn is_hoistable(&self) -> bool {
        match &self.kind {
            IrSchemaKind::Object(_) | IrSchemaKind::Enum(_) => true,
            IrSchemaKind::Intersection(composite) | IrSchemaKind::Union(composite) => {
                !composite.schemas.is_empty()
            }
            _ => false,
        }
    }

    /// Visits this schema and every schema nested inside it, depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a IrSchema)) {
        visit(self);
        match &self.kind {
            IrSchemaKind::Intersection(composite) | IrSchemaKind::Union(composite) => {
                for ty in &composite.types {
                    ty.walk(visit);
                }
                for schema in &composite.schemas {
                    schema.walk(visit);
                }
            }
            IrSchemaKind::Object(object) => {
                for property in object.properties.values() {
                    property.schema.walk(visit);
                }
                for schema in &object.schemas {
                    schema.walk(visit);
                }
            }
            IrSchemaKind::TypeReference(_)
            | IrSchemaKind::Enum(_)
            | IrSchemaKind::Numeric
            | IrSchemaKind::String
            | IrSchemaKind::Boolean => {}
        }
    }
}

/// The shape of an [`IrSchema`].
#[derive(Clone, Debug, PartialEq)]
pub enum IrSchemaKind {
    /// A link to a top-level schema, by name.
    TypeReference(String),
    /// An `allOf` composition.
    Intersection(IrComposite),
    /// A `oneOf` composition.
    Union(IrComposite),
    Enum(IrEnum),
    Object(IrObject),
    Numeric,
    String,
    Boolean,
}

impl IrSchemaKind {
    /// Returns the referenced schema name, if this is a reference.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::TypeReference(name) => Some(name),
            _ => None,
        }
    }
}

/// The members of an intersection or a union.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IrComposite {
    pub types: Vec<IrSchema>,
    /// Sub-schemas hoisted out of the members.
    pub schemas: Vec<IrSchema>,
}

/// An enumeration of literal values.
#[derive(Clone, Debug, PartialEq)]
pub struct IrEnum {
    pub enum_type: IrEnumType,
    /// The literals, verbatim and in declaration order. Duplicates
    /// are kept.
    pub items: Vec<serde_json::Value>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IrEnumType {
    String,
    Number,
}

/// An object with named properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IrObject {
    /// Properties in declaration order.
    pub properties: IndexMap<String, IrProperty>,
    /// Object and enum properties, hoisted to be declared
    /// under the object's namespace.
    pub schemas: Vec<IrSchema>,
}

/// A property of an [`IrObject`].
#[derive(Clone, Debug, PartialEq)]
pub struct IrProperty {
    pub schema: IrSchema,
    pub description: Option<String>,
    pub required: bool,
    pub repeated: bool,
    pub default: Option<serde_json::Value>,
}

/// A resolved operation.
#[derive(Clone, Debug, PartialEq)]
pub struct IrOperation {
    /// The path template, verbatim.
    pub path: String,
    pub segments: Vec<PathSegment<'static>>,
    /// The operation ID.
    pub name: String,
    pub summary: Option<String>,
    pub method: Method,
    /// The name of the synthesized request envelope schema.
    pub request: String,
    /// The response schema, or `None` if the operation has no content.
    pub response: Option<IrSchema>,
    pub path_params: Vec<String>,
    pub query_params: Vec<String>,
    pub has_body: bool,
}
