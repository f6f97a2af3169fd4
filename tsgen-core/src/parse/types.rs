use std::{fmt::Display, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::error::SerdeError;

/// An OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Option<Components>,
}

impl Document {
    /// Parse an OpenAPI document from a YAML or JSON string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SerdeError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml);
        let result = serde_path_to_error::deserialize(deserializer)?;
        Ok(result)
    }

    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SerdeError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let result = serde_path_to_error::deserialize(&mut deserializer)?;
        Ok(result)
    }

    /// Decodes an already-parsed, generic JSON tree.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SerdeError> {
        let result = serde_path_to_error::deserialize(value)?;
        Ok(result)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
}

/// Operation definitions for a single path.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Parameters shared by every operation on this path.
    #[serde(default)]
    pub parameters: Vec<RefOrParameter>,
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub head: Option<Operation>,
    #[serde(default)]
    pub options: Option<Operation>,
    #[serde(default)]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Returns an iterator over the operations for each HTTP method.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::Get, self.get.as_ref()),
            (Method::Post, self.post.as_ref()),
            (Method::Put, self.put.as_ref()),
            (Method::Delete, self.delete.as_ref()),
            (Method::Patch, self.patch.as_ref()),
            (Method::Head, self.head.as_ref()),
            (Method::Options, self.options.as_ref()),
            (Method::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|o| (method, o)))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl Method {
    /// Returns the lowercase verb, as it's spelled in a path item.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
            Self::Trace => "trace",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RefOrParameter>,
    #[serde(default)]
    pub request_body: Option<RefOrRequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOrResponse>,
}

/// A path, query, header, or cookie parameter.
#[derive(Clone, Debug, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<RefOrSchema>,
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// Request body definition.
#[derive(Clone, Debug, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Response definition.
#[derive(Clone, Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Clone, Debug, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<RefOrSchema>,
}

/// Components section containing reusable definitions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, RefOrSchema>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
}

/// Either a reference to a component or an inline component definition.
///
/// This generic type is used throughout the parse tree to represent
/// locations where a component can either be defined inline, or referenced
/// via `$ref`. The [`RefOr::Ref`] variant holds a reference to a definition
/// in the `#/components/*` section; the [`RefOr::Other`] variant holds an
/// inline definition.
///
/// A node that carries `$ref` is always a reference, even if it has other
/// keys, like `description`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A reference to a component definition via `$ref`.
    Ref(Ref),
    /// An inline component definition.
    Other(T),
}

/// Either a reference or a schema definition.
pub type RefOrSchema = RefOr<Box<Schema>>;

/// Either a reference or a parameter definition.
pub type RefOrParameter = RefOr<Parameter>;

/// Either a reference or a request body definition.
pub type RefOrRequestBody = RefOr<RequestBody>;

/// Either a reference or a response definition.
pub type RefOrResponse = RefOr<Response>;

/// A reference to another component.
#[derive(Debug, Clone, Deserialize)]
pub struct Ref {
    #[serde(rename = "$ref")]
    pub path: ComponentRef,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Ty {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    /// A type that isn't part of OpenAPI 3.0, like Swagger's `file`.
    #[serde(other)]
    Other,
}

/// An OpenAPI schema definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default)]
    pub ty: Option<Ty>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,

    // Object properties.
    #[serde(default)]
    pub properties: Option<IndexMap<String, RefOrSchema>>,
    #[serde(default)]
    pub required: Vec<String>,

    // Array items.
    #[serde(default)]
    pub items: Option<RefOrSchema>,

    // Enum variants.
    #[serde(rename = "enum", default)]
    pub variants: Option<Vec<serde_json::Value>>,

    // Composition.
    #[serde(default)]
    pub all_of: Option<Vec<RefOrSchema>>,
    #[serde(default)]
    pub one_of: Option<Vec<RefOrSchema>>,
}

/// A reference to a component in the current document.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ComponentRef {
    /// The JSON Pointer, without the `#` prefix.
    pointer: String,
}

impl ComponentRef {
    /// Returns the JSON Pointer, like `/components/schemas/Pet`.
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Extracts the component name (final segment, unescaped).
    pub fn name(&self) -> String {
        self.pointer
            .rsplit('/')
            .next()
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .unwrap_or_default()
    }
}

impl FromStr for ComponentRef {
    type Err = BadComponentRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(s) = s
            .trim_matches(|c| c <= ' ')
            .strip_prefix('#')
            .map(|rest| &rest[..rest.find(['\t', '\n', '\r']).unwrap_or(rest.len())])
        else {
            return Err(BadComponentRef::NotSameDocument);
        };
        if !s.is_empty() && !s.starts_with('/') {
            return Err(BadComponentRef::Syntax(s.to_owned()));
        }
        // `~` must begin an escape sequence, `~0` or `~1`.
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '~' && !matches!(chars.next(), Some('0' | '1')) {
                return Err(BadComponentRef::Syntax(s.to_owned()));
            }
        }
        Ok(Self {
            pointer: s.to_owned(),
        })
    }
}

impl<'de> Deserialize<'de> for ComponentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;
        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = ComponentRef;
            fn expecting(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str("a component reference")
            }
            fn visit_str<E: ::serde::de::Error>(self, s: &str) -> Result<Self::Value, E> {
                s.parse().map_err(E::custom)
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BadComponentRef {
    #[error("references must start with `#`; external references aren't supported")]
    NotSameDocument,
    #[error("invalid JSON Pointer syntax: `{0}`")]
    Syntax(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::assert_matches;

    #[test]
    fn parse_schema_ref() {
        let r: ComponentRef = "#/components/schemas/Pet".parse().unwrap();
        assert_eq!(r.name(), "Pet");
        assert_eq!(r.pointer(), "/components/schemas/Pet");
    }

    #[test]
    fn parse_parameter_ref() {
        let r: ComponentRef = "#/components/parameters/limit".parse().unwrap();
        assert_eq!(r.name(), "limit");
    }

    #[test]
    fn reject_external_ref() {
        let err = "other.yaml#/components/schemas/Pet".parse::<ComponentRef>();
        assert_matches!(err, Err(BadComponentRef::NotSameDocument));
    }

    #[test]
    fn reject_bad_escape() {
        let err = "#/components/schemas/Foo~2Bar".parse::<ComponentRef>();
        assert_matches!(err, Err(BadComponentRef::Syntax(_)));
    }

    #[test]
    fn handle_escaping() {
        let r: ComponentRef = "#/components/schemas/Foo~1Bar".parse().unwrap();
        assert_eq!(r.name(), "Foo/Bar");
    }

    #[test]
    fn ref_with_siblings_is_a_ref() {
        let schema: RefOrSchema = serde_json::from_value(serde_json::json!({
            "$ref": "#/components/schemas/Pet",
            "description": "The pet.",
        }))
        .unwrap();
        assert_matches!(schema, RefOr::Ref(r) if r.path.name() == "Pet");
    }

    #[test]
    fn unknown_type_parses_as_other() {
        let schema: Schema = serde_json::from_value(serde_json::json!({
            "type": "file",
        }))
        .unwrap();
        assert_eq!(schema.ty, Some(Ty::Other));
    }

    #[test]
    fn document_from_value() {
        let doc = Document::from_value(serde_json::json!({
            "openapi": "3.0.0",
            "info": { "title": "Test API", "version": "2.1.0" },
            "paths": {
                "/pets": {
                    "parameters": [],
                    "get": { "operationId": "listPets", "responses": {} },
                    "head": { "operationId": "headPets", "responses": {} },
                },
            },
        }))
        .unwrap();
        assert_eq!(doc.info.version, "2.1.0");
        let item = &doc.paths["/pets"];
        let methods: Vec<_> = item.operations().map(|(method, _)| method).collect();
        assert_eq!(methods, [Method::Get, Method::Head]);
    }

    #[test]
    fn document_from_json_reports_path() {
        let err = Document::from_json(r#"{"openapi": "3.0.0", "info": {"title": "T"}}"#)
            .unwrap_err();
        assert_matches!(err, SerdeError::JsonWithPath(_));
        assert!(err.to_string().contains("version"), "{err}");
    }
}
