use heck::AsPascalCase;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::parse::{
    self, Components, Document, Method, Operation, Parameter, ParameterLocation, PathItem,
    RefOrParameter, RefOrRequestBody, RefOrResponse, RefOrSchema, path::PathSegment,
};

use super::{
    error::IrError,
    transform::transform,
    types::{IrObject, IrOperation, IrProperty, IrSchema, IrSchemaKind},
};

const MIME_JSON: &str = "application/json";

/// The name of the request envelope property that holds the body.
const BODY_PROPERTY: &str = "body";

const PARAMETERS_POINTER: &str = "/components/parameters/";
const REQUEST_BODIES_POINTER: &str = "/components/requestBodies/";
const RESPONSES_POINTER: &str = "/components/responses/";

/// Options that control schema resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolverOptions {
    /// How deeply schema nodes may nest before resolution gives up.
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// The resolved form of a whole document.
#[derive(Clone, Debug, PartialEq)]
pub struct IrSpec {
    pub title: String,
    pub version: String,
    /// Top-level declarations: component schemas first, then the
    /// response and request envelope schemas of each operation.
    pub schemas: Vec<IrSchema>,
    pub operations: Vec<IrOperation>,
}

impl IrSpec {
    pub fn from_doc(doc: &Document) -> Result<Self, IrError> {
        Self::from_doc_with_options(doc, ResolverOptions::default())
    }

    pub fn from_doc_with_options(
        doc: &Document,
        options: ResolverOptions,
    ) -> Result<Self, IrError> {
        Resolver::new(doc, options).resolve()
    }
}

/// Per-run resolution state. Each run builds its own parameter table,
/// so resolving the same document twice gives equal results.
struct Resolver<'a> {
    doc: &'a Document,
    components: Option<&'a Components>,
    options: ResolverOptions,
    schemas: Vec<IrSchema>,
    operations: Vec<IrOperation>,
}

impl<'a> Resolver<'a> {
    fn new(doc: &'a Document, options: ResolverOptions) -> Self {
        Self {
            doc,
            components: doc.components.as_ref(),
            options,
            schemas: vec![],
            operations: vec![],
        }
    }

    fn resolve(mut self) -> Result<IrSpec, IrError> {
        let doc = self.doc;
        for (name, schema) in self.components.into_iter().flat_map(|c| &c.schemas) {
            let resolved = transform(name, schema, self.options.max_depth)?;
            tracing::debug!(name = %name, kind = kind_name(&resolved.kind), "resolved schema");
            self.push_component(resolved);
        }
        let declared = self.schemas.len();

        for (path, item) in &doc.paths {
            for (method, op) in item.operations() {
                let operation = self.operation(path, item, method, op)?;
                tracing::debug!(
                    operation = %operation.name,
                    %method,
                    path = %path,
                    "resolved operation"
                );
                self.operations.push(operation);
            }
        }

        self.check_references(declared)?;

        Ok(IrSpec {
            title: doc.info.title.clone(),
            version: doc.info.version.clone(),
            schemas: self.schemas,
            operations: self.operations,
        })
    }

    /// Adds a component schema. A top-level array of objects or enums is
    /// split into an element declaration named `<Name>Item`, and an array
    /// alias that keeps the component's name.
    fn push_component(&mut self, schema: IrSchema) {
        match schema.kind {
            IrSchemaKind::Object(_) | IrSchemaKind::Enum(_) if schema.repeated => {
                let item = format!("{}Item", schema.name);
                let alias = IrSchema {
                    repeated: true,
                    ..IrSchema::new(&schema.name, IrSchemaKind::TypeReference(item.clone()))
                };
                self.schemas.push(IrSchema {
                    name: item,
                    ..schema.into_declaration()
                });
                self.schemas.push(alias);
            }
            _ => self.schemas.push(schema),
        }
    }

    fn operation(
        &mut self,
        path: &str,
        item: &'a PathItem,
        method: Method,
        op: &'a Operation,
    ) -> Result<IrOperation, IrError> {
        let id = op
            .operation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| IrError::MissingOperationId {
                method,
                path: path.to_owned(),
            })?;

        let response = self.response(id, method, op)?;
        if let Some(response) = &response
            && response.is_hoistable()
        {
            self.schemas.push(response.clone().into_declaration());
        }

        let segments = parse::path::parse(path)
            .map_err(|source| IrError::BadOperationPath {
                operation: id.to_owned(),
                source,
            })?
            .into_iter()
            .map(PathSegment::into_owned)
            .collect();

        let request = AsPascalCase(format!("{id}_request")).to_string();
        let mut envelope = IrObject::default();
        let mut path_params = vec![];
        let mut query_params = vec![];

        for param in self.parameters(item, op)? {
            let required = match param.location {
                ParameterLocation::Path => {
                    path_params.push(param.name.clone());
                    // Path parameters are always present in the URL.
                    true
                }
                ParameterLocation::Query => {
                    query_params.push(param.name.clone());
                    param.required
                }
                ParameterLocation::Header | ParameterLocation::Cookie => {
                    tracing::debug!(
                        operation = id,
                        parameter = %param.name,
                        "skipping header or cookie parameter"
                    );
                    continue;
                }
            };
            let schema = param
                .schema
                .as_ref()
                .ok_or_else(|| IrError::UnresolvableSchema {
                    name: format!("{request}.{}", param.name),
                })?;
            let type_name = AsPascalCase(&param.name).to_string();
            let resolved = transform(&type_name, schema, self.options.max_depth)?;
            insert_property(
                id,
                &mut envelope,
                &param.name,
                resolved,
                required,
                param.description.clone(),
                default_of(schema),
            )?;
        }

        let has_body = match &op.request_body {
            Some(body) => {
                let body = match body {
                    RefOrRequestBody::Other(body) => body,
                    RefOrRequestBody::Ref(r) => {
                        let name = r.path.name();
                        self.components
                            .filter(|_| r.path.pointer().starts_with(REQUEST_BODIES_POINTER))
                            .and_then(|c| c.request_bodies.get(&name))
                            .ok_or_else(|| IrError::UnresolvedRequestBody {
                                reference: format!("#{}", r.path.pointer()),
                            })?
                    }
                };
                let schema = body
                    .content
                    .get(MIME_JSON)
                    .and_then(|media| media.schema.as_ref())
                    .ok_or_else(|| IrError::NoJsonContent {
                        operation: id.to_owned(),
                        location: "request body",
                    })?;
                let resolved = transform("Body", schema, self.options.max_depth)?;
                insert_property(
                    id,
                    &mut envelope,
                    BODY_PROPERTY,
                    resolved,
                    body.required,
                    body.description.clone(),
                    None,
                )?;
                true
            }
            None => false,
        };

        self.schemas
            .push(IrSchema::new(&request, IrSchemaKind::Object(envelope)));

        Ok(IrOperation {
            path: path.to_owned(),
            segments,
            name: id.to_owned(),
            summary: op.summary.clone(),
            method,
            request,
            response,
            path_params,
            query_params,
            has_body,
        })
    }

    /// Returns the parameters of an operation, with path-level parameters
    /// first. An operation-level parameter replaces a path-level one with
    /// the same name and location.
    fn parameters(
        &self,
        item: &'a PathItem,
        op: &'a Operation,
    ) -> Result<Vec<&'a Parameter>, IrError> {
        let mut merged = IndexMap::new();
        for param in item.parameters.iter().chain(&op.parameters) {
            let param = self.parameter(param)?;
            merged.insert((param.name.as_str(), param.location), param);
        }
        Ok(merged.into_values().collect())
    }

    fn parameter(&self, param: &'a RefOrParameter) -> Result<&'a Parameter, IrError> {
        match param {
            RefOrParameter::Other(param) => Ok(param),
            RefOrParameter::Ref(r) => {
                let name = r.path.name();
                self.components
                    .filter(|_| r.path.pointer().starts_with(PARAMETERS_POINTER))
                    .and_then(|c| c.parameters.get(&name))
                    .ok_or_else(|| IrError::UnresolvedGlobalParameter {
                        reference: format!("#{}", r.path.pointer()),
                    })
            }
        }
    }

    /// Picks the response for an operation by its method's
    /// conventional status codes.
    fn response(
        &self,
        id: &str,
        method: Method,
        op: &'a Operation,
    ) -> Result<Option<IrSchema>, IrError> {
        let codes = conventional_statuses(method).ok_or_else(|| IrError::UnsupportedVerb {
            operation: id.to_owned(),
            method,
        })?;
        let (code, response) = op
            .responses
            .iter()
            .find(|(code, _)| codes.contains(&code.as_str()))
            .ok_or_else(|| IrError::NoConventionalResponse {
                operation: id.to_owned(),
                codes: codes.join(", "),
            })?;
        if code == "204" {
            return Ok(None);
        }
        let response = match response {
            RefOrResponse::Other(response) => response,
            RefOrResponse::Ref(r) => {
                let name = r.path.name();
                self.components
                    .filter(|_| r.path.pointer().starts_with(RESPONSES_POINTER))
                    .and_then(|c| c.responses.get(&name))
                    .ok_or_else(|| IrError::UnresolvedResponse {
                        reference: format!("#{}", r.path.pointer()),
                    })?
            }
        };
        let schema = response
            .content
            .get(MIME_JSON)
            .and_then(|media| media.schema.as_ref())
            .ok_or_else(|| IrError::NoJsonContent {
                operation: id.to_owned(),
                location: "response",
            })?;
        let name = AsPascalCase(format!("{id}_response")).to_string();
        transform(&name, schema, self.options.max_depth).map(Some)
    }

    /// Checks that every reference points to one of the first `declared`
    /// schemas, which came from the document's components.
    fn check_references(&self, declared: usize) -> Result<(), IrError> {
        let names: FxHashSet<_> = self.schemas[..declared]
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        let roots = self
            .schemas
            .iter()
            .chain(self.operations.iter().filter_map(|op| op.response.as_ref()));
        for root in roots {
            let mut missing = None;
            root.walk(&mut |schema| {
                if let Some(name) = schema.kind.type_name()
                    && missing.is_none()
                    && !names.contains(name)
                {
                    missing = Some(name);
                }
            });
            if let Some(name) = missing {
                return Err(IrError::UnresolvedReference {
                    referrer: root.name.clone(),
                    type_name: name.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Returns the response status codes that an operation with this
/// method may succeed with, or `None` if the method isn't supported.
fn conventional_statuses(method: Method) -> Option<&'static [&'static str]> {
    Some(match method {
        Method::Get => &["200"],
        Method::Post => &["200", "201", "204"],
        Method::Put | Method::Patch => &["200", "204"],
        Method::Delete => &["200", "202", "204"],
        Method::Head | Method::Options | Method::Trace => return None,
    })
}

/// Adds a property to a request envelope, hoisting its schema
/// if it needs its own declaration. Path parameters, query parameters,
/// and the body share the envelope, so their names must be distinct.
fn insert_property(
    operation: &str,
    envelope: &mut IrObject,
    name: &str,
    mut schema: IrSchema,
    required: bool,
    description: Option<String>,
    default: Option<serde_json::Value>,
) -> Result<(), IrError> {
    if envelope.properties.contains_key(name) {
        return Err(IrError::ConflictingInput {
            operation: operation.to_owned(),
            name: name.to_owned(),
        });
    }
    schema.required = required;
    if schema.is_hoistable() {
        envelope.schemas.push(schema.clone().into_declaration());
    }
    envelope.properties.insert(
        name.to_owned(),
        IrProperty {
            repeated: schema.repeated,
            schema,
            description,
            required,
            default,
        },
    );
    Ok(())
}

fn default_of(schema: &RefOrSchema) -> Option<serde_json::Value> {
    match schema {
        RefOrSchema::Other(schema) => schema.default.clone(),
        RefOrSchema::Ref(_) => None,
    }
}

fn kind_name(kind: &IrSchemaKind) -> &'static str {
    match kind {
        IrSchemaKind::TypeReference(_) => "reference",
        IrSchemaKind::Intersection(_) => "intersection",
        IrSchemaKind::Union(_) => "union",
        IrSchemaKind::Enum(_) => "enum",
        IrSchemaKind::Object(_) => "object",
        IrSchemaKind::Numeric => "numeric",
        IrSchemaKind::String => "string",
        IrSchemaKind::Boolean => "boolean",
    }
}
