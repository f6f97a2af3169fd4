use heck::AsPascalCase;
use itertools::Itertools;
use serde_json::Value;

use crate::parse::{RefOrSchema, Schema, Ty};

use super::{
    error::IrError,
    types::{IrComposite, IrEnum, IrEnumType, IrObject, IrProperty, IrSchema, IrSchemaKind},
};

/// The prefix of every pointer that a schema `$ref` may target.
const SCHEMAS_POINTER: &str = "/components/schemas/";

/// Resolves a schema node into an [`IrSchema`] named `name`.
///
/// Resolution fails with [`IrError::RecursionLimit`] if the node
/// nests more than `limit` levels deep.
#[inline]
pub fn transform(name: &str, schema: &RefOrSchema, limit: usize) -> Result<IrSchema, IrError> {
    IrTransformer {
        name,
        depth: 0,
        limit,
    }
    .transform(schema)
}

#[derive(Clone, Copy, Debug)]
struct IrTransformer<'n> {
    name: &'n str,
    depth: usize,
    limit: usize,
}

impl<'n> IrTransformer<'n> {
    fn transform(self, schema: &RefOrSchema) -> Result<IrSchema, IrError> {
        if self.depth > self.limit {
            return Err(IrError::RecursionLimit {
                name: self.name.to_owned(),
                limit: self.limit,
            });
        }
        let schema = match schema {
            RefOrSchema::Ref(r) => {
                let pointer = r.path.pointer();
                if !pointer.starts_with(SCHEMAS_POINTER) {
                    return Err(IrError::UnresolvedReference {
                        referrer: self.name.to_owned(),
                        type_name: format!("#{pointer}"),
                    });
                }
                return Ok(IrSchema::new(
                    self.name,
                    IrSchemaKind::TypeReference(r.path.name()),
                ));
            }
            RefOrSchema::Other(schema) => schema,
        };
        tracing::trace!(name = self.name, depth = self.depth, "resolving schema");
        self.try_all_of(schema)
            .or_else(|| self.try_one_of(schema))
            .or_else(|| self.try_enum(schema))
            .or_else(|| self.try_array(schema))
            .or_else(|| self.try_object(schema))
            .or_else(|| self.try_primitive(schema))
            .unwrap_or_else(|| {
                Err(IrError::UnresolvableSchema {
                    name: self.name.to_owned(),
                })
            })
    }

    /// Returns a transformer for a child node, one level deeper.
    fn nested<'m>(self, name: &'m str) -> IrTransformer<'m> {
        IrTransformer {
            name,
            depth: self.depth + 1,
            limit: self.limit,
        }
    }

    fn try_all_of(self, schema: &Schema) -> Option<Result<IrSchema, IrError>> {
        let members = schema.all_of.as_ref()?;
        Some(
            self.composite(members)
                .map(|c| IrSchema::new(self.name, IrSchemaKind::Intersection(c))),
        )
    }

    fn try_one_of(self, schema: &Schema) -> Option<Result<IrSchema, IrError>> {
        let members = schema.one_of.as_ref()?;
        Some(
            self.composite(members)
                .map(|c| IrSchema::new(self.name, IrSchemaKind::Union(c))),
        )
    }

    /// Resolves every member of a composite under the composite's own name,
    /// and moves their hoisted sub-schemas up to the composite.
    fn composite(self, members: &[RefOrSchema]) -> Result<IrComposite, IrError> {
        let mut types = members
            .iter()
            .map(|member| self.nested(self.name).transform(member))
            .collect::<Result<Vec<_>, _>>()?;
        let schemas = types
            .iter_mut()
            .flat_map(|ty| match &mut ty.kind {
                IrSchemaKind::Intersection(composite) | IrSchemaKind::Union(composite) => {
                    std::mem::take(&mut composite.schemas)
                }
                IrSchemaKind::Object(object) => std::mem::take(&mut object.schemas),
                _ => vec![],
            })
            .collect_vec();
        warn_on_collisions(self.name, &schemas);
        Ok(IrComposite { types, schemas })
    }

    fn try_enum(self, schema: &Schema) -> Option<Result<IrSchema, IrError>> {
        let items = schema.variants.as_ref()?;
        let enum_type = match schema.ty {
            Some(Ty::String) => IrEnumType::String,
            Some(Ty::Integer | Ty::Number) => IrEnumType::Number,
            None if items.iter().all(Value::is_string) => IrEnumType::String,
            None if items.iter().all(Value::is_number) => IrEnumType::Number,
            _ => {
                return Some(Err(IrError::UnresolvableSchema {
                    name: self.name.to_owned(),
                }));
            }
        };
        Some(Ok(IrSchema::new(
            self.name,
            IrSchemaKind::Enum(IrEnum {
                enum_type,
                items: items.clone(),
            }),
        )))
    }

    fn try_array(self, schema: &Schema) -> Option<Result<IrSchema, IrError>> {
        if schema.ty != Some(Ty::Array) {
            return None;
        }
        let Some(items) = &schema.items else {
            return Some(Err(IrError::UnresolvableSchema {
                name: self.name.to_owned(),
            }));
        };
        Some(
            self.nested(self.name)
                .transform(items)
                .and_then(|mut item| {
                    if item.repeated {
                        return Err(IrError::NestedArray {
                            name: self.name.to_owned(),
                        });
                    }
                    item.name = self.name.to_owned();
                    item.repeated = true;
                    Ok(item)
                }),
        )
    }

    fn try_object(self, schema: &Schema) -> Option<Result<IrSchema, IrError>> {
        match (schema.ty, &schema.properties) {
            (Some(Ty::Object), _) | (None, Some(_)) => Some(self.object(schema)),
            _ => None,
        }
    }

    fn object(self, schema: &Schema) -> Result<IrSchema, IrError> {
        let mut object = IrObject::default();
        for (name, child) in schema.properties.iter().flatten() {
            let type_name = AsPascalCase(name).to_string();
            let mut resolved = self.nested(&type_name).transform(child)?;
            let required = schema.required.iter().any(|r| r == name);
            resolved.required = required;
            let (description, default) = match child {
                RefOrSchema::Other(child) => (child.description.clone(), child.default.clone()),
                RefOrSchema::Ref(_) => (None, None),
            };
            if resolved.is_hoistable() {
                object.schemas.push(resolved.clone().into_declaration());
            }
            object.properties.insert(
                name.clone(),
                IrProperty {
                    repeated: resolved.repeated,
                    schema: resolved,
                    description,
                    required,
                    default,
                },
            );
        }
        warn_on_collisions(self.name, &object.schemas);
        Ok(IrSchema::new(self.name, IrSchemaKind::Object(object)))
    }

    fn try_primitive(self, schema: &Schema) -> Option<Result<IrSchema, IrError>> {
        let kind = match schema.ty? {
            Ty::Integer | Ty::Number => IrSchemaKind::Numeric,
            Ty::String => IrSchemaKind::String,
            Ty::Boolean => IrSchemaKind::Boolean,
            Ty::Array | Ty::Object | Ty::Null | Ty::Other => return None,
        };
        Some(Ok(IrSchema::new(self.name, kind)))
    }
}

/// Logs sibling sub-schemas that would be declared with the same name.
/// Both are kept; the emitted namespace will declare the name twice.
fn warn_on_collisions(parent: &str, schemas: &[IrSchema]) {
    for name in schemas.iter().map(|s| s.name.as_str()).duplicates() {
        tracing::warn!(
            schema = parent,
            sub_schema = name,
            "multiple sub-schemas hoist to the same name"
        );
    }
}

impl IrSchema {
    /// Strips the use-site flags from a schema that's about to be declared
    /// on its own. Whether a property is an array or required belongs
    /// to the property, not to the declared type.
    pub(super) fn into_declaration(self) -> Self {
        Self {
            repeated: false,
            required: false,
            ..self
        }
    }
}
