use swc_ecma_ast::{Decl, TsType, TsTypeElement};
use tsgen_core::ir::{IrObject, IrProperty, IrSchema};

use super::{
    emit::{TsComments, array, interface_decl, property_sig, type_ref},
    schema::ts_inline,
};

/// Generates an `interface` declaration for an object.
pub fn ts_object(name: &str, object: &IrObject, comments: &TsComments) -> Decl {
    interface_decl(name, ts_members(name, object, comments))
}

/// Generates the property signatures of an object. Hoisted property
/// types are qualified by `parent`, the namespace they're declared in.
pub fn ts_members(parent: &str, object: &IrObject, comments: &TsComments) -> Vec<TsTypeElement> {
    object
        .properties
        .iter()
        .map(|(name, property)| {
            let span = comments.span_with_jsdoc(jsdoc(property).as_deref());
            property_sig(
                name,
                !property.required,
                ts_property_type(parent, &property.schema, comments),
                span,
            )
        })
        .collect()
}

fn ts_property_type(parent: &str, schema: &IrSchema, comments: &TsComments) -> Box<TsType> {
    let ty = if schema.is_hoistable() {
        type_ref(&format!("{parent}.{}", schema.name))
    } else {
        ts_inline(schema, comments)
    };
    if schema.repeated { array(ty) } else { ty }
}

/// Returns the JSDoc text for a property: its description,
/// followed by its default value.
fn jsdoc(property: &IrProperty) -> Option<String> {
    let default = property
        .default
        .as_ref()
        .map(|value| format!("@default {value}"));
    match (property.description.as_deref(), default) {
        (Some(description), Some(default)) => Some(format!("{description} {default}")),
        (Some(description), None) => Some(description.to_owned()),
        (None, default) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use swc_common::DUMMY_SP;
    use tsgen_core::{
        ir::{IrSchemaKind, transform},
        parse::RefOrSchema,
    };

    use crate::emit::{emit_module, export_decl};

    fn object(yaml: &str) -> IrSchema {
        let schema: RefOrSchema = serde_yaml::from_str(yaml).unwrap();
        transform("Pet", &schema, 64).unwrap()
    }

    fn emit(schema: &IrSchema) -> String {
        let IrSchemaKind::Object(object) = &schema.kind else {
            panic!("expected object; got `{schema:?}`");
        };
        let comments = TsComments::new();
        let decl = ts_object(&schema.name, object, &comments);
        emit_module(vec![export_decl(decl, DUMMY_SP)], &comments).unwrap()
    }

    #[test]
    fn test_required_and_optional_properties() {
        let schema = object(indoc::indoc! {"
            type: object
            required: [name, tags]
            properties:
              name:
                type: string
              age:
                type: integer
              tags:
                type: array
                items:
                  type: string
              owner:
                $ref: '#/components/schemas/Person'
        "});

        assert_eq!(
            emit(&schema),
            indoc::indoc! {"
                export interface Pet {
                  name: string;
                  age?: number;
                  tags: string[];
                  owner?: Person;
                }
            "}
        );
    }

    #[test]
    fn test_hoisted_properties_are_qualified() {
        let schema = object(indoc::indoc! {"
            type: object
            properties:
              status:
                type: string
                enum: [available, sold]
              photo_urls:
                type: array
                items:
                  type: object
                  properties:
                    url:
                      type: string
        "});

        assert_eq!(
            emit(&schema),
            indoc::indoc! {"
                export interface Pet {
                  status?: Pet.Status;
                  photo_urls?: Pet.PhotoUrls[];
                }
            "}
        );
    }

    #[test]
    fn test_property_jsdoc() {
        let schema = object(indoc::indoc! {"
            type: object
            properties:
              limit:
                type: integer
                description: How many to return.
                default: 20
        "});

        let output = emit(&schema);

        assert!(
            output.contains("/** How many to return. @default 20 */"),
            "{output}"
        );
        assert!(output.contains("limit?: number;"), "{output}");
    }

    #[test]
    fn test_jsdoc_text() {
        let property = |description: Option<&str>, default| IrProperty {
            schema: IrSchema::new("Limit", IrSchemaKind::Numeric),
            description: description.map(str::to_owned),
            required: false,
            repeated: false,
            default,
        };
        assert_eq!(jsdoc(&property(None, None)), None);
        assert_eq!(
            jsdoc(&property(None, Some(serde_json::json!("asc")))).as_deref(),
            Some(r#"@default "asc""#)
        );
        assert_eq!(
            jsdoc(&property(Some("Sort order."), None)).as_deref(),
            Some("Sort order.")
        );
    }
}
