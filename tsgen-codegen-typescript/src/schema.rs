use swc_common::DUMMY_SP;
use swc_ecma_ast::{ModuleItem, TsKeywordTypeKind, TsType};
use tsgen_core::{
    codegen::Code,
    ir::{IrSchema, IrSchemaKind, IrSpec},
};

use super::{
    composite::{ts_intersection, ts_union},
    emit::{
        TsComments, array, emit_module, export_decl, kw, namespace_decl, type_alias_decl,
        type_lit, type_ref,
    },
    enum_::{ts_enum, ts_enum_literals},
    object::{ts_members, ts_object},
};

/// Generates `schemas.ts`, with a declaration for every
/// top-level schema.
pub struct CodegenSchemas<'a> {
    spec: &'a IrSpec,
}

impl<'a> CodegenSchemas<'a> {
    pub fn new(spec: &'a IrSpec) -> Self {
        Self { spec }
    }

    /// Renders each top-level schema on its own, in declaration order.
    pub fn declarations(&self) -> miette::Result<Vec<TsDeclaration>> {
        self.spec
            .schemas
            .iter()
            .map(|schema| {
                let comments = TsComments::new();
                let text = emit_module(ts_declaration(schema, &comments), &comments)?;
                Ok(TsDeclaration {
                    name: schema.name.clone(),
                    text,
                })
            })
            .collect()
    }
}

impl Code for CodegenSchemas<'_> {
    fn path(&self) -> &str {
        "schemas.ts"
    }

    fn into_string(self) -> miette::Result<String> {
        let comments = TsComments::new();
        let items = self
            .spec
            .schemas
            .iter()
            .flat_map(|schema| ts_declaration(schema, &comments))
            .collect();
        emit_module(items, &comments)
    }
}

/// The rendered text of one top-level schema, including the
/// namespace of its hoisted sub-schemas.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TsDeclaration {
    pub name: String,
    pub text: String,
}

/// Generates the exported declaration for a schema, followed by a
/// namespace that declares its hoisted sub-schemas.
pub(crate) fn ts_declaration(schema: &IrSchema, comments: &TsComments) -> Vec<ModuleItem> {
    let decl = match &schema.kind {
        IrSchemaKind::Object(object) => ts_object(&schema.name, object, comments),
        IrSchemaKind::Enum(ty) => ts_enum(&schema.name, ty),
        _ => type_alias_decl(&schema.name, ts_use(schema, comments)),
    };
    let mut items = vec![export_decl(decl, DUMMY_SP)];

    let hoisted = schema.hoisted();
    if !hoisted.is_empty() {
        let body = hoisted
            .iter()
            .flat_map(|schema| ts_declaration(schema, comments))
            .collect();
        items.push(export_decl(namespace_decl(&schema.name, body), DUMMY_SP));
    }
    items
}

/// Generates the type of a schema where it's used inline,
/// as an array if it's repeated.
pub(crate) fn ts_use(schema: &IrSchema, comments: &TsComments) -> Box<TsType> {
    let ty = ts_inline(schema, comments);
    if schema.repeated { array(ty) } else { ty }
}

/// Generates the element type of a schema, written out in full.
pub(crate) fn ts_inline(schema: &IrSchema, comments: &TsComments) -> Box<TsType> {
    match &schema.kind {
        IrSchemaKind::TypeReference(name) => type_ref(name),
        IrSchemaKind::Intersection(composite) => ts_intersection(composite, comments),
        IrSchemaKind::Union(composite) => ts_union(composite, comments),
        IrSchemaKind::Enum(ty) => ts_enum_literals(ty),
        IrSchemaKind::Object(object) => type_lit(ts_members(&schema.name, object, comments)),
        IrSchemaKind::Numeric => kw(TsKeywordTypeKind::TsNumberKeyword),
        IrSchemaKind::String => kw(TsKeywordTypeKind::TsStringKeyword),
        IrSchemaKind::Boolean => kw(TsKeywordTypeKind::TsBooleanKeyword),
    }
}
