use itertools::Itertools;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use swc_common::DUMMY_SP;
use swc_ecma_ast::{Decl, Expr, TsKeywordTypeKind};
use tsgen_core::{
    codegen::Code,
    ir::{IrOperation, IrSpec},
    parse::path::PathFragment,
};

use super::{
    emit::{
        TplPart, TsComments, array, call, emit_module, export_decl, fn_decl, fn_type, generic,
        import_type_decl, interface_decl, kw, member, object_lit, property_sig, record,
        return_stmt, str_expr, tpl, type_alias_decl, type_ref,
    },
    naming::ts_function_name,
    schema::ts_inline,
};

/// Characters that literal path text must encode: the path and URL
/// delimiters, plus `` ` ``, `\` and braces for template literals.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generates `client.ts`, with a function for each operation.
///
/// The functions don't send requests themselves. Each one takes a
/// `Requester` that performs the HTTP exchange.
pub struct CodegenClient<'a> {
    spec: &'a IrSpec,
}

impl<'a> CodegenClient<'a> {
    pub fn new(spec: &'a IrSpec) -> Self {
        Self { spec }
    }

    /// Returns the schema names that the functions refer to,
    /// in order of first use.
    fn imports(&self) -> Vec<String> {
        self.spec
            .operations
            .iter()
            .flat_map(|op| {
                let mut names = vec![op.request.as_str()];
                match &op.response {
                    Some(response) if response.is_hoistable() => names.push(&response.name),
                    Some(response) => response.walk(&mut |schema| {
                        names.extend(schema.kind.type_name());
                    }),
                    None => {}
                }
                names
            })
            .unique()
            .map(str::to_owned)
            .collect()
    }
}

impl Code for CodegenClient<'_> {
    fn path(&self) -> &str {
        "client.ts"
    }

    fn into_string(self) -> miette::Result<String> {
        let comments = TsComments::new();
        let mut items = vec![];

        let imports = self.imports();
        if !imports.is_empty() {
            items.push(import_type_decl(&imports, "./schemas"));
        }

        items.push(export_decl(
            interface_decl(
                "ApiRequest",
                vec![
                    property_sig("method", false, kw(TsKeywordTypeKind::TsStringKeyword), DUMMY_SP),
                    property_sig("path", false, kw(TsKeywordTypeKind::TsStringKeyword), DUMMY_SP),
                    property_sig(
                        "query",
                        true,
                        record(kw(TsKeywordTypeKind::TsUnknownKeyword)),
                        DUMMY_SP,
                    ),
                    property_sig("body", true, kw(TsKeywordTypeKind::TsUnknownKeyword), DUMMY_SP),
                ],
            ),
            DUMMY_SP,
        ));
        items.push(export_decl(
            type_alias_decl(
                "Requester",
                fn_type(
                    &[("request", type_ref("ApiRequest"))],
                    generic("Promise", vec![kw(TsKeywordTypeKind::TsAnyKeyword)]),
                ),
            ),
            comments.span_with_jsdoc(Some("Sends a request, and resolves to the decoded response body.")),
        ));

        for op in &self.spec.operations {
            let span = comments.span_with_jsdoc(op.summary.as_deref());
            items.push(export_decl(ts_operation(op, &comments), span));
        }

        emit_module(items, &comments)
    }
}

/// Generates the function for an operation.
fn ts_operation(op: &IrOperation, comments: &TsComments) -> Decl {
    let response = match &op.response {
        Some(response) => {
            let ty = if response.is_hoistable() {
                type_ref(&response.name)
            } else {
                ts_inline(response, comments)
            };
            if response.repeated { array(ty) } else { ty }
        }
        None => kw(TsKeywordTypeKind::TsVoidKeyword),
    };

    let mut request = vec![
        ("method".to_owned(), str_expr(op.method.as_str())),
        ("path".to_owned(), ts_path(op)),
    ];
    if !op.query_params.is_empty() {
        let query = op
            .query_params
            .iter()
            .map(|name| (name.clone(), member("req", name)))
            .collect();
        request.push(("query".to_owned(), object_lit(query)));
    }
    if op.has_body {
        request.push(("body".to_owned(), member("req", "body")));
    }

    fn_decl(
        &ts_function_name(&op.name),
        vec![
            ("requester", type_ref("Requester")),
            ("req", type_ref(&op.request)),
        ],
        generic("Promise", vec![response]),
        vec![return_stmt(call("requester", vec![object_lit(request)]))],
    )
}

/// Generates the request path: a string literal, or a template literal
/// that substitutes encoded path parameters.
fn ts_path(op: &IrOperation) -> Box<Expr> {
    if op.segments.iter().all(|segment| segment.params().next().is_none()) {
        return str_expr(&op.path);
    }
    let parts = op
        .segments
        .iter()
        .flat_map(|segment| {
            std::iter::once(TplPart::Text("/".to_owned())).chain(segment.fragments().iter().map(
                |fragment| match fragment {
                    PathFragment::Literal(text) => {
                        TplPart::Text(utf8_percent_encode(text, SEGMENT).to_string())
                    }
                    PathFragment::Param(name) => TplPart::Expr(call(
                        "encodeURIComponent",
                        vec![member("req", name)],
                    )),
                },
            ))
        })
        .collect();
    tpl(parts)
}
