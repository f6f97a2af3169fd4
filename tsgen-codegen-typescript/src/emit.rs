use std::cell::Cell;

use miette::IntoDiagnostic;
use swc_common::{
    BytePos, DUMMY_SP, SourceMap, Span, SyntaxContext,
    comments::{Comment, CommentKind, Comments, SingleThreadedComments},
    sync::Lrc,
};
use swc_ecma_ast::{
    BindingIdent, BlockStmt, Bool, CallExpr, Callee, ComputedPropName, Decl, ExportAll,
    ExportDecl, Expr, ExprOrSpread, FnDecl, Function, Ident, IdentName, ImportDecl,
    ImportNamedSpecifier, ImportPhase, ImportSpecifier, KeyValueProp, Lit, MemberExpr,
    MemberProp, Module, ModuleDecl, ModuleItem, Number, ObjectLit, Param, Pat, Prop, PropName,
    PropOrSpread, ReturnStmt, Stmt, Str, Tpl, TplElement, TsArrayType, TsEntityName, TsEnumDecl,
    TsEnumMember, TsEnumMemberId, TsFnOrConstructorType, TsFnParam, TsFnType, TsInterfaceBody,
    TsInterfaceDecl, TsIntersectionType, TsKeywordType, TsKeywordTypeKind, TsLit, TsLitType,
    TsModuleBlock, TsModuleDecl, TsModuleName, TsNamespaceBody, TsParenthesizedType,
    TsPropertySignature, TsQualifiedName, TsType, TsTypeAliasDecl, TsTypeAnn, TsTypeElement,
    TsTypeLit, TsTypeParamInstantiation, TsTypeRef, TsUnionOrIntersectionType, TsUnionType,
};
use swc_ecma_codegen::{Emitter, text_writer::JsWriter};

use crate::naming::is_valid_identifier;

// MARK: Comments

/// Bundles a [`SingleThreadedComments`] store with a [`BytePos`] counter
/// for allocating unique spans to attach JSDoc comments.
pub struct TsComments {
    comments: SingleThreadedComments,
    next_pos: Cell<u32>,
}

impl TsComments {
    pub fn new() -> Self {
        Self {
            comments: SingleThreadedComments::default(),
            // `BytePos(0)` is `DUMMY_SP.lo`.
            next_pos: Cell::new(1),
        }
    }

    /// Allocates a unique span, attaching a leading `/** text */`
    /// comment if `text` is given.
    pub fn span_with_jsdoc(&self, text: Option<&str>) -> Span {
        let pos = self.next_pos.get();
        self.next_pos.set(pos + 1);
        let lo = BytePos(pos);
        let span = Span::new(lo, lo);

        if let Some(text) = text {
            self.comments.add_leading(
                lo,
                Comment {
                    kind: CommentKind::Block,
                    span: DUMMY_SP,
                    text: format!("* {} ", text.replace("*/", "*\\/")).into(),
                },
            );
        }

        span
    }
}

impl Default for TsComments {
    fn default() -> Self {
        Self::new()
    }
}

// MARK: Idents

pub fn ident(name: &str) -> Ident {
    Ident::new_no_ctxt(name.into(), DUMMY_SP)
}

pub fn ident_name(name: &str) -> IdentName {
    IdentName::new(name.into(), DUMMY_SP)
}

fn str_lit(value: &str) -> Str {
    Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }
}

// MARK: Types

/// Creates a keyword type like `string`, `number`, or `void`.
pub fn kw(kind: TsKeywordTypeKind) -> Box<TsType> {
    Box::new(TsType::TsKeywordType(TsKeywordType {
        span: DUMMY_SP,
        kind,
    }))
}

/// Creates a string literal type like `"active"`.
pub fn lit_str(s: &str) -> Box<TsType> {
    Box::new(TsType::TsLitType(TsLitType {
        span: DUMMY_SP,
        lit: TsLit::Str(str_lit(s)),
    }))
}

/// Creates a number literal type, keeping the literal's spelling.
pub fn lit_num(n: &serde_json::Number) -> Box<TsType> {
    Box::new(TsType::TsLitType(TsLitType {
        span: DUMMY_SP,
        lit: TsLit::Number(number(n)),
    }))
}

pub fn lit_bool(b: bool) -> Box<TsType> {
    Box::new(TsType::TsLitType(TsLitType {
        span: DUMMY_SP,
        lit: TsLit::Bool(Bool {
            span: DUMMY_SP,
            value: b,
        }),
    }))
}

fn number(n: &serde_json::Number) -> Number {
    Number {
        span: DUMMY_SP,
        value: n.as_f64().unwrap_or_default(),
        raw: Some(n.to_string().into()),
    }
}

/// Creates an array type `T[]`, parenthesizing union and
/// intersection element types.
pub fn array(elem: Box<TsType>) -> Box<TsType> {
    Box::new(TsType::TsArrayType(TsArrayType {
        span: DUMMY_SP,
        elem_type: parenthesize_composite(elem),
    }))
}

/// Wraps union and intersection types in parentheses. The printer
/// doesn't add them on its own, so `(A | B)[]` would print as `A | B[]`.
pub fn parenthesize_composite(ty: Box<TsType>) -> Box<TsType> {
    match *ty {
        TsType::TsUnionOrIntersectionType(_) => {
            Box::new(TsType::TsParenthesizedType(TsParenthesizedType {
                span: DUMMY_SP,
                type_ann: ty,
            }))
        }
        _ => ty,
    }
}

/// Creates a generic type reference, like `Promise<T>`.
#[allow(clippy::vec_box)] // `TsTypeParamInstantiation` requires `Vec<Box<TsType>>`.
pub fn generic(name: &str, params: Vec<Box<TsType>>) -> Box<TsType> {
    Box::new(TsType::TsTypeRef(TsTypeRef {
        span: DUMMY_SP,
        type_name: TsEntityName::Ident(ident(name)),
        type_params: Some(Box::new(TsTypeParamInstantiation {
            span: DUMMY_SP,
            params,
        })),
    }))
}

/// Creates a `Record<string, T>` type reference.
pub fn record(value: Box<TsType>) -> Box<TsType> {
    generic("Record", vec![kw(TsKeywordTypeKind::TsStringKeyword), value])
}

/// Creates a union type `A | B | C`. An empty union is `never`.
#[allow(clippy::vec_box)] // `TsUnionType` requires `Vec<Box<TsType>>`.
pub fn union(mut types: Vec<Box<TsType>>) -> Box<TsType> {
    match types.len() {
        0 => kw(TsKeywordTypeKind::TsNeverKeyword),
        1 => types.remove(0),
        _ => Box::new(TsType::TsUnionOrIntersectionType(
            TsUnionOrIntersectionType::TsUnionType(TsUnionType {
                span: DUMMY_SP,
                types,
            }),
        )),
    }
}

/// Creates an intersection type `A & B & C`. An empty intersection
/// is `unknown`.
#[allow(clippy::vec_box)] // `TsIntersectionType` requires `Vec<Box<TsType>>`.
pub fn intersection(mut types: Vec<Box<TsType>>) -> Box<TsType> {
    match types.len() {
        0 => kw(TsKeywordTypeKind::TsUnknownKeyword),
        1 => types.remove(0),
        _ => Box::new(TsType::TsUnionOrIntersectionType(
            TsUnionOrIntersectionType::TsIntersectionType(TsIntersectionType {
                span: DUMMY_SP,
                types,
            }),
        )),
    }
}

/// Creates a type reference, parsing dotted names like `Order.Status`
/// into a qualified name chain.
pub fn type_ref(name: &str) -> Box<TsType> {
    Box::new(TsType::TsTypeRef(TsTypeRef {
        span: DUMMY_SP,
        type_name: entity_name(name),
        type_params: None,
    }))
}

fn entity_name(name: &str) -> TsEntityName {
    let mut parts = name.split('.');
    let first = TsEntityName::Ident(ident(parts.next().unwrap_or_default()));
    parts.fold(first, |left, part| {
        TsEntityName::TsQualifiedName(Box::new(TsQualifiedName {
            span: DUMMY_SP,
            left,
            right: ident_name(part),
        }))
    })
}

/// Creates an anonymous object type `{ field: Type; ... }`.
pub fn type_lit(members: Vec<TsTypeElement>) -> Box<TsType> {
    Box::new(TsType::TsTypeLit(TsTypeLit {
        span: DUMMY_SP,
        members,
    }))
}

fn type_ann(ty: Box<TsType>) -> Box<TsTypeAnn> {
    Box::new(TsTypeAnn {
        span: DUMMY_SP,
        type_ann: ty,
    })
}

/// Creates a function type with named parameters, like
/// `(request: ApiRequest) => Promise<any>`.
pub fn fn_type(params: &[(&str, Box<TsType>)], ret: Box<TsType>) -> Box<TsType> {
    Box::new(TsType::TsFnOrConstructorType(
        TsFnOrConstructorType::TsFnType(TsFnType {
            span: DUMMY_SP,
            params: params
                .iter()
                .map(|(name, ty)| {
                    TsFnParam::Ident(BindingIdent {
                        id: ident(name),
                        type_ann: Some(type_ann(ty.clone())),
                    })
                })
                .collect(),
            type_params: None,
            type_ann: type_ann(ret),
        }),
    ))
}

// MARK: Properties

/// Creates a property signature for an interface or type literal.
/// Names that aren't identifiers are quoted.
pub fn property_sig(name: &str, optional: bool, ty: Box<TsType>, span: Span) -> TsTypeElement {
    TsTypeElement::TsPropertySignature(TsPropertySignature {
        span,
        readonly: false,
        key: Box::new(key_expr(name)),
        computed: false,
        optional,
        type_ann: Some(type_ann(ty)),
    })
}

fn key_expr(name: &str) -> Expr {
    if is_valid_identifier(name) {
        Expr::Ident(ident(name))
    } else {
        Expr::Lit(Lit::Str(str_lit(name)))
    }
}

// MARK: Expressions

pub fn str_expr(value: &str) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Str(str_lit(value))))
}

/// Creates a member access `obj.prop`, or `obj["prop"]` if `prop`
/// isn't an identifier.
pub fn member(obj: &str, prop: &str) -> Box<Expr> {
    let prop = if is_valid_identifier(prop) {
        MemberProp::Ident(ident_name(prop))
    } else {
        MemberProp::Computed(ComputedPropName {
            span: DUMMY_SP,
            expr: str_expr(prop),
        })
    };
    Box::new(Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(Expr::Ident(ident(obj))),
        prop,
    }))
}

/// Creates a call `callee(args...)`.
pub fn call(callee: &str, args: Vec<Box<Expr>>) -> Box<Expr> {
    Box::new(Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(Expr::Ident(ident(callee)))),
        args: args
            .into_iter()
            .map(|expr| ExprOrSpread { spread: None, expr })
            .collect(),
        type_args: None,
    }))
}

/// Creates an object literal `{ key: value, ... }`.
pub fn object_lit(props: Vec<(String, Box<Expr>)>) -> Box<Expr> {
    Box::new(Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props: props
            .into_iter()
            .map(|(key, value)| {
                let key = if is_valid_identifier(&key) {
                    PropName::Ident(ident_name(&key))
                } else {
                    PropName::Str(str_lit(&key))
                };
                PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp { key, value })))
            })
            .collect(),
    }))
}

/// A piece of a template literal.
pub enum TplPart {
    Text(String),
    Expr(Box<Expr>),
}

/// Creates a template literal from text and expressions, like
/// `` `/pets/${id}` ``. Text must not contain `` ` ``, `\`, or `${`.
pub fn tpl(parts: Vec<TplPart>) -> Box<Expr> {
    let mut quasis = vec![String::new()];
    let mut exprs = vec![];
    for part in parts {
        match part {
            TplPart::Text(text) => {
                if let Some(last) = quasis.last_mut() {
                    last.push_str(&text);
                }
            }
            TplPart::Expr(expr) => {
                exprs.push(expr);
                quasis.push(String::new());
            }
        }
    }
    let tail = quasis.len() - 1;
    Box::new(Expr::Tpl(Tpl {
        span: DUMMY_SP,
        exprs,
        quasis: quasis
            .into_iter()
            .enumerate()
            .map(|(index, text)| TplElement {
                span: DUMMY_SP,
                tail: index == tail,
                cooked: Some(text.as_str().into()),
                raw: text.as_str().into(),
            })
            .collect(),
    }))
}

pub fn return_stmt(arg: Box<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        span: DUMMY_SP,
        arg: Some(arg),
    })
}

// MARK: Declarations

/// Creates an `interface Name { members }` declaration.
pub fn interface_decl(name: &str, members: Vec<TsTypeElement>) -> Decl {
    Decl::TsInterface(Box::new(TsInterfaceDecl {
        span: DUMMY_SP,
        id: ident(name),
        declare: false,
        type_params: None,
        extends: vec![],
        body: TsInterfaceBody {
            span: DUMMY_SP,
            body: members,
        },
    }))
}

/// Creates a `type Name = Type` declaration.
pub fn type_alias_decl(name: &str, ty: Box<TsType>) -> Decl {
    Decl::TsTypeAlias(Box::new(TsTypeAliasDecl {
        span: DUMMY_SP,
        declare: false,
        id: ident(name),
        type_params: None,
        type_ann: ty,
    }))
}

/// The name of an enum member: an identifier, or a quoted string.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EnumMemberName {
    Ident(String),
    Str(String),
}

/// Creates an `enum Name { member = value, ... }` declaration.
pub fn enum_decl(name: &str, members: Vec<(EnumMemberName, Box<Expr>)>) -> Decl {
    Decl::TsEnum(Box::new(TsEnumDecl {
        span: DUMMY_SP,
        declare: false,
        is_const: false,
        id: ident(name),
        members: members
            .into_iter()
            .map(|(id, init)| TsEnumMember {
                span: DUMMY_SP,
                id: match id {
                    EnumMemberName::Ident(id) => TsEnumMemberId::Ident(ident(&id)),
                    EnumMemberName::Str(id) => TsEnumMemberId::Str(str_lit(&id)),
                },
                init: Some(init),
            })
            .collect(),
    }))
}

/// Creates a literal expression for an enum member's value.
pub fn lit_expr(value: &serde_json::Value) -> Box<Expr> {
    match value {
        serde_json::Value::Number(n) => Box::new(Expr::Lit(Lit::Num(number(n)))),
        serde_json::Value::String(s) => str_expr(s),
        other => str_expr(&other.to_string()),
    }
}

/// Creates a `namespace Name { body }` declaration.
pub fn namespace_decl(name: &str, body: Vec<ModuleItem>) -> Decl {
    Decl::TsModule(Box::new(TsModuleDecl {
        span: DUMMY_SP,
        declare: false,
        global: false,
        namespace: true,
        id: TsModuleName::Ident(ident(name)),
        body: Some(TsNamespaceBody::TsModuleBlock(TsModuleBlock {
            span: DUMMY_SP,
            body,
        })),
    }))
}

/// Creates a `function name(params): ret { body }` declaration.
pub fn fn_decl(
    name: &str,
    params: Vec<(&str, Box<TsType>)>,
    ret: Box<TsType>,
    body: Vec<Stmt>,
) -> Decl {
    Decl::Fn(FnDecl {
        ident: ident(name),
        declare: false,
        function: Box::new(Function {
            params: params
                .into_iter()
                .map(|(name, ty)| Param {
                    span: DUMMY_SP,
                    decorators: vec![],
                    pat: Pat::Ident(BindingIdent {
                        id: ident(name),
                        type_ann: Some(type_ann(ty)),
                    }),
                })
                .collect(),
            decorators: vec![],
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            body: Some(BlockStmt {
                span: DUMMY_SP,
                ctxt: SyntaxContext::empty(),
                stmts: body,
            }),
            is_generator: false,
            is_async: false,
            type_params: None,
            return_type: Some(type_ann(ret)),
        }),
    })
}

// MARK: Module items

/// Wraps a declaration in `export <decl>`. The span carries any
/// JSDoc comment.
pub fn export_decl(decl: Decl, span: Span) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl { span, decl }))
}

/// Creates `import type { names } from "module";`.
pub fn import_type_decl(names: &[String], module: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: names
            .iter()
            .map(|n| {
                ImportSpecifier::Named(ImportNamedSpecifier {
                    span: DUMMY_SP,
                    local: ident(n),
                    imported: None,
                    is_type_only: false,
                })
            })
            .collect(),
        src: Box::new(str_lit(module)),
        type_only: true,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

/// Creates `export * from "module";`.
pub fn export_all(module: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::ExportAll(ExportAll {
        span: DUMMY_SP,
        src: Box::new(str_lit(module)),
        type_only: false,
        with: None,
    }))
}

// MARK: Emitter

/// Prints module items as TypeScript source, with two-space indents
/// and a trailing newline.
pub fn emit_module(body: Vec<ModuleItem>, comments: &TsComments) -> miette::Result<String> {
    let cm: Lrc<SourceMap> = Lrc::new(SourceMap::default());
    let mut buf = Vec::new();

    let module = Module {
        span: DUMMY_SP,
        body,
        shebang: None,
    };

    {
        let mut wr = JsWriter::new(cm.clone(), "\n", &mut buf, None);
        wr.set_indent_str("  ");
        let mut emitter = Emitter {
            cfg: Default::default(),
            cm: cm.clone(),
            comments: Some(&comments.comments),
            wr,
        };
        emitter.emit_module(&module).into_diagnostic()?;
    }

    let mut result = String::from_utf8(buf).into_diagnostic()?;
    if !result.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}
