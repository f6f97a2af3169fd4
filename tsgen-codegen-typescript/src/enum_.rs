use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde_json::Value;
use swc_ecma_ast::{Decl, TsKeywordTypeKind, TsType};
use tsgen_core::ir::IrEnum;

use super::{
    emit::{EnumMemberName, enum_decl, kw, lit_bool, lit_expr, lit_num, lit_str, union},
    naming::ts_enum_member_name,
};

/// Generates an `enum` declaration.
///
/// Repeated literals are declared once. Distinct literals whose member
/// names collide get a numeric suffix.
pub fn ts_enum(name: &str, ty: &IrEnum) -> Decl {
    let mut taken = FxHashSet::default();
    let members = ty
        .items
        .iter()
        .unique_by(|value| value.to_string())
        .map(|value| {
            let member = uniquify(&mut taken, ts_enum_member_name(name, ty.enum_type, value));
            (member, lit_expr(value))
        })
        .collect();
    enum_decl(name, members)
}

fn uniquify(taken: &mut FxHashSet<String>, member: EnumMemberName) -> EnumMemberName {
    let (EnumMemberName::Ident(text) | EnumMemberName::Str(text)) = &member;
    if taken.insert(text.clone()) {
        return member;
    }
    let mut count = 2;
    let unique = loop {
        let candidate = format!("{text}_{count}");
        if taken.insert(candidate.clone()) {
            break candidate;
        }
        count += 1;
    };
    match member {
        EnumMemberName::Ident(_) => EnumMemberName::Ident(unique),
        EnumMemberName::Str(_) => EnumMemberName::Str(unique),
    }
}

/// Generates a union of an enum's literal values, for enums that
/// appear inline as members of a composite.
pub fn ts_enum_literals(ty: &IrEnum) -> Box<TsType> {
    union(
        ty.items
            .iter()
            .unique_by(|value| value.to_string())
            .map(|value| match value {
                Value::String(s) => lit_str(s),
                Value::Number(n) => lit_num(n),
                Value::Bool(b) => lit_bool(*b),
                Value::Null => kw(TsKeywordTypeKind::TsNullKeyword),
                other => lit_str(&other.to_string()),
            })
            .collect(),
    )
}
