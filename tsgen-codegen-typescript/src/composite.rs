use swc_ecma_ast::TsType;
use tsgen_core::ir::IrComposite;

use super::{
    emit::{TsComments, intersection, parenthesize_composite, union},
    schema::ts_use,
};

/// Generates `A & B & ...` for an `allOf`. Members that are themselves
/// unions are parenthesized.
pub fn ts_intersection(composite: &IrComposite, comments: &TsComments) -> Box<TsType> {
    intersection(
        composite
            .types
            .iter()
            .map(|member| parenthesize_composite(ts_use(member, comments)))
            .collect(),
    )
}

/// Generates `A | B | ...` for a `oneOf`.
pub fn ts_union(composite: &IrComposite, comments: &TsComments) -> Box<TsType> {
    union(
        composite
            .types
            .iter()
            .map(|member| ts_use(member, comments))
            .collect(),
    )
}
