use heck::AsLowerCamelCase;
use itertools::Itertools;
use serde_json::Value;
use tsgen_core::ir::IrEnumType;

use crate::emit::EnumMemberName;

/// TypeScript reserved words that can't name a function or a binding.
const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    // Strict mode reserved words.
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// Returns `true` if `s` can be written as a bare identifier,
/// like a property key or a member name.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c == '$' || c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
}

/// Returns the camelCase name of the function for an operation.
pub fn ts_function_name(operation_id: &str) -> String {
    let name = AsLowerCamelCase(clean(operation_id)).to_string();
    if KEYWORDS.contains(&name.as_str()) || !is_valid_identifier(&name) {
        format!("_{name}")
    } else {
        name
    }
}

/// Returns the member name for an enum literal.
///
/// String enums name members after their literals, quoted if they aren't
/// identifiers. Numeric enums name them `<Enum>_<value>`.
pub fn ts_enum_member_name(enum_name: &str, ty: IrEnumType, value: &Value) -> EnumMemberName {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match ty {
        IrEnumType::String if is_valid_identifier(&text) => EnumMemberName::Ident(text),
        // Numeric names aren't allowed, even when quoted.
        IrEnumType::String if text.parse::<f64>().is_ok() => {
            EnumMemberName::Ident(format!("_{}", spell_number(&text)))
        }
        IrEnumType::String => EnumMemberName::Str(text),
        IrEnumType::Number => {
            EnumMemberName::Ident(format!("{enum_name}_{}", spell_number(&text)))
        }
    }
}

/// Spells a number as identifier characters, keeping its sign:
/// `-1.5` becomes `neg1_5`.
fn spell_number(text: &str) -> String {
    match text.strip_prefix('-') {
        Some(magnitude) => format!("neg{}", clean(magnitude)),
        None => clean(text),
    }
}

/// Replaces every run of characters that can't appear in an
/// identifier with `_`.
fn clean(s: &str) -> String {
    s.split(|c: char| c != '$' && !unicode_ident::is_xid_continue(c))
        .filter(|part| !part.is_empty())
        .join("_")
}
