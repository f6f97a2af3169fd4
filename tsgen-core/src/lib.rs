//! Parses OpenAPI documents and resolves them into an intermediate
//! representation for code generators.

pub mod codegen;
pub mod error;
pub mod ir;
pub mod parse;
