//! Emits TypeScript from a resolved [`IrSpec`]: schema declarations,
//! client functions, and an index module that re-exports both.

use tsgen_core::{codegen::Code, ir::IrSpec};

mod client;
mod composite;
mod emit;
mod enum_;
mod index;
mod naming;
mod object;
mod schema;


pub use client::*;
pub use index::*;
pub use naming::{is_valid_identifier, ts_function_name};
pub use schema::*;

/// Renders every generated file, as `(path, contents)` pairs.
///
/// Nothing is written here; callers write the files once every
/// one has rendered.
pub fn render(spec: &IrSpec, client: bool) -> miette::Result<Vec<(String, String)>> {
    let mut files = vec![];
    let schemas = CodegenSchemas::new(spec);
    files.push((schemas.path().to_owned(), schemas.into_string()?));
    if client {
        let client = CodegenClient::new(spec);
        files.push((client.path().to_owned(), client.into_string()?));
    }
    let index = CodegenIndex::new(client);
    files.push((index.path().to_owned(), index.into_string()?));
    files.push(("version".to_owned(), format!("{}\n", spec.version)));
    Ok(files)
}
