use tsgen_core::codegen::Code;

use super::emit::{TsComments, emit_module, export_all};

/// Generates `index.ts`, which re-exports the other modules.
#[derive(Clone, Copy, Debug)]
pub struct CodegenIndex {
    client: bool,
}

impl CodegenIndex {
    pub fn new(client: bool) -> Self {
        Self { client }
    }
}

impl Code for CodegenIndex {
    fn path(&self) -> &str {
        "index.ts"
    }

    fn into_string(self) -> miette::Result<String> {
        let comments = TsComments::new();
        let mut items = vec![];
        if self.client {
            items.push(export_all("./client"));
        }
        items.push(export_all("./schemas"));
        emit_module(items, &comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_with_client() {
        let output = CodegenIndex::new(true).into_string().unwrap();
        assert_eq!(
            output,
            "export * from \"./client\";\nexport * from \"./schemas\";\n"
        );
    }

    #[test]
    fn test_index_without_client() {
        let output = CodegenIndex::new(false).into_string().unwrap();
        assert_eq!(output, "export * from \"./schemas\";\n");
    }
}
