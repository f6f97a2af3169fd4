use crate::parse::{Method, path::BadPath};

/// An error that stops resolution. A document that can't be fully
/// resolved produces no IR.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum IrError {
    #[error("operation `{method} {path}` is missing `operationId`")]
    #[diagnostic(code(tsgen::ir::missing_operation_id))]
    MissingOperationId { method: Method, path: String },

    #[error("couldn't resolve schema `{name}`")]
    #[diagnostic(
        code(tsgen::ir::unresolvable_schema),
        help("schemas need `$ref`, `allOf`, `oneOf`, `enum`, or a supported `type`")
    )]
    UnresolvableSchema { name: String },

    #[error("schema `{name}` is an array of arrays, which can't be represented")]
    #[diagnostic(code(tsgen::ir::nested_array))]
    NestedArray { name: String },

    #[error("parameter `{reference}` isn't defined in `components.parameters`")]
    #[diagnostic(code(tsgen::ir::unresolved_parameter))]
    UnresolvedGlobalParameter { reference: String },

    #[error("request body `{reference}` isn't defined in `components.requestBodies`")]
    #[diagnostic(code(tsgen::ir::unresolved_request_body))]
    UnresolvedRequestBody { reference: String },

    #[error("response `{reference}` isn't defined in `components.responses`")]
    #[diagnostic(code(tsgen::ir::unresolved_response))]
    UnresolvedResponse { reference: String },

    #[error("schema `{referrer}` references `{type_name}`, which isn't defined in `components.schemas`")]
    #[diagnostic(code(tsgen::ir::unresolved_reference))]
    UnresolvedReference { referrer: String, type_name: String },

    #[error("operation `{operation}` should include one of {codes} responses")]
    #[diagnostic(code(tsgen::ir::no_conventional_response))]
    NoConventionalResponse { operation: String, codes: String },

    #[error("operation `{operation}` uses unsupported method `{method}`")]
    #[diagnostic(code(tsgen::ir::unsupported_verb))]
    UnsupportedVerb { operation: String, method: Method },

    #[error("operation `{operation}` has more than one input named `{name}`")]
    #[diagnostic(
        code(tsgen::ir::conflicting_input),
        help("path and query parameters, and the request body, share one request object")
    )]
    ConflictingInput { operation: String, name: String },

    #[error("{location} of operation `{operation}` has no `application/json` schema")]
    #[diagnostic(code(tsgen::ir::no_json_content))]
    NoJsonContent {
        operation: String,
        location: &'static str,
    },

    #[error("schema `{name}` is nested more than {limit} levels deep")]
    #[diagnostic(code(tsgen::ir::recursion_limit))]
    RecursionLimit { name: String, limit: usize },

    #[error("operation `{operation}` has an invalid path")]
    #[diagnostic(code(tsgen::ir::bad_path))]
    BadOperationPath {
        operation: String,
        #[source]
        #[diagnostic_source]
        source: BadPath,
    },
}
